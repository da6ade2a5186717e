//! User CRUD operations.

use sqlx::SqlitePool;

use crate::error::{Result, StoreError};
use crate::models::{NewUser, User};
use crate::validation::{validate_email, validate_phone, validate_telegram};

const USER_COLUMNS: &str =
    "id, email, first_name, last_name, phone, telegram, is_active, created_at";

/// Register a new user.
pub async fn create_user(pool: &SqlitePool, new: &NewUser) -> Result<User> {
    validate_email(&new.email)?;
    validate_phone(new.phone.as_deref())?;
    validate_telegram(new.telegram.as_deref())?;

    let email = new.email.trim();
    let result = sqlx::query(
        r#"
        INSERT INTO users (email, first_name, last_name, phone, telegram)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(email)
    .bind(&new.first_name)
    .bind(&new.last_name)
    .bind(&new.phone)
    .bind(&new.telegram)
    .execute(pool)
    .await
    .map_err(|e| StoreError::from_write(e, "User", email))?;

    let id = result.last_insert_rowid();
    tracing::info!(user_id = id, "Created user");

    get_user(pool, id).await
}

/// Get a user by ID.
pub async fn get_user(pool: &SqlitePool, id: i64) -> Result<User> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| StoreError::not_found("User", id))
}

/// Get a user by their login email.
pub async fn get_user_by_email(pool: &SqlitePool, email: &str) -> Result<User> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"))
        .bind(email.trim())
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| StoreError::not_found("User", email))
}

/// Update an existing user. `created_at` is left untouched.
pub async fn update_user(pool: &SqlitePool, user: &User) -> Result<()> {
    validate_email(&user.email)?;
    validate_phone(user.phone.as_deref())?;
    validate_telegram(user.telegram.as_deref())?;

    let result = sqlx::query(
        r#"
        UPDATE users
        SET email = ?, first_name = ?, last_name = ?, phone = ?, telegram = ?, is_active = ?
        WHERE id = ?
        "#,
    )
    .bind(user.email.trim())
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.phone)
    .bind(&user.telegram)
    .bind(user.is_active)
    .bind(user.id)
    .execute(pool)
    .await
    .map_err(|e| StoreError::from_write(e, "User", &user.email))?;

    if result.rows_affected() == 0 {
        return Err(StoreError::not_found("User", user.id));
    }

    Ok(())
}

/// Delete a user. Their templates, and those templates' instances, go with them.
pub async fn delete_user(pool: &SqlitePool, id: i64) -> Result<()> {
    let result = sqlx::query(
        r#"
        DELETE FROM users
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::not_found("User", id));
    }

    tracing::info!(user_id = id, "Deleted user");
    Ok(())
}

/// List all users by ID.
pub async fn list_users(pool: &SqlitePool) -> Result<Vec<User>> {
    let users = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))
        .fetch_all(pool)
        .await?;

    Ok(users)
}

/// List users with the given last name, by ID.
pub async fn list_users_by_last_name(pool: &SqlitePool, last_name: &str) -> Result<Vec<User>> {
    let users = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE last_name = ? ORDER BY id"
    ))
    .bind(last_name)
    .fetch_all(pool)
    .await?;

    Ok(users)
}

/// Distinct last names, for building a filter list.
pub async fn list_last_names(pool: &SqlitePool) -> Result<Vec<String>> {
    let names = sqlx::query_scalar::<_, String>(
        r#"
        SELECT DISTINCT last_name
        FROM users
        WHERE last_name != ''
        ORDER BY last_name
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(names)
}

/// Count total users.
pub async fn count_users(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationError;
    use crate::Database;

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    fn new_user(email: &str, last_name: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            first_name: "Ann".to_string(),
            last_name: last_name.to_string(),
            ..NewUser::default()
        }
    }

    #[tokio::test]
    async fn test_user_crud() {
        let db = test_db().await;

        let user = create_user(db.pool(), &new_user("ann@example.com", "Petrova"))
            .await
            .unwrap();
        assert!(user.is_active);
        assert!(user.phone.is_none());
        assert!(!user.created_at.is_empty());

        let fetched = get_user_by_email(db.pool(), "ann@example.com").await.unwrap();
        assert_eq!(fetched, user);

        let updated = User {
            telegram: Some("@ann".to_string()),
            is_active: false,
            ..user.clone()
        };
        update_user(db.pool(), &updated).await.unwrap();
        let fetched = get_user(db.pool(), user.id).await.unwrap();
        assert_eq!(fetched.telegram.as_deref(), Some("@ann"));
        assert!(!fetched.is_active);
        assert_eq!(fetched.created_at, user.created_at);

        assert_eq!(count_users(db.pool()).await.unwrap(), 1);

        delete_user(db.pool(), user.id).await.unwrap();
        assert!(matches!(
            get_user(db.pool(), user.id).await,
            Err(StoreError::NotFound { entity: "User", .. })
        ));
        assert!(matches!(
            delete_user(db.pool(), user.id).await,
            Err(StoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let db = test_db().await;
        create_user(db.pool(), &new_user("ann@example.com", "Petrova"))
            .await
            .unwrap();

        let result = create_user(db.pool(), &new_user("ann@example.com", "Ivanova")).await;
        assert!(matches!(
            result,
            Err(StoreError::AlreadyExists { entity: "User", .. })
        ));
    }

    #[tokio::test]
    async fn test_invalid_email_is_not_written() {
        let db = test_db().await;
        let result = create_user(db.pool(), &new_user("not-an-email", "Petrova")).await;
        assert!(matches!(
            result,
            Err(StoreError::Validation(ValidationError::InvalidEmail(_)))
        ));
        assert_eq!(count_users(db.pool()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_filter_by_last_name() {
        let db = test_db().await;
        let a = create_user(db.pool(), &new_user("a@example.com", "Petrova"))
            .await
            .unwrap();
        create_user(db.pool(), &new_user("b@example.com", "Ivanova"))
            .await
            .unwrap();
        let c = create_user(db.pool(), &new_user("c@example.com", "Petrova"))
            .await
            .unwrap();
        create_user(db.pool(), &new_user("d@example.com", ""))
            .await
            .unwrap();

        let petrovs = list_users_by_last_name(db.pool(), "Petrova").await.unwrap();
        assert_eq!(
            petrovs.iter().map(|u| u.id).collect::<Vec<_>>(),
            vec![a.id, c.id]
        );

        assert_eq!(
            list_last_names(db.pool()).await.unwrap(),
            vec!["Ivanova".to_string(), "Petrova".to_string()]
        );
        assert_eq!(list_users(db.pool()).await.unwrap().len(), 4);
    }
}
