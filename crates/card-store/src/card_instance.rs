//! Card instance storage.

use card_schema::check_instance;
use serde_json::{Map, Value};
use sqlx::types::Json;
use sqlx::{SqliteExecutor, SqlitePool};

use crate::begin_write;
use crate::card_template::fetch_template;
use crate::error::{Result, StoreError};
use crate::models::{CardInstance, NewCardInstance};

/// Persist instance data after checking it against the owning template.
///
/// The template read, the check and the insert share one write transaction,
/// so a concurrent schema edit cannot slip in between them.
pub async fn create_instance(pool: &SqlitePool, new: &NewCardInstance) -> Result<CardInstance> {
    let mut tx = begin_write(pool).await?;

    let template = fetch_template(&mut *tx, new.template_id).await?;
    check_instance(&template.fields, &new.data)?;

    let result = sqlx::query(
        r#"
        INSERT INTO card_instances (template_id, data)
        VALUES (?, ?)
        "#,
    )
    .bind(new.template_id)
    .bind(Json(&new.data))
    .execute(&mut *tx)
    .await
    .map_err(|e| StoreError::from_write(e, "CardInstance", new.template_id.to_string()))?;

    tx.commit().await?;

    let id = result.last_insert_rowid();
    tracing::info!(instance_id = id, template_id = new.template_id, "Created card instance");

    get_instance(pool, id).await
}

pub async fn get_instance(pool: &SqlitePool, id: i64) -> Result<CardInstance> {
    fetch_instance(pool, id).await
}

async fn fetch_instance<'e, E>(executor: E, id: i64) -> Result<CardInstance>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, CardInstance>(
        r#"
        SELECT id, template_id, data, created_at
        FROM card_instances
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?
    .ok_or_else(|| StoreError::not_found("CardInstance", id))
}

/// List a template's instances, newest first.
pub async fn list_instances(pool: &SqlitePool, template_id: i64) -> Result<Vec<CardInstance>> {
    let instances = sqlx::query_as::<_, CardInstance>(
        r#"
        SELECT id, template_id, data, created_at
        FROM card_instances
        WHERE template_id = ?
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(template_id)
    .fetch_all(pool)
    .await?;

    Ok(instances)
}

/// Replace an instance's data, re-checking it against the template.
pub async fn update_instance_data(
    pool: &SqlitePool,
    id: i64,
    data: &Map<String, Value>,
) -> Result<CardInstance> {
    let mut tx = begin_write(pool).await?;

    let instance = fetch_instance(&mut *tx, id).await?;
    let template = fetch_template(&mut *tx, instance.template_id).await?;
    check_instance(&template.fields, data)?;

    let result = sqlx::query(
        r#"
        UPDATE card_instances
        SET data = ?
        WHERE id = ?
        "#,
    )
    .bind(Json(data))
    .bind(id)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::not_found("CardInstance", id));
    }

    tx.commit().await?;

    get_instance(pool, id).await
}

pub async fn delete_instance(pool: &SqlitePool, id: i64) -> Result<()> {
    let result = sqlx::query(
        r#"
        DELETE FROM card_instances
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::not_found("CardInstance", id));
    }

    Ok(())
}

/// Count a template's instances.
pub async fn count_instances(pool: &SqlitePool, template_id: i64) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM card_instances WHERE template_id = ?",
    )
    .bind(template_id)
    .fetch_one(pool)
    .await?;

    Ok(count)
}
