//! Card template storage.
//!
//! Field schemas are validated before any write; a rejected schema never
//! reaches the database. Listings are newest first.

use card_schema::{check_instance, validate_fields};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::{SqliteExecutor, SqlitePool};

use crate::begin_write;
use crate::error::{Result, StoreError};
use crate::models::{CardInstance, CardTemplate, NewCardTemplate, TemplateSummary};
use crate::validation::validate_template_name;

const TEMPLATE_COLUMNS: &str = "id, name, creator_id, fields, created_at";

/// Validate and persist a new template. `created_at` is stamped by the store.
pub async fn create_template(pool: &SqlitePool, new: &NewCardTemplate) -> Result<CardTemplate> {
    validate_template_name(&new.name)?;
    let schema = validate_fields(&new.fields)?;

    let name = new.name.trim();
    let result = sqlx::query(
        r#"
        INSERT INTO card_templates (name, creator_id, fields)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(name)
    .bind(new.creator_id)
    .bind(Json(&schema))
    .execute(pool)
    .await
    .map_err(|e| StoreError::from_write(e, "CardTemplate", name))?;

    let id = result.last_insert_rowid();
    tracing::info!(
        template_id = id,
        creator_id = new.creator_id,
        fields = schema.len(),
        "Created card template"
    );

    get_template(pool, id).await
}

/// Get a template by ID.
pub async fn get_template(pool: &SqlitePool, id: i64) -> Result<CardTemplate> {
    fetch_template(pool, id).await
}

pub(crate) async fn fetch_template<'e, E>(executor: E, id: i64) -> Result<CardTemplate>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, CardTemplate>(&format!(
        "SELECT {TEMPLATE_COLUMNS} FROM card_templates WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?
    .ok_or_else(|| StoreError::not_found("CardTemplate", id))
}

/// Get the newest template with this name. Surrounding whitespace is
/// ignored, as it is when names are stored.
pub async fn get_template_by_name(pool: &SqlitePool, name: &str) -> Result<CardTemplate> {
    let name = name.trim();
    sqlx::query_as::<_, CardTemplate>(&format!(
        r#"
        SELECT {TEMPLATE_COLUMNS}
        FROM card_templates
        WHERE name = ?
        ORDER BY created_at DESC, id DESC
        LIMIT 1
        "#
    ))
    .bind(name)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| StoreError::not_found("CardTemplate", name))
}

/// List all templates, newest first.
pub async fn list_templates(pool: &SqlitePool) -> Result<Vec<CardTemplate>> {
    let templates = sqlx::query_as::<_, CardTemplate>(&format!(
        "SELECT {TEMPLATE_COLUMNS} FROM card_templates ORDER BY created_at DESC, id DESC"
    ))
    .fetch_all(pool)
    .await?;

    Ok(templates)
}

/// List one creator's templates, newest first.
pub async fn list_templates_by_creator(
    pool: &SqlitePool,
    creator_id: i64,
) -> Result<Vec<CardTemplate>> {
    let templates = sqlx::query_as::<_, CardTemplate>(&format!(
        r#"
        SELECT {TEMPLATE_COLUMNS}
        FROM card_templates
        WHERE creator_id = ?
        ORDER BY created_at DESC, id DESC
        "#
    ))
    .bind(creator_id)
    .fetch_all(pool)
    .await?;

    Ok(templates)
}

/// List templates with creator email and field count, newest first.
pub async fn list_template_summaries(pool: &SqlitePool) -> Result<Vec<TemplateSummary>> {
    let rows = sqlx::query_as::<_, TemplateSummary>(
        r#"
        SELECT t.id, t.name, t.creator_id, u.email AS creator_email,
               (SELECT COUNT(*) FROM json_each(t.fields)) AS field_count,
               t.created_at
        FROM card_templates t
        JOIN users u ON u.id = t.creator_id
        ORDER BY t.created_at DESC, t.id DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Rename a template.
pub async fn rename_template(pool: &SqlitePool, id: i64, name: &str) -> Result<()> {
    validate_template_name(name)?;

    let result = sqlx::query(
        r#"
        UPDATE card_templates
        SET name = ?
        WHERE id = ?
        "#,
    )
    .bind(name.trim())
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::not_found("CardTemplate", id));
    }

    Ok(())
}

/// Replace a template's field schema.
///
/// The new schema must validate, and every instance already stored for the
/// template must conform to it. Otherwise nothing changes and the first
/// incompatible instance is reported.
pub async fn update_template_fields(
    pool: &SqlitePool,
    id: i64,
    fields: &Value,
) -> Result<CardTemplate> {
    let schema = validate_fields(fields)?;

    let mut tx = begin_write(pool).await?;

    let exists = sqlx::query_scalar::<_, i64>("SELECT id FROM card_templates WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    if exists.is_none() {
        return Err(StoreError::not_found("CardTemplate", id));
    }

    let instances = sqlx::query_as::<_, CardInstance>(
        r#"
        SELECT id, template_id, data, created_at
        FROM card_instances
        WHERE template_id = ?
        ORDER BY id
        "#,
    )
    .bind(id)
    .fetch_all(&mut *tx)
    .await?;

    for instance in &instances {
        if let Err(violations) = check_instance(&schema, &instance.data) {
            tracing::warn!(
                template_id = id,
                instance_id = instance.id,
                "Rejected incompatible field schema"
            );
            return Err(StoreError::IncompatibleSchema {
                template_id: id,
                instance_id: instance.id,
                violations,
            });
        }
    }

    sqlx::query(
        r#"
        UPDATE card_templates
        SET fields = ?
        WHERE id = ?
        "#,
    )
    .bind(Json(&schema))
    .bind(id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(
        template_id = id,
        instances_checked = instances.len(),
        "Updated card template fields"
    );

    get_template(pool, id).await
}

/// Delete a template and all of its instances.
pub async fn delete_template(pool: &SqlitePool, id: i64) -> Result<()> {
    let result = sqlx::query(
        r#"
        DELETE FROM card_templates
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::not_found("CardTemplate", id));
    }

    tracing::info!(template_id = id, "Deleted card template");
    Ok(())
}

pub async fn count_templates(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM card_templates")
        .fetch_one(pool)
        .await?;

    Ok(count)
}
