//! Store error types.

use card_schema::{ConformanceErrors, SchemaValidationError};
use thiserror::Error;

use crate::validation::ValidationError;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// SQLx error (connection, query, etc.)
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("{entity} already exists: {id}")]
    AlreadyExists { entity: &'static str, id: String },

    /// A write referenced a row that does not exist.
    #[error("integrity violation on {entity}: {detail}")]
    IntegrityViolation { entity: &'static str, detail: String },

    /// Template field schema rejected before any write.
    #[error("invalid template fields: {0}")]
    Schema(#[from] SchemaValidationError),

    /// Instance data does not match its template.
    #[error("instance data does not match template: {0}")]
    Conformance(#[from] ConformanceErrors),

    /// A schema edit would orphan data already stored in an instance.
    #[error("new fields are incompatible with instance {instance_id} of template {template_id}: {violations}")]
    IncompatibleSchema {
        template_id: i64,
        instance_id: i64,
        violations: ConformanceErrors,
    },

    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),
}

impl StoreError {
    /// Classify a failed INSERT/UPDATE.
    pub(crate) fn from_write(err: sqlx::Error, entity: &'static str, id: impl Into<String>) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return StoreError::AlreadyExists {
                    entity,
                    id: id.into(),
                };
            }
            if db_err.is_foreign_key_violation() {
                return StoreError::IntegrityViolation {
                    entity,
                    detail: db_err.message().to_string(),
                };
            }
        }
        StoreError::Sqlx(err)
    }

    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        StoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
