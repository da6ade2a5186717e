//! Error types for the card admin service.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use card_store::StoreError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let message = self.to_string();

        let (status, body) = match &self {
            AdminError::Store(StoreError::Schema(err)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({
                    "error": message,
                    "field": err.field,
                    "rule": err.rule.to_string(),
                }),
            ),
            AdminError::Store(StoreError::Conformance(errors)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "error": message, "violations": errors }),
            ),
            AdminError::Store(StoreError::Validation(_)) | AdminError::BadRequest(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, json!({ "error": message }))
            }
            AdminError::Store(StoreError::NotFound { .. }) => {
                (StatusCode::NOT_FOUND, json!({ "error": message }))
            }
            AdminError::Store(StoreError::AlreadyExists { .. }) => {
                (StatusCode::CONFLICT, json!({ "error": message }))
            }
            AdminError::Store(StoreError::IncompatibleSchema {
                instance_id,
                violations,
                ..
            }) => (
                StatusCode::CONFLICT,
                json!({
                    "error": message,
                    "instance_id": instance_id,
                    "violations": violations,
                }),
            ),
            AdminError::Store(StoreError::IntegrityViolation { .. }) => {
                tracing::warn!("Integrity violation: {}", message);
                (StatusCode::BAD_REQUEST, json!({ "error": message }))
            }
            AdminError::Store(err) => {
                tracing::error!("Store error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "internal error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for admin operations.
pub type Result<T> = std::result::Result<T, AdminError>;
