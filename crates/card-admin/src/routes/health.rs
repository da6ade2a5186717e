//! Health check endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use card_store::card_template;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct Health {
    pub status: &'static str,
    /// Stored template count, absent when the store can't be reached.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub templates: Option<i64>,
}

/// Reports `ok` only if the card store answers a query.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Health>) {
    match card_template::count_templates(state.db.pool()).await {
        Ok(count) => (
            StatusCode::OK,
            Json(Health {
                status: "ok",
                templates: Some(count),
            }),
        ),
        Err(err) => {
            tracing::error!("Health check failed: {}", err);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(Health {
                    status: "unavailable",
                    templates: None,
                }),
            )
        }
    }
}
