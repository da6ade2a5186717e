//! Card instance API.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use card_store::{card_instance, CardInstance, NewCardInstance};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::state::AppState;

pub async fn list_api(
    State(state): State<AppState>,
    Path(template_id): Path<i64>,
) -> Result<Json<Vec<CardInstance>>> {
    let instances = card_instance::list_instances(state.db.pool(), template_id).await?;
    Ok(Json(instances))
}

/// Create an instance. The body is the instance data object itself.
pub async fn create_api(
    State(state): State<AppState>,
    Path(template_id): Path<i64>,
    Json(data): Json<Map<String, Value>>,
) -> Result<(StatusCode, Json<CardInstance>)> {
    let instance =
        card_instance::create_instance(state.db.pool(), &NewCardInstance { template_id, data })
            .await?;
    Ok((StatusCode::CREATED, Json(instance)))
}

pub async fn get_api(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<CardInstance>> {
    let instance = card_instance::get_instance(state.db.pool(), id).await?;
    Ok(Json(instance))
}

pub async fn update_api(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(data): Json<Map<String, Value>>,
) -> Result<Json<CardInstance>> {
    let instance = card_instance::update_instance_data(state.db.pool(), id, &data).await?;
    Ok(Json(instance))
}

pub async fn delete_api(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode> {
    card_instance::delete_instance(state.db.pool(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
