//! Card template pages and API.

use askama::Template;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use card_store::{card_template, CardTemplate, NewCardTemplate, TemplateSummary};
use serde_json::Value;
use tracing::info;

use crate::error::Result;
use crate::state::AppState;

/// Public template listing, newest first.
#[derive(Template)]
#[template(path = "templates_list.html")]
pub struct TemplatesListTemplate {
    pub templates: Vec<TemplateSummary>,
}

/// Admin table of templates: name, creator, creation date.
#[derive(Template)]
#[template(path = "admin_templates.html")]
pub struct AdminTemplatesTemplate {
    pub templates: Vec<TemplateSummary>,
}

pub async fn templates_page(State(state): State<AppState>) -> Result<TemplatesListTemplate> {
    let templates = card_template::list_template_summaries(state.db.pool()).await?;
    Ok(TemplatesListTemplate { templates })
}

pub async fn admin_templates_page(State(state): State<AppState>) -> Result<AdminTemplatesTemplate> {
    let templates = card_template::list_template_summaries(state.db.pool()).await?;
    Ok(AdminTemplatesTemplate { templates })
}

/// List templates as JSON, newest first.
pub async fn list_api(State(state): State<AppState>) -> Result<Json<Vec<CardTemplate>>> {
    let templates = card_template::list_templates(state.db.pool()).await?;
    Ok(Json(templates))
}

pub async fn create_api(
    State(state): State<AppState>,
    Json(req): Json<NewCardTemplate>,
) -> Result<(StatusCode, Json<CardTemplate>)> {
    let template = card_template::create_template(state.db.pool(), &req).await?;
    info!(template_id = template.id, name = %template.name, "Template created via API");
    Ok((StatusCode::CREATED, Json(template)))
}

pub async fn get_api(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<CardTemplate>> {
    let template = card_template::get_template(state.db.pool(), id).await?;
    Ok(Json(template))
}

pub async fn by_name_api(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<CardTemplate>> {
    let template = card_template::get_template_by_name(state.db.pool(), &name).await?;
    Ok(Json(template))
}

/// Replace a template's fields. Rejected if existing instances would no longer conform.
pub async fn update_fields_api(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(fields): Json<Value>,
) -> Result<Json<CardTemplate>> {
    let template = card_template::update_template_fields(state.db.pool(), id, &fields).await?;
    Ok(Json(template))
}

pub async fn delete_api(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode> {
    card_template::delete_template(state.db.pool(), id).await?;
    info!(template_id = id, "Template deleted via API");
    Ok(StatusCode::NO_CONTENT)
}
