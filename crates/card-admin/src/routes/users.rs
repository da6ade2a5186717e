//! User admin page and API.

use askama::Template;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use card_store::{user, NewUser, User};
use serde::Deserialize;
use tracing::info;

use crate::error::{AdminError, Result};
use crate::state::AppState;

/// Optional `?last_name=` filter.
#[derive(Debug, Default, Deserialize)]
pub struct UserFilter {
    pub last_name: Option<String>,
}

/// Admin table of users: last name, first name, id.
#[derive(Template)]
#[template(path = "admin_users.html")]
pub struct AdminUsersTemplate {
    pub users: Vec<User>,
    pub last_names: Vec<String>,
    pub selected: String,
}

pub async fn admin_users_page(
    State(state): State<AppState>,
    Query(filter): Query<UserFilter>,
) -> Result<AdminUsersTemplate> {
    // The filter form submits an empty value for "all".
    let filter = UserFilter {
        last_name: filter.last_name.filter(|name| !name.trim().is_empty()),
    };
    let users = filtered_users(&state, &filter).await?;
    let last_names = user::list_last_names(state.db.pool()).await?;
    Ok(AdminUsersTemplate {
        users,
        last_names,
        selected: filter.last_name.unwrap_or_default(),
    })
}

pub async fn list_api(
    State(state): State<AppState>,
    Query(filter): Query<UserFilter>,
) -> Result<Json<Vec<User>>> {
    let users = filtered_users(&state, &filter).await?;
    Ok(Json(users))
}

pub async fn create_api(
    State(state): State<AppState>,
    Json(req): Json<NewUser>,
) -> Result<(StatusCode, Json<User>)> {
    let user = user::create_user(state.db.pool(), &req).await?;
    info!(user_id = user.id, "User created via API");
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn get_api(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<User>> {
    let user = user::get_user(state.db.pool(), id).await?;
    Ok(Json(user))
}

/// Delete a user along with every template they created.
pub async fn delete_api(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode> {
    user::delete_user(state.db.pool(), id).await?;
    info!(user_id = id, "User deleted via API");
    Ok(StatusCode::NO_CONTENT)
}

async fn filtered_users(state: &AppState, filter: &UserFilter) -> Result<Vec<User>> {
    let pool = state.db.pool();
    match filter.last_name.as_deref() {
        Some(name) if name.trim().is_empty() => {
            Err(AdminError::BadRequest("last_name must not be empty".to_string()))
        }
        Some(name) => Ok(user::list_users_by_last_name(pool, name).await?),
        None => Ok(user::list_users(pool).await?),
    }
}
