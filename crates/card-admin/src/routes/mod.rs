//! Route handlers for the card admin service.

pub mod health;
pub mod instances;
pub mod templates;
pub mod users;

use axum::routing::{get, put};
use axum::Router;

use crate::state::AppState;

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        // HTML pages
        .route("/", get(templates::templates_page))
        .route("/admin/templates", get(templates::admin_templates_page))
        .route("/admin/users", get(users::admin_users_page))
        // Health check
        .route("/health", get(health::health))
        // API endpoints
        .route("/api/users", get(users::list_api).post(users::create_api))
        .route("/api/users/:id", get(users::get_api).delete(users::delete_api))
        .route(
            "/api/templates",
            get(templates::list_api).post(templates::create_api),
        )
        .route("/api/templates/by-name/:name", get(templates::by_name_api))
        .route(
            "/api/templates/:id",
            get(templates::get_api).delete(templates::delete_api),
        )
        .route("/api/templates/:id/fields", put(templates::update_fields_api))
        .route(
            "/api/templates/:id/instances",
            get(instances::list_api).post(instances::create_api),
        )
        .route(
            "/api/instances/:id",
            get(instances::get_api)
                .put(instances::update_api)
                .delete(instances::delete_api),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use card_store::Database;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn app() -> Router {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        router().with_state(AppState::new(db))
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::String(
                String::from_utf8_lossy(&bytes).into_owned(),
            ))
        };
        (status, value)
    }

    async fn create_user(app: &Router, email: &str, last_name: &str) -> i64 {
        let (status, user) = send(
            app,
            Method::POST,
            "/api/users",
            Some(json!({"email": email, "first_name": "Ivan", "last_name": last_name})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        user["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = app().await;
        let (status, body) = send(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["templates"], 0);
    }

    #[tokio::test]
    async fn test_health_reports_closed_store() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        let app = router().with_state(AppState::new(db.clone()));
        db.close().await;

        let (status, body) = send(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "unavailable");
        assert!(body.get("templates").is_none());
    }

    #[tokio::test]
    async fn test_template_lifecycle() {
        let app = app().await;
        let creator_id = create_user(&app, "u1@example.com", "Petrov").await;

        let (status, template) = send(
            &app,
            Method::POST,
            "/api/templates",
            Some(json!({
                "name": "Biology Cards",
                "creator_id": creator_id,
                "fields": {
                    "term": {"type": "text", "label": "Term"},
                    "definition": {"type": "textarea", "label": "Definition"}
                }
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = template["id"].as_i64().unwrap();
        assert_eq!(template["fields"]["term"]["label"], "Term");

        let (status, found) = send(&app, Method::GET, "/api/templates/by-name/Biology%20Cards", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(found["id"], id);

        let (status, instance) = send(
            &app,
            Method::POST,
            &format!("/api/templates/{id}/instances"),
            Some(json!({"term": "cell"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(instance["data"]["term"], "cell");

        let (status, body) = send(
            &app,
            Method::PUT,
            &format!("/api/templates/{id}/fields"),
            Some(json!({"definition": {"type": "textarea", "label": "Definition"}})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["violations"][0]["rule"], "undeclared_field");

        let (status, _) = send(&app, Method::DELETE, &format!("/api/users/{creator_id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&app, Method::GET, &format!("/api/templates/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_schema_names_field_and_rule() {
        let app = app().await;
        let creator_id = create_user(&app, "u1@example.com", "Petrov").await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/templates",
            Some(json!({
                "name": "Pictures",
                "creator_id": creator_id,
                "fields": {"image": {"type": "image", "allowed_formats": ["bmp"]}}
            })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["field"], "image");
        assert_eq!(body["rule"], "must contain key 'label'");
    }

    #[tokio::test]
    async fn test_nonconforming_instance_lists_violations() {
        let app = app().await;
        let creator_id = create_user(&app, "u1@example.com", "Petrov").await;
        let (_, template) = send(
            &app,
            Method::POST,
            "/api/templates",
            Some(json!({
                "name": "Quiz",
                "creator_id": creator_id,
                "fields": {"question": {"type": "text", "label": "Question", "max_length": 5}}
            })),
        )
        .await;
        let id = template["id"].as_i64().unwrap();

        let (status, body) = send(
            &app,
            Method::POST,
            &format!("/api/templates/{id}/instances"),
            Some(json!({"question": "too long", "extra": 1})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["violations"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_creator_is_bad_request() {
        let app = app().await;
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/templates",
            Some(json!({"name": "Orphan", "creator_id": 404, "fields": {}})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_user_filter() {
        let app = app().await;
        create_user(&app, "a@example.com", "Petrov").await;
        create_user(&app, "b@example.com", "Sidorov").await;

        let (status, users) = send(&app, Method::GET, "/api/users?last_name=Sidorov", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(users.as_array().unwrap().len(), 1);
        assert_eq!(users[0]["email"], "b@example.com");

        let (status, _) = send(&app, Method::GET, "/api/users?last_name=", None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, page) = send(&app, Method::GET, "/admin/users?last_name=", None).await;
        assert_eq!(status, StatusCode::OK);
        let page = page.as_str().unwrap();
        assert!(page.contains("Petrov"));
        assert!(page.contains("Sidorov"));
    }

    #[tokio::test]
    async fn test_list_page_is_newest_first() {
        let app = app().await;
        let creator_id = create_user(&app, "u1@example.com", "Petrov").await;
        for name in ["First template", "Second template"] {
            let (status, _) = send(
                &app,
                Method::POST,
                "/api/templates",
                Some(json!({"name": name, "creator_id": creator_id, "fields": {}})),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, page) = send(&app, Method::GET, "/", None).await;
        assert_eq!(status, StatusCode::OK);
        let page = page.as_str().unwrap();
        let first = page.find("First template").unwrap();
        let second = page.find("Second template").unwrap();
        assert!(second < first);

        let (_, list) = send(&app, Method::GET, "/api/templates", None).await;
        assert_eq!(list[0]["name"], "Second template");
    }
}
