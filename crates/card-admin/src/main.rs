//! Card template web service.
//!
//! Serves the template listing, admin pages for users and templates, and a
//! JSON API over the card store.

mod config;
mod error;
mod routes;
mod state;

use card_store::Database;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;
    info!(addr = %config.addr, "Starting card admin server");

    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;

    let state = AppState::new(db);

    let app = routes::router()
        .nest_service("/static", ServeDir::new("static"))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    info!(addr = %config.addr, "Card admin server listening");
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
