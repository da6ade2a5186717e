//! SQLite persistence for card templates.
//!
//! Users own card templates; templates own card instances. Deleting a user
//! removes their templates, and deleting a template removes its instances.
//! Template field schemas and instance data are validated with
//! [`card_schema`] before they are written.
//!
//! # Example
//!
//! ```no_run
//! use card_store::{card_template, user, Database, NewCardTemplate, NewUser};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("sqlite:cards.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     let author = user::create_user(db.pool(), &NewUser {
//!         email: "author@example.com".to_string(),
//!         ..NewUser::default()
//!     }).await?;
//!
//!     card_template::create_template(db.pool(), &NewCardTemplate {
//!         name: "Biology Cards".to_string(),
//!         creator_id: author.id,
//!         fields: json!({
//!             "term": {"type": "text", "label": "Term"},
//!             "definition": {"type": "textarea", "label": "Definition"}
//!         }),
//!     }).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod card_instance;
pub mod card_template;
pub mod error;
pub mod models;
pub mod user;
pub mod validation;

pub use error::{Result, StoreError};
pub use models::{
    CardInstance, CardTemplate, NewCardInstance, NewCardTemplate, NewUser, TemplateSummary, User,
};
pub use validation::ValidationError;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::str::FromStr;
use std::time::Duration;

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    const DEFAULT_POOL_SIZE: u32 = 10;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`,
    /// or `sqlite::memory:` for tests. Foreign keys are always enforced, since
    /// cascade deletion depends on them.
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!(url, pool_size, "Connected to card database");

        Ok(Self { pool })
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Begin a transaction holding SQLite's write lock from the start.
///
/// Read-check-write sequences (instance conformance, schema edits) run in
/// one of these so they are serialized against each other.
pub(crate) async fn begin_write(pool: &SqlitePool) -> Result<Transaction<'static, Sqlite>> {
    Ok(pool.begin_with("BEGIN IMMEDIATE").await?)
}
