//! Database provisioning.
//!
//! Creates the card database on a SQL server if it does not exist yet. This
//! runs once per environment, outside the request path.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use sqlx::migrate::MigrateDatabase;
use sqlx::{Postgres, Sqlite};
use thiserror::Error;

/// Errors from provisioning. None of these are retried.
#[derive(Debug, Error)]
pub enum ProvisioningError {
    #[error("database '{0}' already exists")]
    AlreadyExists(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Connection or creation failed in the driver.
    #[error("driver error: {0}")]
    Driver(#[from] sqlx::Error),

    #[error("schema setup failed: {0}")]
    Schema(#[from] card_store::StoreError),
}

pub type Result<T> = std::result::Result<T, ProvisioningError>;

/// SQL backends the provisioner can talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Driver {
    /// `host` is a directory, the database is a file inside it.
    Sqlite,
    Postgres,
}

impl FromStr for Driver {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sqlite" | "sqlite3" => Ok(Driver::Sqlite),
            "postgres" | "postgresql" => Ok(Driver::Postgres),
            other => Err(format!("unsupported driver '{other}'")),
        }
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Driver::Sqlite => f.write_str("sqlite"),
            Driver::Postgres => f.write_str("postgres"),
        }
    }
}

/// Where and how to create the database.
#[derive(Clone, PartialEq, Eq)]
pub struct ProvisionConfig {
    pub driver: Driver,
    pub host: String,
    pub database: String,
    pub user: String,
    pub password: String,
}

impl fmt::Debug for ProvisionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProvisionConfig")
            .field("driver", &self.driver)
            .field("host", &self.host)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

impl ProvisionConfig {
    /// Check the database name before it is spliced into a URL.
    pub fn validate(&self) -> Result<()> {
        if self.database.is_empty() {
            return Err(ProvisioningError::InvalidConfig(
                "database name is required".to_string(),
            ));
        }
        let valid = self
            .database
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.');
        if !valid {
            return Err(ProvisioningError::InvalidConfig(format!(
                "database name '{}' may only contain letters, digits, '_', '-' and '.'",
                self.database
            )));
        }
        if self.driver == Driver::Postgres && self.host.is_empty() {
            return Err(ProvisioningError::InvalidConfig(
                "host is required for postgres".to_string(),
            ));
        }
        Ok(())
    }

    /// Connection URL for the target database.
    pub fn database_url(&self) -> String {
        self.url_with_password(&urlencoding::encode(&self.password))
    }

    /// Connection URL with the password masked, for logs.
    pub fn redacted_url(&self) -> String {
        self.url_with_password("***")
    }

    fn url_with_password(&self, password: &str) -> String {
        match self.driver {
            Driver::Sqlite => {
                let file = if Path::new(&self.database).extension().is_some() {
                    self.database.clone()
                } else {
                    format!("{}.db", self.database)
                };
                format!("sqlite:{}", Path::new(&self.host).join(file).display())
            }
            Driver::Postgres => {
                let credentials = match (self.user.is_empty(), self.password.is_empty()) {
                    (true, _) => String::new(),
                    (false, true) => format!("{}@", urlencoding::encode(&self.user)),
                    (false, false) => format!("{}:{}@", urlencoding::encode(&self.user), password),
                };
                format!("postgres://{}{}/{}", credentials, self.host, self.database)
            }
        }
    }
}

/// Create the configured database. Fails if it already exists.
pub async fn provision(config: &ProvisionConfig) -> Result<()> {
    config.validate()?;
    let url = config.database_url();

    tracing::info!(
        driver = %config.driver,
        url = %config.redacted_url(),
        "Provisioning database"
    );

    match config.driver {
        Driver::Sqlite => create_if_absent::<Sqlite>(&url, &config.database).await?,
        Driver::Postgres => create_if_absent::<Postgres>(&url, &config.database).await?,
    }

    tracing::info!(database = %config.database, "Database created");
    Ok(())
}

/// Apply the card store schema to a freshly provisioned SQLite database.
pub async fn apply_card_schema(config: &ProvisionConfig) -> Result<()> {
    if config.driver != Driver::Sqlite {
        return Err(ProvisioningError::InvalidConfig(format!(
            "the card store schema only targets sqlite, not {}",
            config.driver
        )));
    }

    let db = card_store::Database::connect(&config.database_url()).await?;
    db.migrate().await?;
    db.close().await;
    Ok(())
}

async fn create_if_absent<DB: MigrateDatabase>(url: &str, name: &str) -> Result<()> {
    if DB::database_exists(url).await? {
        return Err(ProvisioningError::AlreadyExists(name.to_string()));
    }
    DB::create_database(url).await?;
    Ok(())
}
