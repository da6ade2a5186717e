//! `ccdb`: create the card database if it is absent.

use clap::Parser;
use provision::{apply_card_schema, provision, Driver, ProvisionConfig, ProvisioningError};
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "ccdb")]
#[command(about = "Create the card database on the configured SQL server")]
struct Args {
    /// Database driver (sqlite or postgres)
    #[arg(long, env = "SQL_DRIVER", default_value = "sqlite")]
    driver: Driver,

    /// Server host[:port], or the directory holding the file for sqlite
    #[arg(long, env = "SQL_SERVER", default_value = "")]
    host: String,

    /// Database name
    #[arg(long, env = "SQL_DB")]
    database: String,

    /// Login user
    #[arg(long, env = "SQL_LOGIN", default_value = "")]
    user: String,

    /// Login password
    #[arg(long, env = "SQL_PASS", default_value = "", hide_env_values = true)]
    password: String,

    /// Also create the card store tables (sqlite only)
    #[arg(long)]
    migrate: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let config = ProvisionConfig {
        driver: args.driver,
        host: args.host,
        database: args.database,
        user: args.user,
        password: args.password,
    };

    if let Err(err) = run(&config, args.migrate).await {
        error!("{}", err);
        return Err(err.into());
    }

    info!(database = %config.database, "Database {} created", config.database);
    Ok(())
}

async fn run(config: &ProvisionConfig, migrate: bool) -> Result<(), ProvisioningError> {
    provision(config).await?;
    if migrate {
        apply_card_schema(config).await?;
        info!("Card store schema applied");
    }
    Ok(())
}
