//! # Vaultbase main program
//!
//! Loads configuration and secrets, prepares the database and serves the
//! gateway.

use std::path::PathBuf;

use vaultbase::config::{AppConfig, Secrets};
use vaultbase::error::Result;
use vaultbase::management::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    vaultbase::logging::init_logging(None);

    let config_path =
        PathBuf::from(std::env::var("VAULTBASE_CONFIG").unwrap_or_else(|_| "config.toml".into()));
    let config = AppConfig::load(&config_path)?;

    let secrets = match Secrets::from_env() {
        Ok(secrets) => secrets,
        Err(e) => {
            tracing::error!("secret material missing: {e}");
            std::process::exit(1);
        }
    };

    let db = vaultbase::database::init_database(&config.database.url).await?;
    vaultbase::database::run_migrations(&db).await?;

    let state = AppState::new(db, config, secrets);
    if let Err(e) = state.serve().await {
        tracing::error!("gateway exited with error: {e}");
        std::process::exit(1);
    }
    Ok(())
}
