//! Database connection and migration management

use sea_orm::{Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use std::path::Path;
use tracing::{debug, info};

/// Connect to the database, creating the sqlite file if needed.
pub async fn init_database(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    if database_url.starts_with("sqlite:") && !database_url.contains(":memory:") {
        let db_path = database_url
            .strip_prefix("sqlite://")
            .unwrap_or(database_url.strip_prefix("sqlite:").unwrap_or(database_url));
        let db_file_path = Path::new(db_path);

        if let Some(parent_dir) = db_file_path.parent() {
            if !parent_dir.exists() {
                debug!("creating database directory: {}", parent_dir.display());
                std::fs::create_dir_all(parent_dir).map_err(|e| {
                    DbErr::Custom(format!(
                        "cannot create database directory {}: {e}",
                        parent_dir.display()
                    ))
                })?;
            }
        }

        if !db_file_path.exists() {
            std::fs::File::create(db_file_path).map_err(|e| {
                DbErr::Custom(format!(
                    "cannot create database file {}: {e}",
                    db_file_path.display()
                ))
            })?;
        }
    }

    let db = Database::connect(database_url).await?;
    info!("database connected");
    Ok(db)
}

/// Run pending migrations.
pub async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    migration::Migrator::up(db, None).await?;
    info!("database migrations applied");
    Ok(())
}
