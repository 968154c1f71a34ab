//! Shared test fixtures: in-memory database and deterministic secrets.

#![allow(dead_code)]

use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};
use sea_orm_migration::MigratorTrait;

use entity::users;
use vaultbase::config::Secrets;
use vaultbase::management::services::users as user_service;

/// Fresh in-memory database with the full schema applied.
pub async fn test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite connects");
    migration::Migrator::up(&db, None)
        .await
        .expect("migrations apply");
    db
}

/// Fixed secret material so tokens and keys are reproducible per run.
pub fn test_secrets() -> Secrets {
    Secrets::new(
        "session-test-secret",
        "api-key-test-secret",
        "v1",
        "perimeter-test-secret",
    )
}

/// Register a user through the real registration path.
pub async fn seed_user(db: &DatabaseConnection, clerk_id: &str, email: &str) -> users::Model {
    user_service::register(db, clerk_id, email)
        .await
        .expect("user registers")
}

/// Flip the confirmed flag on an existing user.
pub async fn set_confirmed(db: &DatabaseConnection, user: users::Model, confirmed: bool) -> users::Model {
    let mut active: users::ActiveModel = user.into();
    active.confirmed = Set(confirmed);
    active.update(db).await.expect("user updates")
}

/// Soft-delete an existing user.
pub async fn set_deleted(db: &DatabaseConnection, user: users::Model) -> users::Model {
    let mut active: users::ActiveModel = user.into();
    active.deleted = Set(true);
    active.update(db).await.expect("user updates")
}
