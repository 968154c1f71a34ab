//! Project provisioning
//!
//! Creating a project mints its API key and inserts both rows inside one
//! transaction, so a key never exists without its service or vice versa.
//! Preconditions run before the transaction opens and have no side
//! effects on failure.

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, SqlErr, TransactionTrait,
};
use uuid::Uuid;

use entity::{api_keys, services, users};

use crate::auth::api_key::{ApiKeyCodec, ApiKeyMaterial};
use crate::auth::capability::CapabilitySet;
use crate::auth::store::{self, NewKeyRow};
use crate::config::DEFAULT_API_KEY_TTL;
use crate::error::{GatewayError, Result};

/// Minimum accepted service name length.
const MIN_SERVICE_NAME_LEN: usize = 8;

/// The result of a successful provisioning run.
#[derive(Debug)]
pub struct ProvisionedProject {
    pub service: services::Model,
    pub key: ApiKeyMaterial,
    pub capabilities: CapabilitySet,
    pub expires_at: i64,
}

/// A project with its key info, as returned by listing.
#[derive(Debug)]
pub struct ProjectView {
    pub service: services::Model,
    pub key: api_keys::Model,
}

/// Orchestrates key issuance, key insertion and service creation as one
/// atomic unit.
pub struct ProjectProvisioner {
    codec: Arc<ApiKeyCodec>,
    require_confirmed_account: bool,
}

impl ProjectProvisioner {
    #[must_use]
    pub fn new(codec: Arc<ApiKeyCodec>, require_confirmed_account: bool) -> Self {
        Self {
            codec,
            require_confirmed_account,
        }
    }

    /// Provision a new project for `owner_user_id`.
    ///
    /// Either both the key row and the service row become visible, or
    /// neither does. The transaction rolls back on every non-commit exit
    /// path; after a successful commit the rollback-on-drop is a no-op.
    pub async fn provision(
        &self,
        db: &DatabaseConnection,
        owner_user_id: i64,
        name: &str,
        capabilities: CapabilitySet,
    ) -> Result<ProvisionedProject> {
        // preconditions, all before any mutation
        if name.len() < MIN_SERVICE_NAME_LEN {
            return Err(GatewayError::precondition(format!(
                "the service name must be at least {MIN_SERVICE_NAME_LEN} characters long"
            )));
        }

        let owner = users::Entity::find_by_id(owner_user_id)
            .one(db)
            .await?
            .ok_or_else(|| GatewayError::not_found("user"))?;
        if owner.deleted {
            return Err(GatewayError::not_found("user"));
        }
        if self.require_confirmed_account && !owner.confirmed {
            return Err(GatewayError::precondition(
                "the account must be confirmed before creating a project",
            ));
        }

        // case-sensitive exact match; the unique index is the race-breaker
        // for requests that pass this check concurrently
        let same_name = services::Entity::find()
            .filter(services::Column::UserId.eq(owner_user_id))
            .filter(services::Column::Name.eq(name))
            .count(db)
            .await?;
        if same_name > 0 {
            return Err(duplicate_name_error());
        }

        let txn = db.begin().await?;

        let material = self.codec.issue()?;
        let expires_at = Utc::now().timestamp() + DEFAULT_API_KEY_TTL;

        let key_id = store::insert_key(
            &txn,
            NewKeyRow {
                opaque_id: material.id.clone(),
                key: material.key.clone(),
                capabilities,
                expires_at,
            },
        )
        .await?;

        let service = services::ActiveModel {
            service_uuid: Set(Uuid::new_v4().to_string()),
            user_id: Set(owner_user_id),
            key_id: Set(key_id),
            name: Set(name.to_string()),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(map_service_insert_err)?;

        txn.commit().await?;

        tracing::info!(
            user_id = owner_user_id,
            service = %service.service_uuid,
            "project provisioned"
        );

        Ok(ProvisionedProject {
            service,
            key: material,
            capabilities,
            expires_at,
        })
    }
}

/// All projects for an owner, newest first, with their key info.
pub async fn list_projects(db: &DatabaseConnection, owner_user_id: i64) -> Result<Vec<ProjectView>> {
    let rows = services::Entity::find()
        .filter(services::Column::UserId.eq(owner_user_id))
        .order_by_desc(services::Column::CreatedAt)
        .find_also_related(api_keys::Entity)
        .all(db)
        .await?;

    rows.into_iter()
        .map(|(service, key)| {
            // the provisioning transaction guarantees the key exists
            let key = key.ok_or_else(|| {
                GatewayError::database(format!(
                    "service {} has no backing key row",
                    service.service_uuid
                ))
            })?;
            Ok(ProjectView { service, key })
        })
        .collect()
}

async fn owned_service(
    db: &DatabaseConnection,
    owner_user_id: i64,
    name: &str,
) -> Result<services::Model> {
    let service = services::Entity::find()
        .filter(services::Column::UserId.eq(owner_user_id))
        .filter(services::Column::Name.eq(name))
        .one(db)
        .await?
        .ok_or_else(|| GatewayError::not_found("service"))?;
    Ok(service)
}

/// Delete a project. Deleting the key row cascades to the service row.
pub async fn delete_project(db: &DatabaseConnection, owner_user_id: i64, name: &str) -> Result<()> {
    let service = owned_service(db, owner_user_id, name).await?;
    api_keys::Entity::delete_by_id(service.key_id)
        .exec(db)
        .await?;
    tracing::info!(user_id = owner_user_id, service = %service.service_uuid, "project deleted");
    Ok(())
}

/// Update which capabilities the project's key carries.
pub async fn toggle_capabilities(
    db: &DatabaseConnection,
    owner_user_id: i64,
    name: &str,
    capabilities: CapabilitySet,
) -> Result<api_keys::Model> {
    let service = owned_service(db, owner_user_id, name).await?;

    let key = api_keys::Entity::find_by_id(service.key_id)
        .one(db)
        .await?
        .ok_or_else(|| GatewayError::not_found("API key"))?;

    let mut active: api_keys::ActiveModel = key.into();
    active.cache = Set(capabilities.cache);
    active.storage = Set(capabilities.storage);
    Ok(active.update(db).await?)
}

fn duplicate_name_error() -> GatewayError {
    GatewayError::already_exists("a user cannot have two services with the same name")
}

fn map_service_insert_err(e: DbErr) -> GatewayError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => duplicate_name_error(),
        _ => e.into(),
    }
}
