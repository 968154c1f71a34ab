//! Capability store boundary
//!
//! The two persistence operations the credential core consumes: insert a
//! key row and look one up by its opaque id. Both are generic over
//! `ConnectionTrait` so the provisioner can run them inside its
//! transaction. The core never caches the store's state.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};

use entity::{api_keys, services};

use crate::auth::capability::CapabilitySet;
use crate::error::Result;

/// A key row as the credential core sees it, with the owning user joined
/// in from the service that holds the key.
#[derive(Debug, Clone)]
pub struct CapabilityRecord {
    pub key_id: i64,
    pub opaque_id: String,
    pub owner_user_id: i64,
    pub service_id: i64,
    pub capabilities: CapabilitySet,
    pub expires_at: i64,
    pub revoked: bool,
}

impl CapabilityRecord {
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now().timestamp()
    }
}

/// Parameters for a new key row.
#[derive(Debug, Clone)]
pub struct NewKeyRow {
    pub opaque_id: String,
    pub key: String,
    pub capabilities: CapabilitySet,
    pub expires_at: i64,
}

/// Insert a key row, returning its storage id.
pub async fn insert_key<C: ConnectionTrait>(conn: &C, row: NewKeyRow) -> Result<i64> {
    let model = api_keys::ActiveModel {
        opaque_id: Set(row.opaque_id),
        key: Set(row.key),
        cache: Set(row.capabilities.cache),
        storage: Set(row.capabilities.storage),
        revoked: Set(false),
        expires_at: Set(row.expires_at),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    };
    let inserted = model.insert(conn).await?;
    Ok(inserted.key_id)
}

/// Look up a key row by its opaque id, joining the owning service.
///
/// Returns `None` both when no key row exists and when a key row has no
/// service yet; a key only becomes usable once its owning service commit
/// is visible.
pub async fn find_by_opaque_id<C: ConnectionTrait>(
    conn: &C,
    opaque_id: &str,
) -> Result<Option<CapabilityRecord>> {
    let found = api_keys::Entity::find()
        .filter(api_keys::Column::OpaqueId.eq(opaque_id))
        .find_also_related(services::Entity)
        .one(conn)
        .await?;

    Ok(found.and_then(|(key, service)| {
        service.map(|service| CapabilityRecord {
            key_id: key.key_id,
            opaque_id: key.opaque_id,
            owner_user_id: service.user_id,
            service_id: service.sid,
            capabilities: CapabilitySet {
                cache: key.cache,
                storage: key.storage,
            },
            expires_at: key.expires_at,
            revoked: key.revoked,
        })
    }))
}
