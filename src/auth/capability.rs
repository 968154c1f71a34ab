//! Capability enforcement
//!
//! Per-request authorization for programmatic clients. The enforcement
//! order is fixed: signature first, storage lookup second, so a
//! structurally forged key never causes a storage round-trip.

use std::sync::Arc;

use sea_orm::ConnectionTrait;
use serde::{Deserialize, Serialize};

use crate::auth::api_key::ApiKeyCodec;
use crate::auth::store;
use crate::error::{GatewayError, Result};

/// A named permission an API key may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Cache,
    Storage,
}

impl Capability {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cache => "cache",
            Self::Storage => "storage",
        }
    }
}

/// The set of capabilities enabled on a key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySet {
    pub cache: bool,
    pub storage: bool,
}

impl CapabilitySet {
    #[must_use]
    pub const fn contains(self, capability: Capability) -> bool {
        match capability {
            Capability::Cache => self.cache,
            Capability::Storage => self.storage,
        }
    }
}

/// The owner context handed to the downstream forwarder after a key has
/// been authorized.
#[derive(Debug, Clone)]
pub struct OwnerContext {
    pub user_id: i64,
    pub service_id: i64,
    pub capabilities: CapabilitySet,
}

/// Per-request capability check for presented API keys.
pub struct CapabilityGate {
    codec: Arc<ApiKeyCodec>,
}

impl CapabilityGate {
    #[must_use]
    pub fn new(codec: Arc<ApiKeyCodec>) -> Self {
        Self { codec }
    }

    /// Authorize a presented key string for the required capability.
    pub async fn authorize<C: ConnectionTrait>(
        &self,
        conn: &C,
        key_string: &str,
        required: Capability,
    ) -> Result<OwnerContext> {
        // signature before any storage lookup
        let verified = self.codec.verify(key_string)?;

        let record = store::find_by_opaque_id(conn, &verified.id)
            .await?
            .ok_or_else(|| GatewayError::not_found("API key"))?;

        if record.revoked {
            return Err(GatewayError::unauthorized("API key has been revoked"));
        }
        if record.is_expired() {
            return Err(GatewayError::unauthorized("API key has expired"));
        }
        if !record.capabilities.contains(required) {
            return Err(GatewayError::unauthorized(format!(
                "API key does not carry the {} capability",
                required.as_str()
            )));
        }

        Ok(OwnerContext {
            user_id: record.owner_user_id,
            service_id: record.service_id,
            capabilities: record.capabilities,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_set_membership() {
        let cache_only = CapabilitySet {
            cache: true,
            storage: false,
        };
        assert!(cache_only.contains(Capability::Cache));
        assert!(!cache_only.contains(Capability::Storage));
    }
}
