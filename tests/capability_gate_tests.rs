//! Capability gate integration tests
//!
//! Covers the enforcement order end to end: forged keys fail before the
//! database is consulted, validly signed but unknown keys are not found,
//! and revocation, expiry and capability membership each deny access.

mod common;

use std::sync::Arc;

use pretty_assertions::assert_eq;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};

use entity::api_keys;
use vaultbase::GatewayError;
use vaultbase::auth::api_key::ApiKeyCodec;
use vaultbase::auth::capability::{Capability, CapabilityGate, CapabilitySet};
use vaultbase::auth::store::{self, NewKeyRow};
use vaultbase::management::services::projects::{ProjectProvisioner, ProvisionedProject};

struct GateSuite {
    db: sea_orm::DatabaseConnection,
    gate: CapabilityGate,
    provisioner: ProjectProvisioner,
    owner_id: i64,
}

impl GateSuite {
    async fn setup() -> Self {
        let db = common::test_db().await;
        let owner = common::seed_user(&db, "clerk-gate", "gate@test.com").await;
        let codec = Arc::new(ApiKeyCodec::new(&common::test_secrets()));
        Self {
            db,
            gate: CapabilityGate::new(Arc::clone(&codec)),
            provisioner: ProjectProvisioner::new(codec, false),
            owner_id: owner.id,
        }
    }

    async fn provision(&self, name: &str, capabilities: CapabilitySet) -> ProvisionedProject {
        self.provisioner
            .provision(&self.db, self.owner_id, name, capabilities)
            .await
            .unwrap()
    }
}

#[tokio::test]
async fn authorized_key_yields_owner_context() {
    let suite = GateSuite::setup().await;
    let provisioned = suite
        .provision(
            "gate-project",
            CapabilitySet {
                cache: true,
                storage: true,
            },
        )
        .await;

    let owner = suite
        .gate
        .authorize(&suite.db, &provisioned.key.key, Capability::Cache)
        .await
        .unwrap();
    assert_eq!(owner.user_id, suite.owner_id);
    assert_eq!(owner.service_id, provisioned.service.sid);
    assert!(owner.capabilities.storage);
}

#[tokio::test]
async fn missing_capability_is_unauthorized() {
    let suite = GateSuite::setup().await;
    let provisioned = suite
        .provision(
            "cache-only-project",
            CapabilitySet {
                cache: true,
                storage: false,
            },
        )
        .await;

    let err = suite
        .gate
        .authorize(&suite.db, &provisioned.key.key, Capability::Storage)
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Unauthorized { .. }));
}

#[tokio::test]
async fn revoked_key_is_unauthorized() {
    let suite = GateSuite::setup().await;
    let provisioned = suite
        .provision(
            "revoked-project",
            CapabilitySet {
                cache: true,
                storage: true,
            },
        )
        .await;

    let key = api_keys::Entity::find_by_id(provisioned.service.key_id)
        .one(&suite.db)
        .await
        .unwrap()
        .unwrap();
    let mut active: api_keys::ActiveModel = key.into();
    active.revoked = Set(true);
    active.update(&suite.db).await.unwrap();

    let err = suite
        .gate
        .authorize(&suite.db, &provisioned.key.key, Capability::Cache)
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Unauthorized { .. }));
}

#[tokio::test]
async fn expired_key_is_unauthorized_even_though_its_signature_holds() {
    let suite = GateSuite::setup().await;
    let provisioned = suite
        .provision(
            "expired-project",
            CapabilitySet {
                cache: true,
                storage: true,
            },
        )
        .await;

    let key = api_keys::Entity::find_by_id(provisioned.service.key_id)
        .one(&suite.db)
        .await
        .unwrap()
        .unwrap();
    let mut active: api_keys::ActiveModel = key.into();
    active.expires_at = Set(chrono::Utc::now().timestamp() - 60);
    active.update(&suite.db).await.unwrap();

    // the signature is still the issuer's
    ApiKeyCodec::new(&common::test_secrets())
        .verify(&provisioned.key.key)
        .unwrap();

    let err = suite
        .gate
        .authorize(&suite.db, &provisioned.key.key, Capability::Cache)
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Unauthorized { .. }));
}

#[tokio::test]
async fn forged_key_fails_on_signature() {
    let suite = GateSuite::setup().await;

    let forger = ApiKeyCodec::new(&vaultbase::config::Secrets::new(
        "session-test-secret",
        "attacker-secret",
        "v1",
        "perimeter-test-secret",
    ));
    let forged = forger.issue().unwrap();

    let err = suite
        .gate
        .authorize(&suite.db, &forged.key, Capability::Cache)
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::SignatureInvalid));
}

#[tokio::test]
async fn validly_signed_unknown_key_is_not_found() {
    let suite = GateSuite::setup().await;

    // signed with the real secret but never persisted
    let unknown = ApiKeyCodec::new(&common::test_secrets()).issue().unwrap();

    let err = suite
        .gate
        .authorize(&suite.db, &unknown.key, Capability::Cache)
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::NotFound { .. }));
}

#[tokio::test]
async fn key_row_without_a_service_is_not_usable() {
    let suite = GateSuite::setup().await;

    // a key row alone, as a half-committed provisioning run would leave it
    let material = ApiKeyCodec::new(&common::test_secrets()).issue().unwrap();
    store::insert_key(
        &suite.db,
        NewKeyRow {
            opaque_id: material.id.clone(),
            key: material.key.clone(),
            capabilities: CapabilitySet {
                cache: true,
                storage: true,
            },
            expires_at: chrono::Utc::now().timestamp() + 3600,
        },
    )
    .await
    .unwrap();

    let err = suite
        .gate
        .authorize(&suite.db, &material.key, Capability::Cache)
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::NotFound { .. }));
}
