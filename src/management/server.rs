//! HTTP server
//!
//! Wires the shared application state and serves the management and
//! capability routes over axum.

use std::net::SocketAddr;
use std::sync::Arc;

use sea_orm::DatabaseConnection;
use tokio::net::TcpListener;

use crate::auth::api_key::ApiKeyCodec;
use crate::auth::capability::CapabilityGate;
use crate::auth::jwt::SessionTokenCodec;
use crate::auth::session::SessionRotator;
use crate::config::{AppConfig, Secrets};
use crate::error::{GatewayError, Result};
use crate::management::services::projects::ProjectProvisioner;
use crate::proxy::DownstreamClient;

/// Shared application state handed to every handler and middleware.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<AppConfig>,
    pub secrets: Arc<Secrets>,
    pub session_codec: Arc<SessionTokenCodec>,
    pub rotator: Arc<SessionRotator>,
    pub gate: Arc<CapabilityGate>,
    pub provisioner: Arc<ProjectProvisioner>,
    pub downstream: Arc<DownstreamClient>,
}

impl AppState {
    #[must_use]
    pub fn new(db: DatabaseConnection, config: AppConfig, secrets: Secrets) -> Self {
        let session_codec = Arc::new(SessionTokenCodec::new(&secrets));
        let api_key_codec = Arc::new(ApiKeyCodec::new(&secrets));
        let rotator = Arc::new(SessionRotator::new(Arc::clone(&session_codec)));
        let gate = Arc::new(CapabilityGate::new(Arc::clone(&api_key_codec)));
        let provisioner = Arc::new(ProjectProvisioner::new(
            Arc::clone(&api_key_codec),
            config.policy.require_confirmed_account,
        ));
        let downstream = Arc::new(DownstreamClient::new(config.downstream.clone()));

        Self {
            db,
            config: Arc::new(config),
            secrets: Arc::new(secrets),
            session_codec,
            rotator,
            gate,
            provisioner,
            downstream,
        }
    }

    /// Bind and serve until the process is stopped.
    pub async fn serve(self) -> Result<()> {
        let host = self.config.server.host.clone();
        let port = self.config.server.port;
        let ip = host
            .parse::<std::net::IpAddr>()
            .map_err(|e| GatewayError::internal(format!("invalid bind address '{host}': {e}")))?;
        let addr = SocketAddr::new(ip, port);

        let router = super::routes::create_routes(self);

        tracing::info!(%addr, "starting gateway server");
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| GatewayError::internal_with_source("failed to bind listener", e))?;
        axum::serve(listener, router)
            .await
            .map_err(|e| GatewayError::internal_with_source("server error", e))?;
        Ok(())
    }
}
