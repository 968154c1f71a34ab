//! Project handlers: provisioning, listing, capability toggling, deletion

use std::sync::Arc;

use axum::{
    Extension,
    extract::{Path, State},
    response::Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::capability::CapabilitySet;
use crate::management::middleware::AuthContext;
use crate::management::response::ApiResponse;
use crate::management::server::AppState;
use crate::management::services::projects::{self, ProjectView, ProvisionedProject};

/// Project creation / toggle payload.
#[derive(Debug, Deserialize)]
pub struct ProjectRequest {
    pub name: String,
    #[serde(default)]
    pub cache: bool,
    #[serde(default)]
    pub storage: bool,
}

/// Key info as handed to the owner.
#[derive(Debug, Serialize)]
pub struct ApiKeyResponse {
    pub id: String,
    /// The full key string; shown in full only at provisioning time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub created_at: i64,
    pub expires_at: i64,
    pub cache: bool,
    pub storage: bool,
}

/// Project view returned to the owner.
#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    pub service_uuid: String,
    pub service_name: String,
    pub service_created_at: i64,
    pub key_info: ApiKeyResponse,
}

impl From<ProvisionedProject> for ProjectResponse {
    fn from(p: ProvisionedProject) -> Self {
        Self {
            service_uuid: p.service.service_uuid.clone(),
            service_name: p.service.name.clone(),
            service_created_at: p.service.created_at.and_utc().timestamp(),
            key_info: ApiKeyResponse {
                id: p.key.id,
                key: Some(p.key.key),
                created_at: p.service.created_at.and_utc().timestamp(),
                expires_at: p.expires_at,
                cache: p.capabilities.cache,
                storage: p.capabilities.storage,
            },
        }
    }
}

impl From<ProjectView> for ProjectResponse {
    fn from(view: ProjectView) -> Self {
        Self {
            service_uuid: view.service.service_uuid,
            service_name: view.service.name,
            service_created_at: view.service.created_at.and_utc().timestamp(),
            key_info: ApiKeyResponse {
                id: view.key.opaque_id,
                key: Some(view.key.key),
                created_at: view.key.created_at.and_utc().timestamp(),
                expires_at: view.key.expires_at,
                cache: view.key.cache,
                storage: view.key.storage,
            },
        }
    }
}

/// `POST /projects`
pub async fn create_project(
    State(state): State<AppState>,
    Extension(auth): Extension<Arc<AuthContext>>,
    Json(body): Json<ProjectRequest>,
) -> ApiResponse<ProjectResponse> {
    let capabilities = CapabilitySet {
        cache: body.cache,
        storage: body.storage,
    };
    match state
        .provisioner
        .provision(&state.db, auth.user_id, &body.name, capabilities)
        .await
    {
        Ok(provisioned) => ApiResponse::Created(provisioned.into()),
        Err(err) => err.into(),
    }
}

/// `GET /projects`
pub async fn list_projects(
    State(state): State<AppState>,
    Extension(auth): Extension<Arc<AuthContext>>,
) -> ApiResponse<Vec<ProjectResponse>> {
    match projects::list_projects(&state.db, auth.user_id).await {
        Ok(views) => ApiResponse::Success(views.into_iter().map(Into::into).collect()),
        Err(err) => err.into(),
    }
}

/// `DELETE /projects/{name}`
pub async fn delete_project(
    State(state): State<AppState>,
    Extension(auth): Extension<Arc<AuthContext>>,
    Path(name): Path<String>,
) -> ApiResponse<()> {
    match projects::delete_project(&state.db, auth.user_id, &name).await {
        Ok(()) => ApiResponse::SuccessWithoutData("project deleted".to_string()),
        Err(err) => err.into(),
    }
}

/// `PATCH /projects/{name}`
pub async fn toggle_project(
    State(state): State<AppState>,
    Extension(auth): Extension<Arc<AuthContext>>,
    Path(name): Path<String>,
    Json(body): Json<ProjectRequest>,
) -> ApiResponse<ApiKeyResponse> {
    let capabilities = CapabilitySet {
        cache: body.cache,
        storage: body.storage,
    };
    match projects::toggle_capabilities(&state.db, auth.user_id, &name, capabilities).await {
        Ok(key) => ApiResponse::Success(ApiKeyResponse {
            id: key.opaque_id,
            key: None,
            created_at: key.created_at.and_utc().timestamp(),
            expires_at: key.expires_at,
            cache: key.cache,
            storage: key.storage,
        }),
        Err(err) => err.into(),
    }
}
