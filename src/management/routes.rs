//! Route table
//!
//! Three route groups with distinct authentication perimeters:
//! `/public` behind the shared-secret perimeter, `/projects` behind the
//! session cookie pair, `/api` behind per-request API keys checked in the
//! capability handlers themselves.

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn_with_state;
use axum::routing::{delete, get, patch, post};
use tower_http::trace::TraceLayer;

use crate::config::STORAGE_UPLOAD_SIZE_LIMIT;
use crate::management::handlers;
use crate::management::middleware::{perimeter_auth, session_auth};
use crate::management::server::AppState;
use crate::proxy;

/// Create all routes.
pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .nest("/public", public_routes(state.clone()))
        .nest("/projects", project_routes(state.clone()))
        .nest("/api/cache", cache_routes())
        .nest("/api/storage", storage_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Account routes, reachable only through the trusted frontend.
fn public_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/signup", post(handlers::users::signup))
        .route("/login", post(handlers::users::login))
        .layer(from_fn_with_state(state, perimeter_auth))
}

/// Project management routes, session-cookie authenticated.
fn project_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::projects::create_project))
        .route("/", get(handlers::projects::list_projects))
        .route("/{name}", delete(handlers::projects::delete_project))
        .route("/{name}", patch(handlers::projects::toggle_project))
        .layer(from_fn_with_state(state, session_auth))
}

/// Cache capability routes, API-key authenticated in the handlers.
fn cache_routes() -> Router<AppState> {
    Router::new()
        .route("/put", post(proxy::cache::put_cache))
        .route("/get/{cache_key}", get(proxy::cache::get_cache))
}

/// Storage capability routes, API-key authenticated in the handlers.
fn storage_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/upload/{file_name}",
            post(proxy::storage::upload).layer(DefaultBodyLimit::max(STORAGE_UPLOAD_SIZE_LIMIT)),
        )
        .route("/download/{file_name}", get(proxy::storage::download))
}
