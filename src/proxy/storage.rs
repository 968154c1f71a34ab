//! Storage capability handlers

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
};

use crate::auth::capability::Capability;
use crate::management::server::AppState;
use crate::proxy::{api_key_from_headers, passthrough};

/// `POST /api/storage/upload/{file_name}`
///
/// The request body is the raw file content. Size is capped at the route
/// layer before the body reaches this handler.
pub async fn upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(file_name): Path<String>,
    body: Bytes,
) -> Response {
    let key = match api_key_from_headers(&headers) {
        Ok(key) => key,
        Err(err) => return err.into_response(),
    };
    let owner = match state
        .gate
        .authorize(&state.db, &key, Capability::Storage)
        .await
    {
        Ok(owner) => owner,
        Err(err) => return err.into_response(),
    };

    let path = state.downstream.config().storage_upload_path.clone();
    let uid = owner.user_id.to_string();
    let query = [("uid", uid.as_str()), ("name", file_name.as_str())];
    match state.downstream.post_bytes(&path, &query, body).await {
        Ok(forwarded) => passthrough(forwarded),
        Err(err) => err.into_response(),
    }
}

/// `GET /api/storage/download/{file_name}`
pub async fn download(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(file_name): Path<String>,
) -> Response {
    let key = match api_key_from_headers(&headers) {
        Ok(key) => key,
        Err(err) => return err.into_response(),
    };
    let owner = match state
        .gate
        .authorize(&state.db, &key, Capability::Storage)
        .await
    {
        Ok(owner) => owner,
        Err(err) => return err.into_response(),
    };

    let path = state.downstream.config().storage_download_path.clone();
    let uid = owner.user_id.to_string();
    let query = [("uid", uid.as_str()), ("name", file_name.as_str())];
    match state.downstream.get(&path, &query).await {
        Ok(forwarded) => passthrough(forwarded),
        Err(err) => err.into_response(),
    }
}
