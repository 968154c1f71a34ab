//! Cache capability handlers

use axum::{
    Json,
    extract::{Path, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::auth::capability::Capability;
use crate::management::server::AppState;
use crate::proxy::{api_key_from_headers, passthrough};

/// Incoming cache write request.
#[derive(Debug, Deserialize)]
pub struct SetCacheRequest {
    pub cache_key: String,
    pub cache_value: serde_json::Value,
    #[serde(default)]
    pub cache_ttl: Option<i64>,
}

/// Payload forwarded downstream.
#[derive(Debug, Serialize)]
struct SetCacheOutgoing<'a> {
    uid: String,
    key: &'a str,
    value: &'a serde_json::Value,
    ttl: Option<i64>,
}

/// `POST /api/cache/put`
pub async fn put_cache(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<SetCacheRequest>,
) -> Response {
    let key = match api_key_from_headers(&headers) {
        Ok(key) => key,
        Err(err) => return err.into_response(),
    };
    let owner = match state.gate.authorize(&state.db, &key, Capability::Cache).await {
        Ok(owner) => owner,
        Err(err) => return err.into_response(),
    };

    let outgoing = SetCacheOutgoing {
        uid: owner.user_id.to_string(),
        key: &body.cache_key,
        value: &body.cache_value,
        ttl: body.cache_ttl,
    };
    let path = state.downstream.config().cache_set_path.clone();
    match state.downstream.post_json(&path, &json!(outgoing)).await {
        Ok(forwarded) => passthrough(forwarded),
        Err(err) => err.into_response(),
    }
}

/// `GET /api/cache/get/{cache_key}`
pub async fn get_cache(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(cache_key): Path<String>,
) -> Response {
    let key = match api_key_from_headers(&headers) {
        Ok(key) => key,
        Err(err) => return err.into_response(),
    };
    let owner = match state.gate.authorize(&state.db, &key, Capability::Cache).await {
        Ok(owner) => owner,
        Err(err) => return err.into_response(),
    };

    let path = state.downstream.config().cache_get_path.clone();
    let uid = owner.user_id.to_string();
    let query = [("uid", uid.as_str()), ("key", cache_key.as_str())];
    match state.downstream.get(&path, &query).await {
        Ok(forwarded) => passthrough(forwarded),
        Err(err) => err.into_response(),
    }
}
