//! Downstream forwarding client
//!
//! Thin reverse-forward to the downstream cache/storage service. The
//! downstream protocol is not interpreted here beyond mapping its failure
//! statuses onto the gateway error taxonomy.

use axum::http::StatusCode;
use bytes::Bytes;
use reqwest::Client;

use crate::config::DownstreamConfig;
use crate::error::{GatewayError, Result};

/// A downstream reply: status plus raw body, passed through to the caller.
#[derive(Debug)]
pub struct ForwardedResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

/// HTTP client for the downstream service.
pub struct DownstreamClient {
    http: Client,
    config: DownstreamConfig,
}

impl DownstreamClient {
    #[must_use]
    pub fn new(config: DownstreamConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &DownstreamConfig {
        &self.config
    }

    /// POST a JSON payload to the given downstream path.
    pub async fn post_json(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<ForwardedResponse> {
        let url = format!("{}{}", self.config.base_url, path);
        let response = self
            .http
            .post(&url)
            .header("authorization", &self.config.auth_token)
            .json(body)
            .send()
            .await
            .map_err(|e| GatewayError::internal_with_source("downstream request failed", e))?;
        Self::map_response(response).await
    }

    /// POST a raw body to the given downstream path. Query values are
    /// percent-encoded by the client, so caller-supplied names cannot
    /// smuggle extra parameters.
    pub async fn post_bytes(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: Bytes,
    ) -> Result<ForwardedResponse> {
        let url = format!("{}{}", self.config.base_url, path);
        let response = self
            .http
            .post(&url)
            .query(query)
            .header("authorization", &self.config.auth_token)
            .body(body)
            .send()
            .await
            .map_err(|e| GatewayError::internal_with_source("downstream request failed", e))?;
        Self::map_response(response).await
    }

    /// GET the given downstream path with percent-encoded query values.
    pub async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<ForwardedResponse> {
        let url = format!("{}{}", self.config.base_url, path);
        let response = self
            .http
            .get(&url)
            .query(query)
            .header("authorization", &self.config.auth_token)
            .send()
            .await
            .map_err(|e| GatewayError::internal_with_source("downstream request failed", e))?;
        Self::map_response(response).await
    }

    async fn map_response(response: reqwest::Response) -> Result<ForwardedResponse> {
        let status = response.status();
        match status {
            s if s.is_success() => {
                let body = response
                    .bytes()
                    .await
                    .map_err(|e| GatewayError::internal_with_source("downstream body read failed", e))?;
                Ok(ForwardedResponse {
                    status: StatusCode::from_u16(s.as_u16())
                        .unwrap_or(StatusCode::OK),
                    body,
                })
            }
            reqwest::StatusCode::NOT_FOUND => Err(GatewayError::not_found("downstream resource")),
            reqwest::StatusCode::CONFLICT | reqwest::StatusCode::PRECONDITION_FAILED => Err(
                GatewayError::already_exists("the downstream resource already exists"),
            ),
            other => {
                // detail stays server-side; the caller sees only the category
                tracing::error!(status = %other, "downstream responded with unexpected status");
                Err(GatewayError::internal(format!(
                    "downstream responded with status {other}"
                )))
            }
        }
    }
}
