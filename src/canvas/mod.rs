//! Canvas REST API access: scoped token lifecycle and sessionless launch.

mod credentials;
mod launch;
#[cfg(test)]
pub(crate) mod fake;

pub use credentials::{CanvasCredentials, CredentialIssuer, CredentialLease};
pub use launch::{CanvasLaunchResolver, LaunchResolver};

use crate::model::CanvasConfig;
use anyhow::{Context, Result};

/// Errors from the Canvas HTTP layer.
#[derive(Debug, thiserror::Error)]
pub enum CanvasApiError {
    /// Network, DNS, TLS, timeout or body decoding failure.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Canvas answered with a non-2xx status.
    #[error("Canvas API error ({status}): {body}")]
    Status { status: u16, body: String },
}

/// Shared HTTP plumbing for the Canvas endpoints.
#[derive(Clone)]
pub struct CanvasApi {
    http: reqwest::Client,
    base_url: String,
}

impl CanvasApi {
    pub fn new(cfg: &CanvasConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(cfg.user_agent.clone())
            .timeout(cfg.request_timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Return the response unchanged on 2xx, otherwise capture status and body.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, CanvasApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(CanvasApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, CanvasApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}
