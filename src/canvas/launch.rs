use super::{CanvasApi, CanvasApiError};
use crate::error::ResolutionFailure;
use crate::model::{LaunchSession, ScopedCredential};
use async_trait::async_trait;
use serde::Deserialize;

/// Turns a scoped credential into a one-time launch URL for an external tool.
#[async_trait]
pub trait LaunchResolver: Send + Sync {
    async fn resolve(
        &self,
        credential: &ScopedCredential,
        tool_url: &str,
    ) -> Result<LaunchSession, ResolutionFailure>;
}

/// Resolves launches through `external_tools/sessionless_launch` on one account.
pub struct CanvasLaunchResolver {
    api: CanvasApi,
    account_id: String,
}

#[derive(Deserialize)]
struct SessionlessLaunch {
    url: Option<String>,
}

impl CanvasLaunchResolver {
    pub fn new(api: CanvasApi, account_id: impl Into<String>) -> Self {
        Self {
            api,
            account_id: account_id.into(),
        }
    }
}

#[async_trait]
impl LaunchResolver for CanvasLaunchResolver {
    async fn resolve(
        &self,
        credential: &ScopedCredential,
        tool_url: &str,
    ) -> Result<LaunchSession, ResolutionFailure> {
        tracing::info!(account_id = %self.account_id, "Generating sessionless launch URL");

        let response = self
            .api
            .http
            .get(self.api.url(&format!(
                "accounts/{}/external_tools/sessionless_launch",
                self.account_id
            )))
            .query(&[("url", tool_url)])
            .bearer_auth(credential.secret.expose())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(CanvasApiError::from)?;
        let launch: SessionlessLaunch = CanvasApi::parse_response(response).await?;

        let url = launch
            .url
            .filter(|u| !u.is_empty())
            .ok_or(ResolutionFailure::MissingUrl)?;
        tracing::info!("Sessionless launch URL retrieved");
        Ok(LaunchSession::new(url))
    }
}
