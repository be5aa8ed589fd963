use super::{CanvasApi, CanvasApiError};
use crate::error::CredentialError;
use crate::model::{Secret, ScopedCredential};
use async_trait::async_trait;
use serde::Deserialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Purpose string Canvas shows next to the token in the user's settings.
const TOKEN_PURPOSE: &str = "Temporary Attendance Report Script";

/// Scoped tokens never outlive this, even if deletion fails.
pub const CREDENTIAL_LIFETIME: time::Duration = time::Duration::hours(1);

/// Mints and revokes the per-run scoped credential.
#[async_trait]
pub trait CredentialIssuer: Send + Sync {
    async fn acquire(&self) -> Result<ScopedCredential, CredentialError>;

    /// Best effort. Failures are logged, never returned.
    async fn release(&self, credential: ScopedCredential);
}

/// [`CredentialIssuer`] backed by the Canvas user token endpoints.
pub struct CanvasCredentials {
    api: CanvasApi,
    user_id: String,
    admin_token: Secret,
}

#[derive(Deserialize)]
struct TokenResponse {
    visible_token: Option<String>,
    id: Option<TokenId>,
}

/// Canvas sends numeric ids, but some proxies stringify them.
#[derive(Deserialize)]
#[serde(untagged)]
enum TokenId {
    Number(u64),
    Text(String),
}

impl TokenId {
    fn into_string(self) -> String {
        match self {
            TokenId::Number(n) => n.to_string(),
            TokenId::Text(s) => s,
        }
    }
}

impl CanvasCredentials {
    pub fn new(api: CanvasApi, user_id: impl Into<String>, admin_token: Secret) -> Self {
        Self {
            api,
            user_id: user_id.into(),
            admin_token,
        }
    }

    async fn delete(&self, id: &str) -> Result<(), CanvasApiError> {
        let response = self
            .api
            .http
            .delete(self.api.url(&format!("users/{}/tokens/{}", self.user_id, id)))
            .bearer_auth(self.admin_token.expose())
            .send()
            .await?;
        CanvasApi::ensure_success(response).await?;
        Ok(())
    }
}

#[async_trait]
impl CredentialIssuer for CanvasCredentials {
    async fn acquire(&self) -> Result<ScopedCredential, CredentialError> {
        tracing::info!("Creating temporary API token");

        let expires_at = OffsetDateTime::now_utc() + CREDENTIAL_LIFETIME;
        let expiry = expires_at.format(&Rfc3339)?;
        let body = serde_json::json!({
            "token": {
                "purpose": TOKEN_PURPOSE,
                "expires_at": expiry,
            }
        });

        let response = self
            .api
            .http
            .post(self.api.url(&format!("users/{}/tokens", self.user_id)))
            .bearer_auth(self.admin_token.expose())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(CanvasApiError::from)?;
        let token: TokenResponse = CanvasApi::parse_response(response).await?;

        let secret = token
            .visible_token
            .filter(|t| !t.is_empty())
            .ok_or(CredentialError::MissingSecret)?;
        let id = token.id.map(TokenId::into_string);
        if id.is_none() {
            tracing::warn!("token response had no id; it cannot be deleted and will expire");
        }

        tracing::info!(
            token_id = id.as_deref().unwrap_or("-"),
            "Temporary token created (expires in 1 hour)"
        );
        Ok(ScopedCredential {
            secret: Secret::new(secret),
            id,
            expires_at,
        })
    }

    async fn release(&self, credential: ScopedCredential) {
        let Some(id) = credential.id else {
            tracing::warn!(
                expires_at = %credential.expires_at,
                "temporary token has no id to delete; leaving it to expire"
            );
            return;
        };

        tracing::info!(token_id = %id, "Cleaning up temporary token");
        match self.delete(&id).await {
            Ok(()) => tracing::info!(token_id = %id, "Temporary token deleted"),
            Err(e) => tracing::warn!(
                token_id = %id,
                error = %e,
                "could not delete temporary token (will auto-expire within 1 hour)"
            ),
        }
    }
}

/// Holds the run's credential until it is released.
///
/// `release` is idempotent; a lease dropped while still holding a credential
/// only logs, since the token's expiry bounds its lifetime anyway.
pub struct CredentialLease<'a> {
    issuer: &'a dyn CredentialIssuer,
    credential: Option<ScopedCredential>,
}

impl<'a> CredentialLease<'a> {
    pub async fn acquire(issuer: &'a dyn CredentialIssuer) -> Result<Self, CredentialError> {
        let credential = issuer.acquire().await?;
        Ok(Self {
            issuer,
            credential: Some(credential),
        })
    }

    pub fn credential(&self) -> Option<&ScopedCredential> {
        self.credential.as_ref()
    }

    pub async fn release(&mut self) {
        if let Some(credential) = self.credential.take() {
            self.issuer.release(credential).await;
        }
    }
}

impl Drop for CredentialLease<'_> {
    fn drop(&mut self) {
        if let Some(credential) = &self.credential {
            tracing::warn!(
                expires_at = %credential.expires_at,
                "temporary token was not released; it will expire on its own"
            );
        }
    }
}
