//! Error taxonomy for a report run.
//!
//! Each step has its own error type; [`RunError`] collects them at the
//! orchestrator boundary where every failure becomes a failed outcome.

use crate::canvas::CanvasApiError;
use thiserror::Error;

/// Pre-flight configuration problems. Raised before any network call.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration incomplete, set: {}", .missing.join(", "))]
    Incomplete { missing: Vec<&'static str> },

    #[error("invalid {setting}: {reason}")]
    Invalid {
        setting: &'static str,
        reason: String,
    },
}

/// Minting the scoped token failed. Fatal for the run.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("token request failed: {0}")]
    Api(#[from] CanvasApiError),

    #[error("token response did not include a visible_token")]
    MissingSecret,

    #[error("could not format token expiry: {0}")]
    Expiry(#[from] time::error::Format),
}

/// The sessionless launch could not be resolved.
#[derive(Debug, Error)]
pub enum ResolutionFailure {
    #[error("sessionless launch request failed: {0}")]
    Api(#[from] CanvasApiError),

    #[error("sessionless launch response did not include a url")]
    MissingUrl,
}

/// Failure reported by the browser seam.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("timed out after {after:?} waiting for {what}")]
    Timeout {
        what: String,
        after: std::time::Duration,
    },

    #[error("could not start browser session: {0}")]
    Session(String),

    #[error("webdriver command failed: {0}")]
    Command(String),
}

impl PageError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, PageError::Timeout { .. })
    }
}

/// Report form automation did not reach confirmation.
#[derive(Debug, Error)]
pub enum AutomationError {
    #[error("form automation timed out: {0}")]
    Timeout(PageError),

    #[error("form automation failed: {0}")]
    Errored(String),
}

impl From<PageError> for AutomationError {
    fn from(err: PageError) -> Self {
        if err.is_timeout() {
            AutomationError::Timeout(err)
        } else {
            AutomationError::Errored(err.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    Resolution(#[from] ResolutionFailure),

    #[error(transparent)]
    Automation(#[from] AutomationError),

    #[error("interrupted before {0}")]
    Interrupted(&'static str),

    #[error("unexpected failure: {0}")]
    Unexpected(String),
}

/// Text of a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}
