use std::fmt;
use std::time::Duration;
use time::OffsetDateTime;

/// A string that never shows up in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Everything needed to talk to the Canvas REST API.
#[derive(Debug, Clone)]
pub struct CanvasConfig {
    /// API root, e.g. `https://school.instructure.com/api/v1` (no trailing slash).
    pub base_url: String,
    pub admin_token: Secret,
    pub user_id: String,
    pub account_id: String,
    /// Launch URL of the external tool the sessionless launch targets.
    pub tool_url: String,
    pub request_timeout: Duration,
    pub user_agent: String,
}

#[derive(Debug, Clone)]
pub struct BrowserConfig {
    pub webdriver_url: String,
    pub page_load_timeout: Duration,
    pub element_wait_timeout: Duration,
    /// Pause between filling the form and clicking submit.
    pub settle_delay: Duration,
    /// Pause after the click before the run counts as confirmed.
    pub post_submit_wait: Duration,
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub canvas: CanvasConfig,
    pub browser: BrowserConfig,
    /// Recipient list exactly as the report form should receive it.
    pub report_email: String,
}

/// Short-lived API token minted for a single run.
#[derive(Debug)]
pub struct ScopedCredential {
    pub secret: Secret,
    /// Canvas token id; absent when the create response omitted it.
    pub id: Option<String>,
    pub expires_at: OffsetDateTime,
}

/// One-time authenticated URL into the external tool.
pub struct LaunchSession {
    url: String,
}

impl LaunchSession {
    pub fn new(url: String) -> Self {
        Self { url }
    }

    /// Hands the URL over for navigation; the session cannot be used twice.
    pub fn into_url(self) -> String {
        self.url
    }
}

impl fmt::Debug for LaunchSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LaunchSession")
            .field("url", &"<redacted>")
            .finish()
    }
}

/// Progress of the report form automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Idle,
    Launched,
    FieldsPopulated,
    Submitted,
    Confirmed,
    TimedOut,
    Errored,
}

impl FormState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            FormState::Confirmed | FormState::TimedOut | FormState::Errored
        )
    }
}

/// Terminal result of one run, mapped to the process exit status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionOutcome {
    pub success: bool,
    pub detail: String,
}

impl SubmissionOutcome {
    pub fn succeeded(detail: impl Into<String>) -> Self {
        Self {
            success: true,
            detail: detail.into(),
        }
    }

    pub fn failed(detail: impl Into<String>) -> Self {
        Self {
            success: false,
            detail: detail.into(),
        }
    }

    pub fn exit_code(&self) -> i32 {
        if self.success {
            0
        } else {
            1
        }
    }
}
