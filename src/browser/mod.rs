//! Report form automation.
//!
//! [`FormDriver`] walks one browser page through the report request:
//! `Idle → Launched → FieldsPopulated → Submitted → Confirmed`, ending in
//! `TimedOut` or `Errored` on the first failure. The page is closed before
//! `run` returns, whatever state was reached, including after a panic in a
//! page command.

#[cfg(test)]
pub(crate) mod fake;
pub mod locators;
mod webdriver;

pub use locators::FormLocators;
pub use webdriver::WebDriverLauncher;

use crate::date_range::DateRange;
use crate::error::{panic_message, AutomationError, PageError};
use crate::model::{BrowserConfig, FormState, LaunchSession};
use async_trait::async_trait;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

/// One browser page. Controls are addressed by their `name` attribute.
#[async_trait]
pub trait ReportPage: Send {
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), PageError>;

    /// Wait until a control with `name` is present.
    async fn wait_for(&mut self, name: &str, timeout: Duration) -> Result<(), PageError>;

    /// Replace the control's current value with `value`.
    async fn fill(&mut self, name: &str, value: &str) -> Result<(), PageError>;

    async fn click(&mut self, name: &str) -> Result<(), PageError>;

    async fn close(&mut self) -> Result<(), PageError>;
}

/// Starts browser sessions.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn open(&self) -> Result<Box<dyn ReportPage>, PageError>;
}

pub struct FormDriver {
    page: Box<dyn ReportPage>,
    locators: FormLocators,
    cfg: BrowserConfig,
    state: FormState,
    closed: bool,
}

impl FormDriver {
    pub fn new(page: Box<dyn ReportPage>, locators: FormLocators, cfg: &BrowserConfig) -> Self {
        Self {
            page,
            locators,
            cfg: cfg.clone(),
            state: FormState::Idle,
            closed: false,
        }
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    /// Submit the report request, then tear the page down.
    ///
    /// `Ok` means the driver reached [`FormState::Confirmed`].
    pub async fn run(
        &mut self,
        session: LaunchSession,
        range: &DateRange,
        recipients: &str,
    ) -> Result<(), AutomationError> {
        let result = if self.state == FormState::Idle {
            AssertUnwindSafe(self.drive(session, range, recipients))
                .catch_unwind()
                .await
                .unwrap_or_else(|panic| {
                    Err(AutomationError::Errored(format!(
                        "panic during form automation: {}",
                        panic_message(panic.as_ref())
                    )))
                })
        } else {
            Err(AutomationError::Errored(format!(
                "driver already used (state {:?})",
                self.state
            )))
        };

        match &result {
            Ok(()) => self.transition(FormState::Confirmed),
            Err(AutomationError::Timeout(e)) => {
                tracing::error!(
                    error = %e,
                    "Timed out waiting for the Roll Call page; check the network or whether the form changed"
                );
                self.transition(FormState::TimedOut);
            }
            Err(e) => {
                tracing::error!(error = %e, "Error during form submission");
                self.transition(FormState::Errored);
            }
        }

        self.close().await;
        result
    }

    async fn drive(
        &mut self,
        session: LaunchSession,
        range: &DateRange,
        recipients: &str,
    ) -> Result<(), AutomationError> {
        let (start, end) = range
            .form_values()
            .map_err(|e| AutomationError::Errored(format!("could not format report dates: {e}")))?;

        tracing::info!("Navigating to Roll Call attendance report page");
        self.page
            .navigate(&session.into_url(), self.cfg.page_load_timeout)
            .await?;
        self.transition(FormState::Launched);

        tracing::info!(start = %start, end = %end, "Filling report form");
        self.page
            .wait_for(self.locators.start_date, self.cfg.element_wait_timeout)
            .await?;
        self.page.fill(self.locators.start_date, &start).await?;
        self.page.fill(self.locators.end_date, &end).await?;
        self.page.fill(self.locators.email, recipients).await?;
        self.transition(FormState::FieldsPopulated);

        // Roll Call rejects submissions that arrive right after the fields change.
        tokio::time::sleep(self.cfg.settle_delay).await;

        self.page.click(self.locators.submit).await?;
        self.transition(FormState::Submitted);
        tracing::info!("Form submitted");

        tokio::time::sleep(self.cfg.post_submit_wait).await;
        Ok(())
    }

    fn transition(&mut self, next: FormState) {
        tracing::debug!(from = ?self.state, to = ?next, "form state");
        self.state = next;
    }

    /// Best-effort teardown; runs once.
    async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        tracing::info!("Closing browser");
        if let Err(e) = self.page.close().await {
            tracing::warn!(error = %e, "browser teardown failed");
        }
        debug_assert!(self.state.is_terminal() || self.state == FormState::Idle);
    }
}
