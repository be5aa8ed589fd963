//! Run lifecycle controller.
//!
//! Sequences token creation, launch resolution, date selection and form
//! submission. The scoped token is released on every path once it exists,
//! including step failures, interrupts and panics inside the run body.

use super::interrupt::Interrupt;
use crate::browser::{BrowserLauncher, FormDriver, FormLocators};
use crate::canvas::{CredentialIssuer, CredentialLease, LaunchResolver};
use crate::date_range::DateRange;
use crate::error::{panic_message, AutomationError, RunError};
use crate::model::{FormState, RunConfig, SubmissionOutcome};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use time::Date;

/// Collaborators for one run. Built once from [`RunConfig`] and never mutated.
pub(crate) struct Orchestrator<'a> {
    pub issuer: &'a dyn CredentialIssuer,
    pub resolver: &'a dyn LaunchResolver,
    pub launcher: &'a dyn BrowserLauncher,
    pub locators: FormLocators,
    pub cfg: &'a RunConfig,
    pub interrupt: Interrupt,
}

impl Orchestrator<'_> {
    /// Run the whole sequence for `run_date` and reduce it to an outcome.
    pub(crate) async fn execute(&self, run_date: Date) -> SubmissionOutcome {
        match self.run(run_date).await {
            Ok(()) => SubmissionOutcome::succeeded(format!(
                "report requested for {}",
                self.cfg.report_email
            )),
            Err(e) => {
                match &e {
                    RunError::Credential(_) => {
                        tracing::error!(error = %e, "Failed to create temporary token")
                    }
                    RunError::Resolution(_) => {
                        tracing::error!(error = %e, "Could not obtain sessionless URL; aborting")
                    }
                    RunError::Automation(_) => {
                        tracing::error!(error = %e, "Report form was not submitted")
                    }
                    RunError::Interrupted(_) => tracing::warn!(error = %e, "Run interrupted"),
                    RunError::Unexpected(_) => tracing::error!(error = %e, "Unexpected error"),
                }
                SubmissionOutcome::failed(e.to_string())
            }
        }
    }

    async fn run(&self, run_date: Date) -> Result<(), RunError> {
        self.interrupt.check("token creation")?;
        let mut lease = CredentialLease::acquire(self.issuer).await?;

        let body = AssertUnwindSafe(self.submit(&lease, run_date))
            .catch_unwind()
            .await;
        lease.release().await;

        match body {
            Ok(result) => result,
            Err(panic) => Err(RunError::Unexpected(panic_message(panic.as_ref()))),
        }
    }

    async fn submit(&self, lease: &CredentialLease<'_>, run_date: Date) -> Result<(), RunError> {
        let credential = lease
            .credential()
            .ok_or_else(|| RunError::Unexpected("temporary token released before use".into()))?;

        self.interrupt.check("launch resolution")?;
        let session = self
            .resolver
            .resolve(credential, &self.cfg.canvas.tool_url)
            .await?;

        let range = DateRange::for_run_date(run_date);
        tracing::info!(
            weekday = %run_date.weekday(),
            start = %range.start,
            end = %range.end,
            "Report date range selected"
        );

        self.interrupt.check("browser launch")?;
        let page = self.launcher.open().await.map_err(AutomationError::from)?;
        let mut driver = FormDriver::new(page, self.locators, &self.cfg.browser);
        driver
            .run(session, &range, &self.cfg.report_email)
            .await?;

        // A Ctrl-C during the browser step fails the run even if the click went through.
        self.interrupt.check("confirming the submission")?;

        match driver.state() {
            FormState::Confirmed => Ok(()),
            other => Err(RunError::Unexpected(format!(
                "form automation ended in {other:?}"
            ))),
        }
    }
}
