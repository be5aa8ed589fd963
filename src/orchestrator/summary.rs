//! End-of-run summary lines.

use crate::model::SubmissionOutcome;

const RULE: &str = "============================================================";

/// Pre-formatted closing lines for the run log.
pub(crate) struct RunSummary {
    pub lines: Vec<String>,
}

pub(crate) fn build_run_summary(outcome: &SubmissionOutcome, recipients: &str) -> RunSummary {
    let mut lines = vec![RULE.to_string()];
    if outcome.success {
        lines.push("SUCCESS - Attendance report requested".to_string());
        lines.push(format!("Report will be emailed to: {recipients}"));
    } else {
        lines.push("FAILED - Attendance report was not requested".to_string());
        lines.push(format!("Reason: {}", outcome.detail));
    }
    lines.push(RULE.to_string());
    RunSummary { lines }
}

/// Emit the summary through `tracing`, at error level for failures.
pub(crate) fn log_run_summary(outcome: &SubmissionOutcome, recipients: &str) {
    for line in build_run_summary(outcome, recipients).lines {
        if outcome.success {
            tracing::info!("{line}");
        } else {
            tracing::error!("{line}");
        }
    }
}

pub(crate) fn log_banner(title: &str) {
    tracing::info!("{RULE}");
    tracing::info!("{title}");
    tracing::info!("{RULE}");
}
