use crate::browser::{FormLocators, WebDriverLauncher};
use crate::canvas::{CanvasApi, CanvasCredentials, CanvasLaunchResolver};
use crate::error::ConfigError;
use crate::model::{BrowserConfig, CanvasConfig, RunConfig, Secret, SubmissionOutcome};
use crate::orchestrator::{self, Interrupt, Orchestrator};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use time::{OffsetDateTime, UtcOffset};

/// Placeholder host shipped in the sample configuration.
const PLACEHOLDER_HOST: &str = "yourschool";

#[derive(Debug, Parser, Clone)]
#[command(
    name = "rollcall-report",
    version,
    about = "Request the Roll Call attendance report through a Canvas sessionless launch"
)]
pub struct Cli {
    /// Long-lived Canvas admin token used to mint the temporary token
    #[arg(long, env = "CANVAS_ADMIN_TOKEN", hide_env_values = true)]
    pub admin_token: Option<String>,

    /// Canvas user id that owns the admin token
    #[arg(long, env = "CANVAS_USER_ID")]
    pub user_id: Option<String>,

    /// Canvas API base URL, e.g. https://school.instructure.com/api/v1
    #[arg(long, env = "CANVAS_BASE_URL")]
    pub base_url: Option<String>,

    /// Account (or sub-account) where the Roll Call tool is installed
    #[arg(long, env = "CANVAS_ACCOUNT_ID", default_value = "1")]
    pub account_id: String,

    /// Roll Call LTI launch URL
    #[arg(
        long,
        env = "ROLLCALL_LAUNCH_URL",
        default_value = "https://rollcall.instructure.com/launch"
    )]
    pub tool_url: String,

    /// Report recipient(s); separate several addresses with commas
    #[arg(long, env = "REPORT_EMAIL")]
    pub report_email: Option<String>,

    /// WebDriver (chromedriver) endpoint
    #[arg(long, env = "WEBDRIVER_URL", default_value = "http://localhost:9515")]
    pub webdriver_url: String,

    /// Timeout for each Canvas API request
    #[arg(long, env = "REQUEST_TIMEOUT", default_value = "30s")]
    pub request_timeout: humantime::Duration,

    /// How long to wait for the Roll Call page to load
    #[arg(long, env = "PAGE_LOAD_TIMEOUT", default_value = "30s")]
    pub page_load_timeout: humantime::Duration,

    /// How long to wait for the report form fields to appear
    #[arg(long, env = "ELEMENT_WAIT_TIMEOUT", default_value = "10s")]
    pub element_wait_timeout: humantime::Duration,

    /// Pause between filling the form and submitting it
    #[arg(long, env = "FORM_SETTLE_DELAY", default_value = "2s")]
    pub form_settle_delay: humantime::Duration,

    /// Pause after submitting before closing the browser
    #[arg(long, env = "FORM_SUBMIT_WAIT", default_value = "5s")]
    pub form_submit_wait: humantime::Duration,

    /// Also append logs to this file
    #[arg(long, env = "ATTENDANCE_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

fn required(
    value: &Option<String>,
    setting: &'static str,
    missing: &mut Vec<&'static str>,
) -> String {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => {
            missing.push(setting);
            String::new()
        }
    }
}

fn http_url(value: &str, setting: &'static str) -> Result<reqwest::Url, ConfigError> {
    let url = reqwest::Url::parse(value).map_err(|e| ConfigError::Invalid {
        setting,
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Invalid {
            setting,
            reason: format!("unsupported scheme {:?}", url.scheme()),
        });
    }
    Ok(url)
}

/// Validate CLI/environment settings into a [`RunConfig`].
///
/// Every missing required setting is reported at once.
pub fn build_config(args: &Cli) -> Result<RunConfig, ConfigError> {
    let mut missing = Vec::new();
    let admin_token = required(&args.admin_token, "CANVAS_ADMIN_TOKEN", &mut missing);
    let user_id = required(&args.user_id, "CANVAS_USER_ID", &mut missing);
    let base_url = required(&args.base_url, "CANVAS_BASE_URL", &mut missing);
    let report_email = required(&args.report_email, "REPORT_EMAIL", &mut missing);

    if !base_url.is_empty() && base_url.contains(PLACEHOLDER_HOST) {
        missing.push("CANVAS_BASE_URL");
    }
    if !missing.is_empty() {
        return Err(ConfigError::Incomplete { missing });
    }

    http_url(&base_url, "CANVAS_BASE_URL")?;
    http_url(&args.tool_url, "ROLLCALL_LAUNCH_URL")?;
    http_url(&args.webdriver_url, "WEBDRIVER_URL")?;

    Ok(RunConfig {
        canvas: CanvasConfig {
            base_url: base_url.trim_end_matches('/').to_string(),
            admin_token: Secret::new(admin_token),
            user_id,
            account_id: args.account_id.trim().to_string(),
            tool_url: args.tool_url.clone(),
            request_timeout: Duration::from(args.request_timeout),
            user_agent: format!("rollcall-report/{}", env!("CARGO_PKG_VERSION")),
        },
        browser: BrowserConfig {
            webdriver_url: args.webdriver_url.clone(),
            page_load_timeout: Duration::from(args.page_load_timeout),
            element_wait_timeout: Duration::from(args.element_wait_timeout),
            settle_delay: Duration::from(args.form_settle_delay),
            post_submit_wait: Duration::from(args.form_submit_wait),
        },
        report_email,
    })
}

/// Fail the run before any Canvas call, still closing the log with the summary.
fn not_started(reason: impl std::fmt::Display) -> SubmissionOutcome {
    tracing::error!(error = %reason, "Run could not start; no requests were made");
    let outcome = SubmissionOutcome::failed(reason.to_string());
    orchestrator::log_run_summary(&outcome, "");
    outcome
}

/// Run one report request. `local_offset` must be read before any thread is spawned.
pub async fn run(args: Cli, local_offset: Option<UtcOffset>) -> SubmissionOutcome {
    orchestrator::log_banner("Roll Call Attendance Export - Starting");

    let cfg = match build_config(&args) {
        Ok(cfg) => cfg,
        Err(e) => return not_started(e),
    };

    let offset = local_offset.unwrap_or_else(|| {
        tracing::warn!("local UTC offset unavailable; computing the report range in UTC");
        UtcOffset::UTC
    });
    let run_date = OffsetDateTime::now_utc().to_offset(offset).date();

    let api = match CanvasApi::new(&cfg.canvas) {
        Ok(api) => api,
        Err(e) => return not_started(format!("{e:#}")),
    };
    let issuer = CanvasCredentials::new(
        api.clone(),
        cfg.canvas.user_id.clone(),
        cfg.canvas.admin_token.clone(),
    );
    let resolver = CanvasLaunchResolver::new(api, cfg.canvas.account_id.clone());
    let launcher = WebDriverLauncher::new(&cfg.browser);

    let orchestrator = Orchestrator {
        issuer: &issuer,
        resolver: &resolver,
        launcher: &launcher,
        locators: FormLocators::default(),
        cfg: &cfg,
        interrupt: Interrupt::listen(),
    };
    let outcome = orchestrator.execute(run_date).await;

    orchestrator::log_run_summary(&outcome, &cfg.report_email);
    outcome
}
