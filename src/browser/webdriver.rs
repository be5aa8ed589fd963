use super::locators::by_name;
use super::{BrowserLauncher, ReportPage};
use crate::error::PageError;
use crate::model::BrowserConfig;
use async_trait::async_trait;
use fantoccini::error::{CmdError, ErrorStatus};
use fantoccini::{Client, ClientBuilder, Locator};
use std::time::Duration;

/// Chrome flags for unattended runs inside containers or as root.
const CHROME_ARGS: &[&str] = &[
    "--headless",
    "--disable-gpu",
    "--no-sandbox",
    "--disable-dev-shm-usage",
    // Roll Call lays the form out differently on narrow viewports.
    "--window-size=1920,1080",
];

/// Bound on chromedriver starting Chrome and answering the new-session call.
const SESSION_START_TIMEOUT: Duration = Duration::from_secs(60);

/// Bound on deleting the session. Teardown is best effort.
const TEARDOWN_TIMEOUT: Duration = Duration::from_secs(10);

/// Client-side slack over the session's own page-load timeout, so
/// chromedriver normally reports the timeout first and the session is idle
/// again by the time teardown runs.
const NAVIGATION_GRACE: Duration = Duration::from_secs(5);

/// Opens headless Chrome sessions through a WebDriver endpoint (chromedriver).
pub struct WebDriverLauncher {
    webdriver_url: String,
    page_load_timeout: Duration,
}

impl WebDriverLauncher {
    pub fn new(cfg: &BrowserConfig) -> Self {
        Self {
            webdriver_url: cfg.webdriver_url.clone(),
            page_load_timeout: cfg.page_load_timeout,
        }
    }

    fn capabilities(&self) -> serde_json::Map<String, serde_json::Value> {
        let page_load_ms = u64::try_from(self.page_load_timeout.as_millis()).unwrap_or(u64::MAX);
        let mut caps = serde_json::Map::new();
        caps.insert(
            "goog:chromeOptions".to_string(),
            serde_json::json!({ "args": CHROME_ARGS }),
        );
        caps.insert(
            "timeouts".to_string(),
            serde_json::json!({ "pageLoad": page_load_ms }),
        );
        caps
    }
}

#[async_trait]
impl BrowserLauncher for WebDriverLauncher {
    async fn open(&self) -> Result<Box<dyn ReportPage>, PageError> {
        tracing::info!(webdriver = %self.webdriver_url, "Initializing headless Chrome");

        let mut builder = ClientBuilder::native();
        builder.capabilities(self.capabilities());
        let client = match tokio::time::timeout(
            SESSION_START_TIMEOUT,
            builder.connect(&self.webdriver_url),
        )
        .await
        {
            Ok(Ok(client)) => client,
            Ok(Err(e)) => {
                return Err(PageError::Session(format!(
                    "{e}; is chromedriver running and compatible with the installed Chrome?"
                )))
            }
            Err(_) => {
                return Err(PageError::Session(format!(
                    "no session from {} within {SESSION_START_TIMEOUT:?}",
                    self.webdriver_url
                )))
            }
        };

        tracing::info!("Chrome session started");
        Ok(Box::new(WebDriverPage { client }))
    }
}

struct WebDriverPage {
    client: Client,
}

fn command_error(e: CmdError) -> PageError {
    PageError::Command(e.to_string())
}

fn page_load_timeout(after: Duration) -> PageError {
    PageError::Timeout {
        what: "page load".to_string(),
        after,
    }
}

#[async_trait]
impl ReportPage for WebDriverPage {
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), PageError> {
        let bound = timeout.saturating_add(NAVIGATION_GRACE);
        match tokio::time::timeout(bound, self.client.goto(url)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(CmdError::Standard(ref e))) if matches!(e.error, ErrorStatus::Timeout) => {
                Err(page_load_timeout(timeout))
            }
            Ok(Err(e)) => Err(command_error(e)),
            Err(_) => Err(page_load_timeout(timeout)),
        }
    }

    async fn wait_for(&mut self, name: &str, timeout: Duration) -> Result<(), PageError> {
        let css = by_name(name);
        match self
            .client
            .wait()
            .at_most(timeout)
            .for_element(Locator::Css(&css))
            .await
        {
            Ok(_) => Ok(()),
            Err(CmdError::WaitTimeout) => Err(PageError::Timeout {
                what: name.to_string(),
                after: timeout,
            }),
            Err(e) => Err(command_error(e)),
        }
    }

    async fn fill(&mut self, name: &str, value: &str) -> Result<(), PageError> {
        let css = by_name(name);
        let field = self
            .client
            .find(Locator::Css(&css))
            .await
            .map_err(command_error)?;
        field.clear().await.map_err(command_error)?;
        field.send_keys(value).await.map_err(command_error)
    }

    async fn click(&mut self, name: &str) -> Result<(), PageError> {
        let css = by_name(name);
        self.client
            .find(Locator::Css(&css))
            .await
            .map_err(command_error)?
            .click()
            .await
            .map_err(command_error)
    }

    async fn close(&mut self) -> Result<(), PageError> {
        match tokio::time::timeout(TEARDOWN_TIMEOUT, self.client.clone().close()).await {
            Ok(result) => result.map_err(command_error),
            Err(_) => Err(PageError::Timeout {
                what: "session teardown".to_string(),
                after: TEARDOWN_TIMEOUT,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn launcher(page_load_timeout: Duration) -> WebDriverLauncher {
        WebDriverLauncher::new(&BrowserConfig {
            webdriver_url: "http://localhost:9515".into(),
            page_load_timeout,
            element_wait_timeout: Duration::from_secs(10),
            settle_delay: Duration::from_secs(2),
            post_submit_wait: Duration::from_secs(5),
        })
    }

    #[test]
    fn chrome_runs_headless_with_a_fixed_viewport() {
        let caps = launcher(Duration::from_secs(30)).capabilities();
        let args = caps["goog:chromeOptions"]["args"].as_array().unwrap();
        let args: Vec<&str> = args.iter().filter_map(|a| a.as_str()).collect();
        assert!(args.contains(&"--headless"));
        assert!(args.contains(&"--no-sandbox"));
        assert!(args.contains(&"--disable-dev-shm-usage"));
        assert!(args.contains(&"--window-size=1920,1080"));
    }

    #[test]
    fn session_carries_the_page_load_timeout() {
        let caps = launcher(Duration::from_secs(45)).capabilities();
        assert_eq!(caps["timeouts"]["pageLoad"], 45_000);

        let caps = launcher(Duration::MAX).capabilities();
        assert_eq!(caps["timeouts"]["pageLoad"], u64::MAX);
    }
}
