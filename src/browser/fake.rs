//! Scripted browser doubles that record every command they receive.

use super::{BrowserLauncher, ReportPage};
use crate::error::PageError;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct PageScript {
    pub navigate_times_out: bool,
    pub wait_times_out: bool,
    pub fail_fill: Option<&'static str>,
    pub panic_on_click: bool,
    pub close_fails: bool,
}

pub type Actions = Arc<Mutex<Vec<String>>>;

pub struct FakePage {
    script: PageScript,
    actions: Actions,
}

impl FakePage {
    pub fn new(script: PageScript) -> Self {
        Self {
            script,
            actions: Actions::default(),
        }
    }

    pub fn with_actions(script: PageScript, actions: Actions) -> Self {
        Self { script, actions }
    }

    pub fn actions(&self) -> Actions {
        self.actions.clone()
    }

    fn record(&self, action: String) {
        self.actions.lock().unwrap().push(action);
    }
}

#[async_trait]
impl ReportPage for FakePage {
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), PageError> {
        self.record(format!("navigate {url}"));
        if self.script.navigate_times_out {
            return Err(PageError::Timeout {
                what: "page load".into(),
                after: timeout,
            });
        }
        Ok(())
    }

    async fn wait_for(&mut self, name: &str, timeout: Duration) -> Result<(), PageError> {
        self.record(format!("wait {name}"));
        if self.script.wait_times_out {
            return Err(PageError::Timeout {
                what: name.to_string(),
                after: timeout,
            });
        }
        Ok(())
    }

    async fn fill(&mut self, name: &str, value: &str) -> Result<(), PageError> {
        if self.script.fail_fill == Some(name) {
            return Err(PageError::Command(format!("element {name} not interactable")));
        }
        self.record(format!("fill {name}={value}"));
        Ok(())
    }

    async fn click(&mut self, name: &str) -> Result<(), PageError> {
        if self.script.panic_on_click {
            panic!("click on {name} blew up");
        }
        self.record(format!("click {name}"));
        Ok(())
    }

    async fn close(&mut self) -> Result<(), PageError> {
        self.record("close".into());
        if self.script.close_fails {
            return Err(PageError::Command("session already gone".into()));
        }
        Ok(())
    }
}

/// Hands out [`FakePage`]s that share one action log.
#[derive(Default)]
pub struct FakeLauncher {
    pub script: PageScript,
    pub fail_open: bool,
    pub opened: AtomicUsize,
    pub actions: Actions,
}

impl FakeLauncher {
    pub fn new(script: PageScript) -> Self {
        Self {
            script,
            ..Default::default()
        }
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn actions(&self) -> Vec<String> {
        self.actions.lock().unwrap().clone()
    }
}

#[async_trait]
impl BrowserLauncher for FakeLauncher {
    async fn open(&self) -> Result<Box<dyn ReportPage>, PageError> {
        if self.fail_open {
            return Err(PageError::Session("chromedriver not reachable".into()));
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakePage::with_actions(
            self.script.clone(),
            self.actions.clone(),
        )))
    }
}
