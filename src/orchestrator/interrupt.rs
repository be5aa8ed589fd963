//! Ctrl-C handling.
//!
//! The signal only raises a flag. In-flight HTTP and browser calls run to
//! completion; the controller checks the flag between steps and takes the
//! normal cleanup path.

use crate::error::RunError;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

#[derive(Debug, Clone, Default)]
pub(crate) struct Interrupt {
    raised: Arc<AtomicBool>,
}

impl Interrupt {
    /// Spawn a listener that raises the flag on the first Ctrl-C.
    pub(crate) fn listen() -> Self {
        let interrupt = Self::default();
        let raised = interrupt.raised.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupted; finishing the current step before cleanup");
                raised.store(true, Ordering::Relaxed);
            }
        });
        interrupt
    }

    #[cfg(test)]
    pub(crate) fn raise(&self) {
        self.raised.store(true, Ordering::Relaxed);
    }

    pub(crate) fn is_raised(&self) -> bool {
        self.raised.load(Ordering::Relaxed)
    }

    /// Fail with [`RunError::Interrupted`] if the flag is up.
    pub(crate) fn check(&self, next_step: &'static str) -> Result<(), RunError> {
        if self.is_raised() {
            Err(RunError::Interrupted(next_step))
        } else {
            Ok(())
        }
    }
}
