//! Application-level orchestration.
//!
//! This module owns the run lifecycle (token, launch, form, cleanup), Ctrl-C
//! observation and the closing summary. `cli` builds the collaborators and
//! calls into here.

mod controller;
mod interrupt;
mod summary;

pub(crate) use controller::Orchestrator;
pub(crate) use interrupt::Interrupt;
pub(crate) use summary::{log_banner, log_run_summary};
