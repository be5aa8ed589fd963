use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber: console always, plus `log_file` when set.
///
/// A log file that cannot be opened is reported once the console layer is
/// up; the run continues without it.
pub fn init(log_file: Option<&Path>) {
    let (file_layer, file_error) = match log_file {
        Some(path) => match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => (
                Some(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Arc::new(file)),
                ),
                None,
            ),
            Err(e) => (None, Some(e)),
        },
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rollcall_report=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    match (log_file, file_error) {
        (Some(path), Some(e)) => tracing::warn!(
            path = %path.display(),
            error = %e,
            "could not open log file; continuing with console only"
        ),
        (Some(path), None) => tracing::info!(path = %path.display(), "File logging enabled"),
        _ => {}
    }
}
