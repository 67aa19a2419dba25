//! Structured logging setup: one `tracing-subscriber` initializer shared by
//! every binary and test harness that wants consistent console output.

use tracing_error::ErrorLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Initialize the global tracing subscriber from `RUST_LOG` (default
/// `info`). Safe to call once per process; a second call is a no-op logged
/// at debug level rather than a panic, since test binaries may each try to
/// initialize it independently.
///
/// Layers in an `ErrorLayer` alongside the formatter so that `miette`
/// diagnostics raised from inside a span (scheduler, executor, provider
/// calls are all `#[instrument]`ed) can attach a `SpanTrace` showing which
/// run and node the error came from, not just the error message itself.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::registry().with(filter).with(tracing_subscriber::fmt::layer()).with(ErrorLayer::default());
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::debug!("global tracing subscriber already set");
    }
}
