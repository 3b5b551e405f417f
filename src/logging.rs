//! # Structured Logging Module
//!
//! Environment-aware structured logging for tracing dispatch chains and
//! background task execution.

use std::sync::OnceLock;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with an environment-driven filter.
///
/// Safe to call multiple times; only the first call installs a subscriber.
/// The filter is read from `RUST_LOG`, defaulting to `info` for this crate.
pub fn init_structured_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("idgov_core=info"));

        // Don't panic if a subscriber is already installed (tests, embedders).
        let _ = tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_level(true))
            .with(filter)
            .try_init();
    });
}
