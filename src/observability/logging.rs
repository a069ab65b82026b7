//! Structured logging.
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - Filter comes from `RUST_LOG` when set, otherwise from config

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the filter, letting the environment override the configured one.
pub fn env_filter(configured: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(configured))
}

/// Install the global subscriber. Returns false if one was already set.
pub fn init_logging(configured: &str) -> bool {
    tracing_subscriber::registry()
        .with(env_filter(configured))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok()
}
