//! Tracing subscriber initialization.
//!
//! Call one of these once at startup, before constructing the [`App`](crate::App).
//! The level is controlled by `RUST_LOG`:
//!
//! ```bash
//! RUST_LOG=leadgate_core=debug,tower_http=debug,sqlx=warn cargo run
//! ```

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging with sensible defaults (`info` unless `RUST_LOG` is set).
///
/// # Panics
///
/// Panics if a global subscriber has already been installed.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Initialize JSON-formatted logging for log-aggregation systems.
///
/// # Panics
///
/// Panics if a global subscriber has already been installed.
pub fn init_logging_json() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().json())
        .init();
}
