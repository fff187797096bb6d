//! Logging setup.
//!
//! All crate logging goes through `tracing`. The host process installs a
//! subscriber once at startup; `RUST_LOG` takes precedence over the default
//! filter passed here.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

/// Default filter used when neither the caller nor `RUST_LOG` provides one.
pub const DEFAULT_FILTER: &str = "trellis_lib=info";

/// Installs the global `tracing` subscriber.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init(default_filter: Option<&str>) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter.unwrap_or(DEFAULT_FILTER)))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_span_events(FmtSpan::NONE)
        .try_init()
}
