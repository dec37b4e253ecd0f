//! # Logging Setup
//!
//! Installs the `tracing` subscriber used by binaries embedding the client.
//!
//! ## Log Levels
//! - `RUST_LOG=debug` - Show debug messages
//! - `RUST_LOG=railtrack_client=trace` - Trace the client only
//! - Default: `info,railtrack=debug`
//!
//! Session tokens are never written to any log field.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,railtrack=debug";

/// Initializes the tracing subscriber for structured logging.
///
/// Safe to call more than once: a second call leaves the first subscriber in
/// place and returns false.
pub fn init_tracing() -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_ok()
}
