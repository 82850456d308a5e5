//! # Telemetry
//!
//! Structured logging setup shared by binaries embedding the engine.

use tracing_subscriber::EnvFilter;

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages everywhere
/// - `RUST_LOG=crewpay=trace` - Show trace for crewpay crates only
/// - Default: INFO, with crewpay crates at DEBUG and sqlx at WARN
///
/// Call once at process startup; a second call panics (the global
/// subscriber can only be set once).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,crewpay=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
