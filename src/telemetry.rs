// src/telemetry.rs
// =============================================================================
// Logging setup.
//
// Every module logs through the `tracing` macros (info!, debug!, warn!...).
// Nothing is printed until a subscriber is installed, which is what
// init_telemetry() does once at startup.
//
// Log level:
// - RUST_LOG wins when it is set (e.g. RUST_LOG=site_scout=trace)
// - Otherwise our own crate logs at debug and dependencies at info
//
// Logs go to stderr. stdout is kept for results, so `--json` output can be
// piped straight into another tool.
//
// Rust concepts:
// - Layers: a subscriber is built by stacking a filter and a formatter
// - Extension traits: SubscriberExt adds .with(), SubscriberInitExt
//   adds .init(), they only work once imported
// =============================================================================

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Used when RUST_LOG is unset or can't be parsed
const DEFAULT_FILTER: &str = "info,site_scout=debug";

/// Installs the global subscriber. Call once, before any work starts.
pub fn init_telemetry() {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}


// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why can init() only run once?
//    - It sets the global default subscriber for the whole process
//    - A second call panics, so main() calls it exactly once
//
// 2. Why not println! for logs?
//    - println! writes to stdout and would mix with the results
//    - tracing adds levels, timestamps and fields like url = ... for free
// -----------------------------------------------------------------------------
