//! Tracing setup.
//!
//! LOG_LEVEL carries an EnvFilter directive string ("debug", or full
//! directives); LOG_FORMAT flips between human-readable and JSON output.
//!
//! The `mission` target carries gameplay events (selections, answers,
//! completions, resets); `cybered_backend` carries process-level events.
//! Both default to debug so an unconfigured run is already useful.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,mission=debug,cybered_backend=debug,tower_http=info,axum=info";

pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
