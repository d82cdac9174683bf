//! Development-time tracing for debugging sessions.
//!
//! - **Tracing (this module)**: Dev diagnostics via `RUST_LOG`, output to stderr.
//!   Not persisted.
//! - **Trial logging (`io/trial_log`)**: The session record in
//!   `.session/trials.json`, unaffected by `RUST_LOG`.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset.
fn default_directive(verbose: bool) -> &'static str {
    if verbose { "session=debug" } else { "warn" }
}

/// Install the stderr tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `verbose` selects between debug output
/// for this crate and warnings only.
///
/// ```bash
/// RUST_LOG=session=trace session gate --config .session/config.toml
/// ```
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact().with_target(false))
        .init();
}
