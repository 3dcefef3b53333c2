//! Logging initialization.

use std::sync::Once;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Default filter directive, or the verbose one with `--verbose`.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "info" }
}

/// Install the global subscriber writing to stderr. `RUST_LOG` takes
/// precedence over `verbose`. Only the first call has an effect.
pub fn init_logging(verbose: bool) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(verbose).with_writer(std::io::stderr))
            .try_init();

        tracing::debug!(version = crate::VERSION, "Logging initialized");
    });
}
