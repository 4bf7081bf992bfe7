use std::sync::Once;

use tracing_subscriber::EnvFilter;

/// Filter used when neither `RUST_LOG` nor an explicit filter is given.
pub const DEFAULT_FILTER: &str = "info,sprig_dom=info,sprig_ui=debug";

static INIT: Once = Once::new();

/// Install the global fmt subscriber, honoring `RUST_LOG`.
///
/// Only the first call installs a subscriber; later calls are ignored.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    install(filter);
}

/// Install the global fmt subscriber with explicit filter directives.
pub fn init_with_filter(directives: &str) {
    install(EnvFilter::new(directives));
}

fn install(filter: EnvFilter) {
    INIT.call_once(|| {
        if tracing_subscriber::fmt()
            .with_env_filter(filter)
            .try_init()
            .is_err()
        {
            tracing::debug!("A global tracing subscriber was already installed");
        }
    });
}
