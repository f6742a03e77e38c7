//! Tracing subscriber setup for hosts embedding the wallet.

use proplay_types::constants;
use tracing_subscriber::EnvFilter;

/// Install a global `fmt` subscriber.
///
/// The filter comes from `RUST_LOG` and defaults to `info`. With `json`
/// set, events are emitted as one JSON object per line. Calling this more
/// than once is harmless: later calls leave the first subscriber in place
/// and return `false`.
pub fn init(json: bool) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);
    let installed = if json {
        builder.json().try_init().is_ok()
    } else {
        builder.try_init().is_ok()
    };
    if installed {
        tracing::info!(product = constants::PRODUCT_NAME, version = constants::VERSION, "Telemetry initialised");
    }
    installed
}
