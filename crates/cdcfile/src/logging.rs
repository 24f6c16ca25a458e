//! Logging setup for the gateway and CLI.
//!
//! Output goes to stderr so `cdcfile get --out -` can stream file bytes on
//! stdout. `RUST_LOG` overrides the default directive.

use std::io;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub const DEFAULT_DIRECTIVE: &str = "info";

/// Install the global subscriber.
///
/// Fails only if a subscriber was already installed.
pub fn init_logging(default_directive: &str) -> Result<(), tracing_subscriber::util::TryInitError> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(io::stderr).with_target(false);

    tracing_subscriber::registry().with(env_filter).with(stderr_layer).try_init()
}
