//! Tracing subscriber setup for binaries and tests that use the SDK
//!
//! The library crates only emit events; installing a subscriber is left to
//! the application. `RUST_LOG` wins over the level passed in.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Install a global fmt subscriber; errors if one is already installed
pub fn init_tracing(default_level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| anyhow::anyhow!(e))
}
