//! Tracing initialization.
//!
//! Sets up tracing-subscriber with console output. The log level is taken from
//! `RUST_LOG` when set, falling back to `info`:
//!
//! ```bash
//! export RUST_LOG="robodex=debug,sqlx=warn"
//! ```

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Initialize the tracing subscriber for the process.
///
/// Fails if a global subscriber is already installed, so tests that want
/// logging use `test_log` instead of calling this.
pub fn init_telemetry() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;

    Ok(())
}
