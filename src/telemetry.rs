//! Logging setup and metric names.
//!
//! Metrics are emitted through the `metrics` facade; without an installed
//! recorder they are no-ops.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Visits committed through the ledger.
pub const VISITS_RECORDED_TOTAL: &str = "visits_recorded_total";
/// Visits whose ledger call failed (nothing was written).
pub const VISITS_FAILED_TOTAL: &str = "visits_failed_total";
/// Visits never handed to the ledger (asynchronous mode only), labelled by `reason`.
pub const VISITS_DROPPED_TOTAL: &str = "visits_dropped_total";

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` style directives come from [`Config::log_level`]; output is
/// plain text or JSON lines per [`Config::log_format`].
///
/// # Errors
///
/// Returns an error if the filter cannot be parsed or a subscriber is
/// already installed.
pub fn init_tracing(config: &Config) -> Result<()> {
    let filter = EnvFilter::try_new(&config.log_level)?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if config.log_format == "json" {
        builder
            .json()
            .try_init()
            .map_err(|e| anyhow::anyhow!(e))?;
    } else {
        builder.try_init().map_err(|e| anyhow::anyhow!(e))?;
    }

    Ok(())
}
