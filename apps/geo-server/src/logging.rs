//! Process-wide `tracing` subscriber.
//!
//! Logs go to stderr so that `--print-config` and `import` output on stdout
//! stays machine-readable.

use anyhow::Result;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{LogFormat, LoggingConfig};

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
///
/// # Errors
/// Fails when a global subscriber is already installed.
pub fn init_logging(cfg: &LoggingConfig) -> Result<()> {
    let registry = tracing_subscriber::registry().with(env_filter(cfg));

    match cfg.format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()?,
        LogFormat::Text => registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()?,
    }
    Ok(())
}

fn env_filter(cfg: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "geo_server={level},geo_catalog={level},tower_http={level},sea_orm=warn,sqlx=warn",
            level = cfg.level
        ))
    })
}
