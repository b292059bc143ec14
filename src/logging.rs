use crate::error::{GraphError, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// Directive used when neither an explicit level nor `RUST_LOG` is set.
pub const DEFAULT_DIRECTIVE: &str = "falkordb_compact=info";

fn filter(level: Option<&str>) -> Result<EnvFilter> {
    match level {
        Some(directive) => EnvFilter::try_new(directive)
            .map_err(|e| GraphError::InvalidArgument(format!("Invalid log level: {e}"))),
        None => Ok(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))),
    }
}

/// Installs a global `fmt` subscriber.
///
/// `level` is an `EnvFilter` directive such as `falkordb_compact=trace`; pass
/// `None` to honour `RUST_LOG`, falling back to [`DEFAULT_DIRECTIVE`]. Cache
/// and decode events are emitted at `trace`, refreshes and commands at `debug`.
pub fn init_logging(level: Option<&str>) -> Result<()> {
    fmt()
        .with_env_filter(filter(level)?)
        .with_target(true)
        .with_thread_ids(true)
        .try_init()
        .map_err(|_| GraphError::InvalidArgument("Logging already initialized".into()))
}
