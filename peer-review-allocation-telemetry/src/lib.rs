use tracing_subscriber::layer::SubscriberExt;
pub use tracing_subscriber::util::TryInitError;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

pub const DEFAULT_LOG_LEVEL: &str = "info,peer_review_allocation_engine=debug";

/// `RUST_LOG` wins over `default_filter`, which wins over [`DEFAULT_LOG_LEVEL`].
#[must_use]
pub fn env_filter(default_filter: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter.unwrap_or(DEFAULT_LOG_LEVEL)))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))
}

/// Installs the global subscriber. Fails if one is installed already.
pub fn setup_logging(default_filter: Option<&str>) -> Result<(), TryInitError> {
    let stdout_log = tracing_subscriber::fmt::layer().with_target(true);

    tracing_subscriber::registry()
        .with(stdout_log.with_filter(env_filter(default_filter)))
        .try_init()?;
    tracing::debug!("installed log subscriber");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_setup_fails() {
        let _ = setup_logging(Some("debug"));
        assert!(setup_logging(None).is_err());
    }
}
