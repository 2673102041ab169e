//! Tracing setup.

use tracing_subscriber::EnvFilter;

use crate::{
    config::{LogFormat, ServiceConfig},
    error::{Error, Result},
};

/// Installs the global tracing subscriber.
///
/// An unparsable `log_level` falls back to `info`. Fails if a subscriber is
/// already installed.
pub fn init_tracing(config: &ServiceConfig) -> Result<()> {
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match config.log_format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
    }
    .map_err(|e| Error::Telemetry(e.to_string()))?;

    tracing::info!("Tracing initialized for service: {}", config.name);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_initialization_is_reported() {
        let config = ServiceConfig {
            log_level: "not a [valid filter".to_string(),
            ..ServiceConfig::default()
        };

        // The first call may lose to another test's subscriber; the second always fails.
        let _ = init_tracing(&config);

        assert!(matches!(init_tracing(&config), Err(Error::Telemetry(_))));
    }
}
