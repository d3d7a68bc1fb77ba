//! Subscriber setup for hosts that don't install their own

use serde::{Deserialize, Serialize};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Install a subscriber at all
    pub enabled: bool,
    /// `EnvFilter` directives used when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            filter: "info".to_owned(),
        }
    }
}

/// Install a fmt subscriber
///
/// `RUST_LOG` takes precedence over `config.filter`. Returns whether this
/// call installed the subscriber; later calls, or a host that already set
/// one, leave the existing subscriber alone.
pub fn init(config: &LoggingConfig) -> bool {
    if !config.enabled {
        return false;
    }
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_installs_nothing() {
        let config = LoggingConfig {
            enabled: false,
            ..LoggingConfig::default()
        };
        assert!(!init(&config));
    }

    #[test]
    fn second_init_is_noop() {
        let config = LoggingConfig::default();
        let _ = init(&config);
        assert!(!init(&config));
    }
}
