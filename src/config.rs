//! Configuration with environment loading and validation

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Top-level configuration for a ledger session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    pub engine: EngineConfig,
    pub refresh: RefreshConfig,
    pub log_level: String,
}

/// Facade behavior: simulated latency and the per-operation timeout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Lower bound of the simulated transaction latency, in milliseconds.
    pub latency_min_ms: u64,
    /// Upper bound; zero disables the simulated latency entirely.
    pub latency_max_ms: u64,
    /// Budget for a single mutating operation, latency included.
    pub op_timeout_ms: u64,
}

/// Background refresh cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshConfig {
    pub interval_secs: u64,
}

impl LedgerConfig {
    /// Load configuration from `FELIX_*` environment variables, falling
    /// back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            engine: EngineConfig {
                latency_min_ms: env_u64("FELIX_LATENCY_MIN_MS", 500)?,
                latency_max_ms: env_u64("FELIX_LATENCY_MAX_MS", 1000)?,
                op_timeout_ms: env_u64("FELIX_OP_TIMEOUT_MS", 30_000)?,
            },
            refresh: RefreshConfig {
                interval_secs: env_u64("FELIX_REFRESH_INTERVAL_SECS", 15)?,
            },
            log_level: env::var("FELIX_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.engine.latency_max_ms > 0 && self.engine.latency_min_ms > self.engine.latency_max_ms
        {
            return Err(ConfigError::InvalidConfig(
                "latency_min_ms must not exceed latency_max_ms".to_string(),
            ));
        }
        if self.engine.op_timeout_ms == 0 {
            return Err(ConfigError::InvalidConfig(
                "op_timeout_ms must be positive".to_string(),
            ));
        }
        if self.refresh.interval_secs == 0 {
            return Err(ConfigError::InvalidConfig(
                "refresh interval_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            refresh: RefreshConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl EngineConfig {
    /// Latency bounds, or `None` when the simulated delay is disabled.
    pub fn latency_range(&self) -> Option<(u64, u64)> {
        if self.latency_max_ms == 0 {
            None
        } else {
            Some((self.latency_min_ms.min(self.latency_max_ms), self.latency_max_ms))
        }
    }

    /// Configuration for tests: no artificial delay, generous timeout.
    pub fn no_latency() -> Self {
        Self {
            latency_min_ms: 0,
            latency_max_ms: 0,
            op_timeout_ms: 30_000,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            latency_min_ms: 500,
            latency_max_ms: 1000,
            op_timeout_ms: 30_000,
        }
    }
}

impl RefreshConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self { interval_secs: 15 }
    }
}

fn env_u64(key: &str, default: u64) -> Result<u64, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| ConfigError::InvalidConfig(format!("{key} must be an integer, got {raw:?}"))),
        Err(_) => Ok(default),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        LedgerConfig::default().validate().unwrap();
    }

    #[test]
    fn inverted_latency_bounds_are_rejected() {
        let mut config = LedgerConfig::default();
        config.engine.latency_min_ms = 2000;
        config.engine.latency_max_ms = 1000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut config = LedgerConfig::default();
        config.engine.op_timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_latency_max_disables_delay() {
        assert_eq!(EngineConfig::no_latency().latency_range(), None);
        assert_eq!(
            EngineConfig::default().latency_range(),
            Some((500, 1000))
        );
    }
}
