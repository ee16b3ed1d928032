//! Service configuration
//!
//! Defaults are overridden by `OCCUPANCY_*` environment variables, e.g.
//! `OCCUPANCY_STORE=memory` or `OCCUPANCY_LOCK_TIMEOUT_MS=250`. Database
//! settings live in [`common::database::DatabaseConfig`].

use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use std::time::Duration;

use crate::display::DisplayZone;

/// Which store backs the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

/// Occupancy service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Address the HTTP server binds to
    pub bind_address: String,
    pub store: StoreBackend,
    /// Upper bound on any single lock wait
    pub lock_timeout_ms: u64,
    /// UTC offset applied when rendering timestamps
    pub display_timezone: String,
    /// Provision the known buildings at startup
    pub seed_on_start: bool,
}

impl AppConfig {
    /// Load configuration from defaults and the environment
    pub fn load() -> Result<Self, ConfigError> {
        let config: AppConfig = Config::builder()
            .set_default("bind_address", "0.0.0.0:3002")?
            .set_default("store", "postgres")?
            .set_default("lock_timeout_ms", 5000_i64)?
            .set_default("display_timezone", "+00:00")?
            .set_default("seed_on_start", true)?
            .add_source(Environment::with_prefix("OCCUPANCY").try_parsing(true))
            .build()?
            .try_deserialize()?;

        if config.lock_timeout_ms == 0 {
            return Err(ConfigError::Message(
                "lock_timeout_ms must be greater than zero".to_string(),
            ));
        }
        config.display_zone()?;

        Ok(config)
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }

    pub fn display_zone(&self) -> Result<DisplayZone, ConfigError> {
        self.display_timezone.parse().map_err(ConfigError::Message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 5] = [
        "OCCUPANCY_BIND_ADDRESS",
        "OCCUPANCY_STORE",
        "OCCUPANCY_LOCK_TIMEOUT_MS",
        "OCCUPANCY_DISPLAY_TIMEZONE",
        "OCCUPANCY_SEED_ON_START",
    ];

    fn clear_env() {
        for var in VARS {
            unsafe {
                std::env::remove_var(var);
            }
        }
    }

    #[test]
    #[serial]
    fn test_app_config_defaults() {
        clear_env();

        let config = AppConfig::load().unwrap();
        assert_eq!(config.bind_address, "0.0.0.0:3002");
        assert_eq!(config.store, StoreBackend::Postgres);
        assert_eq!(config.lock_timeout(), Duration::from_millis(5000));
        assert_eq!(config.display_zone().unwrap(), DisplayZone::utc());
        assert!(config.seed_on_start);
    }

    #[test]
    #[serial]
    fn test_app_config_from_env() {
        clear_env();
        unsafe {
            std::env::set_var("OCCUPANCY_STORE", "memory");
            std::env::set_var("OCCUPANCY_LOCK_TIMEOUT_MS", "250");
            std::env::set_var("OCCUPANCY_DISPLAY_TIMEZONE", "+02:00");
            std::env::set_var("OCCUPANCY_SEED_ON_START", "false");
        }

        let config = AppConfig::load().unwrap();
        assert_eq!(config.store, StoreBackend::Memory);
        assert_eq!(config.lock_timeout(), Duration::from_millis(250));
        assert_eq!(config.display_zone().unwrap().to_string(), "+02:00");
        assert!(!config.seed_on_start);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_app_config_rejects_bad_timezone() {
        clear_env();
        unsafe {
            std::env::set_var("OCCUPANCY_DISPLAY_TIMEZONE", "Mars/Olympus");
        }

        assert!(AppConfig::load().is_err());

        clear_env();
    }
}
