//! Application configuration module
//!
//! Configuration is read from environment variables (and a `.env` file when
//! present) with the `SAILING_CLUB` prefix. Nested values are separated by a
//! double underscore.
//!
//! # Example
//!
//! ```no_run
//! use sailing_club::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Membership fee: {}", config.club.membership_fee());
//! ```

mod club;
mod database;
mod error;
mod logging;

pub use club::ClubConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use logging::{Environment, LogFormat, LoggingConfig};

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// PostgreSQL connection
    pub database: DatabaseConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Membership fee and currency
    #[serde(default)]
    pub club: ClubConfig,
}

impl AppConfig {
    /// Load configuration from the environment.
    ///
    /// - `SAILING_CLUB__DATABASE__URL=...` -> `database.url`
    /// - `SAILING_CLUB__LOGGING__FORMAT=json` -> `logging.format`
    /// - `SAILING_CLUB__CLUB__MEMBERSHIP_FEE_CENTS=15000` -> `club.membership_fee_cents`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or a value
    /// cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("SAILING_CLUB")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.database.validate()?;
        self.logging.validate()?;
        self.club.validate()?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.logging.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Money;
    use std::env;
    use std::sync::Mutex;

    // Env vars are process-global
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "SAILING_CLUB__DATABASE__URL",
        "SAILING_CLUB__DATABASE__MAX_CONNECTIONS",
        "SAILING_CLUB__LOGGING__ENVIRONMENT",
        "SAILING_CLUB__CLUB__MEMBERSHIP_FEE_CENTS",
        "SAILING_CLUB__CLUB__CURRENCY",
    ];

    fn set_minimal_env() {
        env::set_var("SAILING_CLUB__DATABASE__URL", "postgresql://club@localhost/club");
    }

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn loads_with_only_a_database_url() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.expect("config should load");
        assert_eq!(config.database.url, "postgresql://club@localhost/club");
        assert_eq!(config.club.membership_fee(), Money::from_units(130));
        assert_eq!(config.club.currency, "EUR");
        assert!(!config.is_production());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn nested_overrides_are_applied() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("SAILING_CLUB__DATABASE__MAX_CONNECTIONS", "4");
        env::set_var("SAILING_CLUB__LOGGING__ENVIRONMENT", "production");
        env::set_var("SAILING_CLUB__CLUB__MEMBERSHIP_FEE_CENTS", "15000");
        let result = AppConfig::load();
        clear_env();

        let config = result.expect("config should load");
        assert_eq!(config.database.max_connections, 4);
        assert!(config.is_production());
        assert_eq!(config.logging.effective_format(), LogFormat::Json);
        assert_eq!(config.club.membership_fee(), Money::from_units(150));
    }

    #[test]
    fn invalid_currency_fails_validation() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("SAILING_CLUB__CLUB__CURRENCY", "euro");
        let result = AppConfig::load();
        clear_env();

        let config = result.expect("config should load");
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidCurrency(_))
        ));
    }
}
