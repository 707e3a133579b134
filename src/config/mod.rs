//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `MHM_` prefix and nested values use underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use mhm_core::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod backend;
mod error;
mod purchases;

pub use backend::BackendConfig;
pub use error::{ConfigError, ValidationError};
pub use purchases::PurchasesConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Contains all configuration sections for the subscription core.
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Purchase-service configuration (platform key, product catalog)
    #[serde(default)]
    pub purchases: PurchasesConfig,

    /// Backend API configuration (subscription-status endpoint)
    #[serde(default)]
    pub backend: BackendConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `MHM` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `MHM__PURCHASES__PLATFORM_KEY=appl_xxx` -> `purchases.platform_key`
    /// - `MHM__BACKEND__BASE_URL=https://...` -> `backend.base_url`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::Environment::default().prefix("MHM").separator("__"))
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.purchases.validate()?;
        self.backend.validate()?;
        Ok(())
    }
}
