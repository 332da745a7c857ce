//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `SLICE_HOUSE_DATA_DIR` - Directory for the persistent cart store
//!   (default: `.slice-house`)
//! - `SLICE_HOUSE_CART_KEY` - Storage key for the cart slot (default: `cart`)

use std::env;
use std::path::PathBuf;

use thiserror::Error;

const DEFAULT_DATA_DIR: &str = ".slice-house";
const DEFAULT_CART_KEY: &str = "cart";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Directory holding the persistent cart store
    pub data_dir: PathBuf,
    /// Storage key the cart is saved under
    pub cart_key: String,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a set variable has an unusable value
    /// (empty data dir or empty cart key).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let data_dir = optional_var("SLICE_HOUSE_DATA_DIR")?
            .map_or_else(|| PathBuf::from(DEFAULT_DATA_DIR), PathBuf::from);
        let cart_key =
            optional_var("SLICE_HOUSE_CART_KEY")?.unwrap_or_else(|| DEFAULT_CART_KEY.to_string());

        Ok(Self { data_dir, cart_key })
    }
}

/// Read an optional variable, rejecting set-but-empty values.
fn optional_var(name: &str) -> Result<Option<String>, ConfigError> {
    match env::var(name) {
        Ok(value) if value.trim().is_empty() => Err(ConfigError::InvalidEnvVar(
            name.to_string(),
            "must not be empty".to_string(),
        )),
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => Err(ConfigError::InvalidEnvVar(
            name.to_string(),
            "must be valid UTF-8".to_string(),
        )),
    }
}
