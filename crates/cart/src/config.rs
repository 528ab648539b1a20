//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `CART_STORAGE_DIR` - Directory for the file-backed store (default: .cartkeep)
//! - `CART_STORAGE_KEY` - Key the cart snapshot is stored under (default: cart)
//! - `CART_API_BASE_URL` - Catalog API base URL (default: <http://10.0.2.2:3333>,
//!   the Android emulator alias for the host machine's localhost)

use std::path::PathBuf;

use thiserror::Error;
use url::Url;

use crate::storage::validate_key;

/// Storage key used for the cart snapshot unless overridden.
pub const DEFAULT_STORAGE_KEY: &str = "cart";
/// Directory used by the file-backed store unless overridden.
pub const DEFAULT_STORAGE_DIR: &str = ".cartkeep";
/// Catalog API base URL unless overridden.
pub const DEFAULT_API_BASE_URL: &str = "http://10.0.2.2:3333";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart application configuration.
#[derive(Debug, Clone)]
pub struct CartConfig {
    /// Where and under which key the cart is persisted
    pub storage: StorageConfig,
    /// Catalog HTTP API configuration
    pub api: ApiConfig,
}

/// Persistence configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Directory for the file-backed store
    pub dir: PathBuf,
    /// Key the cart snapshot is stored under
    pub key: String,
}

/// Catalog API configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL, always ending in `/` so relative paths join beneath it
    pub base_url: Url,
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            storage: StorageConfig::from_env()?,
            api: ApiConfig::from_env()?,
        })
    }
}

impl StorageConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let dir = PathBuf::from(get_env_or_default("CART_STORAGE_DIR", DEFAULT_STORAGE_DIR));
        let key = get_env_or_default("CART_STORAGE_KEY", DEFAULT_STORAGE_KEY);
        validate_storage_key(&key, "CART_STORAGE_KEY")?;
        Ok(Self { dir, key })
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}

impl ApiConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let raw = get_env_or_default("CART_API_BASE_URL", DEFAULT_API_BASE_URL);
        Ok(Self {
            base_url: parse_base_url(&raw, "CART_API_BASE_URL")?,
        })
    }

    /// Build a configuration from a base URL string.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the URL does not parse or is
    /// not http(s).
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url(base_url, "base_url")?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Storage keys double as file names for the file-backed store.
fn validate_storage_key(key: &str, var_name: &str) -> Result<(), ConfigError> {
    validate_key(key).map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))
}

/// Parse a base URL, requiring http(s) and normalizing to a trailing slash.
fn parse_base_url(raw: &str, var_name: &str) -> Result<Url, ConfigError> {
    let mut url =
        Url::parse(raw).map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
