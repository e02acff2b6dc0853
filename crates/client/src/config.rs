//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//! - `MID_SHOP_API_URL` - Base URL of the REST API (default: `http://localhost:8080/api`)
//! - `MID_SHOP_LOGIN_PATH` - Login entry point navigated to after a 401 (default: `/login`)
//! - `MID_SHOP_STATE_DIR` - Directory holding the persisted session
//!   (default: the platform's local data directory + `mid-shop`)
//! - `MID_SHOP_CATALOG_CACHE_TTL_SECS` - Catalog cache lifetime, 0 disables it (default: 300)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "http://localhost:8080/api";
const DEFAULT_LOGIN_PATH: &str = "/login";
const DEFAULT_CATALOG_CACHE_TTL_SECS: u64 = 300;
const STATE_DIR_NAME: &str = "mid-shop";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL every endpoint path is appended to (e.g. `https://shop.example.com/api`)
    pub api_base_url: Url,
    /// Path handed to the navigator when the session is torn down
    pub login_path: String,
    /// Directory of the persisted session file
    pub state_dir: PathBuf,
    /// Lifetime of cached catalog responses (`Duration::ZERO` disables caching)
    pub catalog_cache_ttl: Duration,
}

impl ClientConfig {
    /// Configuration pointing at `api_base_url` with every other setting at its default.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `api_base_url` is not an absolute
    /// http(s) URL.
    pub fn new(api_base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_base_url: parse_base_url("MID_SHOP_API_URL", api_base_url)?,
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            state_dir: default_state_dir(),
            catalog_cache_ttl: Duration::from_secs(DEFAULT_CATALOG_CACHE_TTL_SECS),
        })
    }

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

        let api_base_url = parse_base_url(
            "MID_SHOP_API_URL",
            &get_env_or_default("MID_SHOP_API_URL", DEFAULT_API_URL),
        )?;
        let login_path = get_env_or_default("MID_SHOP_LOGIN_PATH", DEFAULT_LOGIN_PATH);
        let state_dir = get_optional_env("MID_SHOP_STATE_DIR")
            .map_or_else(default_state_dir, PathBuf::from);
        let catalog_cache_ttl = get_env_or_default(
            "MID_SHOP_CATALOG_CACHE_TTL_SECS",
            &DEFAULT_CATALOG_CACHE_TTL_SECS.to_string(),
        )
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| {
            ConfigError::InvalidEnvVar("MID_SHOP_CATALOG_CACHE_TTL_SECS".to_string(), e.to_string())
        })?;

        Ok(Self {
            api_base_url,
            login_path,
            state_dir,
            catalog_cache_ttl,
        })
    }

    /// Override the persistence directory.
    #[must_use]
    pub fn with_state_dir(mut self, state_dir: impl Into<PathBuf>) -> Self {
        self.state_dir = state_dir.into();
        self
    }

    /// Override the catalog cache lifetime.
    #[must_use]
    pub const fn with_catalog_cache_ttl(mut self, ttl: Duration) -> Self {
        self.catalog_cache_ttl = ttl;
        self
    }

    /// Path of the persisted session file inside `state_dir`.
    #[must_use]
    pub fn session_file(&self) -> PathBuf {
        self.state_dir.join("session.json")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
#[must_use]
pub fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse the API base URL, making sure it ends with `/` so endpoint paths join under it.
fn parse_base_url(var_name: &str, value: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(value.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;

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

fn default_state_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(STATE_DIR_NAME)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let url = parse_base_url("TEST_URL", "http://localhost:8080/api").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/");
        assert_eq!(
            url.join("cart/items").unwrap().as_str(),
            "http://localhost:8080/api/cart/items"
        );
    }

    #[test]
    fn test_base_url_rejects_other_schemes() {
        let err = parse_base_url("TEST_URL", "ftp://example.com/api").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_base_url_rejects_garbage() {
        assert!(parse_base_url("TEST_URL", "not a url").is_err());
    }

    #[test]
    fn test_new_uses_defaults() {
        let config = ClientConfig::new("https://shop.example.com/api/").unwrap();
        assert_eq!(config.login_path, "/login");
        assert_eq!(config.catalog_cache_ttl, Duration::from_secs(300));
        assert!(config.session_file().ends_with("mid-shop/session.json"));
    }

    #[test]
    fn test_with_state_dir() {
        let config = ClientConfig::new("http://localhost/api")
            .unwrap()
            .with_state_dir("/tmp/mid-shop-test");
        assert_eq!(
            config.session_file(),
            PathBuf::from("/tmp/mid-shop-test/session.json")
        );
    }
}
