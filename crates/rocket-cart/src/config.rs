//! # Cart Configuration
//!
//! Where the API lives, where the cart is stored, and how the store reacts
//! to corrupt state or concurrent commits.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     ROCKETSHOES_API_URL=http://localhost:3333                          │
//! │     ROCKETSHOES_DB_PATH=/tmp/rocketshoes.db                            │
//! │     ROCKETSHOES_STORAGE_KEY=@RocketShoes:cart                          │
//! │     ROCKETSHOES_ON_CORRUPT=fail                                        │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/rocketshoes-cart/rocket-cart.toml (Linux)                │
//! │     ~/Library/Application Support/com.rocketshoes.cart/... (macOS)     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [api]
//! base_url = "http://localhost:3333"
//! request_timeout_secs = 10
//!
//! [storage]
//! database_path = "/var/lib/rocketshoes/rocketshoes.db"
//! key = "@RocketShoes:cart"
//!
//! [store]
//! on_corrupt = "reset"   # reset | fail
//! max_conflict_retries = 3
//! ```

use rocket_core::DEFAULT_STORAGE_KEY;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{ConfigError, ConfigResult};

const CONFIG_FILE_NAME: &str = "rocket-cart.toml";
const DATABASE_FILE_NAME: &str = "rocketshoes.db";

// =============================================================================
// Corrupt State Policy
// =============================================================================

/// What the store does when the persisted cart cannot be parsed at startup.
///
/// ```text
/// RESET (Default)                      FAIL
/// ───────────────                      ────
/// • Log a warning                      • Opening the store errors with
/// • Start with an empty cart             CartError::CorruptState
/// • Next mutation overwrites the       • Stored value is left untouched
///   corrupt value                        for inspection
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorruptStatePolicy {
    #[default]
    Reset,
    Fail,
}

impl std::fmt::Display for CorruptStatePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CorruptStatePolicy::Reset => write!(f, "reset"),
            CorruptStatePolicy::Fail => write!(f, "fail"),
        }
    }
}

impl std::str::FromStr for CorruptStatePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reset" | "empty" => Ok(CorruptStatePolicy::Reset),
            "fail" | "error" => Ok(CorruptStatePolicy::Fail),
            other => Err(ConfigError::Invalid(format!(
                "Unknown corrupt-state policy: '{}'. Valid options: reset, fail",
                other
            ))),
        }
    }
}

// =============================================================================
// Sections
// =============================================================================

/// Storefront API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Root of the stock and product endpoints.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout. Absent means requests may wait indefinitely.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    "http://localhost:3333".to_string()
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: default_base_url(),
            request_timeout_secs: None,
        }
    }
}

/// Durable storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// SQLite file. Defaults to the platform data directory.
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Key the cart snapshot is stored under.
    #[serde(default = "default_storage_key")]
    pub key: String,
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            database_path: None,
            key: default_storage_key(),
        }
    }
}

/// Cart store behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Handling of an unparsable persisted cart.
    #[serde(default)]
    pub on_corrupt: CorruptStatePolicy,

    /// Re-plans allowed after losing a commit race.
    #[serde(default = "default_max_conflict_retries")]
    pub max_conflict_retries: u32,
}

fn default_max_conflict_retries() -> u32 {
    3
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            on_corrupt: CorruptStatePolicy::default(),
            max_conflict_retries: default_max_conflict_retries(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete cart configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CartConfig {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub store: StoreSettings,
}

impl CartConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (rocket-cart.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading cart config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        let url = Url::parse(&self.api.base_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", self.api.base_url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl(format!(
                "API URL must start with http:// or https://, got: {}",
                self.api.base_url
            )));
        }

        if self.storage.key.trim().is_empty() {
            return Err(ConfigError::Invalid("storage key must not be empty".into()));
        }

        if self.api.request_timeout_secs == Some(0) {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Applies overrides from any variable source.
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(url) = var("ROCKETSHOES_API_URL") {
            debug!(url = %url, "Overriding API URL from environment");
            self.api.base_url = url;
        }

        if let Some(path) = var("ROCKETSHOES_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.storage.database_path = Some(PathBuf::from(path));
        }

        if let Some(key) = var("ROCKETSHOES_STORAGE_KEY") {
            self.storage.key = key;
        }

        if let Some(policy) = var("ROCKETSHOES_ON_CORRUPT") {
            match policy.parse() {
                Ok(parsed) => self.store.on_corrupt = parsed,
                Err(_) => warn!(policy = %policy, "Unknown corrupt-state policy in environment"),
            }
        }
    }

    fn project_dirs() -> Option<directories::ProjectDirs> {
        directories::ProjectDirs::from("com", "rocketshoes", "cart")
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// The SQLite file to open: the configured path, else the platform data
    /// directory.
    pub fn database_path(&self) -> Option<PathBuf> {
        self.storage.database_path.clone().or_else(|| {
            Self::project_dirs().map(|dirs| dirs.data_dir().join(DATABASE_FILE_NAME))
        })
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.api.request_timeout_secs.map(Duration::from_secs)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
