//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (ONESYNC_*)
//! 2. TOML config file (if ONESYNC_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (ONESYNC_*)
/// 2. TOML config file (if ONESYNC_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite mirror database.
    ///
    /// Set via ONESYNC_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Directory holding cached resource files, one per resource id.
    ///
    /// Set via ONESYNC_CACHE_DIR environment variable.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// Base URL of the remote content API.
    #[serde(default = "default_graph_base_url")]
    pub graph_base_url: String,

    /// OAuth2 authorization endpoint.
    #[serde(default = "default_authorize_url")]
    pub authorize_url: String,

    /// OAuth2 token endpoint used for code and refresh-token grants.
    #[serde(default = "default_token_url")]
    pub token_url: String,

    /// OAuth2 client id.
    ///
    /// Set via ONESYNC_CLIENT_ID environment variable.
    #[serde(default)]
    pub client_id: Option<String>,

    /// OAuth2 client secret.
    ///
    /// Set via ONESYNC_CLIENT_SECRET environment variable.
    #[serde(default)]
    pub client_secret: Option<String>,

    /// Redirect URI registered for the authorization-code grant.
    #[serde(default)]
    pub redirect_uri: Option<String>,

    /// Scopes requested for both grants.
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,

    /// Notebook mirrored by the scheduled sync.
    ///
    /// Set via ONESYNC_NOTEBOOK_ID environment variable.
    #[serde(default)]
    pub notebook_id: Option<String>,

    /// Only this account may complete the authorization flow, when set.
    #[serde(default)]
    pub allowed_email: Option<String>,

    /// Sections whose display name starts with this prefix are never mirrored.
    #[serde(default = "default_reserved_section_prefix")]
    pub reserved_section_prefix: String,

    /// Pages requested per batch during page sync.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Upper bound on batches per section and run; 0 disables the cap.
    #[serde(default)]
    pub max_page_batches: u32,

    /// Interval between scheduled sync runs, in seconds.
    #[serde(default = "default_sync_interval_secs")]
    pub sync_interval_secs: u64,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via ONESYNC_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// User-Agent string for HTTP requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./onesync.sqlite")
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("./cache")
}

fn default_graph_base_url() -> String {
    "https://graph.microsoft.com".into()
}

fn default_authorize_url() -> String {
    "https://login.microsoftonline.com/consumers/oauth2/v2.0/authorize".into()
}

fn default_token_url() -> String {
    "https://login.microsoftonline.com/consumers/oauth2/v2.0/token".into()
}

fn default_scopes() -> Vec<String> {
    vec!["offline_access".into(), "user.read".into(), "notes.read".into()]
}

fn default_reserved_section_prefix() -> String {
    "_".into()
}

fn default_page_size() -> u32 {
    20
}

fn default_sync_interval_secs() -> u64 {
    3600
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_user_agent() -> String {
    "onesync/0.1".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            cache_dir: default_cache_dir(),
            graph_base_url: default_graph_base_url(),
            authorize_url: default_authorize_url(),
            token_url: default_token_url(),
            client_id: None,
            client_secret: None,
            redirect_uri: None,
            scopes: default_scopes(),
            notebook_id: None,
            allowed_email: None,
            reserved_section_prefix: default_reserved_section_prefix(),
            page_size: default_page_size(),
            max_page_batches: 0,
            sync_interval_secs: default_sync_interval_secs(),
            timeout_ms: default_timeout_ms(),
            user_agent: default_user_agent(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Scheduler period as Duration.
    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs)
    }

    /// Safety cap for the page loop, `None` when unbounded.
    pub fn page_batch_cap(&self) -> Option<u32> {
        (self.max_page_batches > 0).then_some(self.max_page_batches)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `ONESYNC_`
    /// 2. TOML file from `ONESYNC_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("ONESYNC_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("ONESYNC_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// OAuth2 client id, required once the token lifecycle is used.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the client id is not set.
    pub fn require_client_id(&self) -> Result<&str, ConfigError> {
        self.client_id.as_deref().ok_or_else(|| ConfigError::Missing {
            field: "client_id".into(),
            hint: "Set ONESYNC_CLIENT_ID environment variable".into(),
        })
    }

    /// Notebook to mirror, required by the scheduled sync.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the notebook id is not set or blank.
    pub fn require_notebook_id(&self) -> Result<&str, ConfigError> {
        self.notebook_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| ConfigError::Missing {
                field: "notebook_id".into(),
                hint: "Set ONESYNC_NOTEBOOK_ID environment variable".into(),
            })
    }
}
