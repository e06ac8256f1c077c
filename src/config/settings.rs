//! TOML-based configuration.
//!
//! Supports a config file (opengov.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [api]
//! base_url = "${OPENGOV_API_URL}"
//! timeout_seconds = 30
//!
//! [views]
//! storage_path = "$HOME/.local/share/opengov/views.db"
//! url_param = "view"
//! debounce_ms = 300
//! default_page_size = 100
//! disable_url_sync = false
//!
//! [query]
//! default_limit = 1000
//!
//! [[patterns]]
//! match = "prefix"
//! value = "DOT_"
//! render = "currency"
//! decimals = 0
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::patterns::{ColumnPatterns, PatternRule};
use crate::api::endpoint_url;
use crate::model::{QueryConfig, DEFAULT_QUERY_LIMIT};
use crate::view::{ViewOptions, DEFAULT_PAGE_SIZE, DEFAULT_URL_PARAM};

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Settings {
    /// Query backend.
    pub api: ApiSettings,

    /// View persistence and URL sync.
    pub views: ViewSettings,

    pub query: QuerySettings,

    /// Column rendering rules; the built-in rules apply when empty.
    pub patterns: Vec<PatternRule>,
}

/// Query backend settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Base URL (supports ${ENV_VAR} expansion).
    pub base_url: String,

    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3001".to_string(),
            timeout_seconds: 30,
        }
    }
}

impl ApiSettings {
    /// Get the base URL with environment variables expanded.
    pub fn resolved_base_url(&self) -> Result<String, SettingsError> {
        expand_env_vars(&self.base_url)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Full URL of a backend path such as [`crate::api::EXECUTE_PATH`].
    pub fn endpoint(&self, path: &str) -> Result<String, SettingsError> {
        Ok(endpoint_url(&self.resolved_base_url()?, path))
    }
}

/// View persistence settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ViewSettings {
    /// SQLite view store; `<data_dir>/opengov/views.db` when unset.
    pub storage_path: Option<String>,

    /// URL query parameter carrying the encoded view.
    pub url_param: String,

    /// Delay before a state change reaches the URL.
    pub debounce_ms: u64,

    pub default_page_size: usize,

    /// Suppress URL writes (pages with many tables).
    pub disable_url_sync: bool,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            storage_path: None,
            url_param: DEFAULT_URL_PARAM.to_string(),
            debounce_ms: 300,
            default_page_size: DEFAULT_PAGE_SIZE,
            disable_url_sync: false,
        }
    }
}

impl ViewSettings {
    /// Configured store path with environment variables expanded.
    pub fn resolved_storage_path(&self) -> Result<Option<PathBuf>, SettingsError> {
        self.storage_path
            .as_deref()
            .map(|p| expand_env_vars(p).map(PathBuf::from))
            .transpose()
    }

    /// Manager options for these settings, without default views.
    pub fn view_options(&self) -> ViewOptions {
        ViewOptions {
            url_param: self.url_param.clone(),
            debounce: Duration::from_millis(self.debounce_ms),
            default_page_size: self.default_page_size,
            disable_url_sync: self.disable_url_sync,
            default_views: Vec::new(),
        }
    }
}

/// Query building settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct QuerySettings {
    /// Row limit of new query configs.
    pub default_limit: u64,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_QUERY_LIMIT,
        }
    }
}

impl QuerySettings {
    /// An empty query against `source_table` with the configured limit.
    pub fn new_query(&self, source_table: &str) -> QueryConfig {
        QueryConfig::new(source_table).with_limit(self.default_limit)
    }

    /// Parse a query config; one without a `limit` gets the configured limit.
    pub fn parse_query_config(&self, json: &str) -> Result<QueryConfig, serde_json::Error> {
        let mut value: serde_json::Value = serde_json::from_str(json)?;
        if let Some(object) = value.as_object_mut() {
            object
                .entry("limit")
                .or_insert_with(|| self.default_limit.into());
        }
        serde_json::from_value(value)
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and check settings from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `OPENGOV_CONFIG`
    /// 2. `./opengov.toml`
    /// 3. `~/.config/opengov/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        // Check environment variable first
        if let Ok(path) = env::var("OPENGOV_CONFIG") {
            return Self::from_file(&path);
        }

        // Then the working directory
        let local_config = PathBuf::from("opengov.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        // Then the user config directory
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("opengov").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        // No config file: use defaults
        Ok(Settings::default())
    }

    /// Reject values no caller can work with.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.views.url_param.trim().is_empty() {
            return Err(SettingsError::InvalidConfig(
                "views.url_param must not be empty".into(),
            ));
        }
        if self.views.default_page_size == 0 {
            return Err(SettingsError::InvalidConfig(
                "views.default_page_size must be positive".into(),
            ));
        }
        if self.query.default_limit == 0 {
            return Err(SettingsError::InvalidConfig(
                "query.default_limit must be positive".into(),
            ));
        }
        if let Some(rule) = self.patterns.iter().find(|r| r.value.is_empty()) {
            return Err(SettingsError::InvalidConfig(format!(
                "pattern with render '{}' has an empty value",
                rule.render
            )));
        }
        Ok(())
    }

    /// Rendering registry for these settings.
    pub fn column_patterns(&self) -> ColumnPatterns {
        if self.patterns.is_empty() {
            ColumnPatterns::builtin()
        } else {
            ColumnPatterns::new(self.patterns.clone())
        }
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let mut var_name = String::new();
        if chars.peek() == Some(&'{') {
            chars.next();
            for ch in chars.by_ref() {
                if ch == '}' {
                    break;
                }
                var_name.push(ch);
            }
        } else {
            while let Some(ch) = chars.next_if(|ch| ch.is_alphanumeric() || *ch == '_') {
                var_name.push(ch);
            }
            if var_name.is_empty() {
                // lone $
                result.push('$');
                continue;
            }
        }

        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
