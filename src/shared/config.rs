use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::infra::github::DEFAULT_GRAPHQL_URL;

const APP_DIR: &str = "resolve-threads";

/// Top-level configuration for resolve-threads.
#[derive(Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// GitHub API connection settings.
    #[serde(default)]
    pub github: GitHubConfig,

    /// Conversation resolution settings.
    #[serde(default)]
    pub resolve: ResolveConfig,
}

/// GitHub API connection configuration.
#[derive(Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GitHubConfig {
    /// GraphQL endpoint (default: "https://api.github.com/graphql").
    /// Set this for GitHub Enterprise Server, e.g. "https://ghe.example.com/api/graphql".
    #[serde(default = "default_api_url")]
    #[schemars(default = "default_api_url")]
    pub api_url: String,

    /// Per-request timeout in seconds (default: 30).
    #[serde(default = "default_timeout_secs")]
    #[schemars(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Conversation resolution configuration.
#[derive(Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ResolveConfig {
    /// Pause between resolve mutations in milliseconds (default: 100).
    #[serde(default = "default_delay_ms")]
    #[schemars(default = "default_delay_ms")]
    pub delay_ms: u64,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
        }
    }
}

fn default_api_url() -> String {
    DEFAULT_GRAPHQL_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_delay_ms() -> u64 {
    100
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read config file (permission error, etc.)
    #[error("Failed to read config file {path}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// YAML parse error
    #[error("Invalid config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },
}

/// Returns the XDG config directory (~/.config or $XDG_CONFIG_HOME).
/// Empty values are treated as unset per XDG Base Directory Specification.
fn config_dir() -> Option<PathBuf> {
    let non_empty = |key: &str| std::env::var(key).ok().filter(|v| !v.is_empty());
    if let Some(xdg) = non_empty("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg));
    }
    non_empty("HOME").map(|home| PathBuf::from(home).join(".config"))
}

/// Load configuration from ~/.config/resolve-threads/config.ya?ml.
/// Returns Config::default() if no config file exists.
pub fn load_config() -> Result<Config, ConfigError> {
    let Some(dir) = config_dir() else {
        return Ok(Config::default());
    };
    load_config_from_dir(&dir.join(APP_DIR))
}

/// Load configuration from a specific directory.
/// Searches for config.yaml, then config.yml in the given directory.
/// Returns Config::default() if neither file exists.
pub fn load_config_from_dir(dir: &Path) -> Result<Config, ConfigError> {
    for filename in &["config.yaml", "config.yml"] {
        let path = dir.join(filename);
        match std::fs::read_to_string(&path) {
            Ok(content) => return parse_config(&content, &path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => return Err(ConfigError::ReadError { path, source: e }),
        }
    }

    Ok(Config::default())
}

fn parse_config(content: &str, path: &Path) -> Result<Config, ConfigError> {
    serde_yaml::from_str(content).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Generate JSON Schema for the Config struct.
pub fn generate_schema() -> schemars::Schema {
    schemars::schema_for!(Config)
}
