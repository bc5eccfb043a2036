//! Runtime configuration (askdb.toml)
//!
//! All process-wide settings live in one explicit `Config` constructed at
//! startup and passed by reference into component constructors. The model
//! API key is deliberately kept out of the TOML file and sourced from the
//! environment (optionally via a `.env` file).

use serde::{Deserialize, Serialize};

/// Environment variable holding the model API key
pub const API_KEY_ENV: &str = "ASKDB_API_KEY";

const DEFAULT_ROW_LIMIT: usize = 10;

/// Which database backend to connect to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseKind {
    /// SQLite file (or `:memory:`)
    Sqlite,

    /// PostgreSQL connection string
    Postgres,
}

impl Default for DatabaseKind {
    fn default() -> Self {
        Self::Sqlite
    }
}

/// Database connection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Backend type
    #[serde(rename = "type", default)]
    pub kind: DatabaseKind,

    /// File path (sqlite) or connection string (postgres)
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            kind: DatabaseKind::Sqlite,
            url: "askdb.db".to_string(),
        }
    }
}

/// Language-model backend configuration
///
/// The API key is not part of this struct; see [`Config::api_key`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Base URL of an OpenAI-compatible chat-completions API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model identifier sent with each request
    #[serde(default = "default_model")]
    pub model: String,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP server binds to
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

fn default_listen_addr() -> String {
    "0.0.0.0:3000".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Maximum rows the generated query should return unless the user asks
    /// for a specific count (prompt-level directive, not enforced)
    #[serde(default = "default_row_limit")]
    pub row_limit: usize,

    /// Database connection
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Language-model backend
    #[serde(default)]
    pub model: ModelConfig,

    /// HTTP server
    #[serde(default)]
    pub server: ServerConfig,
}

fn default_row_limit() -> usize {
    DEFAULT_ROW_LIMIT
}

impl Default for Config {
    fn default() -> Self {
        Self {
            row_limit: DEFAULT_ROW_LIMIT,
            database: DatabaseConfig::default(),
            model: ModelConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_toml(&contents)
    }

    /// Load config from a TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Resolve the model API key from the environment.
    ///
    /// Reads `.env` first so a checked-out project can keep the key out of
    /// the shell profile. The key never lives in askdb.toml.
    pub fn api_key(&self) -> Result<String, ConfigError> {
        dotenvy::dotenv().ok();
        match std::env::var(API_KEY_ENV) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(ConfigError::MissingApiKey),
        }
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Model API key not set (expected {API_KEY_ENV} in the environment or .env)")]
    MissingApiKey,
}
