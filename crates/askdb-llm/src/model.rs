//! Language-model trait and chat message types

use askdb_core::QueryOutput;
use serde::{Deserialize, Serialize};

/// Message role in a chat-style prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Errors from a language-model backend.
///
/// Any of these is fatal to the pipeline run that hit it; there is no
/// retry or fallback at this layer.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ModelError {
    #[error("Backend unreachable: {0}")]
    Unreachable(String),

    #[error("Backend rejected the request: {0}")]
    Api(String),

    #[error("Output did not conform to the requested shape: {0}")]
    NonConforming(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Trait for language-model backends.
///
/// `complete` is plain completion: the prompt goes out, raw text comes
/// back. `generate_query` is structured mode: the backend must produce a
/// value conforming to [`QueryOutput`]; anything else is a
/// [`ModelError::NonConforming`] failure, never a best-effort parse.
#[async_trait::async_trait]
pub trait LanguageModel: Send + Sync {
    /// Backend name for logs (e.g. "openai", "mock")
    fn name(&self) -> &'static str;

    /// Free-text completion
    async fn complete(&self, messages: &[Message]) -> Result<String, ModelError>;

    /// Structured SQL generation
    async fn generate_query(&self, messages: &[Message]) -> Result<QueryOutput, ModelError>;
}
