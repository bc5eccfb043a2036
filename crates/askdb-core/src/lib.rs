//! AskDB Core
//!
//! Shared domain model for the question-answering pipeline:
//! pipeline state, stage updates, the structured query contract,
//! and runtime configuration.

pub mod config;
pub mod query_output;
pub mod state;

pub use config::{Config, ConfigError, DatabaseConfig, DatabaseKind, ModelConfig, ServerConfig};
pub use query_output::QueryOutput;
pub use state::{PipelineState, StageUpdate, StateError};
