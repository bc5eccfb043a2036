//! Pipeline error taxonomy
//!
//! Model errors halt the run at the stage that hit them. Query execution
//! failure is deliberately absent here: it is captured as result text and
//! threaded forward, not raised.

use askdb_core::StateError;
use askdb_llm::ModelError;
use askdb_store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Rejected before pipeline entry
    #[error("Question must not be empty")]
    EmptyQuestion,

    /// The store produced no schema text to ground the prompt with
    #[error("Schema description is empty; refusing to generate ungrounded SQL")]
    EmptySchema,

    /// Language-model backend failure (either call); fatal, no retry
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Schema introspection failure (not query execution)
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Shared-state contract violation
    #[error(transparent)]
    State(#[from] StateError),
}
