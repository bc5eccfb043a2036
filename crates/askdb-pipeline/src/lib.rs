//! AskDB Pipeline
//!
//! The three-stage question-answering pipeline: generate a SQL query from
//! the question and live schema, execute it, and phrase the result as a
//! natural-language answer. Stages run strictly in order over one shared
//! state and each emits the update it contributed.

pub mod error;
pub mod runner;
pub mod stages;

pub use error::PipelineError;
pub use runner::{Pipeline, PipelineRun, Stage};
pub use stages::{execute_query, generate_answer, write_query};
