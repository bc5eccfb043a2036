//! AskDB LLM
//!
//! Language-model access for the question-answering pipeline. A model is
//! invoked in one of two modes: plain completion (free text back) or
//! structured query generation (the backend must conform to the
//! `QueryOutput` shape or the call fails).

pub mod mock;
pub mod model;
#[cfg(feature = "openai")]
pub mod openai;

pub use mock::{MockModel, MockModelBuilder, RecordedCall};
pub use model::{LanguageModel, Message, ModelError, Role};

#[cfg(feature = "openai")]
pub use openai::OpenAiModel;
