//! Mock language model for testing
//!
//! Returns canned completions and structured queries without any network
//! call, records every invocation so tests can assert on prompt content,
//! and can simulate backend failures and structured-output conformance
//! failures deterministically.
//!
//! ```rust,ignore
//! let model = MockModel::builder()
//!     .with_query("SELECT COUNT(EmployeeId) FROM Employee")
//!     .with_answer("There are 8 employees.")
//!     .build();
//! ```

use crate::model::{LanguageModel, Message, ModelError};
use askdb_core::QueryOutput;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Invocation mode recorded for each call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    /// `complete` with the full message list
    Completion(Vec<Message>),

    /// `generate_query` with the full message list
    Structured(Vec<Message>),
}

impl RecordedCall {
    /// All prompt text of the call, joined, for content assertions
    pub fn prompt_text(&self) -> String {
        let messages = match self {
            Self::Completion(m) | Self::Structured(m) => m,
        };
        messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// In-memory language-model double
pub struct MockModel {
    query: String,
    answer: String,
    structured_failure: Option<String>,
    completion_failure: Option<String>,
    calls: Arc<RwLock<Vec<RecordedCall>>>,
}

impl MockModel {
    pub fn builder() -> MockModelBuilder {
        MockModelBuilder::new()
    }

    /// Calls made so far, in order
    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.calls.read().await.clone()
    }
}

impl Clone for MockModel {
    fn clone(&self) -> Self {
        Self {
            query: self.query.clone(),
            answer: self.answer.clone(),
            structured_failure: self.structured_failure.clone(),
            completion_failure: self.completion_failure.clone(),
            calls: Arc::clone(&self.calls),
        }
    }
}

#[async_trait::async_trait]
impl LanguageModel for MockModel {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn complete(&self, messages: &[Message]) -> Result<String, ModelError> {
        self.calls
            .write()
            .await
            .push(RecordedCall::Completion(messages.to_vec()));

        if let Some(reason) = &self.completion_failure {
            return Err(ModelError::Unreachable(reason.clone()));
        }
        Ok(self.answer.clone())
    }

    async fn generate_query(&self, messages: &[Message]) -> Result<QueryOutput, ModelError> {
        self.calls
            .write()
            .await
            .push(RecordedCall::Structured(messages.to_vec()));

        if let Some(reason) = &self.structured_failure {
            return Err(ModelError::NonConforming(reason.clone()));
        }
        Ok(QueryOutput::new(self.query.clone()))
    }
}

/// Fluent builder for [`MockModel`]
pub struct MockModelBuilder {
    query: String,
    answer: String,
    structured_failure: Option<String>,
    completion_failure: Option<String>,
}

impl MockModelBuilder {
    pub fn new() -> Self {
        Self {
            query: "SELECT 1".to_string(),
            answer: "mock answer".to_string(),
            structured_failure: None,
            completion_failure: None,
        }
    }

    /// SQL returned from structured generation
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    /// Text returned from free-text completion
    pub fn with_answer(mut self, answer: impl Into<String>) -> Self {
        self.answer = answer.into();
        self
    }

    /// Make structured generation fail as non-conforming
    pub fn with_structured_failure(mut self, reason: impl Into<String>) -> Self {
        self.structured_failure = Some(reason.into());
        self
    }

    /// Make free-text completion fail as unreachable
    pub fn with_completion_failure(mut self, reason: impl Into<String>) -> Self {
        self.completion_failure = Some(reason.into());
        self
    }

    pub fn build(self) -> MockModel {
        MockModel {
            query: self.query,
            answer: self.answer,
            structured_failure: self.structured_failure,
            completion_failure: self.completion_failure,
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl Default for MockModelBuilder {
    fn default() -> Self {
        Self::new()
    }
}
