//! Pipeline state and per-stage updates
//!
//! One `PipelineState` exists per incoming question. Stages populate its
//! fields strictly in order (question, query, result, answer) and a stage
//! never overwrites a field set by an earlier stage.

use serde::{Deserialize, Serialize};

/// Shared state threaded through one question-answering run.
///
/// The `question` is user-supplied and immutable once set. The remaining
/// fields are absent until the corresponding stage completes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineState {
    /// The user's natural-language question
    pub question: String,

    /// Generated SQL, set by the write_query stage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,

    /// Raw execution output (or error text), set by the execute_query stage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,

    /// Final natural-language answer, set by the generate_answer stage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
}

impl PipelineState {
    /// Create the initial state for a question
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            query: None,
            result: None,
            answer: None,
        }
    }

    /// True once all four fields are populated
    pub fn is_complete(&self) -> bool {
        self.query.is_some() && self.result.is_some() && self.answer.is_some()
    }

    /// Merge a stage update into the state.
    ///
    /// Updates are strictly additive: applying an update for a field that
    /// is already set is a contract violation and fails rather than
    /// silently overwriting.
    pub fn apply(&mut self, update: &StageUpdate) -> Result<(), StateError> {
        match update {
            StageUpdate::WriteQuery { query } => {
                if self.query.is_some() {
                    return Err(StateError::FieldAlreadySet("query"));
                }
                self.query = Some(query.clone());
            }
            StageUpdate::ExecuteQuery { result } => {
                if self.result.is_some() {
                    return Err(StateError::FieldAlreadySet("result"));
                }
                self.result = Some(result.clone());
            }
            StageUpdate::GenerateAnswer { answer } => {
                if self.answer.is_some() {
                    return Err(StateError::FieldAlreadySet("answer"));
                }
                self.answer = Some(answer.clone());
            }
        }
        Ok(())
    }
}

/// The incremental field(s) a single stage contributes to the shared state.
///
/// Serializes as a one-key object mapping the stage name to the fields it
/// added, e.g. `{"write_query": {"query": "SELECT ..."}}`. The HTTP layer
/// returns the full run as a JSON array of these in stage order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageUpdate {
    /// SQL generation completed
    WriteQuery { query: String },

    /// Query execution completed (successfully or not; failures are data)
    ExecuteQuery { result: String },

    /// Answer generation completed
    GenerateAnswer { answer: String },
}

impl StageUpdate {
    /// Stable stage name as it appears on the wire
    pub fn stage_name(&self) -> &'static str {
        match self {
            Self::WriteQuery { .. } => "write_query",
            Self::ExecuteQuery { .. } => "execute_query",
            Self::GenerateAnswer { .. } => "generate_answer",
        }
    }
}

/// Violations of the stage-ordering contract over shared state
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    #[error("Field '{0}' is already set and cannot be overwritten")]
    FieldAlreadySet(&'static str),

    #[error("Field '{0}' is not yet set; an earlier stage has not run")]
    FieldNotSet(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn updates_apply_in_order() {
        let mut state = PipelineState::new("How many Employees are there?");
        assert!(!state.is_complete());

        state
            .apply(&StageUpdate::WriteQuery {
                query: "SELECT COUNT(EmployeeId) FROM Employee".to_string(),
            })
            .unwrap();
        state
            .apply(&StageUpdate::ExecuteQuery {
                result: "count\n8".to_string(),
            })
            .unwrap();
        state
            .apply(&StageUpdate::GenerateAnswer {
                answer: "There are 8 employees.".to_string(),
            })
            .unwrap();

        assert!(state.is_complete());
        assert_eq!(
            state.query.as_deref(),
            Some("SELECT COUNT(EmployeeId) FROM Employee")
        );
        assert_eq!(state.answer.as_deref(), Some("There are 8 employees."));
    }

    #[test]
    fn set_fields_are_never_overwritten() {
        let mut state = PipelineState::new("q");
        state
            .apply(&StageUpdate::WriteQuery {
                query: "SELECT 1".to_string(),
            })
            .unwrap();

        let err = state
            .apply(&StageUpdate::WriteQuery {
                query: "SELECT 2".to_string(),
            })
            .unwrap_err();
        assert_eq!(err, StateError::FieldAlreadySet("query"));
        assert_eq!(state.query.as_deref(), Some("SELECT 1"));
    }

    #[test]
    fn stage_update_wire_shape() {
        let update = StageUpdate::WriteQuery {
            query: "SELECT Name FROM Artist LIMIT 10".to_string(),
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "write_query": { "query": "SELECT Name FROM Artist LIMIT 10" }
            })
        );
        assert_eq!(update.stage_name(), "write_query");
    }

    #[test]
    fn unset_fields_are_omitted_from_json() {
        let state = PipelineState::new("q");
        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(json, r#"{"question":"q"}"#);
    }
}
