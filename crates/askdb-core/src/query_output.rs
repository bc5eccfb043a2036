//! Structured-output contract for SQL generation
//!
//! When the pipeline asks the model to write SQL it does so in structured
//! mode: the backend must return data conforming to this shape, not free
//! text. This removes any need to regex-extract SQL from prose. A backend
//! that cannot conform fails the call outright.

use serde::{Deserialize, Serialize};

/// The one value the model must produce when generating SQL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOutput {
    /// Syntactically valid SQL query.
    pub query: String,
}

impl QueryOutput {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }

    /// JSON schema sent to backends that enforce structured output.
    ///
    /// `query` is the only property and it is required.
    pub fn json_schema() -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Syntactically valid SQL query."
                }
            },
            "required": ["query"],
            "additionalProperties": false
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn roundtrip() {
        let output = QueryOutput::new("SELECT COUNT(*) FROM Employee");
        let json = serde_json::to_string(&output).unwrap();
        let parsed: QueryOutput = serde_json::from_str(&json).unwrap();
        assert_eq!(output, parsed);
    }

    #[test]
    fn query_is_required() {
        let err = serde_json::from_str::<QueryOutput>("{}");
        assert!(err.is_err());
    }

    #[test]
    fn schema_requires_query() {
        let schema = QueryOutput::json_schema();
        assert_eq!(schema["required"], serde_json::json!(["query"]));
        assert_eq!(schema["properties"]["query"]["type"], "string");
    }
}
