//! OpenAI-compatible chat-completions backend
//!
//! Works against any endpoint speaking the `/chat/completions` wire
//! format. Structured query generation uses the `response_format`
//! json_schema mechanism, so conformance is enforced by the backend and a
//! non-conforming reply is a hard failure here, never a salvage parse.

use crate::model::{LanguageModel, Message, ModelError};
use askdb_core::QueryOutput;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// HTTP client for an OpenAI-compatible API
pub struct OpenAiModel {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl OpenAiModel {
    /// Create a client for the given endpoint and model.
    ///
    /// `base_url` is the API root (e.g. `https://api.openai.com/v1`);
    /// `/chat/completions` is appended per request.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, ModelError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ModelError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
        })
    }

    /// The model identifier sent with each request
    pub fn model(&self) -> &str {
        &self.model
    }

    async fn chat(
        &self,
        messages: &[Message],
        response_format: Option<serde_json::Value>,
    ) -> Result<String, ModelError> {
        let request = ChatRequest {
            model: &self.model,
            messages,
            response_format,
        };

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    ModelError::Unreachable(e.to_string())
                } else {
                    ModelError::Api(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Api(format!("{}: {}", status, body)));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ModelError::Api(format!("Malformed response body: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ModelError::Api("Response contained no completion".to_string()))
    }
}

/// `response_format` payload requesting a [`QueryOutput`]-shaped reply
pub fn query_output_response_format() -> serde_json::Value {
    serde_json::json!({
        "type": "json_schema",
        "json_schema": {
            "name": "query_output",
            "strict": true,
            "schema": QueryOutput::json_schema(),
        }
    })
}

#[async_trait::async_trait]
impl LanguageModel for OpenAiModel {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn complete(&self, messages: &[Message]) -> Result<String, ModelError> {
        tracing::debug!(model = %self.model, "free-text completion request");
        self.chat(messages, None).await
    }

    async fn generate_query(&self, messages: &[Message]) -> Result<QueryOutput, ModelError> {
        tracing::debug!(model = %self.model, "structured query request");
        let content = self
            .chat(messages, Some(query_output_response_format()))
            .await?;
        serde_json::from_str(&content).map_err(|e| {
            ModelError::NonConforming(format!("expected {{\"query\": ...}}, got error: {}", e))
        })
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn request_serialization() {
        let messages = vec![Message::system("s"), Message::user("u")];
        let request = ChatRequest {
            model: "gpt-4o-mini",
            messages: &messages,
            response_format: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "u");
        assert!(json.get("response_format").is_none());
    }

    #[test]
    fn structured_format_carries_query_schema() {
        let format = query_output_response_format();
        assert_eq!(format["type"], "json_schema");
        assert_eq!(format["json_schema"]["strict"], true);
        assert_eq!(
            format["json_schema"]["schema"]["required"],
            serde_json::json!(["query"])
        );
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let model = OpenAiModel::new("https://api.example.com/v1/", "m", "k").unwrap();
        assert_eq!(model.base_url, "https://api.example.com/v1");
    }

    #[test]
    fn response_parsing() {
        let body = r#"{"choices":[{"message":{"content":"hello"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(
            parsed.choices[0].message.content.as_deref(),
            Some("hello")
        );
    }
}
