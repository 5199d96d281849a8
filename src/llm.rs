//! Sync client for an OpenAI-compatible chat-completions API.
//!
//! All model access in the agent goes through the [`LanguageModel`] trait:
//! the classifier, the code generator, the solver, and the chat fallback.
//! Tests substitute fakes; production wires in [`OpenAiClient`].
//!
//! Calls are blocking with a per-request timeout — one utterance, one call,
//! no concurrency at this layer.

use miette::Diagnostic;
use thiserror::Error;

use crate::config::LlmConfig;

/// Errors from the LLM subsystem.
#[derive(Debug, Error, Diagnostic)]
pub enum LlmError {
    #[error("missing API key")]
    #[diagnostic(
        code(atlas::llm::missing_api_key),
        help("Set OPENAI_API_KEY in the environment or a .env file.")
    )]
    MissingApiKey,

    #[error("model request failed: {message}")]
    #[diagnostic(
        code(atlas::llm::request_failed),
        help("Check network connectivity, the API key, and the configured base URL.")
    )]
    RequestFailed { message: String },

    #[error("failed to parse model response: {message}")]
    #[diagnostic(
        code(atlas::llm::parse_error),
        help("The API returned an unexpected response shape.")
    )]
    ParseError { message: String },
}

/// A chat message sent to the model.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    /// Role: "system" or "user".
    pub role: &'static str,
    /// Message content.
    pub content: String,
}

/// The seam between the agent and the external model.
///
/// One blocking call per invocation: a system instruction plus a single user
/// message, returning the assistant's text.
pub trait LanguageModel: Send + Sync {
    fn complete(&self, system: &str, user: &str) -> Result<String, LlmError>;
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiClient {
    config: LlmConfig,
}

impl OpenAiClient {
    pub fn new(config: LlmConfig) -> Self {
        Self { config }
    }

    /// The model name being used.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn chat(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let api_key = self.config.api_key.as_deref().ok_or(LlmError::MissingApiKey)?;

        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        let agent = ureq::AgentBuilder::new()
            .timeout(std::time::Duration::from_secs(self.config.timeout_secs))
            .build();

        let msgs: Vec<serde_json::Value> = messages
            .iter()
            .map(|m| {
                serde_json::json!({
                    "role": m.role,
                    "content": m.content,
                })
            })
            .collect();

        let body = serde_json::json!({
            "model": self.config.model,
            "messages": msgs,
        });

        let body_str = serde_json::to_string(&body).map_err(|e| LlmError::RequestFailed {
            message: format!("JSON serialize error: {e}"),
        })?;

        let resp = agent
            .post(&url)
            .set("Content-Type", "application/json")
            .set("Authorization", &format!("Bearer {api_key}"))
            .send_string(&body_str)
            .map_err(|e: ureq::Error| LlmError::RequestFailed {
                message: e.to_string(),
            })?;

        let resp_str = resp.into_string().map_err(|e| LlmError::ParseError {
            message: e.to_string(),
        })?;

        let json: serde_json::Value =
            serde_json::from_str(&resp_str).map_err(|e| LlmError::ParseError {
                message: e.to_string(),
            })?;

        json["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.trim().to_string())
            .ok_or_else(|| LlmError::ParseError {
                message: "missing 'choices[0].message.content' field".into(),
            })
    }
}

impl LanguageModel for OpenAiClient {
    fn complete(&self, system: &str, user: &str) -> Result<String, LlmError> {
        self.chat(&[
            ChatMessage {
                role: "system",
                content: system.to_string(),
            },
            ChatMessage {
                role: "user",
                content: user.to_string(),
            },
        ])
    }
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("base_url", &self.config.base_url)
            .field("model", &self.config.model)
            .field("has_api_key", &self.config.api_key.is_some())
            .finish()
    }
}
