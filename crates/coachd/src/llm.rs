//! Language model client.
//!
//! Agents depend on the [`TextCompletion`] trait rather than a concrete
//! client, so tests can swap in a canned or failing implementation. The
//! production implementation is [`OpenAiClient`]. Every call site has a
//! deterministic fallback; a missing API key or a failed request degrades
//! the experience but never takes an agent down.

use async_trait::async_trait;
use coach_core::Intent;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("no API key configured")]
    MissingApiKey,
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
    #[error("empty completion")]
    EmptyResponse,
    #[error("unparseable model output: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One message in a chat completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
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

/// Per-request overrides; unset fields use the client defaults.
#[derive(Debug, Clone, Default)]
pub struct CompletionOptions {
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, Clone)]
pub struct Completion {
    pub content: String,
    pub usage: Option<Usage>,
}

/// Text generation seam for agents.
#[async_trait]
pub trait TextCompletion: Send + Sync {
    async fn generate(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<Completion, LlmError>;
}

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// OpenAI chat completions client.
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    default_model: String,
    default_temperature: f64,
    default_max_tokens: u32,
}

impl OpenAiClient {
    /// Create a client reading the API key from `OPENAI_API_KEY`.
    ///
    /// A missing key is not an error here; requests fail with
    /// [`LlmError::MissingApiKey`] and callers fall back to canned text.
    pub fn from_env(model: impl Into<String>, temperature: f64, max_tokens: u32) -> Self {
        let api_key = std::env::var("OPENAI_API_KEY").ok();
        if api_key.is_none() {
            warn!("OPENAI_API_KEY not set, responses fall back to canned text");
        }
        Self {
            http: reqwest::Client::new(),
            api_key,
            default_model: model.into(),
            default_temperature: temperature,
            default_max_tokens: max_tokens,
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f64,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[async_trait]
impl TextCompletion for OpenAiClient {
    async fn generate(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<Completion, LlmError> {
        let api_key = self.api_key.as_ref().ok_or(LlmError::MissingApiKey)?;

        let request = ChatRequest {
            model: options.model.as_deref().unwrap_or(&self.default_model),
            messages,
            temperature: options.temperature.unwrap_or(self.default_temperature),
            max_tokens: options.max_tokens.unwrap_or(self.default_max_tokens),
        };

        let response = self
            .http
            .post(OPENAI_API_URL)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: ChatResponse = response.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(LlmError::EmptyResponse)?;

        Ok(Completion {
            content,
            usage: body.usage,
        })
    }
}

/// Generate text, returning the fallback if the model is unavailable.
pub async fn generate_or(
    llm: &dyn TextCompletion,
    messages: &[ChatMessage],
    options: &CompletionOptions,
    fallback: &str,
) -> String {
    match llm.generate(messages, options).await {
        Ok(completion) => completion.content,
        Err(e) => {
            warn!("completion failed, using fallback: {e}");
            fallback.to_string()
        }
    }
}

/// Classifier verdict for a user message.
#[derive(Debug, Clone, Deserialize)]
pub struct IntentAnalysis {
    pub intent: Intent,
    pub confidence: f64,
    #[serde(default)]
    pub reasoning: Option<String>,
}

/// Ask the model to classify a message into one of the known intents.
///
/// Uses a low temperature and a small token budget; the model is told to
/// answer with a JSON object. Output that cannot be parsed, or that names
/// an intent outside the known set, is an error and the caller falls back
/// to keyword classification.
pub async fn analyze_intent(
    llm: &dyn TextCompletion,
    message: &str,
) -> Result<IntentAnalysis, LlmError> {
    let intents = Intent::all()
        .iter()
        .map(Intent::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    let system = format!(
        "You classify messages sent to a learning assistant. \
         Respond with only a JSON object of the form \
         {{\"intent\": \"...\", \"confidence\": 0.0, \"reasoning\": \"...\"}}. \
         The intent must be one of: {intents}. \
         Confidence is a number between 0 and 1."
    );

    let messages = [ChatMessage::system(system), ChatMessage::user(message)];
    let options = CompletionOptions {
        temperature: Some(0.1),
        max_tokens: Some(200),
        ..Default::default()
    };

    let completion = llm.generate(&messages, &options).await?;
    parse_intent_json(&completion.content)
}

/// Extract and parse the JSON object from model output.
///
/// Models occasionally wrap JSON in prose or code fences, so parse the
/// substring between the first `{` and the last `}`.
fn parse_intent_json(content: &str) -> Result<IntentAnalysis, LlmError> {
    let start = content.find('{');
    let end = content.rfind('}');
    let json = match (start, end) {
        (Some(start), Some(end)) if start < end => &content[start..=end],
        _ => return Err(LlmError::InvalidResponse(content.to_string())),
    };

    serde_json::from_str(json).map_err(|_| LlmError::InvalidResponse(content.to_string()))
}
