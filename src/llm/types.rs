use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Message in a chat-completion conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl Message {
    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// One system+user prompt pair, issued once and then dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatExchange {
    pub system_prompt: String,
    pub user_prompt: String,
    /// Overrides the configured default temperature for this call only.
    pub temperature: Option<f64>,
}

impl ChatExchange {
    /// Create an exchange using the configured default temperature
    pub fn new(system_prompt: impl Into<String>, user_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
            temperature: None,
        }
    }

    /// Override the sampling temperature
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Override the sampling temperature when one is given
    pub fn with_optional_temperature(mut self, temperature: Option<f64>) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Request body for `POST {base_url}{chat_completions_path}`
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub temperature: f64,
}

impl ChatCompletionRequest {
    /// Build the two-message body for an exchange
    pub fn from_exchange(model: impl Into<String>, exchange: &ChatExchange, temperature: f64) -> Self {
        Self {
            model: model.into(),
            messages: vec![
                Message::system(exchange.system_prompt.clone()),
                Message::user(exchange.user_prompt.clone()),
            ],
            temperature,
        }
    }
}

/// Response body; only `choices[0].message.content` is read.
///
/// Choices are kept as raw JSON so that extra or malformed entries after the
/// first one do not reject the response.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Value>,
}

impl ChatCompletionResponse {
    /// Trimmed `choices[0].message.content`, if present
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.pointer("/message/content"))
            .and_then(Value::as_str)
            .map(str::trim)
    }
}
