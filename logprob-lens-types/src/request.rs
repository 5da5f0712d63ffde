use serde::{Deserialize, Serialize};

/// 上游允许的 `top_logprobs` 上限。
pub const MAX_TOP_LOGPROBS: u8 = 20;

/// Chat 消息。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}

/// `POST chat/completions` 请求体，始终请求 logprobs。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    pub logprobs: bool,
    pub top_logprobs: u8,
}

impl CompletionRequest {
    /// 单条用户消息的请求。
    #[must_use]
    pub fn new(model: impl Into<String>, prompt: impl Into<String>, top_logprobs: u8) -> Self {
        Self {
            model: model.into(),
            messages: vec![ChatMessage::user(prompt)],
            temperature: None,
            logprobs: true,
            top_logprobs,
        }
    }

    #[must_use]
    pub const fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }
}
