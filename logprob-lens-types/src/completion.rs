use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::validate::{validate, ValidationErrors};

/// 某个位置上模型考虑过的候选 token。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopAlternative {
    pub token: String,
    #[serde(rename = "logprob")]
    pub log_probability: f64,
    /// UTF-8 字节序列，上游可能显式返回 `null`。
    pub bytes: Option<Vec<u8>>,
}

/// 模型实际输出的 token 及其 top-K 候选。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmittedToken {
    pub token: String,
    #[serde(rename = "logprob")]
    pub log_probability: f64,
    pub bytes: Vec<u8>,
    /// 上游给出的顺序，不做重排。
    #[serde(rename = "top_logprobs")]
    pub alternatives: Vec<TopAlternative>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

/// Token usage accounting.
///
/// `total_tokens == prompt_tokens + completion_tokens` is expected but is
/// passed through as reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

/// 单个 choice。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Choice {
    pub index: u64,
    pub message: Message,
    #[serde(rename = "logprobs", serialize_with = "serialize_logprobs_content")]
    pub tokens: Vec<EmittedToken>,
    pub finish_reason: String,
}

/// Chat completion 响应。
///
/// Deserializing goes through [`validate`], so serde and the validator accept
/// exactly the same documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct Completion {
    pub id: String,
    pub object: String,
    /// Unix 秒。
    pub created: i64,
    pub model: String,
    pub choices: Vec<Choice>,
    pub usage: Usage,
    /// 始终为 `None`，序列化为 `null`。
    pub system_fingerprint: Option<String>,
}

impl Completion {
    /// 校验并转换任意 JSON。
    ///
    /// # Errors
    /// 当 JSON 结构与 chat completion 不符时返回全部违规项。
    pub fn from_json_value(value: &Value) -> Result<Self, ValidationErrors> {
        validate(value)
    }

    /// 第一个 choice（渲染只使用它）。
    #[must_use]
    pub fn first_choice(&self) -> Option<&Choice> {
        self.choices.first()
    }
}

impl TryFrom<Value> for Completion {
    type Error = ValidationErrors;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        validate(&value)
    }
}

/// `choices[].logprobs` is `{ "content": [...] }` on the wire.
fn serialize_logprobs_content<S: serde::Serializer>(
    tokens: &[EmittedToken],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    #[derive(Serialize)]
    struct Content<'a> {
        content: &'a [EmittedToken],
    }

    Content { content: tokens }.serialize(serializer)
}
