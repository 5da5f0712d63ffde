//! Structural validation of untrusted chat-completion JSON.
//!
//! The walk never stops at the first problem: every violation in the
//! document is reported, in document order, and a [`Completion`] is only
//! produced when there are none.

use std::fmt;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::completion::{Choice, Completion, EmittedToken, Message, TopAlternative, Usage};

/// 实际遇到的 JSON 形状。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonKind {
    Missing,
    Null,
    Bool,
    Integer,
    Float,
    String,
    Array,
    Object,
}

impl JsonKind {
    #[must_use]
    pub fn of(value: Option<&Value>) -> Self {
        match value {
            None => Self::Missing,
            Some(Value::Null) => Self::Null,
            Some(Value::Bool(_)) => Self::Bool,
            Some(Value::Number(n)) if n.is_f64() => Self::Float,
            Some(Value::Number(_)) => Self::Integer,
            Some(Value::String(_)) => Self::String,
            Some(Value::Array(_)) => Self::Array,
            Some(Value::Object(_)) => Self::Object,
        }
    }
}

impl fmt::Display for JsonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Missing => "missing",
            Self::Null => "null",
            Self::Bool => "boolean",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        };
        f.write_str(name)
    }
}

/// 期望的 JSON 形状。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    String,
    /// Integer that fits in `i64`.
    SignedInteger,
    NonNegativeInteger,
    Number,
    /// Integer in `0..=255`.
    Byte,
    Array,
    ArrayOrNull,
    Object,
    Null,
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::SignedInteger => "integer in i64 range",
            Self::NonNegativeInteger => "non-negative integer",
            Self::Number => "number",
            Self::Byte => "integer in 0..=255",
            Self::Array => "array",
            Self::ArrayOrNull => "array or null",
            Self::Object => "object",
            Self::Null => "null",
        };
        f.write_str(name)
    }
}

/// 单条违规：字段路径 + 期望 / 实际形状。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Dotted path, e.g. `choices[0].logprobs.content[3].top_logprobs[1].logprob`.
    /// `$` denotes the document root.
    pub path: String,
    pub expected: Expected,
    pub found: JsonKind,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: expected {}, found {}",
            self.path, self.expected, self.found
        )
    }
}

/// 有序、非空的违规列表。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} schema violation(s): {}", .violations.len(), join_violations(.violations))]
pub struct ValidationErrors {
    violations: Vec<Violation>,
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.violations.iter().map(|v| v.path.as_str())
    }

    #[must_use]
    pub fn contains_path(&self, path: &str) -> bool {
        self.paths().any(|p| p == path)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.violations.iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.iter()
    }
}

impl IntoIterator for ValidationErrors {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.into_iter()
    }
}

/// 校验上游返回的任意 JSON。
///
/// Extra fields are ignored. Nothing is coerced or defaulted.
///
/// # Errors
/// 存在任何违规时返回 [`ValidationErrors`]。
pub fn validate(raw: &Value) -> Result<Completion, ValidationErrors> {
    let mut walker = Walker::default();
    let completion = walker.completion(raw);
    match completion {
        Some(completion) if walker.violations.is_empty() => Ok(completion),
        _ => Err(ValidationErrors {
            violations: walker.violations,
        }),
    }
}

fn child(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

#[derive(Default)]
struct Walker {
    violations: Vec<Violation>,
}

impl Walker {
    fn report(&mut self, path: &str, expected: Expected, found: Option<&Value>) {
        let path = if path.is_empty() { "$" } else { path };
        self.violations.push(Violation {
            path: path.to_string(),
            expected,
            found: JsonKind::of(found),
        });
    }

    fn object<'v>(&mut self, value: Option<&'v Value>, path: &str) -> Option<&'v Map<String, Value>> {
        match value {
            Some(Value::Object(map)) => Some(map),
            other => {
                self.report(path, Expected::Object, other);
                None
            }
        }
    }

    fn array<'v>(&mut self, value: Option<&'v Value>, path: &str) -> Option<&'v [Value]> {
        match value {
            Some(Value::Array(items)) => Some(items),
            other => {
                self.report(path, Expected::Array, other);
                None
            }
        }
    }

    fn string(&mut self, map: &Map<String, Value>, parent: &str, key: &str) -> Option<String> {
        match map.get(key) {
            Some(Value::String(s)) => Some(s.clone()),
            other => {
                self.report(&child(parent, key), Expected::String, other);
                None
            }
        }
    }

    fn integer(&mut self, map: &Map<String, Value>, parent: &str, key: &str) -> Option<i64> {
        let value = map.get(key);
        let parsed = value.and_then(Value::as_i64);
        if parsed.is_none() {
            self.report(&child(parent, key), Expected::SignedInteger, value);
        }
        parsed
    }

    fn unsigned(&mut self, map: &Map<String, Value>, parent: &str, key: &str) -> Option<u64> {
        let value = map.get(key);
        let parsed = value.and_then(Value::as_u64);
        if parsed.is_none() {
            self.report(&child(parent, key), Expected::NonNegativeInteger, value);
        }
        parsed
    }

    fn number(&mut self, map: &Map<String, Value>, parent: &str, key: &str) -> Option<f64> {
        let value = map.get(key);
        let parsed = match value {
            Some(Value::Number(n)) => n.as_f64(),
            _ => None,
        };
        if parsed.is_none() {
            self.report(&child(parent, key), Expected::Number, value);
        }
        parsed
    }

    fn null(&mut self, map: &Map<String, Value>, parent: &str, key: &str) -> Option<()> {
        match map.get(key) {
            Some(Value::Null) => Some(()),
            other => {
                self.report(&child(parent, key), Expected::Null, other);
                None
            }
        }
    }

    /// Validates every element, so one bad element does not hide the others.
    fn each<T>(
        &mut self,
        items: &[Value],
        path: &str,
        mut f: impl FnMut(&mut Self, &Value, &str) -> Option<T>,
    ) -> Option<Vec<T>> {
        let parsed: Vec<Option<T>> = items
            .iter()
            .enumerate()
            .map(|(i, item)| f(self, item, &format!("{path}[{i}]")))
            .collect();
        parsed.into_iter().collect()
    }

    fn bytes(&mut self, items: &[Value], path: &str) -> Option<Vec<u8>> {
        self.each(items, path, |walker, item, item_path| {
            let byte = item.as_u64().and_then(|b| u8::try_from(b).ok());
            if byte.is_none() {
                walker.report(item_path, Expected::Byte, Some(item));
            }
            byte
        })
    }

    fn completion(&mut self, raw: &Value) -> Option<Completion> {
        let map = self.object(Some(raw), "")?;
        let id = self.string(map, "", "id");
        let object = self.string(map, "", "object");
        let created = self.integer(map, "", "created");
        let model = self.string(map, "", "model");
        let choices = self
            .array(map.get("choices"), "choices")
            .and_then(|items| self.each(items, "choices", Self::choice));
        let usage = self
            .object(map.get("usage"), "usage")
            .and_then(|usage| self.usage(usage));
        let fingerprint = self.null(map, "", "system_fingerprint");

        fingerprint?;
        Some(Completion {
            id: id?,
            object: object?,
            created: created?,
            model: model?,
            choices: choices?,
            usage: usage?,
            system_fingerprint: None,
        })
    }

    fn usage(&mut self, map: &Map<String, Value>) -> Option<Usage> {
        let prompt_tokens = self.unsigned(map, "usage", "prompt_tokens");
        let completion_tokens = self.unsigned(map, "usage", "completion_tokens");
        let total_tokens = self.unsigned(map, "usage", "total_tokens");
        Some(Usage {
            prompt_tokens: prompt_tokens?,
            completion_tokens: completion_tokens?,
            total_tokens: total_tokens?,
        })
    }

    fn choice(&mut self, value: &Value, path: &str) -> Option<Choice> {
        let map = self.object(Some(value), path)?;
        let index = self.unsigned(map, path, "index");

        let message_path = child(path, "message");
        let message = self
            .object(map.get("message"), &message_path)
            .and_then(|message| {
                let role = self.string(message, &message_path, "role");
                let content = self.string(message, &message_path, "content");
                Some(Message {
                    role: role?,
                    content: content?,
                })
            });

        let logprobs_path = child(path, "logprobs");
        let content_path = child(&logprobs_path, "content");
        let tokens = self
            .object(map.get("logprobs"), &logprobs_path)
            .and_then(|logprobs| self.array(logprobs.get("content"), &content_path))
            .and_then(|items| self.each(items, &content_path, Self::emitted_token));

        let finish_reason = self.string(map, path, "finish_reason");

        Some(Choice {
            index: index?,
            message: message?,
            tokens: tokens?,
            finish_reason: finish_reason?,
        })
    }

    fn emitted_token(&mut self, value: &Value, path: &str) -> Option<EmittedToken> {
        let map = self.object(Some(value), path)?;
        let token = self.string(map, path, "token");
        let log_probability = self.number(map, path, "logprob");

        let bytes_path = child(path, "bytes");
        let bytes = self
            .array(map.get("bytes"), &bytes_path)
            .and_then(|items| self.bytes(items, &bytes_path));

        let alternatives_path = child(path, "top_logprobs");
        let alternatives = self
            .array(map.get("top_logprobs"), &alternatives_path)
            .and_then(|items| self.each(items, &alternatives_path, Self::top_alternative));

        Some(EmittedToken {
            token: token?,
            log_probability: log_probability?,
            bytes: bytes?,
            alternatives: alternatives?,
        })
    }

    fn top_alternative(&mut self, value: &Value, path: &str) -> Option<TopAlternative> {
        let map = self.object(Some(value), path)?;
        let token = self.string(map, path, "token");
        let log_probability = self.number(map, path, "logprob");

        let bytes_path = child(path, "bytes");
        let bytes = match map.get("bytes") {
            Some(Value::Null) => Some(None),
            Some(Value::Array(items)) => self.bytes(items, &bytes_path).map(Some),
            other => {
                self.report(&bytes_path, Expected::ArrayOrNull, other);
                None
            }
        };

        Some(TopAlternative {
            token: token?,
            log_probability: log_probability?,
            bytes: bytes?,
        })
    }
}
