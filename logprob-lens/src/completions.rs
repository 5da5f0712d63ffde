//! Chat Completions API.

use std::sync::Arc;

use logprob_lens_types::request::{CompletionRequest, MAX_TOP_LOGPROBS};
use logprob_lens_types::{validate, Completion};
use serde_json::Value;

use crate::client::ClientInner;
use crate::error::{Error, Result};

#[derive(Clone)]
pub struct Completions {
    pub(crate) inner: Arc<ClientInner>,
}

impl Completions {
    pub(crate) const fn new(inner: Arc<ClientInner>) -> Self {
        Self { inner }
    }

    /// 发送请求并校验响应。
    ///
    /// Every schema violation is logged at `warn` before the error is
    /// returned.
    ///
    /// # Errors
    /// 请求参数无效、网络失败、非 2xx、响应体不是 JSON 或响应结构不符时返回错误。
    pub async fn create(&self, request: &CompletionRequest) -> Result<Completion> {
        let raw = self.create_raw(request).await?;
        validate_logged(&raw)
    }

    /// 发送请求，返回未校验的 JSON。
    ///
    /// # Errors
    /// 请求参数无效、网络失败、非 2xx 或响应体不是 JSON 时返回错误。
    pub async fn create_raw(&self, request: &CompletionRequest) -> Result<Value> {
        check_request(request)?;

        let url = self.inner.api_client.chat_completions_url();
        tracing::debug!(
            model = %request.model,
            top_logprobs = request.top_logprobs,
            "sending chat completion request"
        );
        let response = self.inner.send(self.inner.http.post(url).json(request)).await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "chat completion request failed");
            return Err(Error::ApiError {
                status: status.as_u16(),
                message,
            });
        }
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Validates a raw body, logging each violation at `warn`.
pub(crate) fn validate_logged(raw: &Value) -> Result<Completion> {
    validate(raw).map_err(|errors| {
        for violation in &errors {
            tracing::warn!(
                path = %violation.path,
                expected = %violation.expected,
                found = %violation.found,
                "completion response failed schema validation"
            );
        }
        Error::from(errors)
    })
}

fn check_request(request: &CompletionRequest) -> Result<()> {
    if request.model.trim().is_empty() {
        return Err(Error::InvalidConfig {
            message: "Model name must not be empty".into(),
        });
    }
    if request.messages.is_empty() || request.messages.iter().all(|m| m.content.trim().is_empty())
    {
        return Err(Error::InvalidConfig {
            message: "Prompt must not be empty".into(),
        });
    }
    if !request.logprobs {
        return Err(Error::InvalidConfig {
            message: "logprobs must be requested".into(),
        });
    }
    if request.top_logprobs > MAX_TOP_LOGPROBS {
        return Err(Error::InvalidConfig {
            message: format!(
                "top_logprobs must be within 0..={MAX_TOP_LOGPROBS}, got {}",
                request.top_logprobs
            ),
        });
    }
    if let Some(temperature) = request.temperature {
        if !(0.0..=2.0).contains(&temperature) {
            return Err(Error::InvalidConfig {
                message: format!("temperature must be within 0.0..=2.0, got {temperature}"),
            });
        }
    }
    Ok(())
}
