//! Caller-owned session state: form inputs plus the last rendered result.

use logprob_lens_types::{Completion, CompletionRequest};
use serde_json::Value;

use crate::client::Client;
use crate::completions::validate_logged;
use crate::error::Result;
use crate::render::{render, TokenColumn};

/// 默认请求的候选数。
pub const DEFAULT_TOP_LOGPROBS: u8 = 5;

/// 一次 logprob 查看会话。
///
/// Holds at most one [`Completion`]; every run replaces it wholesale, and a
/// failed run leaves nothing to show.
#[derive(Debug, Clone)]
pub struct LensSession {
    pub model: String,
    pub prompt: String,
    pub temperature: Option<f64>,
    pub top_logprobs: u8,
    completion: Option<Completion>,
    columns: Vec<TokenColumn>,
}

impl LensSession {
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: String::new(),
            temperature: None,
            top_logprobs: DEFAULT_TOP_LOGPROBS,
            completion: None,
            columns: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    #[must_use]
    pub const fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    #[must_use]
    pub const fn with_top_logprobs(mut self, top_logprobs: u8) -> Self {
        self.top_logprobs = top_logprobs;
        self
    }

    /// 由当前输入构建请求。
    #[must_use]
    pub fn request(&self) -> CompletionRequest {
        let request = CompletionRequest::new(&self.model, &self.prompt, self.top_logprobs);
        match self.temperature {
            Some(temperature) => request.with_temperature(temperature),
            None => request,
        }
    }

    /// 发送请求、校验并渲染。
    ///
    /// # Errors
    /// 网络失败、结构校验失败或没有 choice 时返回错误；此时旧结果已被清空。
    pub async fn run(&mut self, client: &Client) -> Result<&[TokenColumn]> {
        let request = self.request();
        self.clear();
        let raw = client.completions().create_raw(&request).await?;
        self.apply(&raw)
    }

    /// 对已获取的响应体执行校验 + 渲染。
    ///
    /// # Errors
    /// 结构校验失败或没有 choice 时返回错误。
    pub fn apply(&mut self, raw: &Value) -> Result<&[TokenColumn]> {
        self.clear();
        let completion = validate_logged(raw)?;
        let columns = render(&completion)?;
        tracing::info!(
            id = %completion.id,
            model = %completion.model,
            columns = columns.len(),
            "rendered token probabilities"
        );
        self.completion = Some(completion);
        self.columns = columns;
        Ok(&self.columns)
    }

    #[must_use]
    pub fn completion(&self) -> Option<&Completion> {
        self.completion.as_ref()
    }

    #[must_use]
    pub fn columns(&self) -> &[TokenColumn] {
        &self.columns
    }

    pub fn clear(&mut self) {
        self.completion = None;
        self.columns.clear();
    }
}
