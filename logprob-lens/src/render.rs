//! Token probability columns derived from a validated completion.

use std::fmt;

use logprob_lens_types::{Completion, EmittedToken};
use thiserror::Error;

/// 渲染前置条件失败。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("completion has no choices to render")]
    EmptyChoiceSet,
}

/// 某个候选 token 的展示单元。
#[derive(Debug, Clone, PartialEq)]
pub struct AlternativeCell {
    pub token: String,
    /// `exp(logprob) * 100`, unrounded.
    pub probability_percent: f64,
    /// Token text is byte-for-byte equal to the emitted token.
    pub is_chosen: bool,
}

impl AlternativeCell {
    /// 保留三位小数的百分比。
    #[must_use]
    pub fn rounded_percent(&self) -> f64 {
        (self.probability_percent * 1000.0).round() / 1000.0
    }
}

impl fmt::Display for AlternativeCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = if self.is_chosen { '*' } else { ' ' };
        write!(
            f,
            "{marker} {:?} {:.3}%",
            self.token,
            self.rounded_percent()
        )
    }
}

/// 单个输出位置：实际 token + 上游顺序的候选。
#[derive(Debug, Clone, PartialEq)]
pub struct TokenColumn {
    pub emitted_token: String,
    pub alternatives: Vec<AlternativeCell>,
}

impl TokenColumn {
    fn from_emitted(emitted: &EmittedToken) -> Self {
        let alternatives = emitted
            .alternatives
            .iter()
            .map(|alternative| AlternativeCell {
                token: alternative.token.clone(),
                probability_percent: log_probability_to_percent(alternative.log_probability),
                is_chosen: alternative.token == emitted.token,
            })
            .collect();
        Self {
            emitted_token: emitted.token.clone(),
            alternatives,
        }
    }

    /// 被标记为实际输出的候选。
    pub fn chosen(&self) -> impl Iterator<Item = &AlternativeCell> {
        self.alternatives.iter().filter(|cell| cell.is_chosen)
    }
}

/// Converts a natural-log probability to a percentage.
///
/// Not renormalized across alternatives, so a column need not sum to 100.
#[must_use]
pub fn log_probability_to_percent(log_probability: f64) -> f64 {
    log_probability.exp() * 100.0
}

/// 渲染第一个 choice 的每个 token。
///
/// # Errors
/// `choices` 为空时返回 [`RenderError::EmptyChoiceSet`]。
pub fn render(completion: &Completion) -> Result<Vec<TokenColumn>, RenderError> {
    let choice = completion
        .first_choice()
        .ok_or(RenderError::EmptyChoiceSet)?;
    Ok(choice.tokens.iter().map(TokenColumn::from_emitted).collect())
}

/// 纯文本展示，供终端输出。
///
/// Token text is debug-quoted so whitespace and control characters stay
/// visible.
#[must_use]
pub fn format_columns(columns: &[TokenColumn]) -> String {
    let mut out = String::new();
    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&format!("[{i}] {:?}\n", column.emitted_token));
        let width = column
            .alternatives
            .iter()
            .map(|cell| format!("{:?}", cell.token).chars().count())
            .max()
            .unwrap_or(0);
        for cell in &column.alternatives {
            let marker = if cell.is_chosen { '*' } else { ' ' };
            let token = format!("{:?}", cell.token);
            out.push_str(&format!(
                "  {marker} {token:<width$} {:>7.3}%\n",
                cell.rounded_percent()
            ));
        }
    }
    out
}
