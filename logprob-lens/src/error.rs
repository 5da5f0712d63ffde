//! Error definitions for the client.

use logprob_lens_types::ValidationErrors;
use thiserror::Error;

use crate::render::RenderError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP client error: {source}")]
    HttpClient {
        #[from]
        source: reqwest::Error,
    },

    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },

    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("Schema error: {source}")]
    Schema {
        #[from]
        source: ValidationErrors,
    },

    #[error("Render error: {source}")]
    Render {
        #[from]
        source: RenderError,
    },
}

impl Error {
    /// 网络层失败（连接、非 2xx、非 JSON 响应体）。
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::HttpClient { .. } | Self::ApiError { .. } | Self::Serialization { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
