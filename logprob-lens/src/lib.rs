//! Core client crate for logprob-lens.

pub mod client;
pub mod completions;
pub mod error;
pub mod render;
pub mod session;

#[cfg(test)]
mod test_support;

pub use logprob_lens_types as types;

pub use client::{Client, ClientBuilder, HttpOptions};
pub use error::{Error, Result};
pub use render::{format_columns, render, AlternativeCell, RenderError, TokenColumn};
pub use session::LensSession;
