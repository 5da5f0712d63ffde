//! Shared types for logprob-lens.

pub mod completion;
pub mod request;
pub mod validate;

pub use completion::{Choice, Completion, EmittedToken, Message, TopAlternative, Usage};
pub use request::{ChatMessage, CompletionRequest};
pub use validate::{validate, Expected, JsonKind, ValidationErrors, Violation};
