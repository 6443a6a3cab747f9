//! Conventional commit messages and release tags for staged changes, written
//! by an LLM behind an OpenRouter-compatible chat-completion endpoint.
pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod generator;
pub mod git;
pub mod interact;
pub mod sanitize;
pub mod style;
pub mod templates;
pub mod tokens;
pub mod types;
pub mod validation;

// Re-export commonly used types
pub use app::{App, Outcome};
pub use config::Config;
pub use error::{AiCommitError, ErrorCode, Result};
pub use types::Args;
