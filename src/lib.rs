//! cmai - AI-generated conventional commit messages for staged git changes.
//!
//! # Overview
//!
//! cmai reads the staged diff, sizes it to fit a model's context, builds a
//! prompt for the configured provider (OpenRouter, Ollama, LM Studio or any
//! OpenAI-compatible endpoint), and commits with the message the model
//! returns.

pub mod commit;
pub mod config;
pub mod error;
pub mod git;
pub mod llm;
pub mod templates;

// Re-export commonly used types
pub use commit::{DiffMode, DiffPayload, ModelTier, RequestPayload, generate_commit_message};
pub use config::{ConfigStore, Settings};
pub use error::{
    CommitError, ConfigError, GenerateError, ProviderError, ResponseError, TemplateError,
    TransportError,
};
pub use llm::{ApiShape, Provider};
pub use templates::TemplateStore;
