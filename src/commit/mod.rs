//! AI-generated commit messages: diff sizing, prompt building and generation.

pub mod diff;
pub mod hints;
pub mod message;
pub mod prompt;
pub mod tier;

pub use diff::{DiffMode, DiffPayload, SizedDiff, size_diff};
pub use hints::{ChangeHint, detect_hints};
pub use message::generate_commit_message;
pub use prompt::{RequestPayload, build_request};
pub use tier::ModelTier;
