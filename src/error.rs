//! Error types for cmai modules using thiserror.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from staging, diffing and committing.
#[derive(Error, Debug)]
pub enum CommitError {
    #[error("No staged changes found. Please stage your changes using 'git add' first.")]
    NoChanges,

    #[error("Failed to open repository: {0}")]
    OpenRepository(#[source] git2::Error),

    #[error("Failed to collect diff: {0}")]
    DiffFailed(#[source] git2::Error),

    #[error("Failed to stage changes: {0}")]
    StagingFailed(#[source] git2::Error),

    #[error("Failed to create commit: {0}")]
    CommitFailed(#[source] git2::Error),

    #[error("Git config error (missing user.name or user.email): {0}")]
    ConfigError(#[source] git2::Error),

    #[error("Failed to push changes: {0}")]
    PushFailed(String),
}

/// Errors from the template store.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Required template '{name}' not found (searched: {})", display_paths(searched))]
    Missing { name: String, searched: Vec<PathBuf> },
}

impl TemplateError {
    /// The file name of the template that could not be resolved.
    pub fn name(&self) -> &str {
        match self {
            TemplateError::Missing { name, .. } => name,
        }
    }
}

/// Errors from the HTTP transport.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Error making API request to {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("API request to {url} failed with HTTP {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },
}

/// Errors from parsing a provider reply into a commit message.
///
/// Every variant keeps the raw response body for diagnosis.
#[derive(Error, Debug)]
pub enum ResponseError {
    #[error("Failed to parse API response as JSON: {raw}")]
    InvalidJson { raw: String },

    #[error("Failed to read '{field}' from API response: {raw}")]
    MissingField { field: &'static str, raw: String },

    #[error("Failed to generate commit message. API response: {raw}")]
    EmptyMessage { raw: String },
}

impl ResponseError {
    /// The raw response body that failed to parse.
    pub fn raw(&self) -> &str {
        match self {
            ResponseError::InvalidJson { raw }
            | ResponseError::MissingField { raw, .. }
            | ResponseError::EmptyMessage { raw } => raw,
        }
    }
}

/// Errors from persisted configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not determine the home directory")]
    NoHomeDir,

    #[error("Failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write config file {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No API key found. Please provide the OpenRouter API key using --api-key flag")]
    MissingApiKey,
}

/// Errors from provider selection and provider-specific preflight checks.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("Ollama CLI not found. Install it from https://ollama.com")]
    OllamaNotInstalled,

    #[error("Ollama server not running. Please start Ollama first: ollama serve")]
    OllamaNotRunning,

    #[error("Model '{0}' not found in Ollama. Please pull it first: ollama pull {0}")]
    ModelNotPulled(String),

    #[error("Failed to spawn ollama process: {0}")]
    SpawnFailed(#[source] std::io::Error),
}

/// Failure anywhere between building a request and reading back a message.
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Response(#[from] ResponseError),
}

fn display_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "no locations".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
