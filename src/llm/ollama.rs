//! Ollama preflight: binary present, server up, model pulled.

use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::error::ProviderError;

/// Check that Ollama can serve `model`.
///
/// `ollama ls` talks to the server, so its failure means the server is not
/// running.
pub async fn check_ollama_ready(model: &str) -> Result<(), ProviderError> {
    if which::which("ollama").is_err() {
        return Err(ProviderError::OllamaNotInstalled);
    }

    let output = Command::new("ollama")
        .arg("ls")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(ProviderError::SpawnFailed)?;

    if !output.status.success() {
        debug!(
            "ollama ls failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        );
        return Err(ProviderError::OllamaNotRunning);
    }

    let listing = String::from_utf8_lossy(&output.stdout);
    if !has_model(&listing, model) {
        return Err(ProviderError::ModelNotPulled(model.to_string()));
    }

    Ok(())
}

/// Model names from `ollama ls` output (first column, header skipped).
pub fn parse_model_list(listing: &str) -> Vec<String> {
    listing
        .lines()
        .skip(1)
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_string)
        .collect()
}

/// Whether `model` is installed. A bare name also matches its `:latest` tag.
pub fn has_model(listing: &str, model: &str) -> bool {
    let models = parse_model_list(listing);
    models
        .iter()
        .any(|m| m == model || (!model.contains(':') && *m == format!("{model}:latest")))
}
