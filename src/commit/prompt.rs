//! Request construction for the two provider dialects.

use serde::Serialize;
use tracing::debug;

use crate::commit::diff::DiffPayload;
use crate::commit::hints::detect_hints;
use crate::commit::tier::ModelTier;
use crate::error::TemplateError;
use crate::llm::ApiShape;
use crate::templates::{self, TemplateStore};

/// Sampling temperature sent to single-prompt providers.
const GENERATE_TEMPERATURE: f32 = 0.2;
/// Nucleus sampling cutoff sent to single-prompt providers.
const GENERATE_TOP_P: f32 = 0.8;

/// A chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

/// Chat-completions request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub stream: bool,
    pub messages: Vec<ChatMessage>,
}

/// Sampling options for single-prompt requests.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateOptions {
    pub temperature: f32,
    pub top_p: f32,
}

/// Single-prompt request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub think: bool,
    pub stream: bool,
    pub options: GenerateOptions,
}

/// Provider-shaped request, ready to serialize.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RequestPayload {
    Chat(ChatRequest),
    Generate(GenerateRequest),
}

impl RequestPayload {
    pub fn model(&self) -> &str {
        match self {
            RequestPayload::Chat(req) => &req.model,
            RequestPayload::Generate(req) => &req.model,
        }
    }

    /// Pretty JSON for debug logging.
    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("<unserializable: {e}>"))
    }
}

/// Build the request body for a provider dialect.
///
/// Every template is required; a missing one fails the build rather than
/// falling back to built-in text.
pub fn build_request(
    templates: &TemplateStore,
    shape: ApiShape,
    model: &str,
    payload: &DiffPayload,
) -> Result<RequestPayload, TemplateError> {
    let diff_section = build_diff_section(payload);

    match shape {
        ApiShape::OpenRouterLike => {
            let system = templates.require(templates::OPENROUTER_SYSTEM)?;
            let user = templates.require(templates::OPENROUTER_USER)?;

            let user = render(
                &user,
                &[
                    ("changes", payload.file_changes.as_str()),
                    ("diff_section", diff_section.as_str()),
                ],
            );

            Ok(RequestPayload::Chat(ChatRequest {
                model: model.to_string(),
                stream: false,
                messages: vec![
                    ChatMessage {
                        role: "system",
                        content: system,
                    },
                    ChatMessage {
                        role: "user",
                        content: user,
                    },
                ],
            }))
        }
        ApiShape::OllamaLike => {
            let tier = ModelTier::resolve(model);
            debug!("Model '{}' resolved to {} tier", model, tier);

            let base = templates.require(templates::OLLAMA_BASE)?;
            let instructions = build_instructions(templates, tier, payload)?;
            let final_check = if tier.wants_guidance() {
                templates.require(templates::OLLAMA_FINAL_CHECK)?
            } else {
                String::new()
            };

            let prompt = render(
                &base,
                &[
                    ("changes", payload.file_changes.as_str()),
                    ("diff_section", diff_section.as_str()),
                    ("instructions", instructions.as_str()),
                    ("final_check", final_check.as_str()),
                ],
            );

            Ok(RequestPayload::Generate(GenerateRequest {
                model: model.to_string(),
                prompt: prompt.trim_end().to_string(),
                think: false,
                stream: false,
                options: GenerateOptions {
                    temperature: GENERATE_TEMPERATURE,
                    top_p: GENERATE_TOP_P,
                },
            }))
        }
    }
}

/// The diff (full or truncated) or, for oversized diffs, the file statistics.
pub fn build_diff_section(payload: &DiffPayload) -> String {
    if payload.uses_diff() {
        format!("## Diff:\n<diff>\n{}\n</diff>", payload.diff_text)
    } else {
        format!(
            "## File statistics:\n<file_stats>\n{}\n</file_stats>\n\n\
             Note: Diff content was too large to include. Please generate commit message based on file changes and statistics only.",
            payload.stat_summary
        )
    }
}

/// Tier-specific instructions, plus change hints for small and medium models.
pub fn build_instructions(
    templates: &TemplateStore,
    tier: ModelTier,
    payload: &DiffPayload,
) -> Result<String, TemplateError> {
    let name = match tier {
        ModelTier::Small => templates::OLLAMA_SMALL,
        ModelTier::Medium => templates::OLLAMA_MEDIUM,
        ModelTier::Large => templates::OLLAMA_LARGE,
    };
    let mut instructions = templates.require(name)?;

    if tier.wants_guidance() {
        let evidence = if payload.uses_diff() {
            &payload.diff_text
        } else {
            &payload.stat_summary
        };
        let hints = detect_hints(&payload.file_changes, evidence);
        if !hints.is_empty() {
            debug!("Change hints: {:?}", hints);
            instructions.push_str("\n\n");
            instructions.push_str(
                &hints
                    .iter()
                    .map(|h| h.advice())
                    .collect::<Vec<_>>()
                    .join("\n"),
            );
        }
    }

    Ok(instructions)
}

/// Substitute `{name}` slots in a single pass.
///
/// Substituted values are never rescanned, so a diff that happens to contain
/// `{instructions}` is left as-is. Unknown `{...}` sequences are kept verbatim.
pub fn render(template: &str, slots: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let slot = after.find('}').and_then(|close| {
            let key = &after[..close];
            slots
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (close, *value))
        });

        match slot {
            Some((close, value)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
