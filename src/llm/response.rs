//! Pull the commit message out of a provider reply.

use serde_json::Value;

use crate::error::ResponseError;
use crate::llm::ApiShape;

/// Extract and normalize the commit message from a raw JSON reply.
///
/// Literal `\n` and `\r` sequences become real control characters and the
/// result is trimmed. An empty message is an error.
pub fn extract_message(shape: ApiShape, raw: &str) -> Result<String, ResponseError> {
    let value: Value = serde_json::from_str(raw).map_err(|_| ResponseError::InvalidJson {
        raw: raw.to_string(),
    })?;

    let message = match shape {
        ApiShape::OllamaLike => value
            .get("response")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ResponseError::MissingField {
                field: "response",
                raw: raw.to_string(),
            })?,
        ApiShape::OpenRouterLike => value
            .get("choices")
            .and_then(|choices| choices.get(0))
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(Value::as_str)
            .ok_or_else(|| ResponseError::MissingField {
                field: "choices[0].message.content",
                raw: raw.to_string(),
            })?,
    };

    let message = normalize(message);
    if message.is_empty() {
        return Err(ResponseError::EmptyMessage {
            raw: raw.to_string(),
        });
    }

    Ok(message)
}

/// Replace literal escape sequences some models emit and trim the result.
pub fn normalize(message: &str) -> String {
    message
        .replace("\\n", "\n")
        .replace("\\r", "\r")
        .trim()
        .to_string()
}
