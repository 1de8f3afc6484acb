//! Commit message generation: build the request, send it, read the reply.

use tracing::debug;

use crate::commit::diff::DiffPayload;
use crate::commit::prompt::build_request;
use crate::config::Settings;
use crate::error::GenerateError;
use crate::llm::{Transport, extract_message};
use crate::templates::TemplateStore;

/// Generate a commit message for the staged changes.
///
/// One request, no retries. Any failure is terminal for the run.
pub async fn generate_commit_message(
    templates: &TemplateStore,
    settings: &Settings,
    payload: &DiffPayload,
    transport: &dyn Transport,
) -> Result<String, GenerateError> {
    let profile = settings.provider.profile();
    let request = build_request(templates, profile.shape, &settings.model, payload)?;

    let url = profile.url(&settings.base_url);
    debug!("Provider: {}", settings.provider);
    debug!("Model: {}", request.model());
    debug!("API URL: {}", url);
    debug!("Request payload:\n{}", request.to_pretty_json());

    let headers = profile.headers(settings.api_key.as_deref());
    let raw = transport.post(&url, &headers, &request).await?;
    debug!("API response:\n{}", raw);

    let message = extract_message(profile.shape, &raw)?;
    debug!("Generated commit message: {}", message);

    Ok(message)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::commit::RequestPayload;
    use crate::error::{ResponseError, TemplateError, TransportError};
    use crate::llm::Provider;
    use crate::templates;

    /// Records the last request and replies with a canned body.
    struct FakeTransport {
        reply: Result<String, u16>,
        seen: Mutex<Option<(String, Vec<(String, String)>, RequestPayload)>>,
    }

    impl FakeTransport {
        fn replying(body: &str) -> Self {
            Self {
                reply: Ok(body.to_string()),
                seen: Mutex::new(None),
            }
        }

        fn failing(status: u16) -> Self {
            Self {
                reply: Err(status),
                seen: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn post(
            &self,
            url: &str,
            headers: &[(String, String)],
            body: &RequestPayload,
        ) -> Result<String, TransportError> {
            *self.seen.lock().unwrap() = Some((url.to_string(), headers.to_vec(), body.clone()));
            match &self.reply {
                Ok(body) => Ok(body.clone()),
                Err(status) => Err(TransportError::Status {
                    url: url.to_string(),
                    status: *status,
                    body: "upstream error".to_string(),
                }),
            }
        }
    }

    fn template_store() -> (tempfile::TempDir, TemplateStore) {
        let dir = tempfile::tempdir().unwrap();
        for (name, body) in [
            (templates::OPENROUTER_SYSTEM, "system"),
            (templates::OPENROUTER_USER, "{changes}\n{diff_section}"),
            (templates::OLLAMA_BASE, "{changes}\n{diff_section}\n{instructions}\n{final_check}"),
            (templates::OLLAMA_SMALL, "small"),
            (templates::OLLAMA_MEDIUM, "medium"),
            (templates::OLLAMA_LARGE, "large"),
            (templates::OLLAMA_FINAL_CHECK, "check"),
        ] {
            fs::write(dir.path().join(name), body).unwrap();
        }
        let store = TemplateStore::from_dir(dir.path());
        (dir, store)
    }

    fn payload() -> DiffPayload {
        DiffPayload::from_parts("M\tsrc/main.rs", "+fn main() {}", || unreachable!()).unwrap()
    }

    fn settings(provider: Provider, base_url: &str, model: &str, key: Option<&str>) -> Settings {
        Settings {
            provider,
            base_url: base_url.to_string(),
            model: model.to_string(),
            api_key: key.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_openrouter_flow() {
        let (_dir, store) = template_store();
        let transport = FakeTransport::replying(
            r#"{"choices": [{"message": {"content": "feat: add entry point"}}]}"#,
        );
        let settings = settings(
            Provider::OpenRouter,
            "https://openrouter.ai/api/v1",
            "google/gemini-flash-1.5-8b",
            Some("sk-or-test"),
        );

        let msg = generate_commit_message(&store, &settings, &payload(), &transport)
            .await
            .unwrap();
        assert_eq!(msg, "feat: add entry point");

        let (url, headers, body) = transport.seen.lock().unwrap().take().unwrap();
        assert_eq!(url, "https://openrouter.ai/api/v1/chat/completions");
        assert!(headers.contains(&("Authorization".to_string(), "Bearer sk-or-test".to_string())));
        assert!(matches!(body, RequestPayload::Chat(_)));
    }

    #[tokio::test]
    async fn test_ollama_flow() {
        let (_dir, store) = template_store();
        let transport = FakeTransport::replying(r#"{"response": "fix: handle empty input\\n"}"#);
        let settings = settings(Provider::Ollama, "http://localhost:11434/api", "qwen3:1.7b", None);

        let msg = generate_commit_message(&store, &settings, &payload(), &transport)
            .await
            .unwrap();
        assert_eq!(msg, "fix: handle empty input");

        let (url, headers, body) = transport.seen.lock().unwrap().take().unwrap();
        assert_eq!(url, "http://localhost:11434/api/generate");
        assert!(!headers.iter().any(|(name, _)| name == "Authorization"));
        assert!(matches!(body, RequestPayload::Generate(_)));
    }

    #[tokio::test]
    async fn test_missing_template_stops_before_request() {
        let dir = tempfile::tempdir().unwrap();
        let store = TemplateStore::from_dir(dir.path());
        let transport = FakeTransport::replying("{}");
        let settings = settings(Provider::LmStudio, "http://localhost:1234/v1", "default", None);

        let err = generate_commit_message(&store, &settings, &payload(), &transport)
            .await
            .unwrap_err();
        assert!(matches!(err, GenerateError::Template(TemplateError::Missing { .. })));
        assert!(transport.seen.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_http_failure_is_surfaced() {
        let (_dir, store) = template_store();
        let transport = FakeTransport::failing(401);
        let settings = settings(Provider::Custom, "https://llm.internal/v1", "m", None);

        let err = generate_commit_message(&store, &settings, &payload(), &transport)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GenerateError::Transport(TransportError::Status { status: 401, .. })
        ));
    }

    #[tokio::test]
    async fn test_unparseable_reply_keeps_raw_body() {
        let (_dir, store) = template_store();
        let transport = FakeTransport::replying(r#"{"error": "model not loaded"}"#);
        let settings = settings(Provider::Ollama, "http://localhost:11434/api", "qwen3:8b", None);

        let err = generate_commit_message(&store, &settings, &payload(), &transport)
            .await
            .unwrap_err();
        match err {
            GenerateError::Response(e @ ResponseError::MissingField { .. }) => {
                assert!(e.raw().contains("model not loaded"));
            }
            other => panic!("expected response error, got {other:?}"),
        }
    }
}
