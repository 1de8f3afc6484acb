//! Integration tests for the HTTP transport and end-to-end generation against
//! a mocked provider.

mod common;

use std::time::Duration;

use cmai::commit::{DiffPayload, generate_commit_message};
use cmai::config::Settings;
use cmai::error::{GenerateError, ResponseError, TransportError};
use cmai::llm::{HttpTransport, Provider};
use cmai::templates::TemplateStore;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn transport() -> HttpTransport {
    HttpTransport::new(Duration::from_secs(5))
}

fn payload() -> DiffPayload {
    DiffPayload::from_parts(
        "M\tsrc/utils.py",
        "-if len(sys.argv)<2:\n+if len(sys.argv) < 2:",
        || unreachable!(),
    )
    .unwrap()
}

fn settings(provider: Provider, base_url: String, model: &str, key: Option<&str>) -> Settings {
    Settings {
        provider,
        base_url,
        model: model.to_string(),
        api_key: key.map(str::to_string),
    }
}

#[tokio::test]
async fn test_openrouter_request_headers_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .and(header("Authorization", "Bearer sk-or-test"))
        .and(header("HTTP-Referer", "https://github.com/mrgoonie/cmai"))
        .and(header("X-Title", "cmai - AI Commit Message Generator"))
        .and(header("Content-Type", "application/json"))
        .and(body_partial_json(json!({
            "model": "google/gemini-flash-1.5-8b",
            "stream": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "style(utils): normalize operator spacing"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let templates = TemplateStore::from_dir(common::templates_dir());
    let settings = settings(
        Provider::OpenRouter,
        format!("{}/api/v1", server.uri()),
        "google/gemini-flash-1.5-8b",
        Some("sk-or-test"),
    );

    let message = generate_commit_message(&templates, &settings, &payload(), &transport())
        .await
        .unwrap();
    assert_eq!(message, "style(utils): normalize operator spacing");
}

#[tokio::test]
async fn test_ollama_generate_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({
            "model": "qwen3:1.7b",
            "think": false,
            "stream": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "qwen3:1.7b",
            "response": "style(utils): add spaces around comparison\\n\\n- no behavior change",
            "done": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let templates = TemplateStore::from_dir(common::templates_dir());
    let settings = settings(
        Provider::Ollama,
        format!("{}/api", server.uri()),
        "qwen3:1.7b",
        None,
    );

    let message = generate_commit_message(&templates, &settings, &payload(), &transport())
        .await
        .unwrap();
    assert_eq!(
        message,
        "style(utils): add spaces around comparison\n\n- no behavior change"
    );

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("Authorization").is_none());

    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let prompt = body["prompt"].as_str().unwrap();
    assert!(prompt.contains("src/utils.py"));
    assert!(prompt.contains("Hint:"));
}

#[tokio::test]
async fn test_custom_provider_without_key_sends_no_authorization() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "fix: handle missing argument"}}]
        })))
        .mount(&server)
        .await;

    let templates = TemplateStore::from_dir(common::templates_dir());
    let settings = settings(Provider::Custom, format!("{}/v1/", server.uri()), "local", None);

    generate_commit_message(&templates, &settings, &payload(), &transport())
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("Authorization").is_none());
}

#[tokio::test]
async fn test_non_success_status_carries_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string(r#"{"error": "invalid key"}"#))
        .mount(&server)
        .await;

    let templates = TemplateStore::from_dir(common::templates_dir());
    let settings = settings(
        Provider::OpenRouter,
        server.uri(),
        "google/gemini-flash-1.5-8b",
        Some("bad"),
    );

    let err = generate_commit_message(&templates, &settings, &payload(), &transport())
        .await
        .unwrap_err();
    match err {
        GenerateError::Transport(TransportError::Status { status, body, .. }) => {
            assert_eq!(status, 401);
            assert!(body.contains("invalid key"));
        }
        other => panic!("Expected TransportError::Status, got {:?}", other),
    }
}

#[tokio::test]
async fn test_html_error_page_is_response_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let templates = TemplateStore::from_dir(common::templates_dir());
    let settings = settings(Provider::LmStudio, server.uri(), "default", None);

    let err = generate_commit_message(&templates, &settings, &payload(), &transport())
        .await
        .unwrap_err();
    match err {
        GenerateError::Response(e @ ResponseError::InvalidJson { .. }) => {
            assert_eq!(e.raw(), "<html>gateway</html>");
        }
        other => panic!("Expected ResponseError::InvalidJson, got {:?}", other),
    }
}

#[tokio::test]
async fn test_deadline_is_enforced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"response": "late"}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let templates = TemplateStore::from_dir(common::templates_dir());
    let settings = settings(Provider::Ollama, server.uri(), "qwen3:8b", None);
    let transport = HttpTransport::new(Duration::from_millis(200));

    let err = generate_commit_message(&templates, &settings, &payload(), &transport)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        GenerateError::Transport(TransportError::Request { .. })
    ));
}
