//! Subject-agent fallback contract against a live-but-failing provider.

use std::path::{Path, PathBuf};

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use lets_talk::agent::SubjectAgent;
use lets_talk::llm::providers::openai_compatible::OpenAiCompatibleProvider;
use lets_talk::llm::{LlmClient, LlmError};
use lets_talk::subjects::Subject;

fn prompts_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("config/prompts")
}

fn subject() -> Subject {
    serde_json::from_str(
        r#"{
            "id": "physics", "name": "Physics", "icon": "🔭",
            "description": "Matter and energy", "persona": "first principles",
            "demo_answers": ["Entropy explains it.", "Consider the energy balance."]
        }"#,
    )
    .unwrap()
}

fn agent_against(server: &MockServer, llm_only: bool, timeout_seconds: u64) -> SubjectAgent {
    let provider = OpenAiCompatibleProvider::new(
        format!("{}/v1/chat/completions", server.uri()),
        "test-model".to_string(),
        0.2,
        timeout_seconds,
        64,
        Some("sk-test".to_string()),
    )
    .unwrap();
    SubjectAgent::new(Some(LlmClient::OpenAi(provider)), llm_only, prompts_dir())
}

#[tokio::test]
async fn live_success_is_not_degraded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "content": "A live answer." } }]
        })))
        .mount(&server)
        .await;

    let agent = agent_against(&server, false, 5);
    let s = subject();
    let reply = agent.respond(&s, &[], "why?").await.unwrap();
    assert_eq!(reply.turn.text, "A live answer.");
    assert!(!reply.degraded);
}

#[tokio::test]
async fn provider_failure_degrades_to_the_canned_answer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("no"))
        .mount(&server)
        .await;

    let agent = agent_against(&server, false, 5);
    let s = subject();
    let reply = agent.respond(&s, &[], "why is the sky blue?").await.unwrap();
    assert!(reply.degraded);
    assert!(s.demo_answers.contains(&reply.turn.text));
}

#[tokio::test]
async fn timeout_without_llm_only_degrades_instead_of_erroring() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(std::time::Duration::from_secs(5))
                .set_body_json(json!({ "choices": [{ "message": { "content": "late" } }] })),
        )
        .mount(&server)
        .await;

    let agent = agent_against(&server, false, 1);
    let s = subject();
    let reply = agent.respond(&s, &[], "why?").await.unwrap();
    assert!(reply.degraded);
    assert!(s.demo_answers.contains(&reply.turn.text));
}

#[tokio::test]
async fn llm_only_propagates_the_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("no"))
        .mount(&server)
        .await;

    let agent = agent_against(&server, true, 5);
    let s = subject();
    let err = agent.respond(&s, &[], "why?").await.unwrap_err();
    assert!(matches!(err, LlmError::Auth(_)));
}

#[tokio::test]
async fn degraded_fallback_matches_the_demo_answer_for_the_same_message() {
    // The fallback must pick the same canned answer demo mode would, so a
    // flapping provider does not change the user-visible text.
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let s = subject();
    let degraded_agent = agent_against(&server, false, 5);
    let demo_agent = SubjectAgent::new(None, false, prompts_dir());

    let degraded = degraded_agent.respond(&s, &[], "why is the sky blue?").await.unwrap();
    let demo = demo_agent.respond(&s, &[], "why is the sky blue?").await.unwrap();
    assert_eq!(degraded.turn.text, demo.turn.text);
    assert!(degraded.degraded);
    assert!(!demo.degraded);
}
