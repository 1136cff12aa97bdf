//! End-to-end router tests over the JSON API, all in demo mode (no network).

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::util::ServiceExt;

use lets_talk::agent::SubjectAgent;
use lets_talk::config::{load_from, EnvOverrides};
use lets_talk::llm::providers;
use lets_talk::subjects::SubjectLibrary;
use lets_talk::web::{build_router, AppState, HealthState};

fn manifest_path(rel: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join(rel)
}

/// State wired exactly as `main` does for a keyless process: demo mode.
fn demo_state() -> AppState {
    let config = load_from(None, &EnvOverrides::default()).unwrap();
    let library =
        Arc::new(SubjectLibrary::load(&manifest_path("config/subjects.json")).unwrap());
    let agent = SubjectAgent::new(None, false, manifest_path("config/prompts"));
    AppState {
        config: Arc::new(config),
        library,
        agent,
        health: HealthState::new(false, "demo mode — no live provider"),
    }
}

/// State for `llm_only` with a live provider selected but no credential:
/// every chat call must fail, never serve demo text.
fn llm_only_without_credentials_state() -> AppState {
    let env = EnvOverrides {
        provider: Some("openai".into()),
        llm_only: Some("true".into()),
        ..Default::default()
    };
    let config = load_from(None, &env).unwrap();
    let client = providers::resolve(&config.llm).unwrap();
    assert!(client.is_some(), "llm_only must build a client even without a key");
    let library =
        Arc::new(SubjectLibrary::load(&manifest_path("config/subjects.json")).unwrap());
    let agent = SubjectAgent::new(client, true, manifest_path("config/prompts"));
    AppState {
        config: Arc::new(config),
        library,
        agent,
        health: HealthState::new(true, "ok"),
    }
}

async fn request(state: &AppState, req: Request<Body>) -> (StatusCode, Value) {
    let response = build_router(state.clone()).oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::String(
            String::from_utf8_lossy(&bytes).into_owned(),
        ))
    };
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

// ── /health ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn health_without_provider_is_degraded_demo() {
    let state = demo_state();
    let (status, body) = request(&state, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["provider"], "demo");
    assert!(body["subject_count"].as_u64().unwrap() > 0);
}

// ── /api/chat ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn chat_in_demo_mode_is_deterministic() {
    let state = demo_state();
    let payload = json!({ "subject_id": "physics", "message": "why is the sky blue?" });

    let (status, first) = request(&state, post_json("/api/chat", payload.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["role"], "subject");
    assert_eq!(first["subject_id"], "physics");
    assert_eq!(first["degraded"], false);
    assert!(!first["text"].as_str().unwrap().is_empty());
    assert_eq!(first["suggestions"].as_array().unwrap().len(), 3);

    let (_, second) = request(&state, post_json("/api/chat", payload)).await;
    assert_eq!(first["text"], second["text"]);
}

#[tokio::test]
async fn chat_with_history_still_succeeds() {
    let state = demo_state();
    let payload = json!({
        "subject_id": "economics",
        "message": "so is it worth it?",
        "history": [
            { "role": "user", "text": "what does it cost?" },
            { "role": "subject", "subject_id": "economics", "text": "count the opportunity cost." }
        ]
    });
    let (status, body) = request(&state, post_json("/api/chat", payload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["subject_id"], "economics");
}

#[tokio::test]
async fn chat_unknown_subject_is_404() {
    let state = demo_state();
    let payload = json!({ "subject_id": "alchemy", "message": "turn lead into gold" });
    let (status, body) = request(&state, post_json("/api/chat", payload)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn chat_empty_message_is_400() {
    let state = demo_state();
    let payload = json!({ "subject_id": "physics", "message": "   " });
    let (status, body) = request(&state, post_json("/api/chat", payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn llm_only_without_credentials_never_serves_demo_text() {
    let state = llm_only_without_credentials_state();
    let payload = json!({ "subject_id": "physics", "message": "why is the sky blue?" });
    let (status, body) = request(&state, post_json("/api/chat", payload)).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "auth");
}

#[tokio::test]
async fn llm_only_without_credentials_fails_the_blind_box_too() {
    let state = llm_only_without_credentials_state();
    let payload = json!({ "question": "why do habits stick?" });
    let (status, _) = request(&state, post_json("/api/ask", payload)).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

// ── /api/subjects ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn subjects_index_groups_by_tag() {
    let state = demo_state();
    let (status, body) = request(&state, get("/api/subjects")).await;
    assert_eq!(status, StatusCode::OK);
    for group in ["popular", "niche", "crossover"] {
        assert!(body[group].is_array(), "missing group {group}");
    }
    assert!(!body["popular"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn random_subjects_are_distinct_catalog_members() {
    let state = demo_state();
    for _ in 0..10 {
        let (status, body) = request(&state, get("/api/subjects/random?n=3")).await;
        assert_eq!(status, StatusCode::OK);
        let subjects = body["subjects"].as_array().unwrap();
        assert_eq!(subjects.len(), 3);
        let ids: HashSet<&str> = subjects
            .iter()
            .map(|s| s["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids.len(), 3, "duplicate ids in one draw");
        for id in ids {
            assert!(state.library.get(id).is_ok());
        }
    }
}

#[tokio::test]
async fn random_subjects_cap_at_catalog_size() {
    let state = demo_state();
    let total = state.library.len();
    let (_, body) = request(&state, get("/api/subjects/random?n=999")).await;
    assert_eq!(body["subjects"].as_array().unwrap().len(), total);
}

// ── /api/ask ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn ask_returns_one_answer_per_picked_subject() {
    let state = demo_state();
    let payload = json!({ "question": "why do prices rise?", "subject_count": 4 });
    let (status, body) = request(&state, post_json("/api/ask", payload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["demo_mode"], true);
    assert_eq!(body["provider"], "demo");
    let subjects = body["subjects"].as_array().unwrap();
    assert_eq!(subjects.len(), 4);
    for s in subjects {
        assert!(!s["answer"].as_str().unwrap().is_empty());
        assert_eq!(s["degraded"], false);
    }
}

#[tokio::test]
async fn ask_empty_question_is_400() {
    let state = demo_state();
    let (status, _) = request(&state, post_json("/api/ask", json!({ "question": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ── /api/pk ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn pk_alternates_speakers() {
    let state = demo_state();
    let payload = json!({
        "question": "is free will real?",
        "subject1": "physics",
        "subject2": "philosophy",
        "max_statements": 4
    });
    let (status, body) = request(&state, post_json("/api/pk", payload)).await;
    assert_eq!(status, StatusCode::OK);
    let statements = body["statements"].as_array().unwrap();
    assert_eq!(statements.len(), 4);
    let speakers: Vec<&str> = statements
        .iter()
        .map(|s| s["speaker"].as_str().unwrap())
        .collect();
    assert_eq!(speakers, ["subject1", "subject2", "subject1", "subject2"]);
    assert_eq!(body["round"], 1);
    assert_eq!(body["has_more"], true);
    assert!(body.get("fun_fact").is_none());
}

#[tokio::test]
async fn pk_final_round_carries_a_fun_fact() {
    let state = demo_state();
    let payload = json!({
        "question": "is free will real?",
        "subject1": "physics",
        "subject2": "philosophy",
        "round": 3,
        "max_statements": 2
    });
    let (_, body) = request(&state, post_json("/api/pk", payload)).await;
    assert_eq!(body["has_more"], false);
    let fact = body["fun_fact"].as_str().unwrap();
    assert!(fact.contains("Physics") && fact.contains("Philosophy"));
}

#[tokio::test]
async fn pk_same_subject_is_400() {
    let state = demo_state();
    let payload = json!({
        "question": "q",
        "subject1": "physics",
        "subject2": "physics"
    });
    let (status, _) = request(&state, post_json("/api/pk", payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn pk_unknown_subject_is_404() {
    let state = demo_state();
    let payload = json!({
        "question": "q",
        "subject1": "physics",
        "subject2": "alchemy"
    });
    let (status, _) = request(&state, post_json("/api/pk", payload)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ── /api/school-pk ────────────────────────────────────────────────────────────

#[tokio::test]
async fn school_pk_runs_between_two_schools() {
    let state = demo_state();
    let payload = json!({
        "question": "why do habits stick?",
        "subject_id": "psychology",
        "school1": "Behaviorism",
        "school2": "Psychoanalysis",
        "max_statements": 2
    });
    let (status, body) = request(&state, post_json("/api/school-pk", payload)).await;
    assert_eq!(status, StatusCode::OK);
    let statements = body["statements"].as_array().unwrap();
    assert_eq!(statements.len(), 2);
    assert_eq!(statements[0]["name"], "Behaviorism");
    assert_eq!(statements[1]["name"], "Psychoanalysis");
}

#[tokio::test]
async fn school_pk_unknown_school_is_404() {
    let state = demo_state();
    let payload = json!({
        "question": "q",
        "subject_id": "psychology",
        "school1": "Behaviorism",
        "school2": "Gestalt"
    });
    let (status, _) = request(&state, post_json("/api/school-pk", payload)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ── Pages ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn landing_and_chat_pages_serve_html() {
    let state = demo_state();
    for uri in ["/", "/chat"] {
        let response = build_router(state.clone())
            .oneshot(get(uri))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(String::from_utf8_lossy(&bytes).contains("Let's Talk"));
    }
}

#[tokio::test]
async fn favicon_is_no_content() {
    let state = demo_state();
    let response = build_router(state.clone())
        .oneshot(get("/favicon.ico"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}
