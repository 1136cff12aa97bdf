//! Axum handlers for the JSON API.
//!
//! Each handler receives [`AppState`] via [`axum::extract::State`] and
//! returns an axum [`Response`]. Non-2xx responses carry a uniform
//! `{error, message}` body. Live-call failures surface as 502/504 only in
//! `llm_only` mode — otherwise the agent has already degraded to a canned
//! answer and the response is a plain 200 with `degraded: true`.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rand::seq::SliceRandom;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::agent::{AgentReply, ConversationTurn};
use crate::llm::LlmError;
use crate::subjects::{Subject, SubjectTag};

use super::AppState;

/// A debate runs at most this many rounds.
const MAX_ROUNDS: u32 = 3;
/// Cap on statements generated per debate request.
const MAX_STATEMENTS: usize = 10;
/// Subjects picked by the blind-box opener when the caller does not say.
const DEFAULT_SUBJECT_COUNT: usize = 3;

// ── Request types ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct ChatRequest {
    subject_id: String,
    message: String,
    #[serde(default)]
    history: Vec<ConversationTurn>,
}

#[derive(Deserialize)]
pub(super) struct AskRequest {
    question: String,
    subject_count: Option<usize>,
}

#[derive(Deserialize)]
pub(super) struct RandomParams {
    n: Option<usize>,
}

#[derive(Deserialize)]
pub(super) struct PkRequest {
    question: String,
    subject1: String,
    subject2: String,
    #[serde(default = "default_round")]
    round: u32,
    #[serde(default)]
    history: Vec<ConversationTurn>,
    max_statements: Option<usize>,
}

#[derive(Deserialize)]
pub(super) struct SchoolPkRequest {
    question: String,
    subject_id: String,
    school1: String,
    school2: String,
    #[serde(default = "default_round")]
    round: u32,
    #[serde(default)]
    history: Vec<ConversationTurn>,
    max_statements: Option<usize>,
}

fn default_round() -> u32 {
    1
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Build a JSON error response body.
fn json_error(code: &str, msg: impl std::fmt::Display) -> Json<Value> {
    Json(json!({ "error": code, "message": format!("{msg}") }))
}

/// Surface a live-call failure to the HTTP caller (`llm_only` path).
fn llm_error_response(e: LlmError) -> Response {
    let (status, code) = match &e {
        LlmError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "timeout"),
        LlmError::Auth(_) => (StatusCode::BAD_GATEWAY, "auth"),
        LlmError::RateLimit(_) => (StatusCode::BAD_GATEWAY, "rate_limit"),
        LlmError::Network(_) => (StatusCode::BAD_GATEWAY, "network"),
        LlmError::MalformedResponse(_) => (StatusCode::BAD_GATEWAY, "malformed_response"),
    };
    (status, json_error(code, e)).into_response()
}

fn bad_request(msg: impl std::fmt::Display) -> Response {
    (StatusCode::BAD_REQUEST, json_error("bad_request", msg)).into_response()
}

fn not_found(msg: impl std::fmt::Display) -> Response {
    (StatusCode::NOT_FOUND, json_error("not_found", msg)).into_response()
}

/// Listing shape shared by the catalog and random-pick endpoints.
fn subject_summary(subject: &Subject) -> Value {
    json!({
        "id": subject.id,
        "name": subject.name,
        "icon": subject.icon,
        "display_name": subject.display_name(),
        "description": subject.description,
        "tag": subject.tag,
        "schools": subject.schools,
    })
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// GET /health
pub(super) async fn health(State(state): State<AppState>) -> Response {
    let provider_health = state.health.snapshot().await;
    let degraded = state.agent.is_demo() || !provider_health.reachable;
    let body = json!({
        "status": if degraded { "degraded" } else { "ok" },
        "provider": state.agent.provider_name(),
        "llm_only": state.config.llm.llm_only,
        "subject_count": state.library.len(),
        "detail": provider_health.message,
    });
    (StatusCode::OK, Json(body)).into_response()
}

/// GET /api/subjects — full catalog grouped by tag.
pub(super) async fn subjects_index(State(state): State<AppState>) -> Response {
    let group = |tag| -> Vec<Value> {
        state
            .library
            .by_tag(tag)
            .into_iter()
            .map(subject_summary)
            .collect()
    };
    let body = json!({
        "popular": group(SubjectTag::Popular),
        "niche": group(SubjectTag::Niche),
        "crossover": group(SubjectTag::Crossover),
    });
    (StatusCode::OK, Json(body)).into_response()
}

/// GET /api/subjects/random?n=k
pub(super) async fn subjects_random(
    State(state): State<AppState>,
    Query(params): Query<RandomParams>,
) -> Response {
    let n = params.n.unwrap_or(DEFAULT_SUBJECT_COUNT).max(1);
    let picked: Vec<Value> = state
        .library
        .random_subset(n)
        .into_iter()
        .map(subject_summary)
        .collect();
    (StatusCode::OK, Json(json!({ "subjects": picked }))).into_response()
}

/// POST /api/chat — one deep-dive turn with a single subject.
pub(super) async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Response {
    let message = req.message.trim();
    if message.is_empty() {
        return bad_request("message must not be empty");
    }
    let subject = match state.library.get(&req.subject_id) {
        Ok(s) => s,
        Err(e) => return not_found(e),
    };

    let AgentReply { turn, degraded } = match state.agent.respond(subject, &req.history, message).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!(subject_id = %subject.id, "chat turn failed: {e}");
            return llm_error_response(e);
        }
    };

    // Follow-up prompts ride along with the reply, same fallback contract.
    let (suggestions, suggestions_degraded) =
        match state.agent.suggestions(subject, message, &turn.text).await {
            Ok(result) => result,
            Err(e) => {
                warn!(subject_id = %subject.id, "suggestions failed: {e}");
                return llm_error_response(e);
            }
        };

    let body = json!({
        "role": "subject",
        "subject_id": subject.id,
        "text": turn.text,
        "degraded": degraded || suggestions_degraded,
        "suggestions": suggestions,
        "timestamp": turn.timestamp,
    });
    (StatusCode::OK, Json(body)).into_response()
}

/// POST /api/ask — blind-box opener: several subjects, one sentence each.
pub(super) async fn ask(
    State(state): State<AppState>,
    Json(req): Json<AskRequest>,
) -> Response {
    let question = req.question.trim();
    if question.is_empty() {
        return bad_request("question must not be empty");
    }
    let count = req
        .subject_count
        .unwrap_or(DEFAULT_SUBJECT_COUNT)
        .clamp(1, MAX_STATEMENTS);

    let picked = state.library.rank_by_relevance(question, count);
    let mut answers = Vec::with_capacity(picked.len());
    for subject in picked {
        match state.agent.one_sentence_answer(subject, question).await {
            Ok(AgentReply { turn, degraded }) => answers.push(json!({
                "id": subject.id,
                "name": subject.name,
                "icon": subject.icon,
                "display_name": subject.display_name(),
                "description": subject.description,
                "answer": turn.text,
                "degraded": degraded,
                "schools": subject.schools,
            })),
            Err(e) => {
                warn!(subject_id = %subject.id, "blind-box answer failed: {e}");
                return llm_error_response(e);
            }
        }
    }

    let body = json!({
        "question": question,
        "subjects": answers,
        "demo_mode": state.agent.is_demo(),
        "provider": state.agent.provider_name(),
    });
    (StatusCode::OK, Json(body)).into_response()
}

/// POST /api/pk — two subjects debate in alternating statements.
pub(super) async fn pk(
    State(state): State<AppState>,
    Json(req): Json<PkRequest>,
) -> Response {
    let question = req.question.trim();
    if question.is_empty() {
        return bad_request("question must not be empty");
    }
    if req.subject1 == req.subject2 {
        return bad_request("pick two different subjects for a debate");
    }
    let first = match state.library.get(&req.subject1) {
        Ok(s) => s,
        Err(e) => return not_found(e),
    };
    let second = match state.library.get(&req.subject2) {
        Ok(s) => s,
        Err(e) => return not_found(e),
    };

    let round = req.round.clamp(1, MAX_ROUNDS);
    let count = req.max_statements.unwrap_or(MAX_STATEMENTS).clamp(1, MAX_STATEMENTS);

    let mut statements = Vec::with_capacity(count);
    for i in 0..count {
        let (speaker, subject) = if i % 2 == 0 {
            ("subject1", first)
        } else {
            ("subject2", second)
        };
        let turn_no = (i / 2 + 1) as u32;
        match state
            .agent
            .pk_statement(subject, question, &req.history, round, turn_no)
            .await
        {
            Ok(AgentReply { turn, degraded }) => statements.push(json!({
                "speaker": speaker,
                "subject_id": subject.id,
                "name": subject.name,
                "icon": subject.icon,
                "text": turn.text,
                "degraded": degraded,
            })),
            Err(e) => {
                warn!(subject_id = %subject.id, "debate statement failed: {e}");
                return llm_error_response(e);
            }
        }
    }

    let has_more = round < MAX_ROUNDS;
    let mut body = json!({
        "question": question,
        "statements": statements,
        "round": round,
        "has_more": has_more,
        "subject1": { "id": first.id, "name": first.name, "icon": first.icon },
        "subject2": { "id": second.id, "name": second.name, "icon": second.icon },
        "demo_mode": state.agent.is_demo(),
    });
    if !has_more {
        body["fun_fact"] = Value::String(fun_fact(&first.name, &second.name));
    }
    (StatusCode::OK, Json(body)).into_response()
}

/// POST /api/school-pk — two schools of one subject debate.
pub(super) async fn school_pk(
    State(state): State<AppState>,
    Json(req): Json<SchoolPkRequest>,
) -> Response {
    let question = req.question.trim();
    if question.is_empty() {
        return bad_request("question must not be empty");
    }
    if req.school1 == req.school2 {
        return bad_request("pick two different schools for a debate");
    }
    let subject = match state.library.get(&req.subject_id) {
        Ok(s) => s,
        Err(e) => return not_found(e),
    };
    let Some(first) = subject.school(&req.school1) else {
        return not_found(format!("unknown school: {}", req.school1));
    };
    let Some(second) = subject.school(&req.school2) else {
        return not_found(format!("unknown school: {}", req.school2));
    };

    let round = req.round.clamp(1, MAX_ROUNDS);
    let count = req.max_statements.unwrap_or(MAX_STATEMENTS).clamp(1, MAX_STATEMENTS);

    let mut statements = Vec::with_capacity(count);
    for i in 0..count {
        let (speaker, school) = if i % 2 == 0 {
            ("school1", first)
        } else {
            ("school2", second)
        };
        let turn_no = (i / 2 + 1) as u32;
        match state
            .agent
            .school_statement(subject, school, question, &req.history, round, turn_no)
            .await
        {
            Ok(AgentReply { turn, degraded }) => statements.push(json!({
                "speaker": speaker,
                "name": school.name,
                "icon": school.icon,
                "text": turn.text,
                "degraded": degraded,
            })),
            Err(e) => {
                warn!(subject_id = %subject.id, school = %school.name, "school statement failed: {e}");
                return llm_error_response(e);
            }
        }
    }

    let has_more = round < MAX_ROUNDS;
    let mut body = json!({
        "question": question,
        "subject_id": subject.id,
        "statements": statements,
        "round": round,
        "has_more": has_more,
        "school1": { "name": first.name, "icon": first.icon },
        "school2": { "name": second.name, "icon": second.icon },
        "demo_mode": state.agent.is_demo(),
    });
    if !has_more {
        body["fun_fact"] = Value::String(format!(
            "💡 {} and {} disagree, yet both enriched the theoretical fabric of {} — reading across schools is how depth is built.",
            first.name, second.name, subject.name
        ));
    }
    (StatusCode::OK, Json(body)).into_response()
}

/// Closing trivia line for a finished cross-subject debate.
fn fun_fact(subject1: &str, subject2: &str) -> String {
    let facts = [
        format!("💡 Curiously, {subject1} and {subject2} were once branches of the same field."),
        format!("💡 People who think through both {subject1} and {subject2} lenses report markedly higher creative output."),
        format!("💡 Many landmark discoveries came from minds fluent in both {subject1} and {subject2} — cross-discipline thinking drives breakthroughs."),
        format!("💡 In antiquity, {subject1} and {subject2} were treated as two complementary ways of reading the world."),
        format!("💡 The meeting point of {subject1} and {subject2} keeps spawning new frontier fields."),
    ];
    let mut rng = rand::thread_rng();
    facts
        .choose(&mut rng)
        .cloned()
        .unwrap_or_else(|| facts[0].clone())
}
