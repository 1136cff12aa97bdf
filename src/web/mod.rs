//! HTTP layer — router, shared request state and the serve loop.
//!
//! The web layer owns request-scoped concerns only: it validates payloads,
//! sequences debate statements for display, and translates agent results
//! into HTTP responses. The components underneath are stateless per request;
//! everything in [`AppState`] is immutable after startup except the cached
//! provider-health snapshot.
//!
//! ## URL layout
//!
//! ```text
//! GET  /health                — readiness + active provider
//! GET  /api/subjects          — full catalog grouped by tag
//! GET  /api/subjects/random   — random subject subset (?n=k)
//! POST /api/ask               — blind-box opener, several one-liners
//! POST /api/chat              — one deep-dive turn with one subject
//! POST /api/pk                — two subjects debate
//! POST /api/school-pk         — two schools of one subject debate
//! GET  /favicon.ico           → 204
//! GET  /                      → landing page
//! GET  /chat                  → chat page
//! ```

mod api;
mod health;
mod ui;

pub use health::{spawn_health_checker, HealthState, ProviderHealth};

use std::sync::Arc;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::agent::SubjectAgent;
use crate::core::config::Config;
use crate::core::error::AppError;
use crate::subjects::SubjectLibrary;

// ── Shared request state ──────────────────────────────────────────────────────

/// Axum router state injected into every handler via
/// [`axum::extract::State`]. Cheap to clone — all fields are
/// reference-counted.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub library: Arc<SubjectLibrary>,
    pub agent: SubjectAgent,
    pub health: HealthState,
}

// ── Router ────────────────────────────────────────────────────────────────────

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // API routes
        .route("/health",              get(api::health))
        .route("/api/subjects",        get(api::subjects_index))
        .route("/api/subjects/random", get(api::subjects_random))
        .route("/api/ask",             post(api::ask))
        .route("/api/chat",            post(api::chat))
        .route("/api/pk",              post(api::pk))
        .route("/api/school-pk",       post(api::school_pk))
        // Pages
        .route("/favicon.ico", get(|| async { StatusCode::NO_CONTENT }))
        .route("/",            get(ui::landing))
        .route("/chat",        get(ui::chat_page))
        .with_state(state)
}

// ── Server loop ───────────────────────────────────────────────────────────────

/// Bind and serve until `shutdown` is cancelled.
pub async fn serve(state: AppState, shutdown: CancellationToken) -> Result<(), AppError> {
    let bind_addr = state.config.server.bind_addr();
    let router = build_router(state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| AppError::Server(format!("bind failed on {bind_addr}: {e}")))?;

    info!(%bind_addr, "http server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| AppError::Server(format!("server error: {e}")))?;

    info!("http server shut down");
    Ok(())
}
