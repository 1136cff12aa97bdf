//! LLM provider abstraction.
//!
//! [`LlmClient`] is an enum over concrete provider implementations. Add a new
//! variant + module in `providers/` for each additional backend.
//!
//! Provider instances are shared immutable capabilities — clone them freely
//! (the underlying `reqwest::Client` is an `Arc` internally). Enum dispatch
//! avoids `dyn` trait objects and the `async-trait` dependency; the active
//! variant is selected once at startup and never changes.
//!
//! All variants surface the same error taxonomy ([`LlmError`]) and the same
//! normalized operation: system prompt + prior turns + user message in,
//! reply text out. The client retries exactly once on a transient network
//! error, with a short fixed backoff; no other error kind is retried.

pub mod providers;

use std::time::Duration;

use thiserror::Error;
use tracing::warn;

/// Fixed pause before the single transient-error retry.
const RETRY_BACKOFF: Duration = Duration::from_millis(500);

// ── Errors ────────────────────────────────────────────────────────────────────

/// Call-scoped failures, uniform across providers.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Bad or missing API key (HTTP 401/403, or no key configured).
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Vendor-side throttling (HTTP 429).
    #[error("rate limited: {0}")]
    RateLimit(String),

    /// The request exceeded the configured per-request timeout.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Transport-level failure or vendor 5xx. Retried once.
    #[error("network error: {0}")]
    Network(String),

    /// The vendor returned an unexpected status or an undecodable body.
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),
}

impl LlmError {
    /// Only network errors are worth a second attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, LlmError::Network(_))
    }
}

// ── Normalized request/response types ────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

/// One prior turn of the conversation, already normalized for the wire.
/// The system prompt travels separately.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: ChatRole::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: ChatRole::Assistant, content: content.into() }
    }
}

/// Successful completion result.
#[derive(Debug, Clone)]
pub struct LlmReply {
    pub text: String,
}

// ── Client enum ──────────────────────────────────────────────────────────────

/// All available live provider backends.
///
/// Demo mode is *not* a variant — it is the absence of a client, decided at
/// startup by [`providers::resolve`].
#[derive(Debug, Clone)]
pub enum LlmClient {
    OpenAi(providers::openai_compatible::OpenAiCompatibleProvider),
    Gemini(providers::gemini::GeminiProvider),
    Huiyuan(providers::huiyuan::HuiyuanProvider),
}

impl LlmClient {
    /// Name used in health reports and log context.
    pub fn provider_name(&self) -> &'static str {
        match self {
            LlmClient::OpenAi(_) => "openai",
            LlmClient::Gemini(_) => "gemini",
            LlmClient::Huiyuan(_) => "huiyuan",
        }
    }

    /// Send one completion request, retrying once on a transient failure.
    pub async fn complete(
        &self,
        system: Option<&str>,
        history: &[ChatMessage],
        user_message: &str,
    ) -> Result<LlmReply, LlmError> {
        match self.complete_once(system, history, user_message).await {
            Err(e) if e.is_transient() => {
                warn!(
                    provider = self.provider_name(),
                    error = %e,
                    "transient failure — retrying once"
                );
                tokio::time::sleep(RETRY_BACKOFF).await;
                self.complete_once(system, history, user_message).await
            }
            other => other,
        }
    }

    async fn complete_once(
        &self,
        system: Option<&str>,
        history: &[ChatMessage],
        user_message: &str,
    ) -> Result<LlmReply, LlmError> {
        match self {
            LlmClient::OpenAi(p) => p.complete(system, history, user_message).await,
            LlmClient::Gemini(p) => p.complete(system, history, user_message).await,
            LlmClient::Huiyuan(p) => p.complete(system, history, user_message).await,
        }
    }

    /// Lightweight reachability probe used by the background health checker.
    pub async fn ping(&self) -> Result<(), LlmError> {
        match self {
            LlmClient::OpenAi(p) => p.ping().await,
            LlmClient::Gemini(p) => p.ping().await,
            LlmClient::Huiyuan(p) => p.ping().await,
        }
    }
}
