//! LLM provider implementations.
//!
//! [`resolve`] is the startup factory: it inspects the provider config and
//! either returns a live [`LlmClient`] or `None` for demo mode. Status and
//! transport error mapping is shared across providers so every backend
//! surfaces the same [`LlmError`] taxonomy.

pub mod gemini;
pub mod huiyuan;
pub mod openai_compatible;

use tracing::warn;

use crate::core::config::{LlmConfig, ProviderKind};
use crate::core::error::AppError;

use super::{LlmClient, LlmError};

/// Decide the process-wide LLM mode, once, at startup.
///
/// - `provider = demo` → `Ok(None)` (demo mode). Combined with `llm_only`
///   this is a contradiction and fails the start.
/// - live provider, no API key, `llm_only` unset → warn and fall back to
///   demo mode.
/// - live provider, no API key, `llm_only` set → a client is still built;
///   every call will surface an authentication failure rather than demo
///   text.
pub fn resolve(config: &LlmConfig) -> Result<Option<LlmClient>, AppError> {
    match config.provider {
        ProviderKind::Demo => {
            if config.llm_only {
                return Err(AppError::Config(
                    "llm_only requires a live provider, but provider is 'demo'".into(),
                ));
            }
            Ok(None)
        }
        live => {
            let api_key = config.active_api_key().map(str::to_string);
            if api_key.is_none() && !config.llm_only {
                warn!(
                    provider = live.as_str(),
                    "no API key configured — falling back to demo mode"
                );
                return Ok(None);
            }
            build(live, config, api_key).map(Some)
        }
    }
}

fn build(
    kind: ProviderKind,
    config: &LlmConfig,
    api_key: Option<String>,
) -> Result<LlmClient, AppError> {
    let settings = config.active_settings().clone();
    let as_config_err = |e: LlmError| AppError::Config(e.to_string());
    match kind {
        ProviderKind::OpenAi => {
            let provider = openai_compatible::OpenAiCompatibleProvider::new(
                settings.api_base_url,
                settings.model,
                settings.temperature,
                settings.timeout_seconds,
                settings.max_tokens,
                api_key,
            )
            .map_err(as_config_err)?;
            Ok(LlmClient::OpenAi(provider))
        }
        ProviderKind::Gemini => {
            let provider = gemini::GeminiProvider::new(
                settings.api_base_url,
                settings.model,
                settings.temperature,
                settings.timeout_seconds,
                settings.max_tokens,
                api_key,
            )
            .map_err(as_config_err)?;
            Ok(LlmClient::Gemini(provider))
        }
        ProviderKind::Huiyuan => {
            if settings.api_base_url.is_empty() {
                return Err(AppError::Config(
                    "huiyuan provider requires a base URL (HUIYUAN_BASE_URL or [llm.huiyuan] api_base_url)".into(),
                ));
            }
            let provider = huiyuan::HuiyuanProvider::new(
                settings.api_base_url,
                settings.model,
                settings.temperature,
                settings.timeout_seconds,
                settings.max_tokens,
                api_key,
            )
            .map_err(as_config_err)?;
            Ok(LlmClient::Huiyuan(provider))
        }
        ProviderKind::Demo => Err(AppError::Config(
            "demo is not a live provider".into(),
        )),
    }
}

// ── Shared wire helpers ───────────────────────────────────────────────────────

/// Map a reqwest transport failure to the uniform taxonomy.
pub(super) fn map_transport_error(e: reqwest::Error) -> LlmError {
    if e.is_timeout() {
        LlmError::Timeout(e.to_string())
    } else {
        LlmError::Network(e.to_string())
    }
}

/// Consume the response and return it if successful, or a structured error.
///
/// Status mapping: 401/403 → `Auth`, 429 → `RateLimit`, 5xx → `Network`
/// (transient), anything else non-success → `MalformedResponse`.
pub(super) async fn check_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, LlmError> {
    use reqwest::StatusCode;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read error body>".to_string());
    let message = format!("HTTP {status}: {}", vendor_error_message(&body));

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(LlmError::Auth(message)),
        StatusCode::TOO_MANY_REQUESTS => Err(LlmError::RateLimit(message)),
        s if s.is_server_error() => Err(LlmError::Network(message)),
        _ => Err(LlmError::MalformedResponse(message)),
    }
}

/// Pull the human-readable message out of a vendor error envelope when the
/// body is JSON of the shape `{"error": {"message": ...}}`; otherwise return
/// the raw body.
fn vendor_error_message(body: &str) -> String {
    #[derive(serde::Deserialize)]
    struct Envelope {
        error: ErrorBody,
    }
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        message: String,
    }

    match serde_json::from_str::<Envelope>(body) {
        Ok(env) => env.error.message,
        Err(_) => body.to_string(),
    }
}
