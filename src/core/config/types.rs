//! Public configuration types.
//!
//! These are the resolved, ready-to-use structs that the rest of the crate
//! consumes. Raw TOML deserialization types live in `raw.rs`.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::core::error::AppError;

// ── Provider ─────────────────────────────────────────────────────────────────

/// Which LLM backend is active for the lifetime of the process.
///
/// `Demo` means no live backend at all — replies come from the canned answer
/// sets in the subject catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    Gemini,
    Huiyuan,
    Demo,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Gemini => "gemini",
            ProviderKind::Huiyuan => "huiyuan",
            ProviderKind::Demo => "demo",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "gemini" => Ok(ProviderKind::Gemini),
            "huiyuan" => Ok(ProviderKind::Huiyuan),
            "demo" => Ok(ProviderKind::Demo),
            other => Err(AppError::Config(format!(
                "unknown LLM provider '{other}' (expected openai, gemini, huiyuan or demo)"
            ))),
        }
    }
}

// ── Server ───────────────────────────────────────────────────────────────────

/// HTTP listener configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// ── LLM ──────────────────────────────────────────────────────────────────────

/// Per-provider connection settings. Populated from `[llm.<provider>]` in the
/// TOML, with `<PROVIDER>_MODEL` / `<PROVIDER>_BASE_URL` env overrides.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    /// Base URL of the vendor endpoint. Empty means "not configured", which
    /// is fatal for providers without a well-known default (huiyuan).
    pub api_base_url: String,
    /// Model name passed in the request body (or URL for Gemini).
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
    /// Maximum tokens to generate per reply.
    pub max_tokens: u32,
}

/// LLM configuration. The API keys come from env vars only — never TOML.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Which provider is active (`demo` disables live calls entirely).
    pub provider: ProviderKind,
    /// When set, a failed live call is surfaced to the caller instead of
    /// falling back to a canned answer.
    pub llm_only: bool,
    pub openai: ProviderSettings,
    pub gemini: ProviderSettings,
    pub huiyuan: ProviderSettings,
    pub openai_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub huiyuan_api_key: Option<String>,
}

impl LlmConfig {
    /// Settings of the active provider. Meaningless for `Demo` (returns the
    /// openai section, which is never used in that mode).
    pub fn active_settings(&self) -> &ProviderSettings {
        match self.provider {
            ProviderKind::Gemini => &self.gemini,
            ProviderKind::Huiyuan => &self.huiyuan,
            _ => &self.openai,
        }
    }

    /// API key of the active provider, if any was supplied in the env.
    pub fn active_api_key(&self) -> Option<&str> {
        let key = match self.provider {
            ProviderKind::OpenAi => &self.openai_api_key,
            ProviderKind::Gemini => &self.gemini_api_key,
            ProviderKind::Huiyuan => &self.huiyuan_api_key,
            ProviderKind::Demo => &None,
        };
        key.as_deref().filter(|k| !k.is_empty())
    }
}

// ── Subjects ─────────────────────────────────────────────────────────────────

/// Subject catalog and prompt template locations.
#[derive(Debug, Clone)]
pub struct SubjectsConfig {
    /// Path to the JSON subject catalog.
    pub catalog: PathBuf,
    /// Directory holding the plain-text prompt templates.
    pub prompts_dir: PathBuf,
}

// ── Config (root) ────────────────────────────────────────────────────────────

/// Fully-resolved application configuration. Built once at startup and
/// treated as immutable for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct Config {
    pub app_name: String,
    pub log_level: String,
    /// Optional append-mode log file; stderr when absent.
    pub log_file: Option<PathBuf>,
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub subjects: SubjectsConfig,
}
