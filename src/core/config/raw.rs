//! Raw TOML deserialization types.
//!
//! These structs mirror the TOML file shape and use `serde` defaults.
//! The `load` module converts them into the public `types` structs.

use serde::Deserialize;

// ── Top-level ────────────────────────────────────────────────────────────────

/// Raw TOML shape — serde target before resolution.
#[derive(Deserialize)]
pub(super) struct RawConfig {
    #[serde(default = "default_app_name")]
    pub app_name: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_file: Option<String>,
    #[serde(default)]
    pub server: RawServer,
    #[serde(default)]
    pub llm: RawLlm,
    #[serde(default)]
    pub subjects: RawSubjects,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            log_level: default_log_level(),
            log_file: None,
            server: RawServer::default(),
            llm: RawLlm::default(),
            subjects: RawSubjects::default(),
        }
    }
}

// ── Server ───────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct RawServer {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for RawServer {
    fn default() -> Self {
        Self { host: default_host(), port: default_port() }
    }
}

// ── LLM ──────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct RawLlm {
    #[serde(default = "default_llm_provider")]
    pub provider: String,
    #[serde(default)]
    pub llm_only: bool,
    #[serde(default = "default_openai")]
    pub openai: RawProviderSettings,
    #[serde(default = "default_gemini")]
    pub gemini: RawProviderSettings,
    #[serde(default = "default_huiyuan")]
    pub huiyuan: RawProviderSettings,
}

impl Default for RawLlm {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            llm_only: false,
            openai: default_openai(),
            gemini: default_gemini(),
            huiyuan: default_huiyuan(),
        }
    }
}

/// One `[llm.<provider>]` section. Absent fields fall back to `None` here and
/// are filled with per-provider defaults during resolution.
#[derive(Deserialize, Default)]
pub(super) struct RawProviderSettings {
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

// ── Subjects ─────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct RawSubjects {
    #[serde(default = "default_catalog")]
    pub catalog: String,
    #[serde(default = "default_prompts_dir")]
    pub prompts_dir: String,
}

impl Default for RawSubjects {
    fn default() -> Self {
        Self {
            catalog: default_catalog(),
            prompts_dir: default_prompts_dir(),
        }
    }
}

// ── Default functions (used by serde and by `load`) ──────────────────────────

fn default_app_name() -> String {
    "lets-talk".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

pub(super) fn default_host() -> String {
    "0.0.0.0".to_string()
}

pub(super) fn default_port() -> u16 {
    5002
}

fn default_llm_provider() -> String {
    "demo".to_string()
}

pub(super) fn default_catalog() -> String {
    "config/subjects.json".to_string()
}

pub(super) fn default_prompts_dir() -> String {
    "config/prompts".to_string()
}

pub(super) fn default_openai() -> RawProviderSettings {
    RawProviderSettings {
        api_base_url: Some("https://api.openai.com/v1/chat/completions".to_string()),
        model: Some("gpt-3.5-turbo".to_string()),
        temperature: Some(0.7),
        timeout_seconds: Some(30),
        max_tokens: Some(400),
    }
}

pub(super) fn default_gemini() -> RawProviderSettings {
    RawProviderSettings {
        api_base_url: Some("https://generativelanguage.googleapis.com/v1beta".to_string()),
        model: Some("gemini-1.5-flash".to_string()),
        temperature: Some(0.7),
        timeout_seconds: Some(30),
        max_tokens: Some(400),
    }
}

pub(super) fn default_huiyuan() -> RawProviderSettings {
    RawProviderSettings {
        // Huiyuan has no public well-known endpoint — the base URL must be
        // supplied via config or HUIYUAN_BASE_URL.
        api_base_url: None,
        model: Some("huiyuan-chat".to_string()),
        temperature: Some(0.7),
        timeout_seconds: Some(30),
        max_tokens: Some(400),
    }
}
