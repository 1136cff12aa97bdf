//! Configuration loading with env-var overrides.
//!
//! Reads a TOML file (default `config/default.toml`), then applies the
//! recognized environment overrides: `LLM_PROVIDER`, `LLM_ONLY`, `PORT`,
//! `LETSTALK_LOG_LEVEL` and the per-provider `<PROVIDER>_API_KEY`,
//! `<PROVIDER>_MODEL`, `<PROVIDER>_BASE_URL` variables. API keys are never
//! read from TOML. Precedence: env > file > built-in defaults (CLI flags are
//! applied on top by `main`).

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::error::AppError;

use super::raw::{self, RawConfig};
use super::types::*;

/// Env overrides for one provider section.
#[derive(Debug, Default, Clone)]
pub struct ProviderEnv {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
}

/// All recognized env overrides, gathered once.
///
/// Tests construct this directly instead of mutating the process env.
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    pub provider: Option<String>,
    pub llm_only: Option<String>,
    pub port: Option<String>,
    pub log_level: Option<String>,
    pub openai: ProviderEnv,
    pub gemini: ProviderEnv,
    pub huiyuan: ProviderEnv,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        let provider_env = |prefix: &str| ProviderEnv {
            api_key: env::var(format!("{prefix}_API_KEY")).ok(),
            model: env::var(format!("{prefix}_MODEL")).ok(),
            base_url: env::var(format!("{prefix}_BASE_URL")).ok(),
        };
        Self {
            provider: env::var("LLM_PROVIDER").ok(),
            llm_only: env::var("LLM_ONLY").ok(),
            port: env::var("PORT").ok(),
            log_level: env::var("LETSTALK_LOG_LEVEL").ok(),
            openai: provider_env("OPENAI"),
            gemini: provider_env("GEMINI"),
            huiyuan: provider_env("HUIYUAN"),
        }
    }
}

/// `"1"`, `"true"` and `"yes"` (any case) count as true; everything else is false.
pub fn is_truthy(s: &str) -> bool {
    matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}

/// Load config from the given path, or `config/default.toml`, then apply
/// env-var overrides. If no path is given and the default file does not
/// exist, built-in defaults are used.
pub fn load(config_path: Option<&str>) -> Result<Config, AppError> {
    let env = EnvOverrides::from_env();
    let path = match config_path {
        Some(p) => Some(PathBuf::from(p)),
        None => {
            let default_path = Path::new("config/default.toml");
            default_path.exists().then(|| default_path.to_path_buf())
        }
    };
    load_from(path.as_deref(), &env)
}

/// Internal loader — accepts an explicit path and pre-gathered overrides.
pub fn load_from(path: Option<&Path>, env: &EnvOverrides) -> Result<Config, AppError> {
    let parsed: RawConfig = match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;
            toml::from_str(&text)
                .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?
        }
        None => RawConfig::default(),
    };

    let provider: ProviderKind = env
        .provider
        .as_deref()
        .unwrap_or(&parsed.llm.provider)
        .parse()?;

    let llm_only = match env.llm_only.as_deref() {
        Some(v) => is_truthy(v),
        None => parsed.llm.llm_only,
    };

    let port = match env.port.as_deref() {
        Some(v) => v
            .parse::<u16>()
            .map_err(|_| AppError::Config(format!("PORT is not a valid port number: '{v}'")))?,
        None => parsed.server.port,
    };

    let log_level = env
        .log_level
        .clone()
        .unwrap_or(parsed.log_level);

    Ok(Config {
        app_name: parsed.app_name,
        log_level,
        log_file: parsed.log_file.map(PathBuf::from),
        server: ServerConfig {
            host: parsed.server.host,
            port,
        },
        llm: LlmConfig {
            provider,
            llm_only,
            openai: resolve_settings(parsed.llm.openai, raw::default_openai(), &env.openai),
            gemini: resolve_settings(parsed.llm.gemini, raw::default_gemini(), &env.gemini),
            huiyuan: resolve_settings(parsed.llm.huiyuan, raw::default_huiyuan(), &env.huiyuan),
            openai_api_key: env.openai.api_key.clone(),
            gemini_api_key: env.gemini.api_key.clone(),
            huiyuan_api_key: env.huiyuan.api_key.clone(),
        },
        subjects: SubjectsConfig {
            catalog: PathBuf::from(parsed.subjects.catalog),
            prompts_dir: PathBuf::from(parsed.subjects.prompts_dir),
        },
    })
}

fn resolve_settings(
    section: super::raw::RawProviderSettings,
    defaults: super::raw::RawProviderSettings,
    env: &ProviderEnv,
) -> ProviderSettings {
    ProviderSettings {
        api_base_url: env
            .base_url
            .clone()
            .or(section.api_base_url)
            .or(defaults.api_base_url)
            .unwrap_or_default(),
        model: env
            .model
            .clone()
            .or(section.model)
            .or(defaults.model)
            .unwrap_or_default(),
        temperature: section.temperature.or(defaults.temperature).unwrap_or(0.7),
        timeout_seconds: section
            .timeout_seconds
            .or(defaults.timeout_seconds)
            .unwrap_or(30),
        max_tokens: section.max_tokens.or(defaults.max_tokens).unwrap_or(400),
    }
}
