//! Configuration loading and resolved types.
//!
//! # Module layout
//!
//! - **types** — Public configuration structs consumed by the rest of the
//!   crate (`Config`, `LlmConfig`, `ProviderKind`, …).
//! - **raw** — Raw TOML deserialization types (`RawConfig`, `RawLlm`, …).
//!   These mirror the file shape and use serde defaults; kept private.
//! - **load** — Loading logic: `load`, `load_from`, `EnvOverrides`,
//!   `is_truthy`.

mod load;
mod raw;
mod types;

pub use load::{is_truthy, load, load_from, EnvOverrides, ProviderEnv};
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_toml(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn builtin_defaults_resolve_to_demo() {
        let config = load_from(None, &EnvOverrides::default()).unwrap();
        assert_eq!(config.llm.provider, ProviderKind::Demo);
        assert!(!config.llm.llm_only);
        assert_eq!(config.server.port, 5002);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.app_name, "lets-talk");
    }

    #[test]
    fn file_values_override_defaults() {
        let f = write_toml(
            r#"
app_name = "talk-dev"
log_level = "debug"

[server]
host = "127.0.0.1"
port = 8080

[llm]
provider = "openai"

[llm.openai]
model = "gpt-4o-mini"
timeout_seconds = 5
"#,
        );
        let config = load_from(Some(f.path()), &EnvOverrides::default()).unwrap();
        assert_eq!(config.app_name, "talk-dev");
        assert_eq!(config.server.bind_addr(), "127.0.0.1:8080");
        assert_eq!(config.llm.provider, ProviderKind::OpenAi);
        assert_eq!(config.llm.openai.model, "gpt-4o-mini");
        assert_eq!(config.llm.openai.timeout_seconds, 5);
        // Untouched fields keep their section defaults.
        assert_eq!(
            config.llm.openai.api_base_url,
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn env_overrides_beat_file_values() {
        let f = write_toml("[llm]\nprovider = \"openai\"\n");
        let env = EnvOverrides {
            provider: Some("gemini".into()),
            llm_only: Some("true".into()),
            port: Some("9000".into()),
            gemini: ProviderEnv {
                api_key: Some("secret".into()),
                model: Some("gemini-2.0-flash".into()),
                base_url: None,
            },
            ..Default::default()
        };
        let config = load_from(Some(f.path()), &env).unwrap();
        assert_eq!(config.llm.provider, ProviderKind::Gemini);
        assert!(config.llm.llm_only);
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.llm.gemini.model, "gemini-2.0-flash");
        assert_eq!(config.llm.active_api_key(), Some("secret"));
    }

    #[test]
    fn unknown_provider_is_fatal() {
        let f = write_toml("[llm]\nprovider = \"watson\"\n");
        let err = load_from(Some(f.path()), &EnvOverrides::default()).unwrap_err();
        assert!(err.to_string().contains("watson"));
    }

    #[test]
    fn malformed_toml_is_fatal() {
        let f = write_toml("[server\nport = oops");
        assert!(load_from(Some(f.path()), &EnvOverrides::default()).is_err());
    }

    #[test]
    fn invalid_port_env_is_fatal() {
        let env = EnvOverrides {
            port: Some("not-a-port".into()),
            ..Default::default()
        };
        assert!(load_from(None, &env).is_err());
    }

    #[test]
    fn truthy_parsing() {
        for v in ["1", "true", "TRUE", "yes", "Yes"] {
            assert!(is_truthy(v), "expected '{v}' to be truthy");
        }
        for v in ["0", "false", "no", "", "on"] {
            assert!(!is_truthy(v), "expected '{v}' to be falsy");
        }
    }

    #[test]
    fn empty_api_key_counts_as_absent() {
        let env = EnvOverrides {
            provider: Some("openai".into()),
            openai: ProviderEnv {
                api_key: Some(String::new()),
                ..Default::default()
            },
            ..Default::default()
        };
        let config = load_from(None, &env).unwrap();
        assert_eq!(config.llm.active_api_key(), None);
    }

    #[test]
    fn huiyuan_base_url_comes_from_env() {
        let env = EnvOverrides {
            provider: Some("huiyuan".into()),
            huiyuan: ProviderEnv {
                api_key: Some("k".into()),
                base_url: Some("https://llm.example.cn/v1/chat/completions".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        let config = load_from(None, &env).unwrap();
        assert_eq!(
            config.llm.active_settings().api_base_url,
            "https://llm.example.cn/v1/chat/completions"
        );
    }
}
