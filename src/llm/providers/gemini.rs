//! Gemini chat completion provider (`models/{model}:generateContent`).
//!
//! Gemini authenticates with the API key as a URL query parameter rather
//! than a header, and carries conversation turns as `contents` with
//! `user`/`model` roles. The system prompt is folded into the first user
//! content — simpler than `system_instruction` and compatible across model
//! generations. All wire types are private to this module.
//!
//! The request URL embeds the key, so it must never be logged; log output
//! carries the base URL and model only.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace};

use crate::llm::{ChatMessage, ChatRole, LlmError, LlmReply};

use super::{check_status, map_transport_error};

// ── Public provider ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct GeminiProvider {
    client: Client,
    api_base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    api_key: Option<String>,
}

impl GeminiProvider {
    /// Build a provider from config values and an optional API key.
    pub fn new(
        api_base_url: String,
        model: String,
        temperature: f32,
        timeout_seconds: u64,
        max_tokens: u32,
        api_key: Option<String>,
    ) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| LlmError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, api_base_url, model, temperature, max_tokens, api_key })
    }

    /// Lightweight reachability probe against the API base URL.
    /// The key is deliberately left out — any HTTP response means reachable.
    pub async fn ping(&self) -> Result<(), LlmError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(5))
            .build()
            .map_err(|e| LlmError::Network(format!("failed to build ping client: {e}")))?;
        client
            .head(&self.api_base_url)
            .send()
            .await
            .map(|_| ())
            .map_err(|e| LlmError::Network(format!("unreachable: {e}")))
    }

    /// One `generateContent` round-trip.
    pub async fn complete(
        &self,
        system: Option<&str>,
        history: &[ChatMessage],
        user_message: &str,
    ) -> Result<LlmReply, LlmError> {
        let Some(key) = &self.api_key else {
            return Err(LlmError::Auth("no API key configured".into()));
        };

        let mut contents = Vec::with_capacity(history.len() + 2);
        if let Some(sys) = system {
            contents.push(Content {
                role: "user",
                parts: vec![ContentPart { text: sys.to_string() }],
            });
        }
        for turn in history {
            contents.push(Content {
                role: match turn.role {
                    ChatRole::User => "user",
                    ChatRole::Assistant => "model",
                },
                parts: vec![ContentPart { text: turn.content.clone() }],
            });
        }
        contents.push(Content {
            role: "user",
            parts: vec![ContentPart { text: user_message.to_string() }],
        });

        let payload = GenerateContentRequest {
            contents,
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_tokens,
            },
        };

        debug!(
            base_url = %self.api_base_url,
            model = %self.model,
            content_count = payload.contents.len(),
            "sending generateContent request"
        );
        if tracing::enabled!(tracing::Level::TRACE) {
            let json = serde_json::to_string_pretty(&payload)
                .unwrap_or_else(|e| format!("<serialization failed: {e}>"));
            trace!(payload = %json, "full request payload");
        }

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.api_base_url.trim_end_matches('/'),
            self.model,
            key
        );

        let response = self.client.post(&url).json(&payload).send().await.map_err(|e| {
            error!(base_url = %self.api_base_url, error = %e, "HTTP request failed (transport)");
            map_transport_error(e)
        })?;

        let response = check_status(response).await?;

        let parsed = response.json::<GenerateContentResponse>().await.map_err(|e| {
            error!(error = %e, "failed to deserialize generateContent response");
            LlmError::MalformedResponse(format!("failed to parse response body: {e}"))
        })?;

        debug!(candidates = parsed.candidates.len(), "received generateContent response");

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .map(|c| {
                c.content
                    .parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| LlmError::MalformedResponse("no candidates in response".into()))?;

        Ok(LlmReply { text })
    }
}

// ── Private wire types ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<ContentPart>,
}

#[derive(Debug, Serialize)]
struct ContentPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: String,
}
