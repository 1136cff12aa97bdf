//! OpenAI-compatible chat completion provider (`/v1/chat/completions`).
//!
//! Exposes the normalized `complete` operation of the `LlmClient`
//! abstraction. All OpenAI wire types are private to this module — callers
//! never see them. This provider is stateless; one call is one round-trip.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace};

use crate::llm::{ChatMessage, ChatRole, LlmError, LlmReply};

use super::{check_status, map_transport_error};

// ── Public provider ───────────────────────────────────────────────────────────

/// Adapter for any HTTP endpoint implementing `/v1/chat/completions`.
///
/// Covers OpenAI itself and hosted or local compatibles. Constructed once at
/// startup, then cheaply cloned because `reqwest::Client` is an `Arc`
/// internally.
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleProvider {
    client: Client,
    api_base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    api_key: Option<String>,
}

impl OpenAiCompatibleProvider {
    /// Build a provider from config values and an optional API key.
    ///
    /// When a key is present it is sent as `Authorization: Bearer <key>` on
    /// every request; a missing key fails each call up-front with an
    /// authentication error rather than a vendor round-trip.
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

    /// Lightweight reachability probe.
    ///
    /// Sends a HEAD request to the configured endpoint. Any HTTP response
    /// (including 4xx) means the server is reachable; only a transport-level
    /// failure is treated as unreachable. Uses a hard 5-second timeout
    /// regardless of the completion timeout config.
    pub async fn ping(&self) -> Result<(), LlmError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(5))
            .build()
            .map_err(|e| LlmError::Network(format!("failed to build ping client: {e}")))?;
        let mut req = client.head(&self.api_base_url);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }
        req.send()
            .await
            .map(|_| ())
            .map_err(|e| LlmError::Network(format!("unreachable: {e}")))
    }

    /// One chat completion round-trip: system prompt + prior turns + the
    /// user's message in, reply text out.
    pub async fn complete(
        &self,
        system: Option<&str>,
        history: &[ChatMessage],
        user_message: &str,
    ) -> Result<LlmReply, LlmError> {
        let Some(key) = &self.api_key else {
            return Err(LlmError::Auth("no API key configured".into()));
        };

        // Some models (gpt-5 family) do not accept a temperature parameter.
        let temperature = if self.model.starts_with("gpt-5") {
            None
        } else {
            Some(self.temperature)
        };

        let mut messages = Vec::with_capacity(history.len() + 2);
        if let Some(sys) = system {
            messages.push(Message { role: "system", content: sys.to_string() });
        }
        for turn in history {
            messages.push(Message {
                role: match turn.role {
                    ChatRole::User => "user",
                    ChatRole::Assistant => "assistant",
                },
                content: turn.content.clone(),
            });
        }
        messages.push(Message { role: "user", content: user_message.to_string() });

        let payload = ChatCompletionRequest {
            model: &self.model,
            messages,
            temperature,
            max_tokens: self.max_tokens,
        };

        debug!(
            model = %self.model,
            temperature = ?temperature,
            message_count = payload.messages.len(),
            "sending chat completion request"
        );
        if tracing::enabled!(tracing::Level::TRACE) {
            let json = serde_json::to_string_pretty(&payload)
                .unwrap_or_else(|e| format!("<serialization failed: {e}>"));
            trace!(payload = %json, "full request payload");
        }

        let response = self
            .client
            .post(&self.api_base_url)
            .bearer_auth(key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!(url = %self.api_base_url, error = %e, "HTTP request failed (transport)");
                map_transport_error(e)
            })?;

        let response = check_status(response).await?;

        let parsed = response
            .json::<ChatCompletionResponse>()
            .await
            .map_err(|e| {
                error!(error = %e, "failed to deserialize chat completion response");
                LlmError::MalformedResponse(format!("failed to parse response body: {e}"))
            })?;

        debug!(choices = parsed.choices.len(), "received chat completion response");

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                LlmError::MalformedResponse("empty or missing content in response".into())
            })?;

        Ok(LlmReply { text })
    }
}

// ── Private wire types ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}
