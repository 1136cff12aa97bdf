//! Huiyuan chat completion provider.
//!
//! Huiyuan (a Chinese cloud vendor) speaks the OpenAI chat-completions wire
//! dialect at a tenant-specific endpoint, so this wraps the generic
//! OpenAI-compatible provider. There is no public default base URL — the
//! factory rejects the provider when none is configured.

use crate::llm::{ChatMessage, LlmError, LlmReply};

use super::openai_compatible::OpenAiCompatibleProvider;

#[derive(Debug, Clone)]
pub struct HuiyuanProvider {
    inner: OpenAiCompatibleProvider,
}

impl HuiyuanProvider {
    pub fn new(
        api_base_url: String,
        model: String,
        temperature: f32,
        timeout_seconds: u64,
        max_tokens: u32,
        api_key: Option<String>,
    ) -> Result<Self, LlmError> {
        let inner = OpenAiCompatibleProvider::new(
            api_base_url,
            model,
            temperature,
            timeout_seconds,
            max_tokens,
            api_key,
        )?;
        Ok(Self { inner })
    }

    pub async fn complete(
        &self,
        system: Option<&str>,
        history: &[ChatMessage],
        user_message: &str,
    ) -> Result<LlmReply, LlmError> {
        self.inner.complete(system, history, user_message).await
    }

    pub async fn ping(&self) -> Result<(), LlmError> {
        self.inner.ping().await
    }
}
