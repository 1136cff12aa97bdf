//! Subject agent — answers questions in the voice of one discipline persona.
//!
//! The agent composes a system prompt from the subject's persona plus fixed
//! instructional framing, invokes the LLM client, and falls back to the
//! subject's canned answer set when no client is configured or a live call
//! fails. In `llm_only` mode a failure is propagated to the caller instead
//! of silently degrading.
//!
//! Agents hold only cheap immutable state (a client clone and the prompts
//! directory), so concurrent requests share nothing mutable.

pub mod demo;
pub mod prompt;

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::llm::{ChatMessage, LlmClient, LlmError};
use crate::subjects::{School, Subject};

use prompt::PromptBuilder;

/// How many trailing turns of debate history are woven into a statement
/// prompt.
const HISTORY_WINDOW: usize = 6;

// ── Conversation types ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Subject,
}

/// One turn of a conversation. History travels with each request — the
/// server keeps no session store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<String>,
    pub text: String,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            subject_id: None,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn subject(subject_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            role: Role::Subject,
            subject_id: Some(subject_id.into()),
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// A produced subject turn plus whether it came from the fallback path.
#[derive(Debug, Clone)]
pub struct AgentReply {
    pub turn: ConversationTurn,
    /// `true` only when a live call failed and a canned answer was served
    /// instead. Demo mode proper is not degraded — it is the selected mode.
    pub degraded: bool,
}

// ── Default prompt bodies ─────────────────────────────────────────────────────
// Used when the corresponding template file under the prompts directory is
// absent, so a bare checkout still answers sensibly. The shared framing
// layer (`framing.txt`) has no inline default — it is additive tone
// guidance, safe to skip.

const SUBJECT_SYSTEM_DEFAULT: &str = "\
You are an expert in {{name}}.
Discipline: {{description}}
Persona: {{persona}}

Give a thorough answer (three to five sentences) from the {{name}}
perspective: analyse in depth, keep a clear line of reasoning, and leave the
reader with something usable.";

const ONE_SENTENCE_DEFAULT: &str = "\
You are an expert in {{name}}.
Discipline: {{description}}
Persona: {{persona}}

Answer the user's question in a single concrete sentence from the {{name}}
angle.";

const PK_STATEMENT_DEFAULT: &str = "\
You are an expert in {{name}}, debating experts from other disciplines.
Discipline: {{description}}
Persona: {{persona}}

This is round {{round}}, statement {{turn}}. {{round_hint}}";

const SCHOOL_STATEMENT_DEFAULT: &str = "\
You represent the {{school}} school within {{name}}.
School: {{school_description}}
Representative figure: {{representative}}
Core claim: {{viewpoint}}

You are debating another school of {{name}}. This is round {{round}},
statement {{turn}}. Speak with the school's distinctive stance, engage the
other side where useful, and keep an academic register.";

const SUGGESTIONS_DEFAULT: &str = "\
You are an expert in {{name}}. Based on the user's question and the answer
given, propose three follow-up questions that pull the user deeper into
{{name}}. One per line, no numbering.";

// ── Agent ─────────────────────────────────────────────────────────────────────

/// Stateless responder for one or more subjects.
///
/// `client == None` means demo mode: every reply comes from the canned
/// answer sets, deterministically.
#[derive(Clone)]
pub struct SubjectAgent {
    client: Option<LlmClient>,
    llm_only: bool,
    prompts_dir: PathBuf,
}

impl SubjectAgent {
    pub fn new(client: Option<LlmClient>, llm_only: bool, prompts_dir: PathBuf) -> Self {
        Self { client, llm_only, prompts_dir }
    }

    /// `true` when no live client is configured.
    pub fn is_demo(&self) -> bool {
        self.client.is_none()
    }

    pub fn provider_name(&self) -> &'static str {
        self.client
            .as_ref()
            .map(LlmClient::provider_name)
            .unwrap_or("demo")
    }

    /// Full chat turn: persona-framed deep answer to `user_message` given
    /// the prior conversation.
    pub async fn respond(
        &self,
        subject: &Subject,
        history: &[ConversationTurn],
        user_message: &str,
    ) -> Result<AgentReply, LlmError> {
        let system = self.subject_system(subject, "subject_system.txt", SUBJECT_SYSTEM_DEFAULT);
        let messages = to_chat_messages(history);
        let (text, degraded) = self
            .complete_or_fallback(subject, &system, &messages, user_message, || {
                demo::canned_answer(subject, user_message)
            })
            .await?;
        Ok(AgentReply { turn: ConversationTurn::subject(&subject.id, text), degraded })
    }

    /// Single-sentence opener used by the blind-box ask flow.
    pub async fn one_sentence_answer(
        &self,
        subject: &Subject,
        question: &str,
    ) -> Result<AgentReply, LlmError> {
        let system = self.subject_system(subject, "one_sentence.txt", ONE_SENTENCE_DEFAULT);
        let user = format!(
            "Question: {question}\n\nAnswer in one concrete sentence from the {} perspective.",
            subject.name
        );
        let (text, degraded) = self
            .complete_or_fallback(subject, &system, &[], &user, || {
                demo::canned_answer(subject, question)
            })
            .await?;
        Ok(AgentReply { turn: ConversationTurn::subject(&subject.id, text), degraded })
    }

    /// One debate statement in a subject-versus-subject exchange.
    pub async fn pk_statement(
        &self,
        subject: &Subject,
        question: &str,
        history: &[ConversationTurn],
        round: u32,
        turn: u32,
    ) -> Result<AgentReply, LlmError> {
        let round_hint = match round {
            1 => "State your basic position and its theoretical grounding.",
            2 => "Deepen your argument and respond to the other side where useful.",
            _ => "Summarise your core claim and elevate the point.",
        };
        let system = PromptBuilder::new(&self.prompts_dir)
            .layer("framing.txt")
            .append(prompt::template(
                &self.prompts_dir,
                "pk_statement.txt",
                PK_STATEMENT_DEFAULT,
            ))
            .var("name", &subject.name)
            .var("description", &subject.description)
            .var("persona", &subject.persona)
            .var("round", round.to_string())
            .var("turn", turn.to_string())
            .var("round_hint", round_hint)
            .build();
        let user = debate_user_prompt(question, history, &subject.name);
        let (text, degraded) = self
            .complete_or_fallback(subject, &system, &[], &user, || {
                demo::canned_pk_statement(subject, round, turn)
            })
            .await?;
        Ok(AgentReply { turn: ConversationTurn::subject(&subject.id, text), degraded })
    }

    /// One debate statement for a school of thought inside a subject.
    pub async fn school_statement(
        &self,
        subject: &Subject,
        school: &School,
        question: &str,
        history: &[ConversationTurn],
        round: u32,
        turn: u32,
    ) -> Result<AgentReply, LlmError> {
        let system = PromptBuilder::new(&self.prompts_dir)
            .layer("framing.txt")
            .append(prompt::template(
                &self.prompts_dir,
                "school_statement.txt",
                SCHOOL_STATEMENT_DEFAULT,
            ))
            .var("name", &subject.name)
            .var("school", &school.name)
            .var("school_description", &school.description)
            .var("representative", &school.representative)
            .var("viewpoint", &school.viewpoint)
            .var("round", round.to_string())
            .var("turn", turn.to_string())
            .build();
        let user = debate_user_prompt(question, history, &school.name);
        let (text, degraded) = self
            .complete_or_fallback(subject, &system, &[], &user, || {
                demo::canned_school_statement(school, round, turn)
            })
            .await?;
        Ok(AgentReply { turn: ConversationTurn::subject(&subject.id, text), degraded })
    }

    /// Up to three follow-up questions for the given exchange.
    pub async fn suggestions(
        &self,
        subject: &Subject,
        question: &str,
        answer: &str,
    ) -> Result<(Vec<String>, bool), LlmError> {
        let system = self.subject_system(subject, "suggestions.txt", SUGGESTIONS_DEFAULT);
        let user = format!(
            "Original question: {question}\n\nMy answer: {answer}\n\n\
             Propose three related follow-up questions (one per line, no numbering)."
        );
        let (text, degraded) = self
            .complete_or_fallback(subject, &system, &[], &user, || {
                demo::canned_suggestions(subject).join("\n")
            })
            .await?;
        let suggestions = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .take(3)
            .map(str::to_string)
            .collect();
        Ok((suggestions, degraded))
    }

    // ── Internals ────────────────────────────────────────────────────────────

    /// Persona-parameterised system prompt: shared framing layer plus the
    /// operation's template body.
    fn subject_system(&self, subject: &Subject, file: &str, default_body: &str) -> String {
        PromptBuilder::new(&self.prompts_dir)
            .layer("framing.txt")
            .append(prompt::template(&self.prompts_dir, file, default_body))
            .var("name", &subject.name)
            .var("description", &subject.description)
            .var("persona", &subject.persona)
            .build()
    }

    /// The fallback contract shared by every operation: demo mode short-
    /// circuits to the canned text; a live failure either propagates
    /// (`llm_only`) or degrades to the canned text.
    async fn complete_or_fallback(
        &self,
        subject: &Subject,
        system: &str,
        history: &[ChatMessage],
        user_prompt: &str,
        fallback: impl FnOnce() -> String,
    ) -> Result<(String, bool), LlmError> {
        let Some(client) = &self.client else {
            return Ok((fallback(), false));
        };
        match client.complete(Some(system), history, user_prompt).await {
            Ok(reply) => Ok((reply.text, false)),
            Err(e) => {
                warn!(
                    provider = client.provider_name(),
                    subject = %subject.id,
                    message = %truncate(user_prompt, 80),
                    error = %e,
                    "LLM call failed"
                );
                if self.llm_only {
                    Err(e)
                } else {
                    Ok((fallback(), true))
                }
            }
        }
    }
}

/// Map stored turns onto the normalized wire roles.
fn to_chat_messages(history: &[ConversationTurn]) -> Vec<ChatMessage> {
    history
        .iter()
        .map(|turn| match turn.role {
            Role::User => ChatMessage::user(&turn.text),
            Role::Subject => ChatMessage::assistant(&turn.text),
        })
        .collect()
}

/// User prompt for a debate statement: the question plus a window of recent
/// exchange history rendered as labelled lines.
fn debate_user_prompt(question: &str, history: &[ConversationTurn], speaker: &str) -> String {
    let mut prompt = format!("Debate question: {question}\n");
    if !history.is_empty() {
        prompt.push_str("\nRecent exchange:\n");
        let start = history.len().saturating_sub(HISTORY_WINDOW);
        for turn in &history[start..] {
            let label = match (&turn.role, &turn.subject_id) {
                (Role::User, _) => "User",
                (Role::Subject, Some(id)) => id.as_str(),
                (Role::Subject, None) => "subject",
            };
            prompt.push_str(&format!("{label}: {}\n", turn.text));
        }
    }
    prompt.push_str(&format!(
        "\nSpeak one statement (30-60 words) as the {speaker} voice."
    ));
    prompt
}

/// Char-safe prefix for log context.
fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max_chars).collect();
        out.push('…');
        out
    }
}
