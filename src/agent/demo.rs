//! Canned replies for demo mode and degraded fallback.
//!
//! Selection must be reproducible for identical inputs: the canned answer is
//! picked by reducing a SHA-256 digest of the user message modulo the size
//! of the subject's answer set. Debate statements are indexed by round and
//! turn instead, so a fixed exchange always replays the same way.

use sha2::{Digest, Sha256};

use crate::subjects::{School, Subject};

/// Canned reply for a chat turn, chosen deterministically from the subject's
/// pre-written answer set by a digest of the message.
pub fn canned_answer(subject: &Subject, message: &str) -> String {
    if subject.demo_answers.is_empty() {
        return format!(
            "Seen through the core concepts of {}, this can be unpacked with a concrete theoretical frame.",
            subject.name
        );
    }
    let idx = digest_index(message, subject.demo_answers.len());
    subject.demo_answers[idx].clone()
}

/// Canned debate statement for a subject, varying by round and turn.
pub fn canned_pk_statement(subject: &Subject, round: u32, turn: u32) -> String {
    let name = &subject.name;
    let templates: [String; 5] = match round {
        1 => [
            format!("From the standpoint of {name}, this question has its own explanatory frame."),
            format!("{name} research offers solid theoretical backing for my position here."),
            format!("We should examine this phenomenon with the methods {name} has refined."),
            format!("A large body of {name} evidence supports this reading."),
            format!("Historically, {name} has treated this as a classic problem."),
        ],
        2 => [
            format!("Other lenses only go so far — {name} reaches the deeper mechanism."),
            format!("The latest {name} findings strongly reinforce my argument."),
            format!("Let us return to the essence: {name} exposes the root cause."),
            format!("The opposing view has merit, yet the {name} account is more compelling."),
            format!("In practice, the {name} approach has proven the most effective here."),
        ],
        _ => [
            format!("Taken together, {name} offers the most systematic resolution."),
            format!("The strength of {name} lies in being testable and verifiable."),
            format!("Looking ahead, the insights of {name} will matter most."),
            format!("Let the perspective of {name} untangle this difficulty."),
            format!("In the end, {name} points the way forward."),
        ],
    };
    let idx = (turn.saturating_sub(1) as usize) % templates.len();
    templates[idx].clone()
}

/// Canned debate statement for a school of thought, cycling through a fixed
/// template set by round and turn.
pub fn canned_school_statement(school: &School, round: u32, turn: u32) -> String {
    let templates = [
        format!("From the {} position: {}.", school.name, school.viewpoint),
        format!(
            "{} pointed this out long ago — we should {}.",
            school.representative,
            lowercase_first(&school.description)
        ),
        format!(
            "I must stress that the heart of {} lies in a deep reading of this question.",
            school.name
        ),
        format!(
            "Within the theoretical frame of {}, this phenomenon finds a better explanation.",
            school.name
        ),
        format!(
            "Let us come back to {} — that is where the key lies.",
            lowercase_first(&school.description)
        ),
    ];
    let idx = ((round.saturating_sub(1) * 5 + turn.saturating_sub(1)) as usize) % templates.len();
    templates[idx].clone()
}

/// Fixed follow-up question set used when no live model is available.
pub fn canned_suggestions(subject: &Subject) -> Vec<String> {
    let name = &subject.name;
    vec![
        format!("How would {name} apply this idea in everyday life?"),
        format!("Can you give a concrete case from {name} that illustrates this?"),
        format!("What were the major disputes over this point in the history of {name}?"),
    ]
}

/// Reduce a SHA-256 digest of `message` to an index in `0..len`.
fn digest_index(message: &str, len: usize) -> usize {
    let digest = Sha256::digest(message.as_bytes());
    let bytes: [u8; 8] = digest[..8].try_into().unwrap_or([0; 8]);
    (u64::from_be_bytes(bytes) % len as u64) as usize
}

fn lowercase_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_lowercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
