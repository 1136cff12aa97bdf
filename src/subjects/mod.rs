//! Subject library — the static catalog of discipline personas.
//!
//! Loaded once at startup from a JSON catalog and immutable afterwards, so
//! it is safe to share behind an `Arc` without synchronisation. A malformed
//! catalog (unreadable file, bad JSON, empty list, duplicate ids) is fatal:
//! the process must not start with a partial subject set.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::core::error::AppError;

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum SubjectError {
    #[error("unknown subject: {0}")]
    NotFound(String),
}

// ── Catalog types ─────────────────────────────────────────────────────────────

/// Catalog grouping used by the listing endpoint and the random picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubjectTag {
    #[default]
    Popular,
    Niche,
    Crossover,
}

/// An intra-subject school of thought, used by the school-debate endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct School {
    pub name: String,
    #[serde(default = "default_icon")]
    pub icon: String,
    pub description: String,
    pub representative: String,
    pub viewpoint: String,
}

/// One discipline persona.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    /// Unique identifier, e.g. `"physics"`.
    pub id: String,
    /// Display name, e.g. `"Physics"`.
    pub name: String,
    #[serde(default = "default_icon")]
    pub icon: String,
    /// One-line characterisation of the discipline.
    pub description: String,
    /// Persona text woven into the system prompt.
    pub persona: String,
    #[serde(default)]
    pub tag: SubjectTag,
    /// Lowercase terms used for question-relevance ranking.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Pre-written canned replies served in demo mode and on fallback.
    #[serde(default)]
    pub demo_answers: Vec<String>,
    #[serde(default)]
    pub schools: Vec<School>,
}

impl Subject {
    /// Display name with icon, e.g. `"🔭 Physics"`.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.icon, self.name)
    }

    /// Look up a school of this subject by name.
    pub fn school(&self, name: &str) -> Option<&School> {
        self.schools.iter().find(|s| s.name == name)
    }
}

fn default_icon() -> String {
    "📚".to_string()
}

#[derive(Deserialize)]
struct Catalog {
    subjects: Vec<Subject>,
}

// ── Library ───────────────────────────────────────────────────────────────────

/// The loaded catalog. Order is stable: subjects keep the order they appear
/// in the JSON file.
#[derive(Debug)]
pub struct SubjectLibrary {
    subjects: Vec<Subject>,
}

impl SubjectLibrary {
    /// Load and validate the catalog. Any failure here is fatal at startup.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let text = fs::read_to_string(path).map_err(|e| {
            AppError::Subjects(format!("cannot read {}: {e}", path.display()))
        })?;
        let catalog: Catalog = serde_json::from_str(&text).map_err(|e| {
            AppError::Subjects(format!("parse error in {}: {e}", path.display()))
        })?;

        if catalog.subjects.is_empty() {
            return Err(AppError::Subjects(format!(
                "{} contains no subjects",
                path.display()
            )));
        }

        let mut seen = HashSet::new();
        for subject in &catalog.subjects {
            if subject.id.is_empty() {
                return Err(AppError::Subjects(format!(
                    "subject '{}' has an empty id",
                    subject.name
                )));
            }
            if !seen.insert(subject.id.as_str()) {
                return Err(AppError::Subjects(format!(
                    "duplicate subject id: {}",
                    subject.id
                )));
            }
        }

        info!(
            path = %path.display(),
            count = catalog.subjects.len(),
            "subject catalog loaded"
        );
        Ok(Self { subjects: catalog.subjects })
    }

    /// All subjects in catalog order.
    pub fn all(&self) -> &[Subject] {
        &self.subjects
    }

    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }

    /// Look up a subject by id.
    pub fn get(&self, id: &str) -> Result<&Subject, SubjectError> {
        self.subjects
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| SubjectError::NotFound(id.to_string()))
    }

    /// Subjects carrying the given tag, in catalog order.
    pub fn by_tag(&self, tag: SubjectTag) -> Vec<&Subject> {
        self.subjects.iter().filter(|s| s.tag == tag).collect()
    }

    /// A random subset of `min(n, len)` distinct subjects.
    pub fn random_subset(&self, n: usize) -> Vec<&Subject> {
        let mut rng = rand::thread_rng();
        self.subjects
            .choose_multiple(&mut rng, n.min(self.subjects.len()))
            .collect()
    }

    /// The `n` subjects most relevant to `question`, by keyword overlap with
    /// a small random jitter so repeated identical questions still vary.
    pub fn rank_by_relevance(&self, question: &str, n: usize) -> Vec<&Subject> {
        let mut rng = rand::thread_rng();
        let mut scored: Vec<(f32, &Subject)> = self
            .subjects
            .iter()
            .map(|s| (relevance_score(question, s) + rng.gen_range(0.0..1.5), s))
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.into_iter().take(n).map(|(_, s)| s).collect()
    }
}

/// Deterministic part of the relevance ranking: +2 per keyword found in the
/// question, +5 when the subject is named outright. Case-insensitive.
pub fn relevance_score(question: &str, subject: &Subject) -> f32 {
    let q = question.to_lowercase();
    let mut score = 0.0;
    for keyword in &subject.keywords {
        if q.contains(&keyword.to_lowercase()) {
            score += 2.0;
        }
    }
    if q.contains(&subject.name.to_lowercase()) {
        score += 5.0;
    }
    score
}
