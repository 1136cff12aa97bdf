//! Let's Talk — a multi-discipline chat and debate service.
//!
//! One question, several discipline personas: ask for a blind-box of short
//! takes, deep-dive with a single subject, or set two subjects (or two
//! schools within one) debating. Replies come from a configured LLM
//! provider, with a deterministic demo mode when none is available.
//!
//! The binary entry point is `src/main.rs`; this library root exposes the
//! internals for integration tests.

pub mod agent;
pub mod bootstrap;
pub mod core;
pub mod llm;
pub mod subjects;
pub mod web;

pub use crate::core::{config, error};
