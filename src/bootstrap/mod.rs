//! Process bootstrap helpers.
//!
//! - **logger** — one-time tracing subscriber setup.

pub mod logger;
