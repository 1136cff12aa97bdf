//! Layered prompt builder for subject agents.
//!
//! Prompts are assembled from plain-text template fragments stored under the
//! configured prompts directory (`config/prompts/` by default). Each layer is
//! appended in order; missing files are silently skipped so layers can be
//! optional, and every operation carries an inline default body so a missing
//! template never breaks a request.
//!
//! Variable substitution uses `{{key}}` syntax and is applied once at
//! [`build()`](PromptBuilder::build) time, after all layers are joined.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

const SEPARATOR: &str = "\n\n";

/// Fluent builder that assembles a layered prompt from template files.
pub struct PromptBuilder {
    prompts_dir: PathBuf,
    parts: Vec<String>,
    vars: HashMap<String, String>,
}

impl PromptBuilder {
    /// Create a builder rooted at `prompts_dir` (e.g. `"config/prompts"`).
    pub fn new(prompts_dir: impl Into<PathBuf>) -> Self {
        Self {
            prompts_dir: prompts_dir.into(),
            parts: Vec::new(),
            vars: HashMap::new(),
        }
    }

    /// Append a layer by loading `filename` from the prompts directory.
    /// Silently skips the layer when the file does not exist.
    pub fn layer(mut self, filename: &str) -> Self {
        let path = self.prompts_dir.join(filename);
        match fs::read_to_string(&path) {
            Ok(text) => {
                let trimmed = text.trim().to_string();
                if !trimmed.is_empty() {
                    self.parts.push(trimmed);
                }
            }
            Err(_) => {
                tracing::debug!("prompt: layer '{}' not found — skipped", path.display());
            }
        }
        self
    }

    /// Directly append a text fragment (e.g. an already-loaded template body).
    pub fn append(mut self, text: impl Into<String>) -> Self {
        let s = text.into();
        let trimmed = s.trim().to_string();
        if !trimmed.is_empty() {
            self.parts.push(trimmed);
        }
        self
    }

    /// Register a `{{key}}` → `value` substitution applied at build time.
    pub fn var(mut self, key: &str, value: impl Into<String>) -> Self {
        self.vars.insert(key.to_string(), value.into());
        self
    }

    /// Assemble all layers, join with blank lines, and apply variable
    /// substitution.
    pub fn build(self) -> String {
        let mut prompt = self.parts.join(SEPARATOR);
        for (k, v) in &self.vars {
            let placeholder = format!("{{{{{}}}}}", k);
            prompt = prompt.replace(&placeholder, v);
        }
        prompt
    }
}

/// Load a template body from the prompts directory, falling back to the
/// given inline default when the file is absent or unreadable.
pub fn template(prompts_dir: &Path, filename: &str, default_body: &str) -> String {
    match fs::read_to_string(prompts_dir.join(filename)) {
        Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
        _ => default_body.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn prompts_dir_with(files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (name, content) in files {
            let mut f = std::fs::File::create(dir.path().join(name)).unwrap();
            f.write_all(content.as_bytes()).unwrap();
        }
        dir
    }

    #[test]
    fn builder_assembles_layers_in_order() {
        let dir = prompts_dir_with(&[("a.txt", "first"), ("b.txt", "second")]);
        let result = PromptBuilder::new(dir.path())
            .layer("a.txt")
            .layer("b.txt")
            .build();
        assert_eq!(result, "first\n\nsecond");
    }

    #[test]
    fn builder_skips_missing_file() {
        let dir = prompts_dir_with(&[]);
        let result = PromptBuilder::new(dir.path())
            .layer("nonexistent.txt")
            .append("hello")
            .build();
        assert_eq!(result, "hello");
    }

    #[test]
    fn builder_substitutes_variable() {
        let dir = prompts_dir_with(&[]);
        let result = PromptBuilder::new(dir.path())
            .append("You are an expert in {{name}}.")
            .var("name", "Physics")
            .build();
        assert_eq!(result, "You are an expert in Physics.");
        assert!(!result.contains("{{name}}"));
    }

    #[test]
    fn template_prefers_file_over_default() {
        let dir = prompts_dir_with(&[("op.txt", "from file")]);
        assert_eq!(template(dir.path(), "op.txt", "default"), "from file");
        assert_eq!(template(dir.path(), "missing.txt", "default"), "default");
    }

    #[test]
    fn template_empty_file_falls_back_to_default() {
        let dir = prompts_dir_with(&[("empty.txt", "  \n")]);
        assert_eq!(template(dir.path(), "empty.txt", "default"), "default");
    }
}
