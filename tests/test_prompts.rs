//! Tests for prompt template files under config/prompts.

use std::fs;
use std::path::Path;

fn prompts_dir() -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("config/prompts")
}

fn prompt_path(name: &str) -> std::path::PathBuf {
    prompts_dir().join(name)
}

#[test]
fn test_framing_prompt_file_exists() {
    assert!(prompt_path("framing.txt").exists(), "framing.txt prompt file missing");
}

#[test]
fn test_subject_system_template_vars() {
    let text = fs::read_to_string(prompt_path("subject_system.txt")).unwrap();
    for var in ["{{name}}", "{{description}}", "{{persona}}"] {
        assert!(text.contains(var), "subject_system.txt should contain {var}");
    }
}

#[test]
fn test_one_sentence_template_vars() {
    let text = fs::read_to_string(prompt_path("one_sentence.txt")).unwrap();
    assert!(text.contains("{{name}}"), "one_sentence.txt should contain {{name}}");
    assert!(text.contains("{{persona}}"), "one_sentence.txt should contain {{persona}}");
}

#[test]
fn test_pk_statement_template_vars() {
    let text = fs::read_to_string(prompt_path("pk_statement.txt")).unwrap();
    for var in ["{{name}}", "{{round}}", "{{turn}}", "{{round_hint}}"] {
        assert!(text.contains(var), "pk_statement.txt should contain {var}");
    }
}

#[test]
fn test_school_statement_template_vars() {
    let text = fs::read_to_string(prompt_path("school_statement.txt")).unwrap();
    for var in ["{{school}}", "{{representative}}", "{{viewpoint}}", "{{round}}"] {
        assert!(text.contains(var), "school_statement.txt should contain {var}");
    }
}

#[test]
fn test_suggestions_template_vars() {
    let text = fs::read_to_string(prompt_path("suggestions.txt")).unwrap();
    assert!(text.contains("{{name}}"), "suggestions.txt should contain {{name}}");
}
