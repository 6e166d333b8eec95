//! Prompt templates for the problem generator.
//!
//! Templates live as `<name>.md` files in a prompts directory and use
//! `{placeholder}` markers that are filled in at request time.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

pub const PROBLEM_PROMPT: &str = "problem";
pub const INTERVIEWER_PROMPT: &str = "interviewer";
pub const FEEDBACK_PROMPT: &str = "feedback";

/// Every template the generator needs.
pub const REQUIRED_PROMPTS: [&str; 3] = [PROBLEM_PROMPT, INTERVIEWER_PROMPT, FEEDBACK_PROMPT];

/// Reads every `.md` file in `dir` into a map keyed by file stem.
pub fn load_prompts(dir: &Path) -> Result<HashMap<String, String>> {
    let mut prompts = HashMap::new();
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read prompts directory {}", dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("md") {
            let key = path
                .file_stem()
                .and_then(|s| s.to_str())
                .context("Could not get file stem")?
                .to_string();
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read prompt {}", path.display()))?;
            debug!(prompt = %key, "Loaded prompt template");
            prompts.insert(key, content);
        }
    }

    for name in REQUIRED_PROMPTS {
        if !prompts.contains_key(name) {
            anyhow::bail!("{name}.md not found in prompts directory {}", dir.display());
        }
    }
    Ok(prompts)
}

/// Substitutes each `{key}` in `template` with its value.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    vars.iter().fold(template.to_string(), |acc, (key, value)| {
        acc.replace(&format!("{{{key}}}"), value)
    })
}
