//! Rendered system instructions for both response modes.

use crate::builder::render_template;
use crate::defaults::{STANDARD_TEMPLATE, TURBO_TEMPLATE};
use crate::loader::load_prompt;
use crate::types::{PromptVariables, STANDARD_PROMPT_ID, TURBO_PROMPT_ID};
use reel_core::AppResult;
use std::path::Path;

/// System instructions, rendered once and reused for every request.
#[derive(Debug, Clone)]
pub struct PromptLibrary {
    standard: String,
    turbo: String,
}

impl PromptLibrary {
    /// Built-in instructions without workspace overrides.
    pub fn builtin() -> AppResult<Self> {
        let vars = PromptVariables::default();
        Ok(Self {
            standard: render_template(STANDARD_TEMPLATE, &vars)?,
            turbo: render_template(TURBO_TEMPLATE, &vars)?,
        })
    }

    /// Built-in instructions with any `.reel/prompts/` overrides applied.
    pub fn load(workspace_path: &Path) -> AppResult<Self> {
        let vars = PromptVariables::default();

        let standard = match load_prompt(workspace_path, STANDARD_PROMPT_ID)? {
            Some(def) => def.template,
            None => STANDARD_TEMPLATE.to_string(),
        };
        let turbo = match load_prompt(workspace_path, TURBO_PROMPT_ID)? {
            Some(def) => def.template,
            None => TURBO_TEMPLATE.to_string(),
        };

        Ok(Self {
            standard: render_template(&standard, &vars)?,
            turbo: render_template(&turbo, &vars)?,
        })
    }

    pub fn standard(&self) -> &str {
        &self.standard
    }

    pub fn turbo(&self) -> &str {
        &self.turbo
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_builtin_renders_domain() {
        let library = PromptLibrary::builtin().unwrap();
        assert!(library
            .standard()
            .starts_with("You are an expert AI assistant specializing in the movie industry."));
        assert!(library.standard().contains("CRITICAL INSTRUCTIONS"));
        assert!(library.turbo().len() < library.standard().len());
        assert!(!library.turbo().contains("{{"));
    }

    #[test]
    fn test_workspace_override() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".reel/prompts");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("system.turbo.yml"),
            "id: system.turbo\ntitle: Terse\napiVersion: \"1.0\"\ntemplate: Answer about {{domain}} in one line.\n",
        )
        .unwrap();

        let library = PromptLibrary::load(temp.path()).unwrap();
        assert_eq!(library.turbo(), "Answer about the movie industry in one line.");
        assert!(library.standard().contains("CRITICAL INSTRUCTIONS"));
    }
}
