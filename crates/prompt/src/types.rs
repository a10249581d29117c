//! Prompt types for reel.
//!
//! This module defines the domain entities for the prompt system.

use serde::{Deserialize, Serialize};

/// Identifier of the standard-mode system instruction.
pub const STANDARD_PROMPT_ID: &str = "system.standard";

/// Identifier of the turbo-mode system instruction.
pub const TURBO_PROMPT_ID: &str = "system.turbo";

/// A prompt definition loaded from YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptDefinition {
    /// Unique prompt identifier
    pub id: String,

    /// Human-readable title
    pub title: String,

    /// API version for schema evolution
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Creator identifier
    #[serde(rename = "createdBy", default)]
    pub created_by: String,

    /// Template string with Handlebars syntax
    pub template: String,
}

/// Values substituted into system instruction templates.
#[derive(Debug, Clone, Serialize)]
pub struct PromptVariables {
    /// Subject area the assistant is restricted to
    pub domain: String,
}

impl Default for PromptVariables {
    fn default() -> Self {
        Self {
            domain: "the movie industry".to_string(),
        }
    }
}
