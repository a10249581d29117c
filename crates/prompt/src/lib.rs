//! Prompt system for reel.
//!
//! This crate provides the system instructions sent to the model:
//! - Built-in Handlebars templates for standard and turbo answers
//! - YAML overrides from `.reel/prompts/<id>.yml`

pub mod builder;
pub mod defaults;
pub mod library;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::render_template;
pub use library::PromptLibrary;
pub use loader::{list_prompts, load_prompt};
pub use types::{PromptDefinition, PromptVariables, STANDARD_PROMPT_ID, TURBO_PROMPT_ID};
