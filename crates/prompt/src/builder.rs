//! Template rendering.

use crate::types::PromptVariables;
use handlebars::Handlebars;
use reel_core::{AppError, AppResult};

/// Render a Handlebars template with the given variables.
///
/// HTML escaping is disabled; the output is plain text sent to a model.
pub fn render_template(template: &str, variables: &PromptVariables) -> AppResult<String> {
    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    handlebars
        .render("prompt", variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))
}
