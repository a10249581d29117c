//! Context assembly: ranked evidence to a bounded prompt block.

use crate::evidence::EvidenceItem;
use crate::mode::ResponseMode;
use reel_prompt::defaults::TURBO_CONTEXT;

/// Returned when there is no evidence to show the model.
pub const NO_CONTEXT: &str = "No specific movie industry context found for this question.";

/// Characters of each evidence item passed to the model.
pub const CONTENT_WINDOW: usize = 500;

/// Format one evidence item as a context entry.
fn format_item(item: &EvidenceItem) -> String {
    let excerpt: String = item.content.chars().take(CONTENT_WINDOW).collect();
    match &item.url {
        Some(url) => format!("From '{}' (Source: {}):\n{}...", item.title, url, excerpt),
        None => format!("From '{}':\n{}...", item.title, excerpt),
    }
}

/// Build the context block for a generation call.
///
/// Turbo mode ignores the evidence and returns a fixed instruction.
pub fn assemble(evidence: &[EvidenceItem], mode: ResponseMode) -> String {
    match mode {
        ResponseMode::Turbo => TURBO_CONTEXT.to_string(),
        ResponseMode::Standard if evidence.is_empty() => NO_CONTEXT.to_string(),
        ResponseMode::Standard => evidence
            .iter()
            .map(format_item)
            .collect::<Vec<_>>()
            .join("\n\n"),
    }
}
