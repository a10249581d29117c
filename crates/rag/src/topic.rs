//! Topic gate: is a question about the movie industry?

use reel_core::{AppError, AppResult};

/// Shown instead of an answer for off-topic questions.
pub const REDIRECT_MESSAGE: &str = "I'm specialized in movie industry topics. Please ask me about \
pre-production, production, or post-production processes, filmmaking techniques, industry \
practices, or any other movie-related questions.";

const MOVIE_KEYWORDS: [&str; 24] = [
    "film",
    "movie",
    "cinema",
    "production",
    "director",
    "actor",
    "actress",
    "script",
    "screenplay",
    "camera",
    "editing",
    "post-production",
    "pre-production",
    "casting",
    "location",
    "budget",
    "schedule",
    "crew",
    "sound",
    "lighting",
    "visual effects",
    "color grading",
    "distribution",
    "box office",
];

pub trait TopicClassifier: Send + Sync {
    /// Whether `question` is in-domain.
    fn is_in_domain(&self, question: &str) -> AppResult<bool>;
}

/// Keyword classifier over a fixed movie-industry vocabulary.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordTopicGate;

impl TopicClassifier for KeywordTopicGate {
    fn is_in_domain(&self, question: &str) -> AppResult<bool> {
        if question.trim().is_empty() {
            return Err(AppError::Validation("Cannot classify an empty question".to_string()));
        }
        if question
            .chars()
            .any(|c| c.is_control() && !matches!(c, '\n' | '\r' | '\t'))
        {
            return Err(AppError::Validation(
                "Question contains control characters".to_string(),
            ));
        }

        let lower = question.to_lowercase();
        Ok(MOVIE_KEYWORDS.iter().any(|keyword| lower.contains(keyword)))
    }
}

/// Classify, treating classifier failures as in-domain.
pub fn passes_gate(classifier: &dyn TopicClassifier, question: &str) -> bool {
    match classifier.is_in_domain(question) {
        Ok(in_domain) => in_domain,
        Err(e) => {
            tracing::warn!("Topic classification failed, allowing question: {}", e);
            true
        }
    }
}
