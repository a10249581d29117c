//! Error types for reel.
//!
//! One enum covers every failure category. The chat pipeline treats the
//! variants differently: configuration and generation failures end a
//! request, retrieval and validation failures are absorbed where they occur.

use thiserror::Error;

/// Unified error type for reel.
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing credential, unknown provider, unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The upstream model call failed
    #[error("Generation error: {0}")]
    Generation(String),

    /// An evidence source was unavailable
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// The response validator failed internally
    #[error("Validation error: {0}")]
    Validation(String),

    /// Local knowledge store errors
    #[error("Knowledge error: {0}")]
    Knowledge(String),

    /// Prompt template errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Whether this error is allowed to fail a whole chat request.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AppError::Config(_) | AppError::Generation(_))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

/// Text shown to a user when a request fails.
///
/// The cause is only revealed when `debug` is enabled.
pub fn failure_message(err: &AppError, debug: bool) -> String {
    let generic = "Sorry, something went wrong while answering your question. Please try again.";
    if debug {
        format!("{} (cause: {})", generic, err)
    } else {
        generic.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(AppError::Config("no key".into()).is_fatal());
        assert!(AppError::Generation("timeout".into()).is_fatal());
        assert!(!AppError::Retrieval("search down".into()).is_fatal());
        assert!(!AppError::Validation("bad pattern".into()).is_fatal());
    }

    #[test]
    fn test_failure_message_hides_cause_without_debug() {
        let err = AppError::Generation("upstream 502".into());
        let msg = failure_message(&err, false);
        assert!(!msg.contains("upstream 502"));

        let msg = failure_message(&err, true);
        assert!(msg.contains("upstream 502"));
    }
}
