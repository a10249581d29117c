//! Knowledge store options and path conventions.

use crate::chunker::DEFAULT_CHUNK_WORDS;
use crate::types::DEFAULT_CATEGORY;
use std::path::Path;

/// Options fixed when a store is opened.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreOptions {
    /// Words per indexed chunk
    pub chunk_words: usize,

    /// Embedding vector dimensions
    pub embedding_dim: usize,

    /// Nearest chunks fetched per requested document before de-duplication
    pub oversample: usize,

    /// Embedding provider name
    pub embedding_provider: String,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            chunk_words: DEFAULT_CHUNK_WORDS,
            embedding_dim: 384,
            oversample: 4,
            embedding_provider: "trigram".to_string(),
        }
    }
}

impl StoreOptions {
    pub fn with_embedding_dim(mut self, embedding_dim: usize) -> Self {
        self.embedding_dim = embedding_dim;
        self
    }

    pub fn with_chunk_words(mut self, chunk_words: usize) -> Self {
        self.chunk_words = chunk_words;
        self
    }
}

/// Infer a production phase from any component of a document path.
pub fn infer_category(path: &Path) -> String {
    for part in path.components() {
        let part = part.as_os_str().to_string_lossy().to_lowercase();
        if part.contains("pre-production") || part.contains("preproduction") {
            return "pre-production".to_string();
        }
        if part.contains("post-production") || part.contains("postproduction") {
            return "post-production".to_string();
        }
        if part.contains("production") {
            return "production".to_string();
        }
    }
    DEFAULT_CATEGORY.to_string()
}

/// Human title from a file stem: underscores become spaces, words are title-cased.
pub fn title_from_path(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    stem.replace('_', " ")
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_infer_category() {
        assert_eq!(
            infer_category(&PathBuf::from("kb/pre-production/casting.txt")),
            "pre-production"
        );
        assert_eq!(
            infer_category(&PathBuf::from("kb/post-production/color.txt")),
            "post-production"
        );
        assert_eq!(
            infer_category(&PathBuf::from("kb/production/set.txt")),
            "production"
        );
        assert_eq!(infer_category(&PathBuf::from("kb/misc/notes.txt")), "production");
    }

    #[test]
    fn test_title_from_path() {
        assert_eq!(
            title_from_path(&PathBuf::from("kb/film_BUDGET_guide.txt")),
            "Film Budget Guide"
        );
        assert_eq!(title_from_path(&PathBuf::from("scheduling.md")), "Scheduling");
    }
}
