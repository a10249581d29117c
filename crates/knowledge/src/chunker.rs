//! Word-window chunking.

use crate::types::ChunkCandidate;

/// Words per chunk used by the knowledge store.
pub const DEFAULT_CHUNK_WORDS: usize = 1000;

/// Split text into consecutive windows of `chunk_words` whitespace-separated words.
///
/// Windows do not overlap; whitespace inside a window is normalized to single spaces.
pub fn chunk_words(text: &str, chunk_words: usize) -> Vec<ChunkCandidate> {
    let chunk_words = chunk_words.max(1);
    let words: Vec<&str> = text.split_whitespace().collect();

    let chunks: Vec<ChunkCandidate> = words
        .chunks(chunk_words)
        .enumerate()
        .map(|(i, window)| ChunkCandidate {
            position: i as u32,
            text: window.join(" "),
        })
        .collect();

    tracing::debug!(
        "Chunked {} words into {} chunks (window: {})",
        words.len(),
        chunks.len(),
        chunk_words
    );

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_words_basic() {
        let text = "word ".repeat(2500);
        let chunks = chunk_words(&text, 1000);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].position, 0);
        assert_eq!(chunks[2].position, 2);
        assert_eq!(chunks[0].text.split(' ').count(), 1000);
        assert_eq!(chunks[2].text.split(' ').count(), 500);
    }

    #[test]
    fn test_chunk_words_empty() {
        assert!(chunk_words("", 100).is_empty());
        assert!(chunk_words("  \n\t ", 100).is_empty());
    }

    #[test]
    fn test_whitespace_normalized() {
        let chunks = chunk_words("call\n\nsheet   breakdown", 10);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "call sheet breakdown");
    }

    #[test]
    fn test_zero_window_treated_as_one() {
        let chunks = chunk_words("a b", 0);
        assert_eq!(chunks.len(), 2);
    }
}
