//! Character-trigram embeddings.
//!
//! Deterministic, offline vectors built from word frequencies and the
//! character trigrams of each word. Not semantic in the neural sense, but
//! documents sharing vocabulary land close together, which is enough for
//! ranking a small domain library.

use crate::embeddings::provider::EmbeddingProvider;
use reel_core::AppResult;
use std::collections::HashMap;

const STOP_WORDS: &[&str] = &[
    "the", "is", "at", "which", "on", "a", "an", "as", "are", "was", "were", "for", "to", "of",
    "in", "and", "or", "but", "with", "by", "from", "this", "that", "be", "have", "has", "had",
    "it", "its", "their", "they", "them", "what", "how", "does",
];

/// Trigram-based embedding provider.
#[derive(Debug)]
pub struct TrigramProvider {
    dimensions: usize,
}

fn fold_hash(bytes: impl Iterator<Item = u8>, multiplier: u64) -> u64 {
    bytes.fold(0u64, |acc, b| acc.wrapping_mul(multiplier).wrapping_add(b as u64))
}

/// Lowercased content words with their frequencies.
fn word_frequencies(text: &str) -> HashMap<String, u32> {
    let mut freq = HashMap::new();
    for word in text
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric() && c != '-' && c != '$')
        .filter(|w| w.chars().count() > 2 && !STOP_WORDS.contains(w))
    {
        *freq.entry(word.to_string()).or_insert(0) += 1;
    }
    freq
}

impl TrigramProvider {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];

        for (word, freq) in word_frequencies(text) {
            let chars: Vec<char> = word.chars().collect();
            let weight = (freq as f32).sqrt();

            for window in chars.windows(3) {
                let trigram: String = window.iter().collect();
                let slot = fold_hash(trigram.bytes(), 37) as usize % self.dimensions;
                vector[slot] += weight;
            }

            let slot = fold_hash(word.bytes(), 31) as usize % self.dimensions;
            vector[slot] += freq as f32;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }

        vector
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for TrigramProvider {
    fn provider_name(&self) -> &str {
        "trigram"
    }

    fn model_name(&self) -> &str {
        "trigram-v1"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(v: &[f32]) -> f32 {
        v.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    fn dot(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[tokio::test]
    async fn test_embeddings_are_unit_vectors() {
        let provider = TrigramProvider::new(384);
        let texts = vec![
            "Color grading happens after picture lock".to_string(),
            "Casting directors run auditions".to_string(),
        ];

        let embeddings = provider.embed_batch(&texts).await.unwrap();
        assert_eq!(embeddings.len(), 2);
        for embedding in &embeddings {
            assert_eq!(embedding.len(), 384);
            assert!((norm(embedding) - 1.0).abs() < 0.001);
        }
    }

    #[tokio::test]
    async fn test_deterministic() {
        let provider = TrigramProvider::new(384);
        let a = provider.embed("shooting schedule").await.unwrap();
        let b = provider.embed("shooting schedule").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_shared_vocabulary_ranks_closer() {
        let provider = TrigramProvider::new(384);
        let query = provider.embed("film budget breakdown").await.unwrap();
        let budget = provider
            .embed("A film budget breakdown lists above-the-line costs")
            .await
            .unwrap();
        let sound = provider
            .embed("Foley artists record footsteps on stage")
            .await
            .unwrap();

        assert!(dot(&query, &budget) > dot(&query, &sound));
    }

    #[tokio::test]
    async fn test_empty_text_is_zero_vector() {
        let provider = TrigramProvider::new(64);
        let embedding = provider.embed("").await.unwrap();
        assert!(embedding.iter().all(|&x| x == 0.0));
    }

    #[tokio::test]
    async fn test_utf8_safety() {
        let provider = TrigramProvider::new(384);
        let embedding = provider
            .embed("Pós-produção 🎬 e correção de cor")
            .await
            .unwrap();
        assert!((norm(&embedding) - 1.0).abs() < 0.001);
    }
}
