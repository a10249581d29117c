//! Embedding provider trait and factory.

use reel_core::{AppError, AppResult};
use std::sync::Arc;

use super::providers::trigram::TrigramProvider;

/// Trait for embedding providers.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "trigram")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Generate embeddings for multiple texts in a batch.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Generate embedding for a single text (convenience method).
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| AppError::Knowledge("No embedding returned".to_string()))
    }
}

/// Create an embedding provider by name.
pub fn create_provider(name: &str, dimensions: usize) -> AppResult<Arc<dyn EmbeddingProvider>> {
    if dimensions == 0 {
        return Err(AppError::Knowledge(
            "Embedding dimensions must be greater than zero".to_string(),
        ));
    }

    match name {
        "trigram" => Ok(Arc::new(TrigramProvider::new(dimensions))),
        _ => Err(AppError::Knowledge(format!(
            "Unknown embedding provider: '{}'. Supported providers: trigram",
            name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_trigram_provider() {
        let provider = create_provider("trigram", 128).unwrap();
        assert_eq!(provider.provider_name(), "trigram");
        assert_eq!(provider.dimensions(), 128);
    }

    #[test]
    fn test_create_unknown_provider() {
        let result = create_provider("neural", 384);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Unknown embedding provider"));
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(create_provider("trigram", 0).is_err());
    }

    #[tokio::test]
    async fn test_provider_embed_single() {
        let provider = create_provider("trigram", 384).unwrap();
        let embedding = provider.embed("location scouting").await.unwrap();
        assert_eq!(embedding.len(), 384);
    }
}
