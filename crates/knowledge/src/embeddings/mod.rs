//! Embedding generation for the semantic index.

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingProvider};
pub use providers::trigram::TrigramProvider;
