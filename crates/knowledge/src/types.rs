//! Knowledge store types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Category assigned when a document's path gives no hint.
pub const DEFAULT_CATEGORY: &str = "production";

/// Production phases a document can belong to.
pub const CATEGORIES: [&str; 3] = ["pre-production", "production", "post-production"];

/// A document held by the knowledge store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeDocument {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// One word window of a document, as stored in the semantic index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub id: String,
    pub document_id: String,
    pub title: String,
    pub category: String,
    pub chunk_index: u32,
    pub text: String,
}

/// A chunk returned by a nearest-neighbour query.
#[derive(Debug, Clone)]
pub struct ChunkMatch {
    pub chunk: DocumentChunk,
    /// `1 - cosine similarity`; lower is closer
    pub distance: f32,
}

/// A parent document reached through its best-matching chunk.
#[derive(Debug, Clone)]
pub struct DocumentMatch {
    pub document: KnowledgeDocument,
    pub distance: f32,
}

/// Chunk text produced by the chunker before it is embedded.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkCandidate {
    pub position: u32,
    pub text: String,
}

/// Result of loading a directory of documents.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadStats {
    pub documents_loaded: u32,
    pub chunks_indexed: u32,
    pub files_skipped: u32,
    pub duration_secs: f64,
}

/// Counts describing the store.
#[derive(Debug, Clone, Default, Serialize)]
pub struct KnowledgeStats {
    pub documents: u32,
    pub chunks: u32,
    pub by_category: BTreeMap<String, u32>,
    pub db_size_bytes: u64,
}
