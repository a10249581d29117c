//! Local knowledge store for reel.
//!
//! Documents are split into word windows, embedded locally and kept in a
//! SQLite index. Queries return the closest parent documents.

pub mod chunker;
pub mod config;
pub mod embeddings;
pub mod index;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use config::StoreOptions;
pub use types::{
    ChunkMatch, DocumentChunk, DocumentMatch, KnowledgeDocument, KnowledgeStats, LoadStats,
    CATEGORIES, DEFAULT_CATEGORY,
};

use chrono::Utc;
use embeddings::{create_provider, EmbeddingProvider};
use reel_core::{AppError, AppResult};
use rusqlite::Connection;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use walkdir::WalkDir;

/// File extensions picked up by [`KnowledgeBase::load_directory`].
const DOCUMENT_EXTENSIONS: [&str; 2] = ["txt", "md"];

/// Stable document id derived from title and content.
pub fn document_id(title: &str, content: &str) -> String {
    let digest = Sha256::new()
        .chain_update(title.as_bytes())
        .chain_update(content.as_bytes())
        .finalize();
    format!("{:x}", digest)[..32].to_string()
}

/// Document store plus semantic index.
pub struct KnowledgeBase {
    conn: Mutex<Connection>,
    embedder: Arc<dyn EmbeddingProvider>,
    options: StoreOptions,
    db_path: Option<PathBuf>,
}

impl std::fmt::Debug for KnowledgeBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnowledgeBase")
            .field("embedder", &self.embedder)
            .field("options", &self.options)
            .field("db_path", &self.db_path)
            .finish()
    }
}

impl KnowledgeBase {
    /// Open a persistent store at `db_path`, creating it if needed.
    pub fn open(db_path: &Path, options: StoreOptions) -> AppResult<Self> {
        let conn = index::init_index(db_path)?;
        tracing::info!("Opened knowledge store at {:?}", db_path);
        Self::from_connection(conn, options, Some(db_path.to_path_buf()))
    }

    /// Open a store that lives only for the life of the process.
    pub fn open_in_memory(options: StoreOptions) -> AppResult<Self> {
        let conn = index::init_in_memory()?;
        Self::from_connection(conn, options, None)
    }

    fn from_connection(
        conn: Connection,
        options: StoreOptions,
        db_path: Option<PathBuf>,
    ) -> AppResult<Self> {
        let embedder = create_provider(&options.embedding_provider, options.embedding_dim)?;
        Ok(Self {
            conn: Mutex::new(conn),
            embedder,
            options,
            db_path,
        })
    }

    /// Replace the embedding provider.
    pub fn with_embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = embedder;
        self
    }

    fn conn(&self) -> AppResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::Knowledge("Knowledge index lock poisoned".to_string()))
    }

    /// Add a document, replacing any earlier copy with the same id.
    ///
    /// Empty `tags` default to the category.
    pub async fn add_document(
        &self,
        title: &str,
        content: &str,
        category: &str,
        tags: Vec<String>,
    ) -> AppResult<KnowledgeDocument> {
        if title.trim().is_empty() {
            return Err(AppError::Knowledge("Document title cannot be empty".to_string()));
        }

        let doc = KnowledgeDocument {
            id: document_id(title, content),
            title: title.to_string(),
            content: content.to_string(),
            category: category.to_string(),
            tags: if tags.is_empty() {
                vec![category.to_string()]
            } else {
                tags
            },
            created_at: Utc::now(),
        };

        let candidates = chunker::chunk_words(content, self.options.chunk_words);
        let texts: Vec<String> = candidates.iter().map(|c| c.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        let mut conn = self.conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| AppError::Knowledge(format!("Failed to begin transaction: {}", e)))?;
        index::delete_chunks(&tx, &doc.id)?;
        index::insert_document(&tx, &doc)?;

        for (candidate, embedding) in candidates.into_iter().zip(embeddings) {
            let chunk = DocumentChunk {
                id: format!("{}_chunk_{}", doc.id, candidate.position),
                document_id: doc.id.clone(),
                title: doc.title.clone(),
                category: doc.category.clone(),
                chunk_index: candidate.position,
                text: candidate.text,
            };
            index::insert_chunk(&tx, &chunk, &embedding)?;
        }
        tx.commit()
            .map_err(|e| AppError::Knowledge(format!("Failed to commit document: {}", e)))?;

        tracing::info!(
            "Added document '{}' ({}, {} chunks)",
            doc.title,
            doc.category,
            texts.len()
        );

        Ok(doc)
    }

    /// Load every `.txt`/`.md` file under `dir`.
    ///
    /// Titles come from file stems and categories from path components.
    /// Unreadable files are skipped and counted.
    pub async fn load_directory(&self, dir: &Path) -> AppResult<LoadStats> {
        let start = Instant::now();

        if !dir.is_dir() {
            return Err(AppError::Knowledge(format!(
                "Knowledge directory does not exist: {:?}",
                dir
            )));
        }

        let mut stats = LoadStats::default();

        for entry in WalkDir::new(dir)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            let is_document = path.is_file()
                && path
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| DOCUMENT_EXTENSIONS.contains(&e.to_lowercase().as_str()));
            if !is_document {
                continue;
            }

            let relative = path.strip_prefix(dir).unwrap_or(path);
            let content = match std::fs::read_to_string(path) {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!("Skipping {:?}: {}", path, e);
                    stats.files_skipped += 1;
                    continue;
                }
            };

            let category = config::infer_category(relative);
            let title = config::title_from_path(path);
            let doc = self
                .add_document(&title, &content, &category, vec![category.clone()])
                .await?;

            stats.documents_loaded += 1;
            stats.chunks_indexed += chunker::chunk_words(&doc.content, self.options.chunk_words)
                .len() as u32;
        }

        stats.duration_secs = start.elapsed().as_secs_f64();

        tracing::info!(
            "Loaded {} documents ({} chunks) from {:?} in {:.2}s",
            stats.documents_loaded,
            stats.chunks_indexed,
            dir,
            stats.duration_secs
        );

        Ok(stats)
    }

    pub fn get_document(&self, id: &str) -> AppResult<Option<KnowledgeDocument>> {
        index::get_document(&*self.conn()?, id)
    }

    pub fn list_documents(&self, category: Option<&str>) -> AppResult<Vec<KnowledgeDocument>> {
        index::list_documents(&*self.conn()?, category)
    }

    /// Delete a document and its indexed chunks.
    pub fn delete_document(&self, id: &str) -> AppResult<bool> {
        let removed = index::delete_document(&*self.conn()?, id)?;
        if removed {
            tracing::info!("Deleted document {}", id);
        }
        Ok(removed)
    }

    /// Drop every document.
    pub fn reset(&self) -> AppResult<()> {
        index::reset_index(&*self.conn()?)
    }

    pub fn stats(&self) -> AppResult<KnowledgeStats> {
        let (documents, chunks, by_category) = index::get_stats(&*self.conn()?)?;
        let db_size_bytes = self
            .db_path
            .as_ref()
            .and_then(|p| std::fs::metadata(p).ok())
            .map(|m| m.len())
            .unwrap_or(0);

        Ok(KnowledgeStats {
            documents,
            chunks,
            by_category,
            db_size_bytes,
        })
    }

    /// The `k` chunks nearest to `query`.
    pub async fn search_chunks(&self, query: &str, k: usize) -> AppResult<Vec<ChunkMatch>> {
        let query_embedding = self.embedder.embed(query).await?;
        let results = index::query_chunks(&*self.conn()?, &query_embedding, k)?;

        Ok(results
            .into_iter()
            .map(|(chunk, similarity)| ChunkMatch {
                chunk,
                distance: 1.0 - similarity,
            })
            .collect())
    }

    /// Up to `limit` distinct documents, ordered by their closest chunk.
    pub async fn search_documents(&self, query: &str, limit: usize) -> AppResult<Vec<DocumentMatch>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let matches = self
            .search_chunks(query, limit * self.options.oversample.max(1))
            .await?;

        let mut seen = HashSet::new();
        let mut documents = Vec::new();

        for m in matches {
            if !seen.insert(m.chunk.document_id.clone()) {
                continue;
            }
            if let Some(document) = self.get_document(&m.chunk.document_id)? {
                documents.push(DocumentMatch {
                    document,
                    distance: m.distance,
                });
            }
            if documents.len() == limit {
                break;
            }
        }

        tracing::debug!(
            "Local search for '{}' returned {} documents",
            query,
            documents.len()
        );

        Ok(documents)
    }
}
