//! SQLite-backed document store and vector index.

use crate::types::{DocumentChunk, KnowledgeDocument};
use chrono::{DateTime, Utc};
use reel_core::{AppError, AppResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::BTreeMap;
use std::path::Path;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS documents (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        content TEXT NOT NULL,
        category TEXT NOT NULL,
        tags TEXT NOT NULL,
        created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS chunks (
        id TEXT PRIMARY KEY,
        document_id TEXT NOT NULL,
        chunk_index INTEGER NOT NULL,
        title TEXT NOT NULL,
        category TEXT NOT NULL,
        text TEXT NOT NULL,
        embedding BLOB NOT NULL,
        FOREIGN KEY (document_id) REFERENCES documents(id)
    );

    CREATE INDEX IF NOT EXISTS idx_chunks_document ON chunks(document_id);
"#;

/// Open (or create) the index database at `db_path`.
pub fn init_index(db_path: &Path) -> AppResult<Connection> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| AppError::Knowledge(format!("Failed to create index directory: {}", e)))?;
    }

    let conn = Connection::open(db_path)
        .map_err(|e| AppError::Knowledge(format!("Failed to open SQLite index: {}", e)))?;
    create_tables(&conn)?;

    tracing::debug!("Initialized SQLite index at {:?}", db_path);
    Ok(conn)
}

/// Open a throwaway index that lives only in memory.
pub fn init_in_memory() -> AppResult<Connection> {
    let conn = Connection::open_in_memory()
        .map_err(|e| AppError::Knowledge(format!("Failed to open in-memory index: {}", e)))?;
    create_tables(&conn)?;
    Ok(conn)
}

fn create_tables(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(SCHEMA)
        .map_err(|e| AppError::Knowledge(format!("Failed to create tables: {}", e)))
}

/// Insert or replace a document row.
pub fn insert_document(conn: &Connection, doc: &KnowledgeDocument) -> AppResult<()> {
    let tags = serde_json::to_string(&doc.tags)?;

    conn.execute(
        "INSERT OR REPLACE INTO documents (id, title, content, category, tags, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            doc.id,
            doc.title,
            doc.content,
            doc.category,
            tags,
            doc.created_at.to_rfc3339(),
        ],
    )
    .map_err(|e| AppError::Knowledge(format!("Failed to insert document: {}", e)))?;

    Ok(())
}

/// Insert a chunk with its embedding.
pub fn insert_chunk(conn: &Connection, chunk: &DocumentChunk, embedding: &[f32]) -> AppResult<()> {
    conn.execute(
        "INSERT OR REPLACE INTO chunks (id, document_id, chunk_index, title, category, text, embedding)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            chunk.id,
            chunk.document_id,
            chunk.chunk_index as i64,
            chunk.title,
            chunk.category,
            chunk.text,
            embedding_to_bytes(embedding),
        ],
    )
    .map_err(|e| AppError::Knowledge(format!("Failed to insert chunk: {}", e)))?;

    Ok(())
}

fn row_to_document(row: &Row<'_>) -> rusqlite::Result<KnowledgeDocument> {
    let tags_json: String = row.get(4)?;
    let tags: Vec<String> = serde_json::from_str(&tags_json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e)))?;

    let created_at: String = row.get(5)?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e)))?;

    Ok(KnowledgeDocument {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        category: row.get(3)?,
        tags,
        created_at,
    })
}

/// Fetch one document by id.
pub fn get_document(conn: &Connection, id: &str) -> AppResult<Option<KnowledgeDocument>> {
    conn.query_row(
        "SELECT id, title, content, category, tags, created_at FROM documents WHERE id = ?1",
        params![id],
        row_to_document,
    )
    .optional()
    .map_err(|e| AppError::Knowledge(format!("Failed to load document {}: {}", id, e)))
}

/// List documents, optionally restricted to one category, oldest first.
pub fn list_documents(
    conn: &Connection,
    category: Option<&str>,
) -> AppResult<Vec<KnowledgeDocument>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, title, content, category, tags, created_at FROM documents
             WHERE ?1 IS NULL OR category = ?1
             ORDER BY created_at, title",
        )
        .map_err(|e| AppError::Knowledge(format!("Failed to prepare query: {}", e)))?;

    let rows = stmt
        .query_map(params![category], row_to_document)
        .map_err(|e| AppError::Knowledge(format!("Failed to list documents: {}", e)))?;

    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| AppError::Knowledge(format!("Failed to read document row: {}", e)))
}

/// Remove a document and all of its chunks. Returns whether the document existed.
pub fn delete_document(conn: &Connection, id: &str) -> AppResult<bool> {
    delete_chunks(conn, id)?;
    let removed = conn
        .execute("DELETE FROM documents WHERE id = ?1", params![id])
        .map_err(|e| AppError::Knowledge(format!("Failed to delete document: {}", e)))?;
    Ok(removed > 0)
}

/// Remove the chunks of one document.
pub fn delete_chunks(conn: &Connection, document_id: &str) -> AppResult<usize> {
    conn.execute(
        "DELETE FROM chunks WHERE document_id = ?1",
        params![document_id],
    )
    .map_err(|e| AppError::Knowledge(format!("Failed to delete chunks: {}", e)))
}

/// Query the index for the top-k chunks closest to `query_embedding`.
///
/// Returns `(chunk, cosine similarity)` pairs, best first.
pub fn query_chunks(
    conn: &Connection,
    query_embedding: &[f32],
    top_k: usize,
) -> AppResult<Vec<(DocumentChunk, f32)>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, document_id, chunk_index, title, category, text, embedding FROM chunks",
        )
        .map_err(|e| AppError::Knowledge(format!("Failed to prepare query: {}", e)))?;

    let rows = stmt
        .query_map([], |row| {
            let bytes: Vec<u8> = row.get(6)?;
            let chunk = DocumentChunk {
                id: row.get(0)?,
                document_id: row.get(1)?,
                chunk_index: row.get::<_, i64>(2)? as u32,
                title: row.get(3)?,
                category: row.get(4)?,
                text: row.get(5)?,
            };
            Ok((chunk, bytes))
        })
        .map_err(|e| AppError::Knowledge(format!("Failed to query chunks: {}", e)))?;

    let mut results = Vec::new();
    for row in rows {
        let (chunk, bytes) =
            row.map_err(|e| AppError::Knowledge(format!("Failed to read chunk row: {}", e)))?;
        let embedding = bytes_to_embedding(&bytes)?;
        let score = cosine_similarity(query_embedding, &embedding);
        results.push((chunk, score));
    }

    results.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    results.truncate(top_k);

    tracing::debug!(
        "Retrieved {} chunks (requested top-{})",
        results.len(),
        top_k
    );

    Ok(results)
}

/// Document count, chunk count, and documents per category.
pub fn get_stats(conn: &Connection) -> AppResult<(u32, u32, BTreeMap<String, u32>)> {
    let count = |sql: &str| -> AppResult<u32> {
        conn.query_row(sql, [], |row| row.get::<_, i64>(0).map(|v| v as u32))
            .map_err(|e| AppError::Knowledge(format!("Failed to count rows: {}", e)))
    };

    let documents = count("SELECT COUNT(*) FROM documents")?;
    let chunks = count("SELECT COUNT(*) FROM chunks")?;

    let mut stmt = conn
        .prepare("SELECT category, COUNT(*) FROM documents GROUP BY category")
        .map_err(|e| AppError::Knowledge(format!("Failed to prepare query: {}", e)))?;
    let by_category = stmt
        .query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u32))
        })
        .map_err(|e| AppError::Knowledge(format!("Failed to group categories: {}", e)))?
        .collect::<Result<BTreeMap<_, _>, _>>()
        .map_err(|e| AppError::Knowledge(format!("Failed to read category row: {}", e)))?;

    Ok((documents, chunks, by_category))
}

/// Delete every document and chunk.
pub fn reset_index(conn: &Connection) -> AppResult<()> {
    conn.execute_batch("DELETE FROM chunks; DELETE FROM documents;")
        .map_err(|e| AppError::Knowledge(format!("Failed to reset index: {}", e)))?;

    tracing::info!("Reset knowledge index");
    Ok(())
}

fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn bytes_to_embedding(bytes: &[u8]) -> AppResult<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(AppError::Knowledge(
            "Invalid embedding bytes length".to_string(),
        ));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

/// Cosine similarity; 0.0 for mismatched lengths or zero vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}
