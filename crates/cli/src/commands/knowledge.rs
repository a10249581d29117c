//! Knowledge command handler.
//!
//! Manages the local document store that grounds answers.

use super::{open_knowledge, print_json};
use clap::{Args, Subcommand};
use reel_core::{config::AppConfig, AppError, AppResult};
use reel_knowledge::{CATEGORIES, DEFAULT_CATEGORY};
use std::path::PathBuf;

/// Knowledge store management
#[derive(Args, Debug)]
pub struct KnowledgeCommand {
    #[command(subcommand)]
    pub action: KnowledgeAction,
}

#[derive(Subcommand, Debug)]
pub enum KnowledgeAction {
    /// Add a single document
    Add(KnowledgeAddCommand),
    /// Load every .txt/.md file under a directory
    Load(KnowledgeLoadCommand),
    /// Search the store
    Search(KnowledgeSearchCommand),
    /// List stored documents
    List(KnowledgeListCommand),
    /// Delete a document by id
    Delete(KnowledgeDeleteCommand),
    /// Show store statistics
    Stats(KnowledgeStatsCommand),
}

/// Add a document
#[derive(Args, Debug)]
pub struct KnowledgeAddCommand {
    /// Document title
    #[arg(long)]
    pub title: String,

    /// Production phase (pre-production, production, post-production)
    #[arg(long, default_value = DEFAULT_CATEGORY)]
    pub category: String,

    /// Comma-separated tags
    #[arg(long, value_delimiter = ',')]
    pub tags: Vec<String>,

    /// Read content from a file
    #[arg(long, conflicts_with = "content")]
    pub file: Option<PathBuf>,

    /// Inline content
    #[arg(long)]
    pub content: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl KnowledgeAddCommand {
    fn read_content(&self) -> AppResult<String> {
        match (&self.file, &self.content) {
            (Some(path), _) => Ok(std::fs::read_to_string(path)?),
            (None, Some(content)) => Ok(content.clone()),
            (None, None) => Err(AppError::Config(
                "Provide document content with --file or --content".to_string(),
            )),
        }
    }

    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing knowledge add command for '{}'", self.title);

        if !CATEGORIES.contains(&self.category.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown category '{}'. Expected one of: {}",
                self.category,
                CATEGORIES.join(", ")
            )));
        }

        let content = self.read_content()?;
        let store = open_knowledge(config)?;
        let tags: Vec<String> = self
            .tags
            .iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        let doc = store
            .add_document(&self.title, &content, &self.category, tags)
            .await?;

        if self.json {
            print_json(&doc)?;
        } else {
            println!("Added '{}' ({}) as {}", doc.title, doc.category, doc.id);
        }

        Ok(())
    }
}

/// Load a directory
#[derive(Args, Debug)]
pub struct KnowledgeLoadCommand {
    /// Directory to load (default: .reel/knowledge)
    pub dir: Option<PathBuf>,

    /// Drop every stored document first
    #[arg(long)]
    pub reset: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl KnowledgeLoadCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let dir = self.dir.clone().unwrap_or_else(|| config.knowledge_dir());
        tracing::info!("Executing knowledge load command for {:?}", dir);

        let store = open_knowledge(config)?;
        if self.reset {
            store.reset()?;
        }
        let stats = store.load_directory(&dir).await?;

        if self.json {
            print_json(&stats)?;
        } else {
            println!(
                "Loaded {} documents ({} chunks, {} skipped) in {:.2}s",
                stats.documents_loaded, stats.chunks_indexed, stats.files_skipped, stats.duration_secs
            );
        }

        Ok(())
    }
}

/// Search the store
#[derive(Args, Debug)]
pub struct KnowledgeSearchCommand {
    /// Query text
    pub query: String,

    /// Number of documents to return
    #[arg(short = 'k', long, default_value = "3")]
    pub top_k: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl KnowledgeSearchCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing knowledge search command");

        let store = open_knowledge(config)?;
        let matches = store.search_documents(&self.query, self.top_k).await?;

        if self.json {
            let output: Vec<serde_json::Value> = matches
                .iter()
                .map(|m| {
                    serde_json::json!({
                        "id": m.document.id,
                        "title": m.document.title,
                        "category": m.document.category,
                        "distance": m.distance,
                    })
                })
                .collect();
            return print_json(&output);
        }

        if matches.is_empty() {
            println!("No matching documents");
        }
        for m in &matches {
            println!(
                "{:.3}  {} [{}]  {}",
                1.0 - m.distance,
                m.document.title,
                m.document.category,
                m.document.id
            );
        }

        Ok(())
    }
}

/// List documents
#[derive(Args, Debug)]
pub struct KnowledgeListCommand {
    /// Only show one category
    #[arg(long)]
    pub category: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl KnowledgeListCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let store = open_knowledge(config)?;
        let docs = store.list_documents(self.category.as_deref())?;

        if self.json {
            return print_json(&docs);
        }

        for doc in &docs {
            println!("{}  {} [{}]", doc.id, doc.title, doc.category);
        }
        println!("{} documents", docs.len());

        Ok(())
    }
}

/// Delete a document
#[derive(Args, Debug)]
pub struct KnowledgeDeleteCommand {
    /// Document id
    pub id: String,
}

impl KnowledgeDeleteCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let store = open_knowledge(config)?;
        if store.delete_document(&self.id)? {
            println!("Deleted {}", self.id);
            Ok(())
        } else {
            Err(AppError::Knowledge(format!("No document with id {}", self.id)))
        }
    }
}

/// Show store stats
#[derive(Args, Debug)]
pub struct KnowledgeStatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl KnowledgeStatsCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let store = open_knowledge(config)?;
        let stats = store.stats()?;

        if self.json {
            print_json(&stats)?;
        } else {
            println!("Knowledge store: {}", config.index_path().display());
            println!("  Documents: {}", stats.documents);
            println!("  Chunks: {}", stats.chunks);
            for (category, count) in &stats.by_category {
                println!("    {}: {}", category, count);
            }
            println!("  DB size: {} bytes", stats.db_size_bytes);
        }

        Ok(())
    }
}

impl KnowledgeCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        match &self.action {
            KnowledgeAction::Add(cmd) => cmd.execute(config).await,
            KnowledgeAction::Load(cmd) => cmd.execute(config).await,
            KnowledgeAction::Search(cmd) => cmd.execute(config).await,
            KnowledgeAction::List(cmd) => cmd.execute(config).await,
            KnowledgeAction::Delete(cmd) => cmd.execute(config).await,
            KnowledgeAction::Stats(cmd) => cmd.execute(config).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add_command(file: Option<PathBuf>, content: Option<&str>) -> KnowledgeAddCommand {
        KnowledgeAddCommand {
            title: "Call Sheets".to_string(),
            category: DEFAULT_CATEGORY.to_string(),
            tags: Vec::new(),
            file,
            content: content.map(str::to_string),
            json: false,
        }
    }

    #[test]
    fn test_add_reads_inline_content() {
        let cmd = add_command(None, Some("A call sheet lists the next day's schedule."));
        assert_eq!(
            cmd.read_content().unwrap(),
            "A call sheet lists the next day's schedule."
        );
    }

    #[test]
    fn test_add_reads_file_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("call_sheets.md");
        std::fs::write(&path, "Distributed by the second AD.").unwrap();

        let cmd = add_command(Some(path), None);
        assert_eq!(cmd.read_content().unwrap(), "Distributed by the second AD.");
    }

    #[test]
    fn test_add_requires_content() {
        let cmd = add_command(None, None);
        assert!(matches!(cmd.read_content(), Err(AppError::Config(_))));
    }
}
