//! Command handlers for the reel CLI.
//!
//! This module organizes all CLI commands into separate submodules.

pub mod ask;
pub mod chat;
pub mod knowledge;

pub use ask::AskCommand;
pub use chat::ChatCommand;
pub use knowledge::KnowledgeCommand;

use reel_core::{config::AppConfig, AppError, AppResult};
use reel_knowledge::{KnowledgeBase, StoreOptions};
use reel_rag::web::format_citation;
use reel_rag::{ChatService, LocalSearch, SourceEntry, SourceType};
use serde::Serialize;
use std::sync::Arc;

/// Open the workspace knowledge store.
pub fn open_knowledge(config: &AppConfig) -> AppResult<KnowledgeBase> {
    let options = StoreOptions::default().with_embedding_dim(config.knowledge.embedding_dim);
    KnowledgeBase::open(&config.index_path(), options)
}

/// Build the answering pipeline over the workspace knowledge store.
pub fn build_service(config: &AppConfig) -> AppResult<ChatService> {
    let knowledge: Arc<dyn LocalSearch> = Arc::new(open_knowledge(config)?);
    let service = ChatService::from_config(config, Some(knowledge))?;
    if !service.can_generate() {
        tracing::warn!(
            "No credential configured for provider '{}'; questions will fail until one is set",
            config.provider
        );
    }
    Ok(service)
}

pub fn print_json<T: Serialize>(value: &T) -> AppResult<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| AppError::Serialization(e.to_string()))?;
    println!("{}", json);
    Ok(())
}

/// One display line for a listed source.
pub fn source_line(source: &SourceEntry) -> String {
    match (source.source_type, source.url.as_deref()) {
        (SourceType::Web | SourceType::WebCitation, Some(url)) => format!(
            "{} ({:.3})",
            format_citation(&source.title, url),
            source.relevance_score
        ),
        _ => match source.category.as_deref() {
            Some(category) => format!(
                "{} [{}, {}] ({:.3})",
                source.title,
                source.source_type.as_str(),
                category,
                source.relevance_score
            ),
            None => format!(
                "{} [{}] ({:.3})",
                source.title,
                source.source_type.as_str(),
                source.relevance_score
            ),
        },
    }
}

pub fn print_sources(sources: &[SourceEntry]) {
    if sources.is_empty() {
        return;
    }
    println!("\nSources:");
    for source in sources {
        println!("  • {}", source_line(source));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_lines() {
        let local = SourceEntry {
            title: "Film Budget Basics".to_string(),
            source_type: SourceType::Local,
            url: None,
            category: Some("pre-production".to_string()),
            relevance_score: 0.82,
        };
        assert_eq!(source_line(&local), "Film Budget Basics [local, pre-production] (0.820)");

        let web = SourceEntry::new("Indie Budgets", SourceType::Web, 0.8)
            .with_url("https://variety.com/budgets");
        assert_eq!(
            source_line(&web),
            "[Indie Budgets](https://variety.com/budgets) from variety.com (0.800)"
        );

        let phrase = SourceEntry::new("Studio Handbook", SourceType::Citation, 0.8);
        assert_eq!(source_line(&phrase), "Studio Handbook [citation] (0.800)");
    }
}
