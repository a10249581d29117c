//! Evidence retrieval from the local knowledge store and the web.

use crate::evidence::EvidenceItem;
use crate::web::WebSearcher;
use async_trait::async_trait;
use reel_core::AppResult;
use reel_knowledge::KnowledgeBase;
use std::sync::Arc;

/// Nearest-neighbour search over local documents.
#[async_trait]
pub trait LocalSearch: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> AppResult<Vec<EvidenceItem>>;
}

#[async_trait]
impl LocalSearch for KnowledgeBase {
    async fn search(&self, query: &str, limit: usize) -> AppResult<Vec<EvidenceItem>> {
        let matches = self.search_documents(query, limit).await?;

        Ok(matches
            .into_iter()
            .map(|m| {
                let similarity = f64::from(1.0 - m.distance);
                EvidenceItem::local(
                    m.document.title,
                    m.document.content,
                    m.document.category,
                    similarity,
                )
            })
            .collect())
    }
}

/// Merges local and web evidence for a question.
#[derive(Default)]
pub struct EvidenceRetriever {
    local: Option<Arc<dyn LocalSearch>>,
    web: Option<WebSearcher>,
}

impl EvidenceRetriever {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_local(mut self, local: Arc<dyn LocalSearch>) -> Self {
        self.local = Some(local);
        self
    }

    pub fn with_web(mut self, web: WebSearcher) -> Self {
        self.web = Some(web);
        self
    }

    /// Local evidence first, then web evidence, without re-ranking.
    ///
    /// Never fails: an unavailable source contributes nothing.
    pub async fn retrieve(
        &self,
        query: &str,
        local_limit: usize,
        web_limit: usize,
        skip_web: bool,
    ) -> Vec<EvidenceItem> {
        let local = async {
            match &self.local {
                Some(store) if local_limit > 0 => match store.search(query, local_limit).await {
                    Ok(mut items) => {
                        items.truncate(local_limit);
                        items
                    }
                    Err(e) => {
                        tracing::warn!("Local search unavailable: {}", e);
                        Vec::new()
                    }
                },
                _ => Vec::new(),
            }
        };

        let web = async {
            match &self.web {
                Some(searcher) if !skip_web => searcher.search(query, web_limit).await,
                _ => Vec::new(),
            }
        };

        let (mut evidence, web_evidence) = tokio::join!(local, web);

        tracing::info!(
            local = evidence.len(),
            web = web_evidence.len(),
            "Evidence retrieved"
        );

        evidence.extend(web_evidence);
        evidence
    }
}
