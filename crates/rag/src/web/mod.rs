//! Web evidence: search, page extraction and source credibility.

pub mod credibility;
pub mod duckduckgo;
pub mod extract;

pub use credibility::{assess_web_source, format_citation, format_web_citation, SourceCredibility};
pub use duckduckgo::DuckDuckGoSearch;
pub use extract::{HttpPageExtractor, PageExtractor};

use crate::evidence::EvidenceItem;
use async_trait::async_trait;
use reel_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Phrase prepended to every web query to keep results on topic.
pub const DOMAIN_ANCHOR: &str = "movie industry";

/// One search-engine result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// A web search backend.
#[async_trait]
pub trait WebSearchProvider: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> AppResult<Vec<SearchHit>>;
}

pub(crate) fn http_client(timeout: Duration) -> AppResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))
}

/// Searches the web and turns results into evidence.
pub struct WebSearcher {
    provider: Arc<dyn WebSearchProvider>,
    extractor: Arc<dyn PageExtractor>,
    fetch_delay: Duration,
}

impl WebSearcher {
    pub fn new(provider: Arc<dyn WebSearchProvider>, extractor: Arc<dyn PageExtractor>) -> Self {
        Self {
            provider,
            extractor,
            fetch_delay: Duration::from_millis(1000),
        }
    }

    /// DuckDuckGo search with HTTP page extraction.
    pub fn duckduckgo(timeout: Duration, page_char_limit: usize) -> AppResult<Self> {
        Ok(Self::new(
            Arc::new(DuckDuckGoSearch::new(timeout)?),
            Arc::new(HttpPageExtractor::new(timeout, page_char_limit)?),
        ))
    }

    /// Pause between page fetches.
    pub fn with_fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = delay;
        self
    }

    /// Search for `query` and extract up to `limit` pages.
    ///
    /// Provider failures yield no evidence. A page that cannot be extracted
    /// falls back to its search snippet.
    pub async fn search(&self, query: &str, limit: usize) -> Vec<EvidenceItem> {
        if limit == 0 {
            return Vec::new();
        }

        let anchored = format!("{} {}", DOMAIN_ANCHOR, query);
        let hits = match self.provider.search(&anchored, limit).await {
            Ok(hits) => hits,
            Err(e) => {
                tracing::warn!("Web search unavailable: {}", e);
                return Vec::new();
            }
        };

        let mut evidence = Vec::with_capacity(hits.len().min(limit));

        for (i, hit) in hits.into_iter().take(limit).enumerate() {
            if i > 0 && !self.fetch_delay.is_zero() {
                tokio::time::sleep(self.fetch_delay).await;
            }

            let content = match self.extractor.extract(&hit.url).await {
                Ok(text) if !text.trim().is_empty() => text,
                Ok(_) => {
                    tracing::debug!(url = %hit.url, "Empty page, using snippet");
                    hit.snippet.clone()
                }
                Err(e) => {
                    tracing::warn!("Extraction failed, using snippet: {}", e);
                    hit.snippet.clone()
                }
            };

            let credibility = assess_web_source(&hit.url);
            evidence.push(EvidenceItem::web(
                hit.title,
                hit.url,
                content,
                credibility.credibility_score,
            ));
        }

        tracing::info!(results = evidence.len(), "Web evidence collected");
        evidence
    }
}
