//! In-crate stand-ins for the model, search engine, page fetcher and local index.

use crate::evidence::EvidenceItem;
use crate::generation::GenerationClient;
use crate::retriever::LocalSearch;
use crate::web::{PageExtractor, SearchHit, WebSearchProvider};
use async_trait::async_trait;
use reel_core::{AppError, AppResult};
use reel_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use reel_prompt::PromptLibrary;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Model that answers with fixed text and records every request.
pub struct FakeLlm {
    reply: String,
    fail: bool,
    pub requests: Mutex<Vec<LlmRequest>>,
}

impl FakeLlm {
    pub fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            fail: false,
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: String::new(),
            fail: true,
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> LlmRequest {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl LlmClient for FakeLlm {
    fn provider_name(&self) -> &str {
        "fake"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.requests.lock().unwrap().push(request.clone());
        if self.fail {
            return Err(AppError::Generation("upstream returned 502".to_string()));
        }
        Ok(LlmResponse {
            content: self.reply.clone(),
            model: request.model.clone(),
            usage: Some(LlmUsage::new(100, 40)),
        })
    }
}

pub fn generator(llm: Arc<FakeLlm>) -> GenerationClient {
    GenerationClient::new(llm, PromptLibrary::builtin().unwrap(), "gpt-4", "gpt-3.5-turbo")
}

/// Search engine returning canned hits and recording queries.
pub struct FakeSearch {
    hits: Vec<SearchHit>,
    fail: bool,
    pub queries: Mutex<Vec<String>>,
}

impl FakeSearch {
    pub fn with_hits(hits: Vec<SearchHit>) -> Arc<Self> {
        Arc::new(Self {
            hits,
            fail: false,
            queries: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            hits: Vec::new(),
            fail: true,
            queries: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl WebSearchProvider for FakeSearch {
    async fn search(&self, query: &str, limit: usize) -> AppResult<Vec<SearchHit>> {
        self.queries.lock().unwrap().push(query.to_string());
        if self.fail {
            return Err(AppError::Retrieval("search provider timed out".to_string()));
        }
        Ok(self.hits.iter().take(limit).cloned().collect())
    }
}

pub fn hit(title: &str, url: &str, snippet: &str) -> SearchHit {
    SearchHit {
        title: title.to_string(),
        url: url.to_string(),
        snippet: snippet.to_string(),
    }
}

/// Page fetcher that fails for URLs containing "broken".
#[derive(Default)]
pub struct FakeExtractor {
    pub fetches: AtomicUsize,
}

#[async_trait]
impl PageExtractor for FakeExtractor {
    async fn extract(&self, url: &str) -> AppResult<String> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if url.contains("broken") {
            return Err(AppError::Retrieval(format!("Failed to fetch {}", url)));
        }
        Ok(format!("Full article text from {}", url))
    }
}

/// Local index with fixed results.
pub struct FakeLocal {
    items: Vec<EvidenceItem>,
    fail: bool,
}

impl FakeLocal {
    pub fn with_items(items: Vec<EvidenceItem>) -> Arc<Self> {
        Arc::new(Self { items, fail: false })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            items: Vec::new(),
            fail: true,
        })
    }
}

#[async_trait]
impl LocalSearch for FakeLocal {
    async fn search(&self, _query: &str, limit: usize) -> AppResult<Vec<EvidenceItem>> {
        if self.fail {
            return Err(AppError::Knowledge("index is locked".to_string()));
        }
        Ok(self.items.iter().take(limit).cloned().collect())
    }
}
