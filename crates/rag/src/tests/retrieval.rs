//! Evidence retrieval across local and web sources.

use super::fakes::{hit, FakeExtractor, FakeLocal, FakeSearch};
use crate::evidence::{EvidenceItem, SourceKind};
use crate::retriever::EvidenceRetriever;
use crate::web::WebSearcher;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

fn local_items() -> Vec<EvidenceItem> {
    vec![
        EvidenceItem::local("Film Budget Basics", "Above and below the line.", "pre-production", 0.82),
        EvidenceItem::local("Scheduling a Shoot", "Stripboards and day-out-of-days.", "pre-production", 0.64),
    ]
}

fn searcher(search: Arc<FakeSearch>, extractor: Arc<FakeExtractor>) -> WebSearcher {
    WebSearcher::new(search, extractor).with_fetch_delay(Duration::ZERO)
}

#[tokio::test]
async fn test_local_first_then_web() {
    let search = FakeSearch::with_hits(vec![hit(
        "Indie Budgets",
        "https://variety.com/budgets",
        "snippet",
    )]);
    let retriever = EvidenceRetriever::new()
        .with_local(FakeLocal::with_items(local_items()))
        .with_web(searcher(search, Arc::new(FakeExtractor::default())));

    let evidence = retriever.retrieve("indie budget", 3, 2, false).await;

    let kinds: Vec<SourceKind> = evidence.iter().map(|e| e.source_kind).collect();
    assert_eq!(kinds, vec![SourceKind::Local, SourceKind::Local, SourceKind::Web]);
    assert_eq!(evidence[2].content, "Full article text from https://variety.com/budgets");
    assert_eq!(evidence[2].url.as_deref(), Some("https://variety.com/budgets"));
    // trade publication credibility
    assert!((evidence[2].relevance_score - 0.8).abs() < 1e-9);
}

#[tokio::test]
async fn test_web_query_is_domain_anchored() {
    let search = FakeSearch::with_hits(vec![]);
    let retriever = EvidenceRetriever::new()
        .with_web(searcher(Arc::clone(&search), Arc::new(FakeExtractor::default())));

    retriever.retrieve("dolly grips", 3, 2, false).await;

    let queries = search.queries.lock().unwrap().clone();
    assert_eq!(queries, vec!["movie industry dolly grips"]);
}

#[tokio::test]
async fn test_extraction_failure_falls_back_to_snippet() {
    let search = FakeSearch::with_hits(vec![
        hit("Broken Page", "https://example.com/broken", "Snippet about grips."),
        hit("Working Page", "https://example.com/ok", "Unused snippet."),
    ]);
    let extractor = Arc::new(FakeExtractor::default());
    let retriever = EvidenceRetriever::new().with_web(searcher(search, Arc::clone(&extractor)));

    let evidence = retriever.retrieve("grips", 0, 2, false).await;

    assert_eq!(evidence.len(), 2);
    assert_eq!(evidence[0].content, "Snippet about grips.");
    assert_eq!(evidence[1].content, "Full article text from https://example.com/ok");
    assert_eq!(extractor.fetches.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_web_limit_is_respected() {
    let search = FakeSearch::with_hits(vec![
        hit("One", "https://example.com/1", "a"),
        hit("Two", "https://example.com/2", "b"),
        hit("Three", "https://example.com/3", "c"),
    ]);
    let extractor = Arc::new(FakeExtractor::default());
    let retriever = EvidenceRetriever::new().with_web(searcher(search, Arc::clone(&extractor)));

    let evidence = retriever.retrieve("anything", 0, 2, false).await;
    assert_eq!(evidence.len(), 2);
    assert_eq!(extractor.fetches.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_failures_degrade_to_empty() {
    let retriever = EvidenceRetriever::new()
        .with_local(FakeLocal::failing())
        .with_web(searcher(FakeSearch::failing(), Arc::new(FakeExtractor::default())));

    assert!(retriever.retrieve("anything", 3, 2, false).await.is_empty());
}

#[tokio::test]
async fn test_skip_web() {
    let search = FakeSearch::with_hits(vec![hit("One", "https://example.com/1", "a")]);
    let retriever = EvidenceRetriever::new()
        .with_local(FakeLocal::with_items(local_items()))
        .with_web(searcher(Arc::clone(&search), Arc::new(FakeExtractor::default())));

    let evidence = retriever.retrieve("budget", 1, 2, true).await;

    assert_eq!(evidence.len(), 1);
    assert_eq!(evidence[0].title, "Film Budget Basics");
    assert!(search.queries.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_fetch_delay_suspends_between_pages() {
    tokio::time::pause();
    let search = FakeSearch::with_hits(vec![
        hit("One", "https://example.com/1", "a"),
        hit("Two", "https://example.com/2", "b"),
    ]);
    let web = WebSearcher::new(search, Arc::new(FakeExtractor::default()))
        .with_fetch_delay(Duration::from_secs(1));

    let started = tokio::time::Instant::now();
    let evidence = web.search("anything", 2).await;

    assert_eq!(evidence.len(), 2);
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(1));
    assert!(elapsed < Duration::from_secs(2));
}

#[tokio::test]
async fn test_knowledge_base_as_local_search() {
    use crate::retriever::LocalSearch;
    use reel_knowledge::{KnowledgeBase, StoreOptions};

    let kb = KnowledgeBase::open_in_memory(StoreOptions::default()).unwrap();
    kb.add_document(
        "Color Grading Workflow",
        "Color grading adjusts contrast and saturation after picture lock.",
        "post-production",
        vec![],
    )
    .await
    .unwrap();

    let items = kb.search("color grading contrast", 3).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].source_kind, SourceKind::Local);
    assert_eq!(items[0].category.as_deref(), Some("post-production"));
    assert!((0.0..=1.0).contains(&items[0].relevance_score));
}
