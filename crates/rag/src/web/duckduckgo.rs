//! DuckDuckGo HTML endpoint search provider.
//!
//! No API key is needed. Results are scraped from the lightweight HTML page.

use super::extract::element_text;
use super::{SearchHit, WebSearchProvider};
use async_trait::async_trait;
use reel_core::{AppError, AppResult};
use scraper::{Html, Selector};
use std::sync::LazyLock;
use std::time::Duration;

const SEARCH_URL: &str = "https://html.duckduckgo.com/html/";

static RESULT: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".result").unwrap());
static RESULT_LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a.result__a").unwrap());
static RESULT_SNIPPET: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".result__snippet").unwrap());

pub struct DuckDuckGoSearch {
    client: reqwest::Client,
}

impl DuckDuckGoSearch {
    pub fn new(timeout: Duration) -> AppResult<Self> {
        Ok(Self {
            client: super::http_client(timeout)?,
        })
    }
}

/// Resolve DuckDuckGo's `/l/?uddg=` redirect links to the target URL.
pub fn resolve_result_url(href: &str) -> Option<String> {
    let absolute = if href.starts_with("//") {
        format!("https:{}", href)
    } else {
        href.to_string()
    };

    let parsed = reqwest::Url::parse(&absolute).ok()?;
    if parsed.path().starts_with("/l/") {
        return parsed
            .query_pairs()
            .find(|(key, _)| key == "uddg")
            .map(|(_, value)| value.into_owned());
    }

    matches!(parsed.scheme(), "http" | "https").then_some(absolute)
}

/// Parse a results page into hits, in page order.
pub fn parse_results(html: &str, limit: usize) -> Vec<SearchHit> {
    let document = Html::parse_document(html);

    document
        .select(&RESULT)
        .filter_map(|result| {
            let link = result.select(&RESULT_LINK).next()?;
            let url = resolve_result_url(link.value().attr("href")?)?;
            Some(SearchHit {
                title: element_text(link),
                url,
                snippet: result
                    .select(&RESULT_SNIPPET)
                    .next()
                    .map(element_text)
                    .unwrap_or_default(),
            })
        })
        .take(limit)
        .collect()
}

#[async_trait]
impl WebSearchProvider for DuckDuckGoSearch {
    async fn search(&self, query: &str, limit: usize) -> AppResult<Vec<SearchHit>> {
        let url = reqwest::Url::parse_with_params(SEARCH_URL, &[("q", query)])
            .map_err(|e| AppError::Retrieval(format!("Invalid search URL: {}", e)))?;

        let body = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::Retrieval(format!("Search request failed: {}", e)))?
            .error_for_status()
            .map_err(|e| AppError::Retrieval(format!("Search provider error: {}", e)))?
            .text()
            .await
            .map_err(|e| AppError::Retrieval(format!("Failed to read search results: {}", e)))?;

        let hits = parse_results(&body, limit);
        tracing::debug!(query, hits = hits.len(), "DuckDuckGo search complete");
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <div class="result results_links">
          <h2 class="result__title">
            <a rel="nofollow" class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fvariety.com%2Ffilm%2Fbudgets&amp;rut=abc">Indie <b>Film</b> Budgets</a>
          </h2>
          <a class="result__snippet" href="//duckduckgo.com/l/?uddg=x">Most indie films cost <b>less</b> than you think.</a>
        </div>
        <div class="result results_links">
          <h2 class="result__title">
            <a rel="nofollow" class="result__a" href="https://www.indiewire.com/scheduling">Scheduling a Shoot</a>
          </h2>
          <a class="result__snippet" href="https://www.indiewire.com/scheduling">Stripboards &amp; day-out-of-days.</a>
        </div>
    "#;

    #[test]
    fn test_parse_results() {
        let hits = parse_results(PAGE, 5);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title, "Indie Film Budgets");
        assert_eq!(hits[0].url, "https://variety.com/film/budgets");
        assert_eq!(hits[0].snippet, "Most indie films cost less than you think.");
        assert_eq!(hits[1].url, "https://www.indiewire.com/scheduling");
        assert_eq!(hits[1].snippet, "Stripboards & day-out-of-days.");
    }

    #[test]
    fn test_result_without_snippet_keeps_its_link() {
        let page = r#"<div class="result"><a class="result__a" href="https://deadline.com/a">Box Office</a></div>
            <div class="result"><a class="result__a" href="https://variety.com/b">Awards</a>
            <a class="result__snippet" href="https://variety.com/b">Season opens.</a></div>"#;
        let hits = parse_results(page, 5);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].snippet, "");
        assert_eq!(hits[1].snippet, "Season opens.");
    }

    #[test]
    fn test_parse_results_respects_limit() {
        assert_eq!(parse_results(PAGE, 1).len(), 1);
        assert!(parse_results("<html></html>", 3).is_empty());
    }

    #[test]
    fn test_resolve_result_url() {
        assert_eq!(
            resolve_result_url("//duckduckgo.com/l/?uddg=https%3A%2F%2Fdeadline.com%2F&rut=1")
                .as_deref(),
            Some("https://deadline.com/")
        );
        assert_eq!(resolve_result_url("javascript:void(0)"), None);
    }
}
