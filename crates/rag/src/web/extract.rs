//! Readable text extraction from HTML pages.

use async_trait::async_trait;
use reel_core::{AppError, AppResult};
use scraper::{ElementRef, Html};
use std::time::Duration;

/// Elements whose whole subtree is dropped before extracting text.
const STRIPPED_ELEMENTS: [&str; 8] = [
    "script", "style", "noscript", "template", "nav", "header", "footer", "aside",
];

/// Elements that break words apart in rendered text.
const BLOCK_ELEMENTS: [&str; 24] = [
    "address", "article", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption", "h1", "h2",
    "h3", "h4", "h5", "h6", "hr", "li", "main", "ol", "p", "pre", "section", "td", "tr",
];

/// Fetches a page and returns its readable text.
#[async_trait]
pub trait PageExtractor: Send + Sync {
    async fn extract(&self, url: &str) -> AppResult<String>;
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child) = ElementRef::wrap(child) {
            let name = child.value().name();
            if STRIPPED_ELEMENTS.contains(&name) {
                continue;
            }
            let block = BLOCK_ELEMENTS.contains(&name);
            if block {
                out.push(' ');
            }
            collect_text(child, out);
            if block {
                out.push(' ');
            }
        }
    }
}

/// Visible text under `element`, whitespace collapsed.
pub fn element_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    collect_text(element, &mut out);
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strip markup and collapse whitespace. No length limit.
pub fn strip_markup(html: &str) -> String {
    element_text(Html::parse_document(html).root_element())
}

/// Truncate to `limit` characters, marking the cut with "...".
pub fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

/// Readable body text of an HTML document, at most `limit` characters plus "...".
pub fn html_to_text(html: &str, limit: usize) -> String {
    truncate_chars(&strip_markup(html), limit)
}

/// Page extractor backed by an HTTP client.
pub struct HttpPageExtractor {
    client: reqwest::Client,
    char_limit: usize,
}

impl HttpPageExtractor {
    pub fn new(timeout: Duration, char_limit: usize) -> AppResult<Self> {
        Ok(Self {
            client: super::http_client(timeout)?,
            char_limit,
        })
    }
}

#[async_trait]
impl PageExtractor for HttpPageExtractor {
    async fn extract(&self, url: &str) -> AppResult<String> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|e| AppError::Retrieval(format!("Invalid URL {}: {}", url, e)))?;
        if parsed.host_str().is_none() || !matches!(parsed.scheme(), "http" | "https") {
            return Err(AppError::Retrieval(format!("Unsupported URL: {}", url)));
        }

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| AppError::Retrieval(format!("Failed to fetch {}: {}", url, e)))?
            .error_for_status()
            .map_err(|e| AppError::Retrieval(format!("Fetch of {} failed: {}", url, e)))?;

        let body = response
            .text()
            .await
            .map_err(|e| AppError::Retrieval(format!("Failed to read {}: {}", url, e)))?;

        let text = html_to_text(&body, self.char_limit);
        tracing::debug!(url, chars = text.chars().count(), "Extracted page text");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_boilerplate_elements() {
        let html = r#"<html><head><style>body { color: red }</style>
            <script type="text/javascript">var x = "<p>";</script></head>
            <body><nav><a href="/">Home</a></nav><header>Site</header>
            <p>Principal   photography
            began in <b>March</b>.</p><aside>Ads</aside><footer>(c) 2024</footer>
            <!-- tracking --></body></html>"#;

        assert_eq!(html_to_text(html, 2000), "Principal photography began in March.");
    }

    #[test]
    fn test_nested_boilerplate_is_dropped_whole() {
        let html = "<nav><ul><li><nav>Sub</nav></li><li>Menu Link</li></ul></nav><p>Body text</p>";
        assert_eq!(html_to_text(html, 2000), "Body text");
    }

    #[test]
    fn test_bare_angle_brackets_are_text() {
        let html = "<p>Ratios like 3 < 5 and 7 > 2 in crew size.</p>";
        assert_eq!(
            html_to_text(html, 2000),
            "Ratios like 3 < 5 and 7 > 2 in crew size."
        );
    }

    #[test]
    fn test_blocks_separate_words() {
        assert_eq!(
            strip_markup("<div>Call sheet<p>Crew call 6am</p><ul><li>Grip</li><li>Gaffer</li></ul></div>"),
            "Call sheet Crew call 6am Grip Gaffer"
        );
    }

    #[test]
    fn test_decodes_entities() {
        assert_eq!(
            strip_markup("<p>Cast &amp; crew&nbsp;&#8212; &quot;day&#x20;one&quot;</p>"),
            "Cast & crew \u{2014} \"day one\""
        );
    }

    #[test]
    fn test_truncation_marks_cut() {
        let long = "a".repeat(2500);
        let text = html_to_text(&long, 2000);
        assert_eq!(text.chars().count(), 2003);
        assert!(text.ends_with("..."));
        assert_eq!(html_to_text("short", 2000), "short");
    }

    #[test]
    fn test_truncation_is_char_safe() {
        assert_eq!(truncate_chars("éééé", 2), "éé...");
    }
}
