//! Citation phrase extraction and matching against evidence titles.

use crate::evidence::EvidenceItem;
use regex::Regex;
use reel_core::AppResult;
use std::sync::LazyLock;

/// Phrases too generic to count as a citation on their own.
const STOP_WORDS: [&str; 6] = ["script", "budget", "schedule", "film", "movie", "production"];

/// Candidates at or below this length are noise.
const MIN_CITATION_CHARS: usize = 5;

/// Unmatched citations longer than this are reported.
const SUBSTANTIAL_CITATION_CHARS: usize = 10;

static CITATION_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:according to|as stated in|based on|from|per|in)\s+(?:the\s+)?([^,.\n]+)")
        .unwrap()
});

/// Pulls candidate citation phrases out of generated text.
pub trait CitationExtractor: Send + Sync {
    fn extract(&self, text: &str) -> AppResult<Vec<String>>;
}

/// Regex-driven extractor over "According to X", "From X", "Per X" and similar.
#[derive(Debug, Default, Clone, Copy)]
pub struct PatternCitationExtractor;

impl CitationExtractor for PatternCitationExtractor {
    fn extract(&self, text: &str) -> AppResult<Vec<String>> {
        Ok(CITATION_PHRASE
            .captures_iter(text)
            .map(|caps| caps[1].trim().to_string())
            .filter(|candidate| is_meaningful(candidate))
            .collect())
    }
}

fn is_meaningful(candidate: &str) -> bool {
    if candidate.chars().count() <= MIN_CITATION_CHARS {
        return false;
    }
    if candidate
        .chars()
        .all(|c| c.is_ascii_digit() || c.is_whitespace() || c == ',' || c == '.')
    {
        return false;
    }
    if candidate.contains("://") {
        return false;
    }
    let lower = candidate.to_lowercase();
    !STOP_WORDS.contains(&lower.as_str())
}

fn significant_tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| token.chars().count() > 3)
        .map(str::to_lowercase)
        .collect()
}

/// Whether a citation phrase plausibly refers to an evidence title.
pub fn citation_matches(citation: &str, title: &str) -> bool {
    let citation = citation.trim().to_lowercase();
    let title = title.trim().to_lowercase();
    if citation.is_empty() || title.is_empty() {
        return false;
    }
    if title.contains(&citation) || citation.contains(&title) {
        return true;
    }

    let citation_tokens = significant_tokens(&citation);
    let title_tokens = significant_tokens(&title);
    citation_tokens.iter().any(|t| title_tokens.contains(t))
        || title_tokens.iter().any(|t| citation_tokens.contains(t))
}

/// Substantial citations that match no evidence title, in order.
pub fn unmatched_citations<'a>(citations: &'a [String], evidence: &[EvidenceItem]) -> Vec<&'a str> {
    citations
        .iter()
        .filter(|c| c.chars().count() > SUBSTANTIAL_CITATION_CHARS)
        .filter(|c| !evidence.iter().any(|item| citation_matches(c, &item.title)))
        .map(String::as_str)
        .collect()
}

/// One aggregated warning for unmatched citations.
pub fn unmatched_citation_warning(unmatched: &[&str]) -> Option<String> {
    match unmatched {
        [] => None,
        [only] => Some(format!("Citation '{}' may not match actual sources", only)),
        few if few.len() <= 3 => Some(format!(
            "Citations {} may not match actual sources",
            quote_list(few)
        )),
        many => Some(format!(
            "{} citations may not match actual sources (e.g. {})",
            many.len(),
            quote_list(&many[..2])
        )),
    }
}

pub(crate) fn quote_list(items: &[&str]) -> String {
    items
        .iter()
        .map(|item| format!("'{}'", item))
        .collect::<Vec<_>>()
        .join(", ")
}
