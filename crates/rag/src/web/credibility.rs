//! Domain-authority heuristics for web sources.

use crate::evidence::EvidenceItem;
use serde::Serialize;

const INDUSTRY_DOMAINS: [&str; 11] = [
    "imdb.com",
    "variety.com",
    "hollywoodreporter.com",
    "deadline.com",
    "thewrap.com",
    "indiewire.com",
    "screenrant.com",
    "collider.com",
    "movieinsider.com",
    "filmmaker.com",
    "cinematography.com",
];

const LOW_AUTHORITY_HOSTS: [&str; 6] = [
    ".blogspot.",
    ".wordpress.",
    ".tumblr.",
    ".weebly.",
    ".wixsite.",
    ".000webhost.",
];

/// Score used when nothing is known about a domain.
pub const NEUTRAL_CREDIBILITY: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainAuthority {
    IndustryRecognized,
    Wikipedia,
    Educational,
    Government,
    Unknown,
}

/// Credibility verdict for one URL.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceCredibility {
    pub is_valid: bool,
    pub credibility_score: f64,
    pub warnings: Vec<String>,
    pub domain_authority: DomainAuthority,
}

/// Host of a URL without a leading `www.`, lowercased.
pub fn domain_of(url: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_lowercase();
    Some(host.strip_prefix("www.").map(str::to_string).unwrap_or(host))
}

/// Rate how far a web page can be trusted from its domain alone.
pub fn assess_web_source(url: &str) -> SourceCredibility {
    let Some(domain) = reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_lowercase))
    else {
        return SourceCredibility {
            is_valid: false,
            credibility_score: 0.0,
            warnings: vec![format!("Validation error: invalid URL '{}'", url)],
            domain_authority: DomainAuthority::Unknown,
        };
    };

    let (mut score, authority) = if INDUSTRY_DOMAINS.iter().any(|d| domain.contains(d)) {
        (0.8, DomainAuthority::IndustryRecognized)
    } else if domain.contains("wikipedia.org") {
        (0.7, DomainAuthority::Wikipedia)
    } else if domain.ends_with(".edu") {
        (0.9, DomainAuthority::Educational)
    } else if domain.ends_with(".gov") {
        (0.9, DomainAuthority::Government)
    } else {
        (NEUTRAL_CREDIBILITY, DomainAuthority::Unknown)
    };

    let mut warnings = Vec::new();
    for pattern in LOW_AUTHORITY_HOSTS {
        if domain.contains(pattern) {
            warnings.push(format!("Low-authority domain: {}", domain));
            score *= 0.7;
        }
    }

    SourceCredibility {
        is_valid: score > 0.3,
        credibility_score: score,
        warnings,
        domain_authority: authority,
    }
}

/// Markdown citation line: `[title](url) from domain`.
pub fn format_citation(title: &str, url: &str) -> String {
    let domain = reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| "Unknown Source".to_string());
    let title = if title.is_empty() { "Unknown Title" } else { title };
    format!("[{}]({}) from {}", title, url, domain)
}

/// Markdown citation line for a web evidence item.
pub fn format_web_citation(item: &EvidenceItem) -> String {
    format_citation(&item.title, item.url.as_deref().unwrap_or_default())
}
