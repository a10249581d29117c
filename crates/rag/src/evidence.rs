//! Evidence records and the source entries shown to users.

use serde::{Deserialize, Serialize};

/// Where a piece of evidence came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Local,
    Web,
}

/// One piece of retrieved supporting material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceItem {
    pub title: String,
    pub source_kind: SourceKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub content: String,
    /// Similarity or credibility in `[0, 1]`
    pub relevance_score: f64,
    /// Production phase, for local documents
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl EvidenceItem {
    pub fn local(
        title: impl Into<String>,
        content: impl Into<String>,
        category: impl Into<String>,
        relevance_score: f64,
    ) -> Self {
        Self {
            title: title.into(),
            source_kind: SourceKind::Local,
            url: None,
            content: content.into(),
            relevance_score: relevance_score.clamp(0.0, 1.0),
            category: Some(category.into()),
        }
    }

    pub fn web(
        title: impl Into<String>,
        url: impl Into<String>,
        content: impl Into<String>,
        relevance_score: f64,
    ) -> Self {
        Self {
            title: title.into(),
            source_kind: SourceKind::Web,
            url: Some(url.into()),
            content: content.into(),
            relevance_score: relevance_score.clamp(0.0, 1.0),
            category: None,
        }
    }
}

/// Kind of a source listed alongside an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Local,
    Web,
    /// A URL the model wrote into its own answer
    WebCitation,
    /// A citation phrase the model wrote into its own answer
    Citation,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Web => "web",
            Self::WebCitation => "web_citation",
            Self::Citation => "citation",
        }
    }
}

/// A source as listed in a chat response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceEntry {
    pub title: String,
    pub source_type: SourceType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub relevance_score: f64,
}

/// Round to three decimal places.
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

impl SourceEntry {
    pub fn new(title: impl Into<String>, source_type: SourceType, relevance_score: f64) -> Self {
        Self {
            title: title.into(),
            source_type,
            url: None,
            category: None,
            relevance_score: round3(relevance_score),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

impl From<&EvidenceItem> for SourceEntry {
    fn from(item: &EvidenceItem) -> Self {
        let source_type = match item.source_kind {
            SourceKind::Local => SourceType::Local,
            SourceKind::Web => SourceType::Web,
        };
        Self {
            title: item.title.clone(),
            source_type,
            url: item.url.clone(),
            category: item.category.clone(),
            relevance_score: round3(item.relevance_score),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scores_are_clamped() {
        assert_eq!(EvidenceItem::local("t", "c", "production", 1.4).relevance_score, 1.0);
        assert_eq!(EvidenceItem::web("t", "https://a.b", "c", -0.2).relevance_score, 0.0);
    }

    #[test]
    fn test_source_entry_from_evidence() {
        let item = EvidenceItem::local("Budget Guide", "text", "pre-production", 0.123456);
        let entry = SourceEntry::from(&item);
        assert_eq!(entry.source_type, SourceType::Local);
        assert_eq!(entry.relevance_score, 0.123);
        assert_eq!(entry.category.as_deref(), Some("pre-production"));

        let json = serde_json::to_value(SourceEntry::new("x", SourceType::WebCitation, 0.9)).unwrap();
        assert_eq!(json["source_type"], "web_citation");
        assert!(json.get("url").is_none());
    }
}
