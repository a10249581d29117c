//! Response validation and confidence scoring.
//!
//! A generated answer is audited against the evidence it was built from:
//! citation phrases are extracted and counted, numeric claims are flagged,
//! and budget or scheduling answers get extra scrutiny. The outcome is a
//! [`ValidationReport`] with a heuristic confidence score.
//!
//! Validation never fails a request. Internal errors become a low-confidence
//! report naming the failure.

pub mod citations;
pub mod claims;
pub mod scoring;
pub mod summary;

pub use citations::{CitationExtractor, PatternCitationExtractor};
pub use summary::{augment_response, generate_validation_summary};

use crate::evidence::{EvidenceItem, SourceEntry, SourceKind, SourceType};
use crate::mode::ValidationMode;
use crate::web::credibility::domain_of;
use moka::sync::Cache;
use regex::Regex;
use reel_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::{Arc, LazyLock};
use std::time::Duration;

const CACHE_TTL: Duration = Duration::from_secs(300);
const CACHE_CAPACITY: u64 = 1_000;

/// Confidence reported when the validator itself fails.
pub const FAILURE_CONFIDENCE: f64 = 0.5;

/// Confidence asserted for unvalidated turbo answers.
pub const TURBO_CONFIDENCE: f64 = 0.9;

const URL_CITATION_SCORE: f64 = 0.9;
const PHRASE_CITATION_SCORE: f64 = 0.8;

pub const MISSING_CITATIONS_NOTE: &str = "⚠️ Response lacks source citations";
pub const CITED_NOTE: &str = "✅ Response cites a good share of its sources";
pub const HIGH_COVERAGE_NOTE: &str = "✅ Good source coverage";
pub const LOW_COVERAGE_NOTE: &str = "⚠️ Low source coverage";
pub const NO_CITATIONS_WARNING: &str = "Response contains no source citations";
pub const TURBO_NOTE: &str =
    "ℹ️ Turbo mode: this answer was not checked against retrieved sources";

static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s)\]>"'<]+"#).unwrap());

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceTypeCounts {
    pub local: usize,
    pub web: usize,
}

impl SourceTypeCounts {
    pub fn from_evidence(evidence: &[EvidenceItem]) -> Self {
        evidence
            .iter()
            .fold(Self::default(), |mut counts, item| {
                match item.source_kind {
                    SourceKind::Local => counts.local += 1,
                    SourceKind::Web => counts.web += 1,
                }
                counts
            })
    }
}

/// Audit of one generated answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub confidence_score: f64,
    pub warnings: Vec<String>,
    pub unverified_claims: Vec<String>,
    pub recommendations: Vec<String>,
    pub source_type_counts: SourceTypeCounts,
    /// Citations per evidence item; not clamped, may exceed 1
    pub source_coverage: f64,
    pub is_valid: bool,
    /// False when no audit actually ran (turbo answers)
    pub validated: bool,
}

impl ValidationReport {
    /// Report used when the validator fails internally.
    pub fn failure(err: &AppError) -> Self {
        Self {
            confidence_score: FAILURE_CONFIDENCE,
            warnings: vec![format!("Validation failed: {}", err)],
            is_valid: false,
            validated: false,
            ..Self::default()
        }
    }

    /// Placeholder report for turbo answers, which skip validation.
    pub fn turbo_stub() -> Self {
        Self {
            confidence_score: TURBO_CONFIDENCE,
            warnings: vec![TURBO_NOTE.to_string()],
            is_valid: true,
            validated: false,
            ..Self::default()
        }
    }
}

/// Validates answers and caches the reports.
pub struct ResponseValidator {
    extractor: Arc<dyn CitationExtractor>,
    cache: Cache<String, ValidationReport>,
}

impl Default for ResponseValidator {
    fn default() -> Self {
        Self::new(Arc::new(PatternCitationExtractor))
    }
}

impl ResponseValidator {
    pub fn new(extractor: Arc<dyn CitationExtractor>) -> Self {
        Self {
            extractor,
            cache: Cache::builder()
                .max_capacity(CACHE_CAPACITY)
                .time_to_live(CACHE_TTL)
                .build(),
        }
    }

    /// Audit `text` against `evidence`. Never fails.
    pub fn validate(
        &self,
        text: &str,
        evidence: &[EvidenceItem],
        question: &str,
        mode: ValidationMode,
    ) -> ValidationReport {
        let key = cache_key(text, evidence, question, mode);
        if let Some(report) = self.cache.get(&key) {
            tracing::debug!("Validation cache hit");
            return report;
        }

        match self.run(text, evidence, question, mode) {
            Ok(report) => {
                tracing::debug!(
                    mode = mode.as_str(),
                    confidence = report.confidence_score,
                    warnings = report.warnings.len(),
                    claims = report.unverified_claims.len(),
                    "Validated response"
                );
                self.cache.insert(key, report.clone());
                report
            }
            Err(e) => {
                tracing::warn!("Validation failed: {}", e);
                ValidationReport::failure(&e)
            }
        }
    }

    fn run(
        &self,
        text: &str,
        evidence: &[EvidenceItem],
        question: &str,
        mode: ValidationMode,
    ) -> AppResult<ValidationReport> {
        let counts = SourceTypeCounts::from_evidence(evidence);
        let found = self.extractor.extract(text)?;
        let coverage = found.len() as f64 / evidence.len().max(1) as f64;

        let mut warnings = Vec::new();
        let mut unverified_claims = Vec::new();
        let mut recommendations = Vec::new();

        match mode {
            ValidationMode::Fast => {
                if found.is_empty() {
                    warnings.push(MISSING_CITATIONS_NOTE.to_string());
                } else if found.len() as f64 >= 0.5 * evidence.len() as f64 {
                    warnings.push(CITED_NOTE.to_string());
                }

                if coverage > 0.8 {
                    warnings.push(HIGH_COVERAGE_NOTE.to_string());
                } else if coverage < 0.3 {
                    warnings.push(LOW_COVERAGE_NOTE.to_string());
                }
            }
            ValidationMode::Full => {
                if found.is_empty() {
                    warnings.push(NO_CITATIONS_WARNING.to_string());
                } else {
                    let unmatched = citations::unmatched_citations(&found, evidence);
                    warnings.extend(citations::unmatched_citation_warning(&unmatched));
                }

                unverified_claims = claims::extract_claims(text);

                if claims::is_budget_or_scheduling_question(question) {
                    let scrutiny = claims::scrutinize_budget_response(text);
                    warnings.extend(scrutiny.warnings);
                    recommendations.extend(scrutiny.recommendations);
                }
            }
        }

        let confidence = scoring::compute_confidence(
            warnings.len(),
            unverified_claims.len(),
            coverage,
            counts.web > 0,
        );

        Ok(ValidationReport {
            confidence_score: confidence,
            is_valid: scoring::is_valid(confidence, warnings.len()),
            warnings,
            unverified_claims,
            recommendations,
            source_type_counts: counts,
            source_coverage: coverage,
            validated: true,
        })
    }

    /// Sources an answer claims for itself: embedded URLs and citation phrases.
    ///
    /// Nothing here is verified; turbo answers have no evidence to check against.
    pub fn extract_citations_from_response(&self, text: &str) -> Vec<SourceEntry> {
        let mut entries: Vec<SourceEntry> = Vec::new();

        for m in URL.find_iter(text) {
            let url = m.as_str().trim_end_matches(['.', ',', ';', ':', '!', '?']);
            let Some(domain) = domain_of(url) else {
                continue;
            };
            push_unique(
                &mut entries,
                SourceEntry::new(domain, SourceType::WebCitation, URL_CITATION_SCORE).with_url(url),
            );
        }

        let without_urls = URL.replace_all(text, " ");
        match self.extractor.extract(&without_urls) {
            Ok(phrases) => {
                for phrase in phrases {
                    push_unique(
                        &mut entries,
                        SourceEntry::new(phrase, SourceType::Citation, PHRASE_CITATION_SCORE),
                    );
                }
            }
            Err(e) => tracing::warn!("Citation extraction failed: {}", e),
        }

        entries
    }
}

fn push_unique(entries: &mut Vec<SourceEntry>, entry: SourceEntry) {
    let title = entry.title.to_lowercase();
    if !entries.iter().any(|e| e.title.to_lowercase() == title) {
        entries.push(entry);
    }
}

/// Citation self-extraction with the default pattern extractor.
pub fn extract_citations_from_response(text: &str) -> Vec<SourceEntry> {
    ResponseValidator::default().extract_citations_from_response(text)
}

fn cache_key(text: &str, evidence: &[EvidenceItem], question: &str, mode: ValidationMode) -> String {
    let mut hasher = Sha256::new();
    hasher.update(mode.as_str().as_bytes());
    hasher.update([0]);
    hasher.update(text.as_bytes());
    hasher.update([0]);
    hasher.update(question.as_bytes());
    for item in evidence {
        hasher.update([0]);
        hasher.update(item.title.as_bytes());
        hasher.update([0]);
        hasher.update(item.url.as_deref().unwrap_or_default().as_bytes());
        hasher.update([0]);
        hasher.update(item.content.as_bytes());
        hasher.update(item.relevance_score.to_bits().to_le_bytes());
    }
    format!("{:x}", hasher.finalize())
}
