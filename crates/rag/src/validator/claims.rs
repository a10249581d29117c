//! Numeric claim extraction and budget/schedule scrutiny.

use super::citations::quote_list;
use regex::Regex;
use std::sync::LazyLock;

const BUDGET_KEYWORDS: [&str; 15] = [
    "budget", "cost", "price", "expense", "financial", "money", "dollar", "euro", "funding",
    "investment", "costing", "estimate", "quotation", "rate", "fee",
];

const SCHEDULING_KEYWORDS: [&str; 14] = [
    "schedule", "timeline", "deadline", "duration", "time", "date", "week", "month", "day",
    "hour", "minute", "milestone", "phase", "stage",
];

const VAGUE_PHRASES: [&str; 5] = [
    "typically costs",
    "usually takes",
    "generally requires",
    "standard practice",
    "industry average",
];

/// Characters searched on each side of a figure for a citation phrase.
const CITATION_WINDOW: usize = 100;

pub const GENERALIZATION_WARNING: &str = "Response contains potentially unsourced generalizations";
pub const GENERALIZATION_RECOMMENDATION: &str =
    "Consider adding specific source citations for generalizations";

static CLAIM_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\b(?:the\s+)?(?:cost|budget|price) is\s+\$?\d[\d,]*(?:\.\d+)?(?:\s*(?:million|billion|thousand))?",
        r"(?i)\btakes\s+\d+\s+[a-z]+",
        r"\$\d[\d,]*(?:\.\d+)?(?:\s*(?:million|billion|thousand))?",
        r"(?i)\b\d+(?:\.\d+)?\s*(?:%|percent\b)",
        r"(?i)\b\d+\s+(?:days?|weeks?|months?)\b",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).unwrap())
    .collect()
});

static FIGURE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\$[\d,]+",
        r"(?i)\d+ percent",
        r"(?i)\d+ days?",
        r"(?i)\d+ weeks?",
        r"(?i)\d+ months?",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).unwrap())
    .collect()
});

static CITATION_INDICATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:according to|from|based on|per|in)\b").unwrap());

/// Definitive numeric assertions, in text order, one entry per instance.
///
/// Matches are pattern-based only; nothing is checked against evidence.
pub fn extract_claims(text: &str) -> Vec<String> {
    let mut spans: Vec<(usize, usize)> = CLAIM_PATTERNS
        .iter()
        .flat_map(|pattern| pattern.find_iter(text).map(|m| (m.start(), m.end())))
        .collect();

    // Earliest first; for equal starts the longest span wins.
    spans.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));

    let mut claims = Vec::new();
    let mut covered_until = 0;
    for (start, end) in spans {
        if start < covered_until {
            continue;
        }
        covered_until = end;
        let figure = text[start..end].trim().trim_end_matches(',');
        claims.push(format!("Specific figure: {}", figure));
    }
    claims
}

/// Whether a question is about money or time.
pub fn is_budget_or_scheduling_question(question: &str) -> bool {
    let lower = question.to_lowercase();
    BUDGET_KEYWORDS
        .iter()
        .chain(SCHEDULING_KEYWORDS.iter())
        .any(|keyword| lower.contains(keyword))
}

/// Outcome of the extra budget/schedule checks.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BudgetScrutiny {
    pub warnings: Vec<String>,
    pub recommendations: Vec<String>,
}

fn floor_boundary(text: &str, mut idx: usize) -> usize {
    while !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

fn ceil_boundary(text: &str, mut idx: usize) -> usize {
    while idx < text.len() && !text.is_char_boundary(idx) {
        idx += 1;
    }
    idx
}

/// Whether a citation phrase appears within the window around a figure.
pub fn is_figure_cited(text: &str, figure: &str) -> bool {
    let Some(idx) = text.find(figure) else {
        return false;
    };
    let start = floor_boundary(text, idx.saturating_sub(CITATION_WINDOW));
    let end = ceil_boundary(text, (idx + CITATION_WINDOW).min(text.len()));
    CITATION_INDICATOR.is_match(&text[start..end])
}

/// Monetary and duration figures, deduplicated in first-seen order.
pub fn collect_figures(text: &str) -> Vec<String> {
    let mut figures: Vec<String> = Vec::new();
    for pattern in FIGURE_PATTERNS.iter() {
        for m in pattern.find_iter(text) {
            let figure = m.as_str().trim_end_matches(',');
            if figure.len() > 1 && !figures.iter().any(|f| f == figure) {
                figures.push(figure.to_string());
            }
        }
    }
    figures
}

fn uncited_figure_warning(uncited: &[&str]) -> Option<String> {
    match uncited {
        [] => None,
        [only] => Some(format!("Specific figure '{}' may not be properly sourced", only)),
        few if few.len() <= 3 => Some(format!(
            "Specific figures {} may not be properly sourced",
            quote_list(few)
        )),
        many => Some(format!(
            "{} specific figures (e.g. {}) may not be properly sourced",
            many.len(),
            quote_list(&many[..2])
        )),
    }
}

/// Extra checks for answers to budget or scheduling questions.
pub fn scrutinize_budget_response(text: &str) -> BudgetScrutiny {
    let mut result = BudgetScrutiny::default();

    let figures = collect_figures(text);
    let uncited: Vec<&str> = figures
        .iter()
        .map(String::as_str)
        .filter(|figure| !is_figure_cited(text, figure))
        .collect();
    if let Some(warning) = uncited_figure_warning(&uncited) {
        result.warnings.push(warning);
    }

    let lower = text.to_lowercase();
    if VAGUE_PHRASES.iter().any(|phrase| lower.contains(phrase)) {
        result.warnings.push(GENERALIZATION_WARNING.to_string());
        result
            .recommendations
            .push(GENERALIZATION_RECOMMENDATION.to_string());
    }

    result
}
