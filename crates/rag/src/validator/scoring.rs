//! Confidence scoring.

const WARNING_PENALTY: f64 = 0.05;
const CLAIM_PENALTY: f64 = 0.10;
const HIGH_COVERAGE_BONUS: f64 = 0.15;
const MEDIUM_COVERAGE_BONUS: f64 = 0.10;
const LOW_COVERAGE_PENALTY: f64 = 0.10;
const WEB_EVIDENCE_BONUS: f64 = 0.10;

/// Minimum confidence for an answer to count as valid.
pub const VALID_CONFIDENCE: f64 = 0.7;

/// Warnings at or above this count make an answer invalid.
pub const MAX_WARNINGS: usize = 3;

/// Heuristic confidence in `[0, 1]`.
///
/// `coverage` is the raw citations-per-evidence ratio and may exceed 1.
pub fn compute_confidence(warnings: usize, claims: usize, coverage: f64, has_web: bool) -> f64 {
    let mut score = 1.0;
    score -= WARNING_PENALTY * warnings as f64;
    score -= CLAIM_PENALTY * claims as f64;

    if coverage > 0.8 {
        score += HIGH_COVERAGE_BONUS;
    } else if coverage > 0.5 {
        score += MEDIUM_COVERAGE_BONUS;
    } else if coverage < 0.3 {
        score -= LOW_COVERAGE_PENALTY;
    }

    if has_web {
        score += WEB_EVIDENCE_BONUS;
    }

    score.clamp(0.0, 1.0)
}

pub fn is_valid(confidence: f64, warnings: usize) -> bool {
    confidence >= VALID_CONFIDENCE && warnings < MAX_WARNINGS
}
