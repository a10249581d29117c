//! Explicit pipeline modes.

use serde::{Deserialize, Serialize};

/// How an answer is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseMode {
    /// Retrieval-grounded answer, validated against its evidence
    #[default]
    Standard,
    /// Latency-optimized answer: no retrieval, no validation, cheaper model
    Turbo,
}

impl ResponseMode {
    pub fn from_turbo_flag(turbo: bool) -> Self {
        if turbo {
            Self::Turbo
        } else {
            Self::Standard
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Turbo => "turbo",
        }
    }
}

/// How thoroughly an answer is audited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Coverage and citation-count heuristics only
    #[default]
    Fast,
    /// Citation cross-checks, claim extraction and budget/schedule scrutiny
    Full,
}

impl ValidationMode {
    pub fn from_fast_flag(fast: bool) -> Self {
        if fast {
            Self::Fast
        } else {
            Self::Full
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Full => "full",
        }
    }
}
