//! Evidence relevance scoring.
//!
//! Maps a retrieved passage's continuous match score onto a display
//! percentage and a discrete relevance bucket. An explicit relevance label
//! from the backend always wins over the derived bucket.

use serde::Serialize;
use std::fmt;

use crate::backend::EvidenceItem;

/// Scores at or above this are `High` relevance.
pub const HIGH_RELEVANCE_THRESHOLD: f64 = 0.6;
/// Scores at or above this (and below the high threshold) are `Medium`.
pub const MEDIUM_RELEVANCE_THRESHOLD: f64 = 0.35;

/// Discretized evidence quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RelevanceBucket {
    High,
    Medium,
    Low,
}

/// Result of scoring a single evidence item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EvidenceScore {
    /// Match score as a whole percentage, always within `0..=100`.
    pub score_percent: u8,
    pub relevance: RelevanceBucket,
}

/// Display-ready evidence item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvidenceView {
    pub content: String,
    pub source: String,
    pub score_percent: u8,
    pub relevance: RelevanceBucket,
}

impl RelevanceBucket {
    /// Bucket for a raw score.
    pub fn from_score(score: f64) -> Self {
        if score >= HIGH_RELEVANCE_THRESHOLD {
            Self::High
        } else if score >= MEDIUM_RELEVANCE_THRESHOLD {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// Bucket for an explicit backend label. Anything that is not `High` or
    /// `Medium` is shown as `Low`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "High" => Self::High,
            "Medium" => Self::Medium,
            _ => Self::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl fmt::Display for RelevanceBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Score one evidence item. Missing scores count as 0.
pub fn score_evidence(item: &EvidenceItem) -> EvidenceScore {
    let score = item.score.unwrap_or(0.0);

    let relevance = match item.relevance.as_deref() {
        Some(label) if !label.is_empty() => RelevanceBucket::from_label(label),
        _ => RelevanceBucket::from_score(score),
    };

    EvidenceScore {
        score_percent: to_percent(score),
        relevance,
    }
}

fn to_percent(score: f64) -> u8 {
    let percent = (score * 100.0).round();
    if percent.is_nan() {
        0
    } else {
        percent.clamp(0.0, 100.0) as u8
    }
}

impl EvidenceView {
    /// Build the display view of an item.
    pub fn from_item(item: &EvidenceItem) -> Self {
        let scored = score_evidence(item);
        Self {
            content: item.content.clone(),
            source: item.source.clone(),
            score_percent: scored.score_percent,
            relevance: scored.relevance,
        }
    }
}
