//! Risk-tiered classification of backend answers.
//!
//! [`classify`] turns a [`RawResponse`] into a [`ClassifiedResponse`] using a
//! strict first-match priority:
//!
//! 1. `risk_level == "High"` → [`Tier::Emergency`]
//! 2. `is_safe == false` → [`Tier::Refusal`]
//! 3. otherwise → [`Tier::Standard`], with a confidence weight and a scored
//!    evidence view
//!
//! A payload that is both high risk and unsafe is an emergency. Both
//! functions here are pure; classifying the same payload twice yields equal
//! values.

mod evidence;

use serde::Serialize;
use std::fmt;

pub use evidence::{
    score_evidence, EvidenceScore, EvidenceView, RelevanceBucket, HIGH_RELEVANCE_THRESHOLD,
    MEDIUM_RELEVANCE_THRESHOLD,
};

use crate::backend::{ConfidenceLevel, RawResponse, RiskLevel};

/// Bar weight (out of 100) for `High` confidence.
pub const HIGH_CONFIDENCE_WEIGHT: u8 = 90;
/// Bar weight for `Medium` confidence.
pub const MEDIUM_CONFIDENCE_WEIGHT: u8 = 55;
/// Bar weight for `Low`, absent or unrecognised confidence.
pub const FALLBACK_CONFIDENCE_WEIGHT: u8 = 25;

/// Fixed guidance shown with every emergency response.
pub const EMERGENCY_ACTIONS: &[&str] = &[
    "Call 911 or your local emergency number immediately.",
    "Do not rely on this AI for critical medical aid.",
    "Go to the nearest emergency room if safe to do so.",
];

/// Disclaimer shown on standard answers when the backend sent none.
pub const DEFAULT_DISCLAIMER: &str = "Not medical advice.";

/// Top-level presentation tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Tier {
    Emergency,
    Refusal,
    Standard,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Emergency => write!(f, "emergency"),
            Tier::Refusal => write!(f, "refusal"),
            Tier::Standard => write!(f, "standard"),
        }
    }
}

/// Visual weight of the backend's confidence label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfidenceStyle {
    /// Label exactly as sent, `None` when the backend omitted it or sent a
    /// blank string.
    pub label: Option<String>,
    /// Effective level; unknown labels fall back to `Low`.
    pub level: ConfidenceLevel,
    /// Bar weight out of 100.
    pub weight: u8,
}

impl ConfidenceStyle {
    /// Derive the style for an optional backend label.
    pub fn from_label(label: Option<&str>) -> Self {
        let label = label.filter(|l| !l.trim().is_empty());
        let (level, weight) = match label.and_then(ConfidenceLevel::parse) {
            Some(ConfidenceLevel::High) => (ConfidenceLevel::High, HIGH_CONFIDENCE_WEIGHT),
            Some(ConfidenceLevel::Medium) => (ConfidenceLevel::Medium, MEDIUM_CONFIDENCE_WEIGHT),
            _ => (ConfidenceLevel::Low, FALLBACK_CONFIDENCE_WEIGHT),
        };

        Self {
            label: label.map(str::to_string),
            level,
            weight,
        }
    }
}

/// Per-tier derived display data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "tier", rename_all = "snake_case")]
pub enum TierDetail {
    Emergency {
        actions: &'static [&'static str],
    },
    Refusal {
        /// Refusal reason split into display lines.
        reason_lines: Vec<String>,
    },
    Standard {
        confidence: ConfidenceStyle,
        /// Scored evidence in backend order.
        evidence: Vec<EvidenceView>,
    },
}

/// A backend answer together with its classification.
///
/// The raw payload is retained unmodified for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedResponse {
    pub detail: TierDetail,
    pub raw: RawResponse,
}

/// Classify a backend answer.
pub fn classify(raw: RawResponse) -> ClassifiedResponse {
    let detail = if raw.risk() == Some(RiskLevel::High) {
        TierDetail::Emergency {
            actions: EMERGENCY_ACTIONS,
        }
    } else if !raw.is_safe {
        TierDetail::Refusal {
            reason_lines: raw
                .refusal_reason
                .as_deref()
                .unwrap_or_default()
                .lines()
                .map(str::to_string)
                .collect(),
        }
    } else {
        TierDetail::Standard {
            confidence: ConfidenceStyle::from_label(raw.confidence.as_deref()),
            evidence: raw.evidence.iter().map(EvidenceView::from_item).collect(),
        }
    };

    ClassifiedResponse { detail, raw }
}

impl ClassifiedResponse {
    /// The presentation tier.
    pub fn tier(&self) -> Tier {
        match self.detail {
            TierDetail::Emergency { .. } => Tier::Emergency,
            TierDetail::Refusal { .. } => Tier::Refusal,
            TierDetail::Standard { .. } => Tier::Standard,
        }
    }

    /// Confidence style, only present for standard answers.
    pub fn confidence_style(&self) -> Option<&ConfidenceStyle> {
        match &self.detail {
            TierDetail::Standard { confidence, .. } => Some(confidence),
            _ => None,
        }
    }

    /// Scored evidence, empty unless the answer is standard.
    pub fn evidence_view(&self) -> &[EvidenceView] {
        match &self.detail {
            TierDetail::Standard { evidence, .. } => evidence,
            _ => &[],
        }
    }

    /// Whether the disclaimer should be highlighted as elevated risk.
    pub fn elevated_disclaimer(&self) -> bool {
        self.raw.risk() == Some(RiskLevel::Moderate)
    }

    /// Disclaimer text, falling back to [`DEFAULT_DISCLAIMER`] for standard
    /// answers that carry none.
    pub fn disclaimer(&self) -> &str {
        match self.detail {
            TierDetail::Standard { .. } if self.raw.disclaimer.trim().is_empty() => {
                DEFAULT_DISCLAIMER
            }
            _ => self.raw.disclaimer.as_str(),
        }
    }
}
