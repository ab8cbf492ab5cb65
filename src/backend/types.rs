use serde::{Deserialize, Deserializer, Serialize};

/// Body of a query request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub text: String,
}

impl QueryRequest {
    /// Create a request for the given query text.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Answer payload returned by the query endpoint.
///
/// Optional fields missing from the payload decode as absent. `is_safe` is
/// the only field the backend must always send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawResponse {
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub evidence: Vec<EvidenceItem>,
    pub is_safe: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refusal_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<String>,
    #[serde(default)]
    pub disclaimer: String,
}

/// A retrieved passage backing an answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceItem {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub source: String,
    /// Match score in `0.0..=1.0`. Non-numeric values decode as absent.
    #[serde(
        default,
        deserialize_with = "lenient_score",
        skip_serializing_if = "Option::is_none"
    )]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance: Option<String>,
}

/// Backend confidence label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

/// Backend risk label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl ConfidenceLevel {
    /// Parse the exact label sent by the backend.
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "High" => Some(Self::High),
            "Medium" => Some(Self::Medium),
            "Low" => Some(Self::Low),
            _ => None,
        }
    }

    /// Label as sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl RiskLevel {
    /// Parse the exact label sent by the backend.
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "Low" => Some(Self::Low),
            "Moderate" => Some(Self::Moderate),
            "High" => Some(Self::High),
            _ => None,
        }
    }
}

impl RawResponse {
    /// Parsed risk level, `None` when absent or unrecognised.
    pub fn risk(&self) -> Option<RiskLevel> {
        self.risk_level.as_deref().and_then(RiskLevel::parse)
    }

    /// Parsed confidence, `None` when absent or unrecognised.
    pub fn confidence_level(&self) -> Option<ConfidenceLevel> {
        self.confidence.as_deref().and_then(ConfidenceLevel::parse)
    }

    /// Response substituted when the backend cannot be reached or answers
    /// with something undecodable.
    pub fn apology() -> Self {
        Self {
            answer: "I apologize, but I encountered an error connecting to the server."
                .to_string(),
            explanation: String::new(),
            confidence: Some(ConfidenceLevel::Low.as_str().to_string()),
            evidence: Vec::new(),
            is_safe: true,
            refusal_reason: None,
            risk_level: None,
            disclaimer: String::new(),
        }
    }
}

impl EvidenceItem {
    /// Create an evidence item with content and source only.
    pub fn new(content: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            source: source.into(),
            score: None,
            relevance: None,
        }
    }

    /// Set the match score.
    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    /// Set an explicit relevance label.
    pub fn with_relevance(mut self, relevance: impl Into<String>) -> Self {
        self.relevance = Some(relevance.into());
        self
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_score<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_f64())
}
