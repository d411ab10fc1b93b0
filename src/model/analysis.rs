//! Complaint analysis result types

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Risk level attached to an analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Unknown,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Unknown => "unknown",
        }
    }

    /// Lenient parse used for LLM output; anything unrecognized is `Unknown`
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "low" => RiskLevel::Low,
            "medium" => RiskLevel::Medium,
            "high" => RiskLevel::High,
            _ => RiskLevel::Unknown,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A candidate rubric extracted from complaint text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RubricCandidate {
    /// Hierarchical path, e.g. "Head > Pain > Night"
    pub path: String,
    /// Confidence as reported by the model, expected in [0, 1]
    pub confidence: f64,
    /// Quote or paraphrase from the complaint
    pub evidence: String,
    /// Coarse category label (Mind, Head, Stomach, ...)
    pub category: String,
}

/// Structured analysis of a patient complaint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AnalysisResult {
    pub summary: String,
    pub risk: RiskLevel,
    pub rubrics: Vec<RubricCandidate>,
}

impl AnalysisResult {
    /// Result returned when the model answered but the answer could not be parsed
    pub fn parsing_issues() -> Self {
        Self {
            summary: "AI analysis completed with some issues.".to_string(),
            risk: RiskLevel::Medium,
            rubrics: vec![RubricCandidate {
                path: "General > Analysis > Error".to_string(),
                confidence: 0.5,
                evidence: "AI response parsing failed".to_string(),
                category: "General".to_string(),
            }],
        }
    }

    /// Result returned when the model could not be reached
    pub fn service_unavailable() -> Self {
        Self {
            summary: "AI analysis unavailable. Please try again.".to_string(),
            risk: RiskLevel::Unknown,
            rubrics: vec![RubricCandidate {
                path: "General > Service > Unavailable".to_string(),
                confidence: 0.6,
                evidence: "AI service temporarily unavailable".to_string(),
                category: "General".to_string(),
            }],
        }
    }
}

/// Remedy suggestion derived from a set of rubrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RemedySuggestion {
    pub name: String,
    pub percentage: f64,
    pub matched_rubrics: Vec<String>,
    pub details: String,
}

/// Free-text request body shared by the analysis endpoints
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AnalysisRequest {
    pub text: String,
}

/// Completion suggestion for a partial complaint
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ComplaintSuggestion {
    pub suggestion: String,
}

// LLM-side shape: every field optional so the validating parse can
// default-fill instead of rejecting the whole payload.

/// Raw analysis as emitted by the model
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtractedAnalysis {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub risk: Option<String>,
    #[serde(default)]
    pub rubrics: Vec<ExtractedRubric>,
}

/// Raw rubric as emitted by the model
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtractedRubric {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub confidence: Option<serde_json::Value>,
    #[serde(default)]
    pub evidence: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}
