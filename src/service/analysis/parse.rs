//! Normalization of raw LLM output into an `AnalysisResult`
//!
//! The model is asked for bare JSON but is not guaranteed to comply, so the
//! raw text is unfenced first and then parsed through a lenient shape that
//! fills defaults. Quality problems that do not make the payload unusable
//! are reported as warnings.
//!
//! Only a top-level object is accepted. A bare rubric array (fenced or not)
//! carries no summary or risk and is treated as malformed.

use serde_json::Value;

use crate::model::analysis::{ExtractedAnalysis, ExtractedRubric};
use crate::model::{AnalysisResult, RiskLevel, RubricCandidate};
use crate::service::analysis::error::AnalysisError;

const JSON_FENCE: &str = "```json";
const FENCE: &str = "```";

/// Normal-path rubric count requested from the model
const EXPECTED_RUBRICS: std::ops::RangeInclusive<usize> = 3..=5;

/// Parsed analysis plus any non-fatal quality warnings
#[derive(Debug)]
pub struct ParsedAnalysis {
    pub result: AnalysisResult,
    pub warnings: Vec<String>,
}

/// Remove Markdown code-fence wrapping around a model response
pub fn strip_code_fence(raw: &str) -> &str {
    let mut content = raw.trim();
    if let Some(rest) = content.strip_prefix(JSON_FENCE) {
        content = rest;
    } else if let Some(rest) = content.strip_prefix(FENCE) {
        content = rest;
    }
    if let Some(rest) = content.strip_suffix(FENCE) {
        content = rest;
    }
    content.trim()
}

/// Parse a raw model response into an analysis result
pub fn parse_analysis(raw: &str) -> Result<ParsedAnalysis, AnalysisError> {
    let cleaned = strip_code_fence(raw);

    let value: Value = serde_json::from_str(cleaned)
        .map_err(|e| AnalysisError::MalformedOutput(format!("invalid JSON: {}", e)))?;

    if !value.is_object() {
        return Err(AnalysisError::MalformedOutput(
            "expected a JSON object at the top level".to_string(),
        ));
    }

    let extracted: ExtractedAnalysis = serde_json::from_value(value)
        .map_err(|e| AnalysisError::MalformedOutput(format!("unexpected shape: {}", e)))?;

    normalize(extracted)
}

fn normalize(extracted: ExtractedAnalysis) -> Result<ParsedAnalysis, AnalysisError> {
    let mut warnings = Vec::new();

    let summary = extracted
        .summary
        .map(|s| s.trim().to_string())
        .unwrap_or_default();
    if summary.is_empty() {
        return Err(AnalysisError::MalformedOutput(
            "summary is missing or blank".to_string(),
        ));
    }

    let risk = match extracted.risk.as_deref() {
        Some(raw) => {
            let risk = RiskLevel::parse_lenient(raw);
            if risk == RiskLevel::Unknown && !raw.trim().eq_ignore_ascii_case("unknown") {
                warnings.push(format!("Unrecognized risk level '{}'", raw));
            }
            risk
        }
        None => {
            warnings.push("Risk level missing".to_string());
            RiskLevel::Unknown
        }
    };

    if extracted.rubrics.is_empty() {
        return Err(AnalysisError::MalformedOutput(
            "no rubrics in response".to_string(),
        ));
    }

    if !EXPECTED_RUBRICS.contains(&extracted.rubrics.len()) {
        warnings.push(format!(
            "Expected 3-5 rubrics, got {}",
            extracted.rubrics.len()
        ));
    }

    let rubrics = extracted
        .rubrics
        .into_iter()
        .enumerate()
        .map(|(i, rubric)| convert_rubric(i + 1, rubric, &mut warnings))
        .collect();

    Ok(ParsedAnalysis {
        result: AnalysisResult {
            summary,
            risk,
            rubrics,
        },
        warnings,
    })
}

fn convert_rubric(
    index: usize,
    extracted: ExtractedRubric,
    warnings: &mut Vec<String>,
) -> RubricCandidate {
    let path = extracted.path.unwrap_or_default();
    if path.trim().is_empty() {
        warnings.push(format!("Rubric {} has no path", index));
    }

    let confidence = match extracted.confidence.as_ref().and_then(confidence_value) {
        Some(c) => c,
        None => {
            warnings.push(format!(
                "Rubric {} has missing or non-numeric confidence, defaulting to 0",
                index
            ));
            0.0
        }
    };

    // Kept as given; only flagged.
    if !(0.0..=1.0).contains(&confidence) {
        warnings.push(format!(
            "Rubric {} confidence {} is outside [0, 1]",
            index, confidence
        ));
    }

    RubricCandidate {
        path,
        confidence,
        evidence: extracted.evidence.unwrap_or_default(),
        category: extracted.category.unwrap_or_default(),
    }
}

fn confidence_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|c| c.is_finite()),
        _ => None,
    }
}
