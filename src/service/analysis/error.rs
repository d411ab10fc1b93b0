//! Error types for complaint analysis

use thiserror::Error;

use crate::service::llm::LlmError;

/// Why an analysis fell back to a canned result
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("LLM service failure: {0}")]
    Service(#[from] LlmError),

    #[error("Malformed LLM output: {0}")]
    MalformedOutput(String),
}
