//! Complaint analysis service using LLM
//!
//! Turns free-text patient complaints into a structured analysis. Failures
//! never reach the caller: a service failure and an unparseable answer each
//! map to a fixed degraded result.

use std::sync::Arc;

use crate::model::AnalysisResult;
use crate::service::analysis::parse::parse_analysis;
use crate::service::analysis::prompts::{
    ANALYSIS_MAX_TOKENS, ANALYSIS_SYSTEM_PROMPT, ANALYSIS_TEMPERATURE, SUGGESTION_FALLBACK,
    SUGGESTION_MAX_TOKENS, SUGGESTION_SYSTEM_PROMPT, SUGGESTION_TEMPERATURE,
    build_suggestion_prompt,
};
use crate::service::llm::{CompletionBackend, CompletionRequest, DEFAULT_MODEL};

/// Environment variable for the analysis model (defaults to gpt-4o-mini if not set)
const ENV_ANALYSIS_MODEL: &str = "ANALYSIS_MODEL";

pub mod error;
pub mod parse;
pub mod prompts;

pub use error::AnalysisError;

/// Service for analyzing and completing patient complaints
pub struct ComplaintAnalyzer {
    backend: Arc<dyn CompletionBackend>,
    model: String,
}

impl ComplaintAnalyzer {
    pub fn new(backend: Arc<dyn CompletionBackend>, model: impl Into<String>) -> Self {
        Self {
            backend,
            model: model.into(),
        }
    }

    /// Creates an analyzer using ANALYSIS_MODEL from the environment
    pub fn from_env(backend: Arc<dyn CompletionBackend>) -> Self {
        let model =
            std::env::var(ENV_ANALYSIS_MODEL).unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        tracing::info!(model = %model, "Complaint analyzer initialized");

        Self::new(backend, model)
    }

    /// Analyze a complaint. Always returns a well-formed result.
    pub async fn analyze(&self, text: &str) -> AnalysisResult {
        match self.try_analyze(text).await {
            Ok(result) => result,
            Err(AnalysisError::MalformedOutput(reason)) => {
                tracing::warn!(
                    model = %self.model,
                    reason = %reason,
                    "Analysis response could not be parsed, using degraded result"
                );
                AnalysisResult::parsing_issues()
            }
            Err(AnalysisError::Service(e)) => {
                tracing::error!(
                    model = %self.model,
                    error = %e,
                    "Analysis service call failed, using degraded result"
                );
                AnalysisResult::service_unavailable()
            }
        }
    }

    async fn try_analyze(&self, text: &str) -> Result<AnalysisResult, AnalysisError> {
        let start_time = std::time::Instant::now();

        tracing::debug!(
            model = %self.model,
            text_length = text.len(),
            "Initiating OpenAI API call for complaint analysis"
        );

        let raw = self
            .backend
            .complete(CompletionRequest {
                model: &self.model,
                system: ANALYSIS_SYSTEM_PROMPT,
                prompt: text,
                temperature: ANALYSIS_TEMPERATURE,
                max_tokens: ANALYSIS_MAX_TOKENS,
            })
            .await?;

        tracing::info!(
            model = %self.model,
            elapsed_ms = start_time.elapsed().as_millis(),
            response_length = raw.len(),
            "OpenAI API call for complaint analysis completed"
        );

        let parsed = parse_analysis(&raw).inspect_err(|_| {
            tracing::debug!(raw = %raw, "Raw analysis response");
        })?;

        if !parsed.warnings.is_empty() {
            tracing::warn!(
                warnings = ?parsed.warnings,
                "Complaint analysis produced quality warnings"
            );
        }

        Ok(parsed.result)
    }

    /// Suggest a completion for a partial complaint. Falls back to a fixed hint.
    pub async fn suggest_complaint(&self, partial: &str) -> String {
        let prompt = build_suggestion_prompt(partial);

        let response = self
            .backend
            .complete(CompletionRequest {
                model: &self.model,
                system: SUGGESTION_SYSTEM_PROMPT,
                prompt: &prompt,
                temperature: SUGGESTION_TEMPERATURE,
                max_tokens: SUGGESTION_MAX_TOKENS,
            })
            .await;

        match response {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => {
                tracing::warn!(model = %self.model, "Empty complaint suggestion, using fallback");
                SUGGESTION_FALLBACK.to_string()
            }
            Err(e) => {
                tracing::error!(model = %self.model, error = %e, "Complaint suggestion failed");
                SUGGESTION_FALLBACK.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RiskLevel, RubricCandidate};
    use crate::service::llm::LlmError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Backend returning a canned reply and recording the requests it saw
    struct FakeBackend {
        reply: Result<String, String>,
        seen: Mutex<Vec<(String, String, f64, u64)>>,
    }

    impl FakeBackend {
        fn replying(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(text.to_string()),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(message.to_string()),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl CompletionBackend for FakeBackend {
        async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, LlmError> {
            self.seen.lock().unwrap().push((
                request.system.to_string(),
                request.prompt.to_string(),
                request.temperature,
                request.max_tokens,
            ));
            self.reply.clone().map_err(LlmError::Request)
        }
    }

    fn analyzer(backend: Arc<FakeBackend>) -> ComplaintAnalyzer {
        ComplaintAnalyzer::new(backend, "test-model")
    }

    #[tokio::test]
    async fn test_unreachable_service_scenario() {
        let backend = FakeBackend::failing("connection refused");
        let result = analyzer(backend)
            .analyze("Severe headache at night, worse from light")
            .await;

        assert_eq!(
            result,
            AnalysisResult {
                summary: "AI analysis unavailable. Please try again.".to_string(),
                risk: RiskLevel::Unknown,
                rubrics: vec![RubricCandidate {
                    path: "General > Service > Unavailable".to_string(),
                    confidence: 0.6,
                    evidence: "AI service temporarily unavailable".to_string(),
                    category: "General".to_string(),
                }],
            }
        );
    }

    #[tokio::test]
    async fn test_unparseable_reply_uses_parsing_fallback() {
        let backend = FakeBackend::replying("I think the patient has a headache.");
        let result = analyzer(backend).analyze("headache").await;

        assert_eq!(result, AnalysisResult::parsing_issues());
        assert_eq!(result.rubrics[0].path, "General > Analysis > Error");
        assert_eq!(result.risk, RiskLevel::Medium);
    }

    #[tokio::test]
    async fn test_fenced_rubric_array_uses_parsing_fallback() {
        let backend = FakeBackend::replying(
            "```json\n[{\"path\": \"Head > Pain > Night\", \"confidence\": 0.9, \"evidence\": \"at night\", \"category\": \"Head\"}]\n```",
        );
        let result = analyzer(backend).analyze("Headache at night").await;

        assert_eq!(result, AnalysisResult::parsing_issues());
    }

    #[tokio::test]
    async fn test_fenced_reply_is_parsed() {
        let backend = FakeBackend::replying(
            "```json\n{\"summary\": \"Nausea after rich food\", \"risk\": \"low\", \"rubrics\": [\
             {\"path\": \"Stomach > Nausea > Rich food\", \"confidence\": 0.85, \"evidence\": \"after rich food\", \"category\": \"Stomach\"}]}\n```",
        );
        let result = analyzer(backend).analyze("Nausea after rich food").await;

        assert_eq!(result.summary, "Nausea after rich food");
        assert_eq!(result.risk, RiskLevel::Low);
        assert_eq!(result.rubrics.len(), 1);
        assert_eq!(result.rubrics[0].confidence, 0.85);
    }

    #[tokio::test]
    async fn test_analysis_request_parameters() {
        let backend = FakeBackend::replying("not json");
        let _ = analyzer(backend.clone()).analyze("Anxious and restless").await;

        let seen = backend.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let (system, prompt, temperature, max_tokens) = &seen[0];
        assert_eq!(system, ANALYSIS_SYSTEM_PROMPT);
        assert_eq!(prompt, "Anxious and restless");
        assert_eq!(*temperature, 0.1);
        assert_eq!(*max_tokens, 500);
    }

    #[tokio::test]
    async fn test_no_retry_on_failure() {
        let backend = FakeBackend::failing("timeout");
        let _ = analyzer(backend.clone()).analyze("text").await;
        assert_eq!(backend.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_result_always_well_formed() {
        for reply in ["", "{}", "null", "[1,2,3]", "{\"summary\": 3}", "```json\n```"] {
            let result = analyzer(FakeBackend::replying(reply)).analyze("x").await;
            assert!(!result.summary.is_empty());
            assert!(!result.rubrics.is_empty());
        }
    }

    #[tokio::test]
    async fn test_suggestion_is_trimmed() {
        let backend = FakeBackend::replying("  Headache for three days, worse in the morning.\n");
        let suggestion = analyzer(backend.clone()).suggest_complaint("Headache").await;

        assert_eq!(suggestion, "Headache for three days, worse in the morning.");
        let seen = backend.seen.lock().unwrap();
        let (system, prompt, temperature, max_tokens) = &seen[0];
        assert_eq!(system, SUGGESTION_SYSTEM_PROMPT);
        assert!(prompt.contains("Headache"));
        assert_eq!(*temperature, 0.3);
        assert_eq!(*max_tokens, 200);
    }

    #[tokio::test]
    async fn test_suggestion_fallback_on_failure() {
        let suggestion = analyzer(FakeBackend::failing("401 Unauthorized"))
            .suggest_complaint("Cough")
            .await;
        assert_eq!(suggestion, SUGGESTION_FALLBACK);
    }

    #[tokio::test]
    async fn test_suggestion_fallback_on_empty_reply() {
        let suggestion = analyzer(FakeBackend::replying("   "))
            .suggest_complaint("Cough")
            .await;
        assert_eq!(suggestion, SUGGESTION_FALLBACK);
    }
}
