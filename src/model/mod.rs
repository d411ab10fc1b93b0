pub mod analysis;
pub mod config;
pub mod records;

pub use analysis::{
    AnalysisRequest, AnalysisResult, ComplaintSuggestion, RemedySuggestion, RiskLevel,
    RubricCandidate,
};
pub use config::{AuthConfig, Config, CorsConfig};
pub use records::{Case, CaseDetail, CaseStatus, NewCase, NewPatient, Patient, Remedy, Rubric, User};
