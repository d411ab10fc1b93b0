pub mod analysis;
pub mod auth;
pub mod case;
pub mod llm;
pub mod remedies;

pub use analysis::ComplaintAnalyzer;
pub use auth::TokenService;
pub use case::CaseService;
pub use llm::LlmClient;
