//! Application state and service initialization
//!
//! Everything handlers receive through `web::Data` is built here once at
//! startup and cloned into each worker.

use std::sync::Arc;

use sqlx::PgPool;

use crate::db::repository::{CaseRepository, PatientRepository, UserRepository, UserStore};
use crate::model::Config;
use crate::service::{CaseService, ComplaintAnalyzer, LlmClient, TokenService};

/// Application state containing all services and shared resources
pub struct AppState {
    /// Database connection pool
    pub db_pool: PgPool,
    pub users: Arc<dyn UserStore>,
    pub patients: PatientRepository,
    pub cases: CaseRepository,
    /// Complaint analyzer shared by the AI endpoints and the case workflow
    pub analyzer: Arc<ComplaintAnalyzer>,
    pub case_service: Arc<CaseService>,
    pub tokens: Arc<TokenService>,
}

impl AppState {
    /// Initialize all services and build application state
    ///
    /// This performs:
    /// 1. Database connection and schema initialization
    /// 2. LLM client initialization (requires OPENAI_API_KEY)
    /// 3. Service dependency graph construction
    pub async fn new(config: &Config) -> Result<Self, AppError> {
        let db_pool = crate::db::create_pool()
            .await
            .map_err(|e| AppError::DatabaseInit(e.to_string()))?;

        crate::db::init_schema(&db_pool)
            .await
            .map_err(|e| AppError::DatabaseInit(e.to_string()))?;

        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| AppError::MissingConfig("OPENAI_API_KEY"))?;

        let llm_client = LlmClient::new(&api_key)
            .map_err(|_| AppError::InvalidConfig("Invalid OPENAI_API_KEY"))?;

        let analyzer = Arc::new(ComplaintAnalyzer::from_env(Arc::new(llm_client)));

        let cases = CaseRepository::new(db_pool.clone());
        let case_service = Arc::new(CaseService::new(
            Arc::new(cases.clone()),
            Arc::clone(&analyzer),
        ));

        Ok(Self {
            users: Arc::new(UserRepository::new(db_pool.clone())),
            patients: PatientRepository::new(db_pool.clone()),
            cases,
            analyzer,
            case_service,
            tokens: Arc::new(TokenService::new(&config.auth)),
            db_pool,
        })
    }
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AppError {
    /// Database initialization failed
    #[error("Database initialization failed: {0}")]
    DatabaseInit(String),

    /// Missing required configuration
    #[error("Missing required configuration: {0}")]
    MissingConfig(&'static str),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(&'static str),
}
