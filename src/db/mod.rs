//! Database module for PostgreSQL persistence

pub mod models;
pub mod repository;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::env;

// Environment variable names
const ENV_DATABASE_URL: &str = "DATABASE_URL";
const ENV_POSTGRES_HOST: &str = "REPERTO_POSTGRES_HOST";
const ENV_POSTGRES_PORT: &str = "REPERTO_POSTGRES_PORT";
const ENV_POSTGRES_USER: &str = "REPERTO_POSTGRES_USER";
const ENV_POSTGRES_PASSWORD: &str = "REPERTO_POSTGRES_PASSWORD";
const ENV_POSTGRES_DB: &str = "REPERTO_POSTGRES_DB";

// Default values
const DEFAULT_POSTGRES_HOST: &str = "127.0.0.1";
const DEFAULT_POSTGRES_PORT: &str = "5432";
const DEFAULT_POSTGRES_USER: &str = "postgres";
const DEFAULT_POSTGRES_PASSWORD: &str = "password";
const DEFAULT_POSTGRES_DB: &str = "reperto_db";

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Database connection error: {0}")]
    Connection(#[from] sqlx::Error),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Record already exists: {0}")]
    Conflict(String),
}

/// Build the connection URL. `DATABASE_URL` wins over the individual variables.
fn database_url() -> String {
    if let Ok(url) = env::var(ENV_DATABASE_URL) {
        return url;
    }

    let host = env::var(ENV_POSTGRES_HOST).unwrap_or_else(|_| DEFAULT_POSTGRES_HOST.to_string());
    let port = env::var(ENV_POSTGRES_PORT).unwrap_or_else(|_| DEFAULT_POSTGRES_PORT.to_string());
    let user = env::var(ENV_POSTGRES_USER).unwrap_or_else(|_| DEFAULT_POSTGRES_USER.to_string());
    let password =
        env::var(ENV_POSTGRES_PASSWORD).unwrap_or_else(|_| DEFAULT_POSTGRES_PASSWORD.to_string());
    let database = env::var(ENV_POSTGRES_DB).unwrap_or_else(|_| DEFAULT_POSTGRES_DB.to_string());

    format!(
        "postgres://{}:{}@{}:{}/{}",
        user, password, host, port, database
    )
}

/// Create a new database connection pool
pub async fn create_pool() -> Result<PgPool, DbError> {
    let database_url = database_url();

    tracing::debug!("Connecting to PostgreSQL");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await?;

    tracing::info!("PostgreSQL connection established");

    Ok(pool)
}

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id BIGSERIAL PRIMARY KEY,
        name VARCHAR(100) NOT NULL,
        email VARCHAR(150) NOT NULL UNIQUE,
        password_hash VARCHAR(255) NOT NULL,
        profile_image VARCHAR(255),
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS patients (
        id BIGSERIAL PRIMARY KEY,
        patient_id VARCHAR(50) NOT NULL UNIQUE,
        name VARCHAR(100) NOT NULL,
        age INTEGER NOT NULL,
        gender VARCHAR(10) NOT NULL,
        phone VARCHAR(20),
        address TEXT,
        medical_history TEXT,
        user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS cases (
        id BIGSERIAL PRIMARY KEY,
        case_id VARCHAR(50) NOT NULL UNIQUE,
        title VARCHAR(200) NOT NULL,
        complaint TEXT NOT NULL,
        summary TEXT,
        risk_level VARCHAR(20),
        status VARCHAR(20) NOT NULL DEFAULT 'pending',
        user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        patient_id BIGINT NOT NULL REFERENCES patients(id) ON DELETE CASCADE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS rubrics (
        id BIGSERIAL PRIMARY KEY,
        path VARCHAR(500) NOT NULL,
        confidence DOUBLE PRECISION NOT NULL,
        evidence TEXT,
        category VARCHAR(100),
        confirmed BOOLEAN NOT NULL DEFAULT FALSE,
        case_id BIGINT NOT NULL REFERENCES cases(id) ON DELETE CASCADE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS remedies (
        id BIGSERIAL PRIMARY KEY,
        name VARCHAR(100) NOT NULL,
        percentage DOUBLE PRECISION NOT NULL,
        matched_rubrics JSONB NOT NULL DEFAULT '[]',
        details TEXT,
        selected BOOLEAN NOT NULL DEFAULT FALSE,
        case_id BIGINT NOT NULL REFERENCES cases(id) ON DELETE CASCADE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_patients_user_id ON patients(user_id)",
    "CREATE INDEX IF NOT EXISTS idx_cases_user_id ON cases(user_id)",
    "CREATE INDEX IF NOT EXISTS idx_rubrics_case_id ON rubrics(case_id)",
    "CREATE INDEX IF NOT EXISTS idx_remedies_case_id ON remedies(case_id)",
];

/// Initialize database schema
pub async fn init_schema(pool: &PgPool) -> Result<(), DbError> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }

    tracing::info!("Database schema initialized");

    Ok(())
}
