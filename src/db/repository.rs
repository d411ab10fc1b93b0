//! Repositories for users, patients, cases and their analysis rows

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::types::Json;

use super::DbError;
use super::models::{CaseRow, Pagination, PatientRow, RemedyRow, RubricRow, UserRow};
use crate::model::records::public_id;
use crate::model::{
    AnalysisResult, Case, CaseDetail, CaseStatus, NewCase, NewPatient, Patient, Remedy,
    RemedySuggestion, Rubric,
};

/// Postgres unique-violation SQLSTATE
const UNIQUE_VIOLATION: &str = "23505";

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|e| e.code())
        .is_some_and(|code| code == UNIQUE_VIOLATION)
}

/// Account storage used by the auth endpoints
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<UserRow, DbError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRow>, DbError>;

    async fn get_by_id(&self, id: i64) -> Result<UserRow, DbError>;
}

/// Case storage used by the analysis workflow
#[async_trait]
pub trait CaseStore: Send + Sync {
    async fn get(&self, user_id: i64, id: i64) -> Result<Case, DbError>;

    async fn save_analysis(
        &self,
        case_id: i64,
        analysis: &AnalysisResult,
        remedies: &[RemedySuggestion],
    ) -> Result<(), DbError>;

    async fn detail(&self, user_id: i64, id: i64) -> Result<CaseDetail, DbError>;
}

/// Repository for user accounts
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new user. Fails with `Conflict` if the email is taken.
    pub async fn create(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<UserRow, DbError> {
        let row: UserRow = sqlx::query_as(
            r#"
            INSERT INTO users (name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DbError::Conflict(email.to_string())
            } else {
                DbError::from(e)
            }
        })?;

        tracing::debug!(user_id = row.id, "Created user");
        Ok(row)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserRow>, DbError> {
        let row = sqlx::query_as("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<UserRow, DbError> {
        sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("user {}", id)))
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn create(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<UserRow, DbError> {
        UserRepository::create(self, name, email, password_hash).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRow>, DbError> {
        UserRepository::find_by_email(self, email).await
    }

    async fn get_by_id(&self, id: i64) -> Result<UserRow, DbError> {
        UserRepository::get_by_id(self, id).await
    }
}

/// Repository for patients, scoped to their owning user
#[derive(Clone)]
pub struct PatientRepository {
    pool: PgPool,
}

impl PatientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user_id: i64, patient: &NewPatient) -> Result<Patient, DbError> {
        let row: PatientRow = sqlx::query_as(
            r#"
            INSERT INTO patients (
                patient_id, name, age, gender, phone, address, medical_history, user_id
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(public_id("PT"))
        .bind(&patient.name)
        .bind(patient.age)
        .bind(&patient.gender)
        .bind(&patient.phone)
        .bind(&patient.address)
        .bind(&patient.medical_history)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(id = row.id, patient_id = %row.patient_id, "Created patient");
        Ok(row.into())
    }

    /// List a user's patients, newest first
    pub async fn list(&self, user_id: i64, page: Pagination) -> Result<Vec<Patient>, DbError> {
        let rows: Vec<PatientRow> = sqlx::query_as(
            r#"
            SELECT * FROM patients
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Patient::from).collect())
    }

    /// Get a patient owned by the user
    pub async fn get(&self, user_id: i64, id: i64) -> Result<Patient, DbError> {
        let row: PatientRow = sqlx::query_as("SELECT * FROM patients WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("patient {}", id)))?;

        Ok(row.into())
    }
}

/// Repository for cases and their rubric/remedy rows
#[derive(Clone)]
pub struct CaseRepository {
    pool: PgPool,
}

impl CaseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user_id: i64, case: &NewCase) -> Result<Case, DbError> {
        let row: CaseRow = sqlx::query_as(
            r#"
            INSERT INTO cases (case_id, title, complaint, status, user_id, patient_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(public_id("CASE"))
        .bind(&case.title)
        .bind(&case.complaint)
        .bind(CaseStatus::Pending.as_str())
        .bind(user_id)
        .bind(case.patient_id)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(id = row.id, case_id = %row.case_id, "Created case");
        Ok(row.into())
    }

    /// List a user's cases, newest first
    pub async fn list(&self, user_id: i64, page: Pagination) -> Result<Vec<Case>, DbError> {
        let rows: Vec<CaseRow> = sqlx::query_as(
            r#"
            SELECT * FROM cases
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Case::from).collect())
    }

    /// Get a case owned by the user
    pub async fn get(&self, user_id: i64, id: i64) -> Result<Case, DbError> {
        let row: CaseRow = sqlx::query_as("SELECT * FROM cases WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("case {}", id)))?;

        Ok(row.into())
    }

    pub async fn rubrics(&self, case_id: i64) -> Result<Vec<Rubric>, DbError> {
        let rows: Vec<RubricRow> =
            sqlx::query_as("SELECT * FROM rubrics WHERE case_id = $1 ORDER BY id")
                .bind(case_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(Rubric::from).collect())
    }

    /// Remedies for a case, best match first
    pub async fn remedies(&self, case_id: i64) -> Result<Vec<Remedy>, DbError> {
        let rows: Vec<RemedyRow> = sqlx::query_as(
            "SELECT * FROM remedies WHERE case_id = $1 ORDER BY percentage DESC, id",
        )
        .bind(case_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Remedy::from).collect())
    }

    /// Load a case owned by the user together with its rubrics and remedies
    pub async fn detail(&self, user_id: i64, id: i64) -> Result<CaseDetail, DbError> {
        let case = self.get(user_id, id).await?;
        let rubrics = self.rubrics(case.id).await?;
        let remedies = self.remedies(case.id).await?;

        Ok(CaseDetail {
            case,
            rubrics,
            remedies,
        })
    }

    /// Store an analysis: case summary/risk/status plus new rubric and remedy rows,
    /// all in one transaction. Earlier rows are kept.
    pub async fn save_analysis(
        &self,
        case_id: i64,
        analysis: &AnalysisResult,
        remedies: &[RemedySuggestion],
    ) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE cases
            SET summary = $1, risk_level = $2, status = $3, updated_at = NOW()
            WHERE id = $4
            "#,
        )
        .bind(&analysis.summary)
        .bind(analysis.risk.as_str())
        .bind(CaseStatus::Analyzed.as_str())
        .bind(case_id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("case {}", case_id)));
        }

        for rubric in &analysis.rubrics {
            sqlx::query(
                r#"
                INSERT INTO rubrics (path, confidence, evidence, category, case_id)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(&rubric.path)
            .bind(rubric.confidence)
            .bind(&rubric.evidence)
            .bind(&rubric.category)
            .bind(case_id)
            .execute(&mut *tx)
            .await?;
        }

        for remedy in remedies {
            sqlx::query(
                r#"
                INSERT INTO remedies (name, percentage, matched_rubrics, details, case_id)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(&remedy.name)
            .bind(remedy.percentage)
            .bind(Json(&remedy.matched_rubrics))
            .bind(&remedy.details)
            .bind(case_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::debug!(
            case_id = case_id,
            rubrics = analysis.rubrics.len(),
            remedies = remedies.len(),
            "Saved case analysis"
        );

        Ok(())
    }
}

#[async_trait]
impl CaseStore for CaseRepository {
    async fn get(&self, user_id: i64, id: i64) -> Result<Case, DbError> {
        CaseRepository::get(self, user_id, id).await
    }

    async fn save_analysis(
        &self,
        case_id: i64,
        analysis: &AnalysisResult,
        remedies: &[RemedySuggestion],
    ) -> Result<(), DbError> {
        CaseRepository::save_analysis(self, case_id, analysis, remedies).await
    }

    async fn detail(&self, user_id: i64, id: i64) -> Result<CaseDetail, DbError> {
        CaseRepository::detail(self, user_id, id).await
    }
}
