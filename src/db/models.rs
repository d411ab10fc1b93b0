//! Database row types and their domain conversions

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::FromRow;
use sqlx::types::Json;
use utoipa::IntoParams;

use crate::model::{Case, CaseStatus, Patient, Remedy, Rubric, User};

const DEFAULT_LIMIT: i64 = 100;
const MAX_LIMIT: i64 = 500;

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub profile_image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    pub fn into_domain(self) -> User {
        User {
            id: self.id,
            name: self.name,
            email: self.email,
            profile_image: self.profile_image,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct PatientRow {
    pub id: i64,
    pub patient_id: String,
    pub name: String,
    pub age: i32,
    pub gender: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub medical_history: Option<String>,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

impl From<PatientRow> for Patient {
    fn from(row: PatientRow) -> Self {
        Patient {
            id: row.id,
            patient_id: row.patient_id,
            name: row.name,
            age: row.age,
            gender: row.gender,
            phone: row.phone,
            address: row.address,
            medical_history: row.medical_history,
            user_id: row.user_id,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct CaseRow {
    pub id: i64,
    pub case_id: String,
    pub title: String,
    pub complaint: String,
    pub summary: Option<String>,
    pub risk_level: Option<String>,
    pub status: String,
    pub user_id: i64,
    pub patient_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<CaseRow> for Case {
    fn from(row: CaseRow) -> Self {
        Case {
            id: row.id,
            case_id: row.case_id,
            title: row.title,
            complaint: row.complaint,
            summary: row.summary,
            risk_level: row.risk_level,
            status: CaseStatus::from_db(&row.status),
            user_id: row.user_id,
            patient_id: row.patient_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct RubricRow {
    pub id: i64,
    pub path: String,
    pub confidence: f64,
    pub evidence: Option<String>,
    pub category: Option<String>,
    pub confirmed: bool,
    pub case_id: i64,
    pub created_at: DateTime<Utc>,
}

impl From<RubricRow> for Rubric {
    fn from(row: RubricRow) -> Self {
        Rubric {
            id: row.id,
            path: row.path,
            confidence: row.confidence,
            evidence: row.evidence,
            category: row.category,
            confirmed: row.confirmed,
            case_id: row.case_id,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct RemedyRow {
    pub id: i64,
    pub name: String,
    pub percentage: f64,
    pub matched_rubrics: Json<Vec<String>>,
    pub details: Option<String>,
    pub selected: bool,
    pub case_id: i64,
    pub created_at: DateTime<Utc>,
}

impl From<RemedyRow> for Remedy {
    fn from(row: RemedyRow) -> Self {
        Remedy {
            id: row.id,
            name: row.name,
            percentage: row.percentage,
            matched_rubrics: row.matched_rubrics.0,
            details: row.details,
            selected: row.selected,
            case_id: row.case_id,
            created_at: row.created_at,
        }
    }
}

/// Offset pagination for list endpoints
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
pub struct Pagination {
    /// Rows to skip (default: 0)
    pub skip: Option<i64>,
    /// Maximum rows to return (default: 100)
    pub limit: Option<i64>,
}

impl Pagination {
    pub fn offset(&self) -> i64 {
        self.skip.unwrap_or(0).max(0)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(0, MAX_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults() {
        let p = Pagination::default();
        assert_eq!(p.offset(), 0);
        assert_eq!(p.limit(), 100);
    }

    #[test]
    fn pagination_bounds() {
        let p = Pagination {
            skip: Some(-5),
            limit: Some(10_000),
        };
        assert_eq!(p.offset(), 0);
        assert_eq!(p.limit(), 500);
    }

    #[test]
    fn case_row_status_conversion() {
        let row = CaseRow {
            id: 1,
            case_id: "CASE-0000ABCD".to_string(),
            title: "Headache".to_string(),
            complaint: "Headache at night".to_string(),
            summary: None,
            risk_level: None,
            status: "analyzed".to_string(),
            user_id: 7,
            patient_id: 3,
            created_at: Utc::now(),
            updated_at: None,
        };
        let case = Case::from(row);
        assert_eq!(case.status, CaseStatus::Analyzed);
        assert_eq!(case.user_id, 7);
    }
}
