use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Lifecycle of a case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    Pending,
    Analyzed,
    Completed,
}

impl CaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStatus::Pending => "pending",
            CaseStatus::Analyzed => "analyzed",
            CaseStatus::Completed => "completed",
        }
    }

    pub fn from_db(value: &str) -> Self {
        match value {
            "analyzed" => CaseStatus::Analyzed,
            "completed" => CaseStatus::Completed,
            _ => CaseStatus::Pending,
        }
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub profile_image: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Patient {
    pub id: i64,
    /// Public identifier, `PT-XXXXXXXX`
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

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewPatient {
    pub name: String,
    pub age: i32,
    pub gender: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub medical_history: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Case {
    pub id: i64,
    /// Public identifier, `CASE-XXXXXXXX`
    pub case_id: String,
    pub title: String,
    pub complaint: String,
    pub summary: Option<String>,
    pub risk_level: Option<String>,
    pub status: CaseStatus,
    pub user_id: i64,
    pub patient_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewCase {
    pub title: String,
    pub complaint: String,
    pub patient_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Rubric {
    pub id: i64,
    pub path: String,
    pub confidence: f64,
    pub evidence: Option<String>,
    pub category: Option<String>,
    pub confirmed: bool,
    pub case_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Remedy {
    pub id: i64,
    pub name: String,
    pub percentage: f64,
    pub matched_rubrics: Vec<String>,
    pub details: Option<String>,
    pub selected: bool,
    pub case_id: i64,
    pub created_at: DateTime<Utc>,
}

/// A case together with its rubrics and remedies (remedies by percentage, descending)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CaseDetail {
    pub case: Case,
    pub rubrics: Vec<Rubric>,
    pub remedies: Vec<Remedy>,
}

/// Builds a public identifier like `PT-1A2B3C4D` from a fresh v4 UUID
pub fn public_id(prefix: &str) -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}", prefix, hex[..8].to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_id_shape() {
        let id = public_id("CASE");
        assert!(id.starts_with("CASE-"));
        let suffix = &id["CASE-".len()..];
        assert_eq!(suffix.len(), 8);
        assert!(
            suffix
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
        );
    }

    #[test]
    fn unknown_status_reads_as_pending() {
        assert_eq!(CaseStatus::from_db("analyzed"), CaseStatus::Analyzed);
        assert_eq!(CaseStatus::from_db("archived"), CaseStatus::Pending);
    }
}
