//! REST API endpoints for patients

use actix_web::{HttpResponse, get, post, web};

use crate::api::error::ApiError;
use crate::api::extract::AuthenticatedUser;
use crate::db::DbError;
use crate::db::models::Pagination;
use crate::db::repository::PatientRepository;
use crate::model::{NewPatient, Patient};

fn patient_not_found(err: DbError) -> ApiError {
    match err {
        DbError::NotFound(_) => ApiError::NotFound("Patient not found".to_string()),
        other => ApiError::from(other),
    }
}

/// Register a patient for the current user
#[utoipa::path(
    post,
    path = "/patients",
    request_body = NewPatient,
    responses(
        (status = 200, description = "Patient created", body = Patient),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer" = [])),
    tag = "patients"
)]
#[post("/patients")]
pub async fn create_patient(
    user: AuthenticatedUser,
    patients: web::Data<PatientRepository>,
    body: web::Json<NewPatient>,
) -> Result<HttpResponse, ApiError> {
    let new_patient = body.into_inner();
    if new_patient.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Patient name is required".to_string()));
    }
    if new_patient.age < 0 {
        return Err(ApiError::BadRequest("Patient age must not be negative".to_string()));
    }

    let patient = patients.create(user.id, &new_patient).await?;
    tracing::info!(user_id = user.id, patient_id = %patient.patient_id, "Patient created");

    Ok(HttpResponse::Ok().json(patient))
}

/// List the current user's patients, newest first
#[utoipa::path(
    get,
    path = "/patients",
    params(Pagination),
    responses(
        (status = 200, description = "Patients", body = [Patient]),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer" = [])),
    tag = "patients"
)]
#[get("/patients")]
pub async fn list_patients(
    user: AuthenticatedUser,
    patients: web::Data<PatientRepository>,
    query: web::Query<Pagination>,
) -> Result<HttpResponse, ApiError> {
    let list = patients.list(user.id, query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(list))
}

/// Get one of the current user's patients
#[utoipa::path(
    get,
    path = "/patients/{id}",
    params(
        ("id" = i64, Path, description = "Patient row id")
    ),
    responses(
        (status = 200, description = "Patient", body = Patient),
        (status = 404, description = "Patient not found", body = crate::api::error::ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "patients"
)]
#[get("/patients/{id}")]
pub async fn get_patient(
    user: AuthenticatedUser,
    patients: web::Data<PatientRepository>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let patient = patients
        .get(user.id, path.into_inner())
        .await
        .map_err(patient_not_found)?;

    Ok(HttpResponse::Ok().json(patient))
}

/// Configure patient routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(create_patient)
        .service(list_patients)
        .service(get_patient);
}
