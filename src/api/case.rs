//! REST API endpoints for cases

use actix_web::{HttpResponse, get, post, web};

use crate::api::error::ApiError;
use crate::api::extract::AuthenticatedUser;
use crate::db::DbError;
use crate::db::models::Pagination;
use crate::db::repository::{CaseRepository, PatientRepository};
use crate::model::{AnalysisRequest, Case, CaseDetail, NewCase};
use crate::service::CaseService;

fn case_not_found(err: DbError) -> ApiError {
    match err {
        DbError::NotFound(_) => ApiError::NotFound("Case not found".to_string()),
        other => ApiError::from(other),
    }
}

/// Open a case for one of the current user's patients
#[utoipa::path(
    post,
    path = "/cases",
    request_body = NewCase,
    responses(
        (status = 200, description = "Case created", body = Case),
        (status = 404, description = "Patient not found", body = crate::api::error::ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "cases"
)]
#[post("/cases")]
pub async fn create_case(
    user: AuthenticatedUser,
    patients: web::Data<PatientRepository>,
    cases: web::Data<CaseRepository>,
    body: web::Json<NewCase>,
) -> Result<HttpResponse, ApiError> {
    let new_case = body.into_inner();

    patients
        .get(user.id, new_case.patient_id)
        .await
        .map_err(|e| match e {
            DbError::NotFound(_) => ApiError::NotFound("Patient not found".to_string()),
            other => ApiError::from(other),
        })?;

    let case = cases.create(user.id, &new_case).await?;
    tracing::info!(user_id = user.id, case_id = %case.case_id, "Case created");

    Ok(HttpResponse::Ok().json(case))
}

/// List the current user's cases, newest first
#[utoipa::path(
    get,
    path = "/cases",
    params(Pagination),
    responses(
        (status = 200, description = "Cases", body = [Case])
    ),
    security(("bearer" = [])),
    tag = "cases"
)]
#[get("/cases")]
pub async fn list_cases(
    user: AuthenticatedUser,
    cases: web::Data<CaseRepository>,
    query: web::Query<Pagination>,
) -> Result<HttpResponse, ApiError> {
    let list = cases.list(user.id, query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(list))
}

/// Get a case with its rubrics and remedies
#[utoipa::path(
    get,
    path = "/cases/{id}",
    params(
        ("id" = i64, Path, description = "Case row id")
    ),
    responses(
        (status = 200, description = "Case detail", body = CaseDetail),
        (status = 404, description = "Case not found", body = crate::api::error::ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "cases"
)]
#[get("/cases/{id}")]
pub async fn get_case(
    user: AuthenticatedUser,
    cases: web::Data<CaseRepository>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let detail = cases
        .detail(user.id, path.into_inner())
        .await
        .map_err(case_not_found)?;

    Ok(HttpResponse::Ok().json(detail))
}

/// Analyze complaint text for a case and store rubrics and remedies
#[utoipa::path(
    post,
    path = "/cases/{id}/analyze",
    params(
        ("id" = i64, Path, description = "Case row id")
    ),
    request_body = AnalysisRequest,
    responses(
        (status = 200, description = "Updated case detail", body = CaseDetail),
        (status = 404, description = "Case not found", body = crate::api::error::ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "cases"
)]
#[post("/cases/{id}/analyze")]
pub async fn analyze_case(
    user: AuthenticatedUser,
    service: web::Data<CaseService>,
    path: web::Path<i64>,
    body: web::Json<AnalysisRequest>,
) -> Result<HttpResponse, ApiError> {
    let detail = service
        .analyze_case(user.id, path.into_inner(), &body.text)
        .await
        .map_err(case_not_found)?;

    Ok(HttpResponse::Ok().json(detail))
}

/// Configure case routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(create_case)
        .service(list_cases)
        .service(get_case)
        .service(analyze_case);
}
