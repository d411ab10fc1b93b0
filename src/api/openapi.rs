//! OpenAPI specification endpoints

use actix_web::{HttpResponse, Responder, get};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::error::ErrorResponse;
use crate::api::{ai, auth, case, health, patient};
use crate::model::{
    AnalysisRequest, AnalysisResult, Case, CaseDetail, CaseStatus, ComplaintSuggestion,
    NewCase, NewPatient, Patient, Remedy, RemedySuggestion, RiskLevel, Rubric, RubricCandidate,
    User,
};

#[derive(OpenApi)]
#[openapi(
    info(title = "Reperto API", description = "Homeopathic case analysis"),
    paths(
        auth::signup,
        auth::login,
        auth::me,
        patient::create_patient,
        patient::list_patients,
        patient::get_patient,
        case::create_case,
        case::list_cases,
        case::get_case,
        case::analyze_case,
        ai::parse_text,
        ai::suggest_complaint,
        health::liveness,
        health::readiness,
    ),
    components(schemas(
        auth::SignupRequest,
        auth::LoginRequest,
        auth::TokenResponse,
        User,
        Patient,
        NewPatient,
        Case,
        NewCase,
        CaseStatus,
        CaseDetail,
        Rubric,
        Remedy,
        AnalysisRequest,
        AnalysisResult,
        RubricCandidate,
        RiskLevel,
        RemedySuggestion,
        ComplaintSuggestion,
        ErrorResponse,
        health::HealthStatus,
        health::ReadinessStatus,
        health::DependencyHealth,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "auth", description = "Accounts and tokens"),
        (name = "patients", description = "Patient records"),
        (name = "cases", description = "Cases and stored analyses"),
        (name = "ai", description = "Stateless complaint analysis"),
        (name = "health", description = "Probes")
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Serve OpenAPI JSON specification
#[get("/openapi.json")]
pub async fn openapi_json() -> impl Responder {
    HttpResponse::Ok().json(ApiDoc::openapi())
}

/// Serve OpenAPI YAML specification
#[get("/openapi.yaml")]
pub async fn openapi_yaml() -> impl Responder {
    match ApiDoc::openapi().to_yaml() {
        Ok(yaml) => HttpResponse::Ok().content_type("text/yaml").body(yaml),
        Err(e) => {
            tracing::error!(error = %e, "Failed to render OpenAPI YAML");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Configure OpenAPI routes
pub fn configure(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.service(openapi_json).service(openapi_yaml);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_routes_and_bearer_scheme() {
        let doc = ApiDoc::openapi();
        for path in [
            "/auth/signup",
            "/auth/login",
            "/auth/me",
            "/patients",
            "/patients/{id}",
            "/cases",
            "/cases/{id}",
            "/cases/{id}/analyze",
            "/ai/parse-text",
            "/ai/suggest-complaint",
            "/health/live",
            "/health/ready",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer"));
    }

    #[test]
    fn test_yaml_renders() {
        let yaml = ApiDoc::openapi().to_yaml().unwrap();
        assert!(yaml.contains("/cases/{id}/analyze"));
    }
}
