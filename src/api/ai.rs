//! Stateless AI endpoints: complaint analysis and completion

use actix_web::{HttpResponse, post, web};

use crate::api::error::ApiError;
use crate::api::extract::AuthenticatedUser;
use crate::model::{AnalysisRequest, AnalysisResult, ComplaintSuggestion};
use crate::service::ComplaintAnalyzer;

/// Analyze free-text complaint without storing anything
#[utoipa::path(
    post,
    path = "/ai/parse-text",
    request_body = AnalysisRequest,
    responses(
        (status = 200, description = "Structured analysis (possibly a degraded fallback)", body = AnalysisResult),
        (status = 400, description = "No text", body = crate::api::error::ErrorResponse),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer" = [])),
    tag = "ai"
)]
#[post("/ai/parse-text")]
pub async fn parse_text(
    user: AuthenticatedUser,
    analyzer: web::Data<ComplaintAnalyzer>,
    body: web::Json<AnalysisRequest>,
) -> Result<HttpResponse, ApiError> {
    if body.text.trim().is_empty() {
        return Err(ApiError::BadRequest("No text".to_string()));
    }

    tracing::debug!(user_id = user.id, "Parsing complaint text");
    let result = analyzer.analyze(&body.text).await;

    Ok(HttpResponse::Ok().json(result))
}

/// Suggest a completion for a partial complaint
#[utoipa::path(
    post,
    path = "/ai/suggest-complaint",
    request_body = AnalysisRequest,
    responses(
        (status = 200, description = "Suggested completion", body = ComplaintSuggestion),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer" = [])),
    tag = "ai"
)]
#[post("/ai/suggest-complaint")]
pub async fn suggest_complaint(
    _user: AuthenticatedUser,
    analyzer: web::Data<ComplaintAnalyzer>,
    body: web::Json<AnalysisRequest>,
) -> Result<HttpResponse, ApiError> {
    let suggestion = analyzer.suggest_complaint(&body.text).await;
    Ok(HttpResponse::Ok().json(ComplaintSuggestion { suggestion }))
}

/// Configure AI routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(parse_text).service(suggest_complaint);
}
