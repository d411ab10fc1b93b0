//! Account endpoints: signup, login, current user

use std::sync::LazyLock;

use actix_web::{HttpResponse, get, post, web};
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::error::ApiError;
use crate::api::extract::AuthenticatedUser;
use crate::db::DbError;
use crate::db::repository::UserStore;
use crate::model::User;
use crate::service::TokenService;
use crate::service::auth::{hash_password, verify_password};

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid")
});

#[derive(Debug, Deserialize, ToSchema)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub user: User,
}

impl TokenResponse {
    fn bearer(access_token: String, user: User) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
            user,
        }
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_signup(req: &SignupRequest) -> Result<(), ApiError> {
    if req.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Name is required".to_string()));
    }
    if !EMAIL_PATTERN.is_match(req.email.trim()) {
        return Err(ApiError::BadRequest("Invalid email address".to_string()));
    }
    if req.password.is_empty() {
        return Err(ApiError::BadRequest("Password is required".to_string()));
    }
    Ok(())
}

/// Create an account and return an access token
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 200, description = "Account created", body = TokenResponse),
        (status = 400, description = "Invalid input or email already registered", body = crate::api::error::ErrorResponse)
    ),
    tag = "auth"
)]
#[post("/auth/signup")]
pub async fn signup(
    users: web::Data<dyn UserStore>,
    tokens: web::Data<TokenService>,
    body: web::Json<SignupRequest>,
) -> Result<HttpResponse, ApiError> {
    let req = body.into_inner();
    validate_signup(&req)?;

    let email = normalize_email(&req.email);
    if users.find_by_email(&email).await?.is_some() {
        return Err(ApiError::BadRequest("Email already registered".to_string()));
    }

    let iterations = tokens.password_iterations();
    let password = req.password;
    let password_hash = web::block(move || hash_password(&password, iterations))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let row = users
        .create(req.name.trim(), &email, &password_hash)
        .await
        .map_err(|e| match e {
            DbError::Conflict(_) => ApiError::BadRequest("Email already registered".to_string()),
            other => ApiError::from(other),
        })?;

    let token = tokens.issue(row.id, &row.email)?;
    tracing::info!(user_id = row.id, "User signed up");

    Ok(HttpResponse::Ok().json(TokenResponse::bearer(token, row.into_domain())))
}

/// Exchange email and password for an access token
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 401, description = "Incorrect email or password", body = crate::api::error::ErrorResponse)
    ),
    tag = "auth"
)]
#[post("/auth/login")]
pub async fn login(
    users: web::Data<dyn UserStore>,
    tokens: web::Data<TokenService>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    let req = body.into_inner();
    let rejected = || ApiError::Unauthorized("Incorrect email or password".to_string());

    let Some(row) = users.find_by_email(&normalize_email(&req.email)).await? else {
        return Err(rejected());
    };

    let stored = row.password_hash.clone();
    let password = req.password;
    let verified = web::block(move || verify_password(&password, &stored))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    if !verified {
        tracing::debug!(user_id = row.id, "Login rejected");
        return Err(rejected());
    }

    let token = tokens.issue(row.id, &row.email)?;
    Ok(HttpResponse::Ok().json(TokenResponse::bearer(token, row.into_domain())))
}

/// Current user profile
#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Missing or invalid token", body = crate::api::error::ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
#[get("/auth/me")]
pub async fn me(
    user: AuthenticatedUser,
    users: web::Data<dyn UserStore>,
) -> Result<HttpResponse, ApiError> {
    tracing::debug!(user_id = user.id, email = %user.email, "Loading current user");

    let row = users.get_by_id(user.id).await.map_err(|e| match e {
        // Token outlived its account
        DbError::NotFound(_) => ApiError::credentials(),
        other => ApiError::from(other),
    })?;

    Ok(HttpResponse::Ok().json(row.into_domain()))
}

/// Configure account routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(signup).service(login).service(me);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::error::ErrorResponse;
    use crate::db::models::UserRow;
    use crate::model::AuthConfig;
    use actix_web::{App, http::StatusCode, http::header, test};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::{Arc, Mutex};

    const TEST_ITERATIONS: u32 = 1_000;

    /// In-memory account table with the unique-email rule
    #[derive(Default)]
    struct MemoryUsers {
        rows: Mutex<Vec<UserRow>>,
    }

    impl MemoryUsers {
        fn with_user(name: &str, email: &str, password: &str) -> Arc<Self> {
            let users = Self::default();
            users.rows.lock().unwrap().push(UserRow {
                id: 1,
                name: name.to_string(),
                email: email.to_string(),
                password_hash: hash_password(password, TEST_ITERATIONS),
                profile_image: None,
                created_at: Utc::now(),
            });
            Arc::new(users)
        }
    }

    #[async_trait]
    impl UserStore for MemoryUsers {
        async fn create(
            &self,
            name: &str,
            email: &str,
            password_hash: &str,
        ) -> Result<UserRow, DbError> {
            let mut rows = self.rows.lock().unwrap();
            if rows.iter().any(|r| r.email == email) {
                return Err(DbError::Conflict(email.to_string()));
            }
            let row = UserRow {
                id: rows.len() as i64 + 1,
                name: name.to_string(),
                email: email.to_string(),
                password_hash: password_hash.to_string(),
                profile_image: None,
                created_at: Utc::now(),
            };
            rows.push(row.clone());
            Ok(row)
        }

        async fn find_by_email(&self, email: &str) -> Result<Option<UserRow>, DbError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .find(|r| r.email == email)
                .cloned())
        }

        async fn get_by_id(&self, id: i64) -> Result<UserRow, DbError> {
            self.rows
                .lock()
                .unwrap()
                .iter()
                .find(|r| r.id == id)
                .cloned()
                .ok_or_else(|| DbError::NotFound(format!("user {}", id)))
        }
    }

    fn token_service() -> TokenService {
        TokenService::new(&AuthConfig {
            secret_key: "account-test-secret".to_string(),
            token_expire_minutes: 5,
            password_iterations: TEST_ITERATIONS,
        })
    }

    macro_rules! auth_app {
        ($users:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::from($users as Arc<dyn UserStore>))
                    .app_data(web::Data::new(token_service()))
                    .configure(configure),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_signup_issues_bearer_token() {
        let app = auth_app!(Arc::new(MemoryUsers::default()));

        let req = test::TestRequest::post()
            .uri("/auth/signup")
            .set_json(serde_json::json!({
                "name": "Dr. Rao",
                "email": " Rao@Clinic.org ",
                "password": "s3cret"
            }))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["token_type"], "bearer");
        assert_eq!(body["user"]["email"], "rao@clinic.org");
        let claims = token_service()
            .validate(body["access_token"].as_str().unwrap())
            .unwrap();
        assert_eq!(claims.sub, "rao@clinic.org");
    }

    #[actix_web::test]
    async fn test_signup_with_taken_email_is_rejected() {
        let app = auth_app!(MemoryUsers::with_user("Dr. Rao", "rao@clinic.org", "s3cret"));

        let req = test::TestRequest::post()
            .uri("/auth/signup")
            .set_json(serde_json::json!({
                "name": "Someone Else",
                "email": "RAO@clinic.org",
                "password": "other"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.message, "Email already registered");
    }

    #[actix_web::test]
    async fn test_login_with_wrong_password_is_unauthorized() {
        let app = auth_app!(MemoryUsers::with_user("Dr. Rao", "rao@clinic.org", "s3cret"));

        for (email, password) in [("rao@clinic.org", "wrong"), ("nobody@clinic.org", "s3cret")] {
            let req = test::TestRequest::post()
                .uri("/auth/login")
                .set_json(serde_json::json!({"email": email, "password": password}))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

            let body: ErrorResponse = test::read_body_json(resp).await;
            assert_eq!(body.message, "Incorrect email or password");
        }
    }

    #[actix_web::test]
    async fn test_login_then_me() {
        let app = auth_app!(MemoryUsers::with_user("Dr. Rao", "rao@clinic.org", "s3cret"));

        let req = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(serde_json::json!({"email": "Rao@Clinic.org", "password": "s3cret"}))
            .to_request();
        let login_body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        let token = login_body["access_token"].as_str().unwrap();

        let req = test::TestRequest::get()
            .uri("/auth/me")
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
            .to_request();
        let me_body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(me_body["id"], 1);
        assert_eq!(me_body["name"], "Dr. Rao");
        assert!(me_body.get("password_hash").is_none());
    }

    #[actix_web::test]
    async fn test_me_for_deleted_account_is_unauthorized() {
        let app = auth_app!(Arc::new(MemoryUsers::default()));
        let token = token_service().issue(99, "gone@clinic.org").unwrap();

        let req = test::TestRequest::get()
            .uri("/auth/me")
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.message, "Could not validate credentials");
    }

    fn signup_request(name: &str, email: &str, password: &str) -> SignupRequest {
        SignupRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[::core::prelude::v1::test]
    fn test_signup_validation() {
        assert!(validate_signup(&signup_request("Dr. Rao", "rao@clinic.org", "pw")).is_ok());
        assert!(validate_signup(&signup_request("", "rao@clinic.org", "pw")).is_err());
        assert!(validate_signup(&signup_request("Dr. Rao", "not-an-email", "pw")).is_err());
        assert!(validate_signup(&signup_request("Dr. Rao", "rao@clinic", "pw")).is_err());
        assert!(validate_signup(&signup_request("Dr. Rao", "rao@clinic.org", "")).is_err());
    }

    #[::core::prelude::v1::test]
    fn test_email_normalization() {
        assert_eq!(normalize_email("  Rao@Clinic.ORG "), "rao@clinic.org");
    }
}
