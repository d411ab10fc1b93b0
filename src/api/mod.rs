pub mod ai;
pub mod auth;
pub mod case;
pub mod error;
pub mod extract;
pub mod health;
pub mod openapi;
pub mod patient;

use actix_web::web;

/// Register every route of the service
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.configure(auth::configure)
        .configure(patient::configure)
        .configure(case::configure)
        .configure(ai::configure)
        .configure(health::configure)
        .configure(openapi::configure);
}
