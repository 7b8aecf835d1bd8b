//! API endpoint modules.

use actix_web::{HttpRequest, HttpResponse, web};

use crate::error::{AppError, AppResult};

pub mod auth;
pub mod health;
pub mod openapi;
pub mod reports;
pub mod role_groups;
pub mod tags;
pub mod users;

pub use health::configure_health_routes;
pub use openapi::ApiDoc;

/// Register every route mounted under `/api`.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(health::configure_health_routes)
        .configure(auth::configure_routes)
        .configure(reports::configure_routes)
        .configure(tags::configure_routes)
        .configure(role_groups::configure_routes)
        .configure(users::configure_routes);
}

/// JSON body errors become 400 in the common error shape.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::InvalidInput(err.to_string()).into())
}

/// Path segment errors (e.g. a non-numeric id) become 400 in the common error shape.
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|err, _req| AppError::InvalidInput(err.to_string()).into())
}

/// Fallback for unknown routes.
pub async fn not_found(req: HttpRequest) -> AppResult<HttpResponse> {
    Err(AppError::NotFound(format!(
        "Route {} {}",
        req.method(),
        req.path()
    )))
}
