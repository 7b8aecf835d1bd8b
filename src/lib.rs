//! Report access server library.
//!
//! Users, role groups, reports and tags over SeaORM, DingTalk login, and the
//! access gate deciding who may see which embedded Power BI report.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod middleware;
pub mod migration;
pub mod models;
pub mod services;

use actix_web::web;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Routes, extractor error handlers and the 404 fallback.
///
/// Shared state (`DbPool`, `Config`, `DingTalkClient`) is registered by the caller.
pub fn configure_app(cfg: &mut web::ServiceConfig) {
    cfg.app_data(api::json_config())
        .app_data(api::path_config())
        .service(api::health::root)
        .service(
            SwaggerUi::new("/swagger-ui/{_:.*}").url("/api/openapi.json", api::ApiDoc::openapi()),
        )
        .service(web::scope("/api").configure(api::configure_routes))
        .default_service(web::route().to(api::not_found));
}
