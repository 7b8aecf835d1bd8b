//! DingTalk login routes.
//!
//! Endpoints:
//! 1. GET /auth/dingtalk/url: QR-code login URL for the front-end
//! 2. POST /auth/dingtalk/callback: exchange code, resolve account, open session
//! 3. POST /auth/logout: revoke session, clear cookie
//! 4. GET /auth/user: the logged-in user

use actix_web::{HttpRequest, HttpResponse, get, post, web};
use sea_orm::TransactionTrait;
use tracing::{info, warn};

use crate::auth::{AccessGate, CurrentUser};
use crate::config::{Config, SESSION_COOKIE};
use crate::db::{DbPool, users};
use crate::error::{AppError, AppResult};
use crate::models::{AuthUrlResponse, CallbackRequest, LoginResponse, MessageResponse, UserResponse};
use crate::services::{DingTalkClient, identity, session};

/// Configure auth routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(dingtalk_url)
        .service(dingtalk_callback)
        .service(logout)
        .service(current_user);
}

/// Build the DingTalk QR-code login URL.
#[utoipa::path(
    get,
    path = "/api/auth/dingtalk/url",
    tag = "Auth",
    responses(
        (status = 200, description = "Authorization URL", body = AuthUrlResponse),
        (status = 400, description = "DingTalk login not configured")
    )
)]
#[get("/auth/dingtalk/url")]
pub async fn dingtalk_url(
    config: web::Data<Config>,
    client: web::Data<DingTalkClient>,
) -> AppResult<HttpResponse> {
    if !config.dingtalk.is_configured() {
        return Err(AppError::InvalidInput(
            "DingTalk login is not configured".to_string(),
        ));
    }

    Ok(HttpResponse::Ok().json(AuthUrlResponse {
        url: client.authorization_url(),
    }))
}

/// Complete a DingTalk login.
///
/// Binds or creates the local account, then sets the session cookie.
#[utoipa::path(
    post,
    path = "/api/auth/dingtalk/callback",
    tag = "Auth",
    request_body = CallbackRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 400, description = "Missing code or rejected by DingTalk"),
        (status = 403, description = "Account disabled"),
        (status = 500, description = "DingTalk unreachable")
    )
)]
#[post("/auth/dingtalk/callback")]
pub async fn dingtalk_callback(
    body: web::Json<CallbackRequest>,
    config: web::Data<Config>,
    client: web::Data<DingTalkClient>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let code = body
        .code
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::InvalidInput("Missing authorization code".to_string()))?;

    let external = client.identify(code).await?;

    let txn = pool.connection().begin().await?;
    let resolved = identity::resolve(&txn, &external).await?;
    let user = resolved.user;

    if !user.is_active {
        // The binding is still recorded; only the session is refused.
        txn.commit().await?;
        warn!(user_id = user.id, "Login refused for disabled account");
        return Err(AppError::Forbidden("Account is disabled".to_string()));
    }

    let token = session::open(&txn, user.id, &config.session).await?;
    let groups = users::role_groups_of(&txn, user.id).await?;
    txn.commit().await?;

    info!(user_id = user.id, outcome = ?resolved.outcome, "DingTalk login");
    Ok(HttpResponse::Ok()
        .cookie(session::session_cookie(token, &config.session))
        .json(LoginResponse {
            message: "Login successful".to_string(),
            user: UserResponse::new(user, groups),
        }))
}

/// Revoke the current session and clear the cookie.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Auth",
    responses((status = 200, description = "Logged out", body = MessageResponse))
)]
#[post("/auth/logout")]
pub async fn logout(
    req: HttpRequest,
    config: web::Data<Config>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        if !cookie.value().is_empty() {
            session::close(pool.connection(), cookie.value()).await?;
        }
    }

    Ok(HttpResponse::Ok()
        .cookie(session::clear_session_cookie(&config.session))
        .json(MessageResponse::new("Logged out")))
}

/// The logged-in user.
#[utoipa::path(
    get,
    path = "/api/auth/user",
    tag = "Auth",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Not logged in")
    )
)]
#[get("/auth/user", wrap = "AccessGate::authenticated()")]
pub async fn current_user(user: CurrentUser, pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let groups = users::role_groups_of(pool.connection(), user.id).await?;
    Ok(HttpResponse::Ok().json(UserResponse::new(user.0, groups)))
}
