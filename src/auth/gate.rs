//! Authorization middleware.
//!
//! Checks run in a fixed order: session authentication, admin bypass,
//! report resource check, named permission. The first failure short-circuits
//! with a JSON error response.

use std::future::{Ready, ready};
use std::rc::Rc;

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::{Error, HttpMessage, HttpResponse, web};
use futures_util::future::LocalBoxFuture;
use tracing::debug;

use super::{CurrentUser, Permission};
use crate::config::SESSION_COOKIE;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::User;
use crate::services::{session, visibility};

/// Path segment naming the report on report-scoped routes.
const REPORT_ID_SEGMENT: &str = "report_id";

/// Access gate middleware factory, attached per route with `wrap = "..."`.
#[derive(Debug, Clone, Copy)]
pub struct AccessGate {
    permission: Option<Permission>,
    report_scoped: bool,
}

impl AccessGate {
    /// Any active, logged-in user.
    pub fn authenticated() -> Self {
        Self {
            permission: None,
            report_scoped: false,
        }
    }

    /// Logged-in user holding `permission`.
    pub fn permission(permission: Permission) -> Self {
        Self {
            permission: Some(permission),
            report_scoped: false,
        }
    }

    /// Report detail: the `{report_id}` report must exist and be visible to the caller.
    pub fn report() -> Self {
        Self {
            permission: Some(Permission::ViewReports),
            report_scoped: true,
        }
    }

    async fn authorize(&self, req: &ServiceRequest) -> AppResult<User> {
        let pool = req
            .app_data::<web::Data<DbPool>>()
            .cloned()
            .ok_or_else(|| AppError::Database("Database pool not configured".to_string()))?;
        let db = pool.connection();

        let token = req
            .cookie(SESSION_COOKIE)
            .map(|c| c.value().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AppError::Unauthorized("Login required".to_string()))?;

        let user = session::user_for_token(db, &token)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Session expired or invalid".to_string()))?;

        if !user.is_active {
            return Err(AppError::Forbidden("Account is disabled".to_string()));
        }

        if user.is_admin() {
            return Ok(user);
        }

        if self.report_scoped {
            let report_id = req
                .match_info()
                .get(REPORT_ID_SEGMENT)
                .and_then(|v| v.parse::<i32>().ok())
                .ok_or_else(|| AppError::InvalidInput("Invalid report id".to_string()))?;
            visibility::check_report_access(db, &user, report_id).await?;
        }

        if let Some(permission) = self.permission {
            if !user.role_enum().has_permission(permission.as_str()) {
                debug!(user_id = user.id, permission = %permission, "Permission denied");
                return Err(AppError::Forbidden(format!(
                    "Permission '{}' required",
                    permission
                )));
            }
        }

        Ok(user)
    }
}

impl<S, B> Transform<S, ServiceRequest> for AccessGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AccessGateMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AccessGateMiddleware {
            service: Rc::new(service),
            gate: *self,
        }))
    }
}

/// Access gate middleware service.
pub struct AccessGateMiddleware<S> {
    service: Rc<S>,
    gate: AccessGate,
}

impl<S, B> Service<ServiceRequest> for AccessGateMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let gate = self.gate;

        Box::pin(async move {
            match gate.authorize(&req).await {
                Ok(user) => {
                    req.extensions_mut().insert(CurrentUser(user));
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                Err(err) => {
                    let (http_req, _payload) = req.into_parts();
                    let res = HttpResponse::from_error(err).map_into_right_body();
                    Ok(ServiceResponse::new(http_req, res))
                }
            }
        })
    }
}
