//! Access log middleware.
//!
//! Requests are logged at debug level on arrival and once more on completion,
//! where denied requests (401/403) are separated from other client errors so
//! that gate rejections are easy to filter.

use std::future::{Ready, ready};
use std::rc::Rc;
use std::time::Instant;

use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::http::StatusCode;
use actix_web::Error;
use futures_util::future::LocalBoxFuture;
use tracing::{debug, error, info, warn};

use crate::config::SESSION_COOKIE;

/// How a finished request is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Ok,
    Denied,
    ClientError,
    ServerError,
}

impl Outcome {
    fn of(status: StatusCode) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::Denied,
            s if s.is_server_error() => Self::ServerError,
            s if s.is_client_error() => Self::ClientError,
            _ => Self::Ok,
        }
    }
}

/// Access log middleware factory.
pub struct RequestLogger;

impl<S, B> Transform<S, ServiceRequest> for RequestLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestLoggerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestLoggerMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct RequestLoggerMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequestLoggerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let started = Instant::now();
        let method = req.method().clone();
        let path = req.path().to_string();
        // Presence only; the token never reaches the log
        let has_session = req
            .cookie(SESSION_COOKIE)
            .is_some_and(|c| !c.value().is_empty());
        let peer = req
            .connection_info()
            .realip_remote_addr()
            .unwrap_or("-")
            .to_string();

        debug!(target: "access", %method, %path, %peer, has_session, "request");

        Box::pin(async move {
            let res = service.call(req).await?;
            let status = res.status().as_u16();
            let elapsed_ms = started.elapsed().as_millis() as u64;

            match Outcome::of(res.status()) {
                Outcome::Ok => {
                    info!(target: "access", %method, %path, status, elapsed_ms, "completed")
                }
                Outcome::Denied => warn!(
                    target: "access",
                    %method, %path, %peer, status, has_session, elapsed_ms,
                    "access denied"
                ),
                Outcome::ClientError => {
                    warn!(target: "access", %method, %path, status, elapsed_ms, "client error")
                }
                Outcome::ServerError => {
                    error!(target: "access", %method, %path, status, elapsed_ms, "server error")
                }
            }

            Ok(res)
        })
    }
}
