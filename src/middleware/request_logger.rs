//! One log line per API request, written when the response is ready.
//!
//! Only the presence of the session cookie is recorded, never its value.
//! Health checks are logged at debug level.

use std::future::{Ready, ready};
use std::time::{Duration, Instant};

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::http::StatusCode;
use futures_util::future::LocalBoxFuture;
use tracing::{debug, error, info, warn};

use crate::config::SESSION_COOKIE;

const HEALTH_PATHS: [&str; 2] = ["/api/v1/health", "/api/v1/ready"];

/// Fields captured before the request is handed to the next service.
struct RequestLine {
    method: String,
    path: String,
    client: String,
    user_agent: String,
    authenticated: bool,
    started: Instant,
}

impl RequestLine {
    fn capture(req: &ServiceRequest) -> Self {
        Self {
            method: req.method().to_string(),
            path: req.path().to_string(),
            client: req
                .connection_info()
                .realip_remote_addr()
                .unwrap_or("-")
                .to_string(),
            user_agent: req
                .headers()
                .get(actix_web::http::header::USER_AGENT)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("-")
                .to_string(),
            authenticated: req.cookie(SESSION_COOKIE).is_some(),
            started: Instant::now(),
        }
    }

    fn finish(self, status: StatusCode) {
        let elapsed: Duration = self.started.elapsed();
        let duration_ms = elapsed.as_millis() as u64;
        let status = status.as_u16();
        let Self {
            method,
            path,
            client,
            user_agent,
            authenticated,
            ..
        } = self;

        if HEALTH_PATHS.contains(&path.as_str()) && status < 400 {
            debug!(target: "api", %method, %path, status, duration_ms, "health check");
        } else if status >= 500 {
            error!(target: "api", %method, %path, status, duration_ms, %client, authenticated, "request failed");
        } else if status >= 400 {
            warn!(target: "api", %method, %path, status, duration_ms, %client, authenticated, %user_agent, "request rejected");
        } else {
            info!(target: "api", %method, %path, status, duration_ms, %client, authenticated, "request");
        }
    }
}

/// Middleware factory, wrap it around the whole `App`.
pub struct RequestLogger;

impl<S, B> Transform<S, ServiceRequest> for RequestLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestLoggerService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestLoggerService { service }))
    }
}

pub struct RequestLoggerService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequestLoggerService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let line = RequestLine::capture(&req);
        let fut = self.service.call(req);

        Box::pin(async move {
            match fut.await {
                Ok(res) => {
                    line.finish(res.status());
                    Ok(res)
                }
                Err(e) => {
                    line.finish(e.as_response_error().status_code());
                    Err(e)
                }
            }
        })
    }
}
