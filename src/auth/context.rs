//! Per-request administrator context.
//!
//! Resolves the session cookie to an active administrator, enforces the CSRF
//! header on state-changing methods and collects the notices returned with
//! the JSON response.

use actix_web::dev::Payload;
use actix_web::http::Method;
use actix_web::{FromRequest, HttpRequest, HttpResponse, web};
use futures_util::future::LocalBoxFuture;
use serde::Serialize;

use super::csrf_matches;
use crate::config::{CSRF_HEADER, SESSION_COOKIE};
use crate::db::{DbPool, sessions};
use crate::entity::{admin_session, administrateur};
use crate::error::{AppError, AppResult};
use crate::models::{ApiResponse, Notice, NoticeLevel};

/// Authenticated request context.
///
/// ```ignore
/// async fn handler(mut ctx: RequestContext) -> AppResult<HttpResponse> {
///     ctx.notice(NoticeLevel::Success, "Enregistré");
///     Ok(ctx.ok(data))
/// }
/// ```
#[derive(Debug)]
pub struct RequestContext {
    pub admin: administrateur::Model,
    pub session: admin_session::Model,
    pub ip: Option<String>,
    notices: Vec<Notice>,
}

impl RequestContext {
    pub fn notice(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.notices.push(Notice {
            level,
            message: message.into(),
        });
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn ip(&self) -> Option<&str> {
        self.ip.as_deref()
    }

    /// 200 with the success envelope and the queued notices.
    pub fn ok<T: Serialize>(&mut self, data: T) -> HttpResponse {
        HttpResponse::Ok().json(ApiResponse::new(data, std::mem::take(&mut self.notices)))
    }

    /// 201 with the success envelope and the queued notices.
    pub fn created<T: Serialize>(&mut self, data: T) -> HttpResponse {
        HttpResponse::Created().json(ApiResponse::new(data, std::mem::take(&mut self.notices)))
    }
}

fn requires_csrf(method: &Method) -> bool {
    !matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

pub(crate) fn client_ip(req: &HttpRequest) -> Option<String> {
    req.connection_info()
        .realip_remote_addr()
        .map(str::to_string)
}

async fn resolve(
    pool: web::Data<DbPool>,
    token: Option<String>,
    csrf_header: Option<String>,
    check_csrf: bool,
) -> AppResult<(administrateur::Model, admin_session::Model)> {
    let token = token.ok_or_else(|| AppError::Unauthorized("Connexion requise".into()))?;
    let session = sessions::find_valid_by_hash(pool.connection(), &sessions::hash_token(&token))
        .await?
        .ok_or_else(|| AppError::Unauthorized("Session expirée, reconnectez-vous".into()))?;

    let admin = pool
        .get_administrateur(session.admin_id)
        .await?
        .filter(|a| a.actif)
        .ok_or_else(|| AppError::Unauthorized("Compte administrateur inactif".into()))?;

    if check_csrf {
        let provided = csrf_header.unwrap_or_default();
        if !csrf_matches(&session.csrf_token, &provided) {
            tracing::warn!(admin = %admin.username, "CSRF token mismatch");
            return Err(AppError::Forbidden("Jeton CSRF invalide".into()));
        }
    }

    Ok((admin, session))
}

impl FromRequest for RequestContext {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let pool = req.app_data::<web::Data<DbPool>>().cloned();
        let token = req.cookie(SESSION_COOKIE).map(|c| c.value().to_string());
        let csrf_header = req
            .headers()
            .get(CSRF_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let check_csrf = requires_csrf(req.method());
        let ip = client_ip(req);

        Box::pin(async move {
            let pool = pool
                .ok_or_else(|| AppError::Database("Database pool is not configured".into()))?;
            let (admin, session) = resolve(pool, token, csrf_header, check_csrf).await?;
            Ok(RequestContext {
                admin,
                session,
                ip,
                notices: Vec::new(),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_methods_skip_csrf() {
        assert!(!requires_csrf(&Method::GET));
        assert!(!requires_csrf(&Method::HEAD));
        assert!(requires_csrf(&Method::POST));
        assert!(requires_csrf(&Method::PUT));
        assert!(requires_csrf(&Method::DELETE));
    }
}
