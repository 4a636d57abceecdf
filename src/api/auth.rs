//! Administrator login, logout and session introspection.
//!
//! The session token lives in an HttpOnly cookie; only its SHA-256 hash is
//! stored. State-changing requests must echo the session's CSRF token in
//! `X-CSRF-Token`.

use actix_web::cookie::{Cookie, SameSite};
use actix_web::{HttpRequest, HttpResponse, get, post, web};
use tracing::{info, warn};

use crate::auth::{RequestContext, verify_password};
use crate::config::{Config, SESSION_COOKIE};
use crate::db::{DbPool, sessions};
use crate::error::{AppError, AppResult, ErrorResponse};
use crate::models::{AdminView, ApiResponse, LoginRequest, SessionInfo};

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(login).service(logout).service(me);
}

fn session_cookie(value: String, config: &Config) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, value);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_secure(config.environment.is_production());
    cookie
}

/// POST /api/v1/auth/login
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Auth",
    responses(
        (status = 200, description = "Session opened, cookie set"),
        (status = 400, description = "Missing credentials", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    )
)]
#[post("/auth/login")]
pub async fn login(
    req: HttpRequest,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let LoginRequest { username, password } = body.into_inner();
    let admin = pool
        .find_administrateur_by_username(username.trim())
        .await?
        .filter(|a| a.actif);

    let valid = match &admin {
        Some(admin) => {
            let hash = admin.password_hash.clone();
            web::block(move || verify_password(&password, &hash))
                .await
                .map_err(|e| AppError::Database(format!("Password check failed: {}", e)))?
        }
        None => false,
    };
    let admin = match admin {
        Some(admin) if valid => admin,
        _ => {
            warn!(username = %username.trim(), "Failed login attempt");
            return Err(AppError::Unauthorized("Identifiants invalides".into()));
        }
    };

    let token = sessions::generate_token();
    let csrf_token = sessions::generate_csrf_token();
    let ip = crate::auth::client_ip(&req);
    let session = sessions::insert(
        pool.connection(),
        admin.id,
        &sessions::hash_token(&token),
        &csrf_token,
        ip.as_deref(),
        config.session_ttl_secs,
    )
    .await?;
    pool.touch_last_login(admin.id).await?;
    info!(admin = %admin.username, "Administrator logged in");

    let info = SessionInfo {
        admin: AdminView::from(admin),
        csrf_token,
        expires_at: session.expires_at,
    };
    Ok(HttpResponse::Ok()
        .cookie(session_cookie(token, &config))
        .json(ApiResponse::new(info, vec![])))
}

/// POST /api/v1/auth/logout
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    tag = "Auth",
    responses(
        (status = 200, description = "Session closed"),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Missing or invalid CSRF token", body = ErrorResponse)
    ),
    security(("session_cookie" = [], "csrf_token" = []))
)]
#[post("/auth/logout")]
pub async fn logout(
    req: HttpRequest,
    ctx: RequestContext,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
) -> AppResult<HttpResponse> {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        sessions::revoke_by_hash(pool.connection(), &sessions::hash_token(cookie.value())).await?;
    }
    info!(admin = %ctx.admin.username, "Administrator logged out");

    let mut clear = session_cookie(String::new(), &config);
    clear.make_removal();
    Ok(HttpResponse::Ok()
        .cookie(clear)
        .json(ApiResponse::new(serde_json::json!({ "logged_out": true }), vec![])))
}

/// Current administrator and the CSRF token for this session.
///
/// GET /api/v1/auth/me
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Current administrator and CSRF token"),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("session_cookie" = []))
)]
#[get("/auth/me")]
pub async fn me(mut ctx: RequestContext) -> AppResult<HttpResponse> {
    let info = SessionInfo {
        admin: AdminView::from(ctx.admin.clone()),
        csrf_token: ctx.session.csrf_token.clone(),
        expires_at: ctx.session.expires_at,
    };
    Ok(ctx.ok(info))
}
