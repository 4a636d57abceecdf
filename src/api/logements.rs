//! Logement endpoints.

use actix_web::{HttpResponse, get, post, put, web};

use crate::auth::RequestContext;
use crate::db::DbPool;
use crate::error::{AppResult, ErrorResponse};
use crate::models::{LogementFilters, LogementInput, NoticeLevel};

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_logements)
        .service(create_logement)
        .service(get_logement)
        .service(update_logement);
}

/// GET /api/v1/logements?statut=disponible
#[utoipa::path(
    get,
    path = "/api/v1/logements",
    tag = "Logements",
    params(
        ("statut" = Option<String>, Query, description = "Filter by status")
    ),
    responses(
        (status = 200, description = "Logements matching the filters"),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("session_cookie" = []))
)]
#[get("/logements")]
pub async fn list_logements(
    mut ctx: RequestContext,
    pool: web::Data<DbPool>,
    query: web::Query<LogementFilters>,
) -> AppResult<HttpResponse> {
    let logements = pool.list_logements(&query).await?;
    Ok(ctx.ok(logements))
}

#[utoipa::path(
    post,
    path = "/api/v1/logements",
    tag = "Logements",
    responses(
        (status = 201, description = "Logement created"),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Missing or invalid CSRF token", body = ErrorResponse)
    ),
    security(("session_cookie" = [], "csrf_token" = []))
)]
#[post("/logements")]
pub async fn create_logement(
    mut ctx: RequestContext,
    pool: web::Data<DbPool>,
    body: web::Json<LogementInput>,
) -> AppResult<HttpResponse> {
    let logement = pool.insert_logement(&body).await?;
    ctx.notice(NoticeLevel::Success, format!("Logement {} créé", logement.reference));
    Ok(ctx.created(logement))
}

#[utoipa::path(
    get,
    path = "/api/v1/logements/{id}",
    tag = "Logements",
    params(
        ("id" = i32, Path, description = "Logement ID")
    ),
    responses(
        (status = 200, description = "Logement"),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Logement not found", body = ErrorResponse)
    ),
    security(("session_cookie" = []))
)]
#[get("/logements/{id}")]
pub async fn get_logement(
    mut ctx: RequestContext,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let logement = pool.require_logement(path.into_inner()).await?;
    Ok(ctx.ok(logement))
}

#[utoipa::path(
    put,
    path = "/api/v1/logements/{id}",
    tag = "Logements",
    params(
        ("id" = i32, Path, description = "Logement ID")
    ),
    responses(
        (status = 200, description = "Logement updated"),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Missing or invalid CSRF token", body = ErrorResponse),
        (status = 404, description = "Logement not found", body = ErrorResponse)
    ),
    security(("session_cookie" = [], "csrf_token" = []))
)]
#[put("/logements/{id}")]
pub async fn update_logement(
    mut ctx: RequestContext,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    body: web::Json<LogementInput>,
) -> AppResult<HttpResponse> {
    let logement = pool.update_logement(path.into_inner(), &body).await?;
    ctx.notice(NoticeLevel::Success, "Logement mis à jour");
    Ok(ctx.ok(logement))
}
