//! Rent tracking endpoints.

use actix_web::{HttpResponse, get, post, web};
use chrono::{Datelike, Utc};

use super::contrats::forward_notices;
use crate::auth::RequestContext;
use crate::db::DbPool;
use crate::error::{AppResult, ErrorResponse};
use crate::models::{LoyerGridParams, RappelLoyerRequest, ToggleLoyerRequest, ToggleLoyerResponse};
use crate::services::LoyerService;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(grid)
        .service(toggle)
        .service(remind_tenant)
        .service(remind_admins);
}

/// GET /api/v1/loyers?annee=2026&logement_id=4
#[utoipa::path(
    get,
    path = "/api/v1/loyers",
    tag = "Loyers",
    params(
        ("annee" = Option<i32>, Query, description = "Year, defaults to the current one"),
        ("logement_id" = Option<i32>, Query, description = "Restrict to one logement")
    ),
    responses(
        (status = 200, description = "Yearly rent grid"),
        (status = 400, description = "Invalid year", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("session_cookie" = []))
)]
#[get("/loyers")]
pub async fn grid(
    mut ctx: RequestContext,
    pool: web::Data<DbPool>,
    query: web::Query<LoyerGridParams>,
) -> AppResult<HttpResponse> {
    let annee = query.annee.unwrap_or_else(|| Utc::now().year());
    let grid = pool.loyer_grid(annee, query.logement_id).await?;
    Ok(ctx.ok(grid))
}

/// Advance one month `attente -> paye -> impaye -> attente`. When the body
/// carries `expected_statut`, a concurrent change is reported as 409.
#[utoipa::path(
    post,
    path = "/api/v1/loyers/toggle",
    tag = "Loyers",
    responses(
        (status = 200, description = "Month advanced to the next status"),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Missing or invalid CSRF token", body = ErrorResponse),
        (status = 409, description = "Status changed concurrently", body = ErrorResponse)
    ),
    security(("session_cookie" = [], "csrf_token" = []))
)]
#[post("/loyers/toggle")]
pub async fn toggle(
    mut ctx: RequestContext,
    pool: web::Data<DbPool>,
    body: web::Json<ToggleLoyerRequest>,
) -> AppResult<HttpResponse> {
    let loyer = pool.toggle_loyer(&body).await?;
    Ok(ctx.ok(ToggleLoyerResponse {
        statut: loyer.statut_paiement,
        date_paiement: loyer.date_paiement,
    }))
}

#[utoipa::path(
    post,
    path = "/api/v1/loyers/rappel",
    tag = "Loyers",
    responses(
        (status = 200, description = "Reminder sent to the tenants"),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Missing or invalid CSRF token", body = ErrorResponse),
        (status = 404, description = "Logement not found", body = ErrorResponse)
    ),
    security(("session_cookie" = [], "csrf_token" = []))
)]
#[post("/loyers/rappel")]
pub async fn remind_tenant(
    mut ctx: RequestContext,
    service: web::Data<LoyerService>,
    body: web::Json<RappelLoyerRequest>,
) -> AppResult<HttpResponse> {
    let outcome = service
        .remind_tenant(body.logement_id, body.mois, body.annee)
        .await?;
    let loyer = forward_notices(&mut ctx, outcome);
    Ok(ctx.ok(loyer))
}

/// Run the monthly administrator summary now.
#[utoipa::path(
    post,
    path = "/api/v1/loyers/rappel-admin",
    tag = "Loyers",
    responses(
        (status = 200, description = "Summary sent to the administrators"),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Missing or invalid CSRF token", body = ErrorResponse)
    ),
    security(("session_cookie" = [], "csrf_token" = []))
)]
#[post("/loyers/rappel-admin")]
pub async fn remind_admins(
    mut ctx: RequestContext,
    service: web::Data<LoyerService>,
) -> AppResult<HttpResponse> {
    let outcome = service.broadcast(Utc::now().date_naive()).await?;
    let report = forward_notices(&mut ctx, outcome);
    Ok(ctx.ok(report))
}
