//! Configuration pages: parameters, scheduled jobs and email templates.

use actix_web::{HttpResponse, get, post, put, web};

use crate::auth::RequestContext;
use crate::db::DbPool;
use crate::error::{AppResult, ErrorResponse};
use crate::models::{NoticeLevel, UpdateParametreRequest};
use crate::services::backup;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_parametres)
        .service(update_parametre)
        .service(list_cron_jobs)
        .service(toggle_cron_job)
        .service(list_email_templates);
}

/// Parameters grouped by `groupe`.
#[utoipa::path(
    get,
    path = "/api/v1/parametres",
    tag = "Parametres",
    responses(
        (status = 200, description = "Parameters grouped by groupe"),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("session_cookie" = []))
)]
#[get("/parametres")]
pub async fn list_parametres(
    mut ctx: RequestContext,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let groups = pool.list_parametres_grouped().await?;
    Ok(ctx.ok(groups))
}

/// The value is validated against the parameter's declared type. Backup
/// settings are mirrored onto the `backup` job.
#[utoipa::path(
    put,
    path = "/api/v1/parametres/{cle}",
    tag = "Parametres",
    params(
        ("cle" = String, Path, description = "Parameter key")
    ),
    responses(
        (status = 200, description = "Parameter updated"),
        (status = 400, description = "Value does not match the declared type", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Missing or invalid CSRF token", body = ErrorResponse),
        (status = 404, description = "Unknown parameter", body = ErrorResponse)
    ),
    security(("session_cookie" = [], "csrf_token" = []))
)]
#[put("/parametres/{cle}")]
pub async fn update_parametre(
    mut ctx: RequestContext,
    pool: web::Data<DbPool>,
    path: web::Path<String>,
    body: web::Json<UpdateParametreRequest>,
) -> AppResult<HttpResponse> {
    let cle = path.into_inner();
    let parametre = pool.update_parametre(&cle, body.valeur.as_deref()).await?;
    if cle.starts_with("backup_") {
        let schedule = backup::load_schedule(&pool).await?;
        backup::save_schedule(&pool, &schedule).await?;
    }
    ctx.notice(NoticeLevel::Success, format!("Paramètre {} enregistré", cle));
    Ok(ctx.ok(parametre))
}

#[utoipa::path(
    get,
    path = "/api/v1/cron-jobs",
    tag = "Parametres",
    responses(
        (status = 200, description = "Scheduled jobs"),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("session_cookie" = []))
)]
#[get("/cron-jobs")]
pub async fn list_cron_jobs(
    mut ctx: RequestContext,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let jobs = pool.list_cron_jobs().await?;
    Ok(ctx.ok(jobs))
}

#[utoipa::path(
    post,
    path = "/api/v1/cron-jobs/{id}/toggle",
    tag = "Parametres",
    params(
        ("id" = i32, Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Job toggled"),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Missing or invalid CSRF token", body = ErrorResponse),
        (status = 404, description = "Job not found", body = ErrorResponse)
    ),
    security(("session_cookie" = [], "csrf_token" = []))
)]
#[post("/cron-jobs/{id}/toggle")]
pub async fn toggle_cron_job(
    mut ctx: RequestContext,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let job = pool.toggle_cron_job(path.into_inner()).await?;
    let etat = if job.actif { "activée" } else { "désactivée" };
    ctx.notice(NoticeLevel::Success, format!("Tâche {} {}", job.nom, etat));
    Ok(ctx.ok(job))
}

#[utoipa::path(
    get,
    path = "/api/v1/email-templates",
    tag = "Parametres",
    responses(
        (status = 200, description = "Email templates"),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("session_cookie" = []))
)]
#[get("/email-templates")]
pub async fn list_email_templates(
    mut ctx: RequestContext,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let templates = pool.list_email_templates().await?;
    Ok(ctx.ok(templates))
}
