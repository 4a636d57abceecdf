//! Backup endpoints: create, list, download, delete, restore and the
//! automatic schedule.

use actix_files::NamedFile;
use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use serde::Deserialize;

use crate::auth::RequestContext;
use crate::config::Config;
use crate::db::DbPool;
use crate::error::{AppError, AppResult, ErrorResponse};
use crate::models::{BackupSchedule, CreateSauvegardeRequest, NoticeLevel};
use crate::services::{BackupService, backup, uploads};

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_sauvegardes)
        .service(create_sauvegarde)
        .service(get_schedule)
        .service(update_schedule)
        .service(upload_and_restore)
        .service(download_sauvegarde)
        .service(restore_sauvegarde)
        .service(delete_sauvegarde);
}

#[derive(Debug, Default, Deserialize)]
pub struct DownloadParams {
    /// `files` selects the archive part of a full backup.
    pub part: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/v1/sauvegardes",
    tag = "Sauvegardes",
    responses(
        (status = 200, description = "Backups, newest first"),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("session_cookie" = []))
)]
#[get("/sauvegardes")]
pub async fn list_sauvegardes(
    mut ctx: RequestContext,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let sauvegardes = pool.list_sauvegardes().await?;
    Ok(ctx.ok(sauvegardes))
}

/// POST /api/v1/sauvegardes {"type": "database" | "files" | "full"}
#[utoipa::path(
    post,
    path = "/api/v1/sauvegardes",
    tag = "Sauvegardes",
    responses(
        (status = 201, description = "Backup created"),
        (status = 400, description = "Unknown backup type", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Missing or invalid CSRF token", body = ErrorResponse),
        (status = 500, description = "Backup failed", body = ErrorResponse)
    ),
    security(("session_cookie" = [], "csrf_token" = []))
)]
#[post("/sauvegardes")]
pub async fn create_sauvegarde(
    mut ctx: RequestContext,
    service: web::Data<BackupService>,
    body: web::Json<CreateSauvegardeRequest>,
) -> AppResult<HttpResponse> {
    let admin_id = ctx.admin.id;
    let ip = ctx.ip.clone();
    let sauvegarde = service
        .create(body.type_sauvegarde, Some(admin_id), ip.as_deref())
        .await?;
    ctx.notice(NoticeLevel::Success, "Sauvegarde créée");
    Ok(ctx.created(sauvegarde))
}

#[utoipa::path(
    get,
    path = "/api/v1/sauvegardes/schedule",
    tag = "Sauvegardes",
    responses(
        (status = 200, description = "Backup schedule"),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("session_cookie" = []))
)]
#[get("/sauvegardes/schedule")]
pub async fn get_schedule(
    mut ctx: RequestContext,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let schedule = backup::load_schedule(&pool).await?;
    Ok(ctx.ok(schedule))
}

#[utoipa::path(
    put,
    path = "/api/v1/sauvegardes/schedule",
    tag = "Sauvegardes",
    responses(
        (status = 200, description = "Backup schedule updated"),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Missing or invalid CSRF token", body = ErrorResponse)
    ),
    security(("session_cookie" = [], "csrf_token" = []))
)]
#[put("/sauvegardes/schedule")]
pub async fn update_schedule(
    mut ctx: RequestContext,
    pool: web::Data<DbPool>,
    body: web::Json<BackupSchedule>,
) -> AppResult<HttpResponse> {
    backup::save_schedule(&pool, &body).await?;
    ctx.notice(NoticeLevel::Success, "Planification enregistrée");
    Ok(ctx.ok(body.into_inner()))
}

/// Multipart with one `.sql.gz` or `.tar.gz` file; stored, recorded, then
/// restored.
#[utoipa::path(
    post,
    path = "/api/v1/sauvegardes/upload",
    tag = "Sauvegardes",
    responses(
        (status = 201, description = "Backup uploaded and restored"),
        (status = 400, description = "Invalid archive", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Missing or invalid CSRF token", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse)
    ),
    security(("session_cookie" = [], "csrf_token" = []))
)]
#[post("/sauvegardes/upload")]
pub async fn upload_and_restore(
    mut ctx: RequestContext,
    config: web::Data<Config>,
    service: web::Data<BackupService>,
    mut payload: Multipart,
) -> AppResult<HttpResponse> {
    let mut form = uploads::read_multipart(&mut payload, config.max_upload_size).await?;
    let file = form.require_file()?;
    let admin_id = ctx.admin.id;
    let ip = ctx.ip.clone();

    let stored = service
        .store_uploaded(&file.filename, &file.bytes, Some(admin_id))
        .await?;
    let restored = service.restore(stored.id, ip.as_deref()).await?;
    ctx.notice(NoticeLevel::Success, "Sauvegarde importée et restaurée");
    Ok(ctx.created(restored))
}

#[utoipa::path(
    get,
    path = "/api/v1/sauvegardes/{id}/download",
    tag = "Sauvegardes",
    params(
        ("id" = i32, Path, description = "Backup ID"),
        ("part" = Option<String>, Query, description = "files selects the archive of a full backup")
    ),
    responses(
        (status = 200, description = "Backup file"),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Backup not found", body = ErrorResponse)
    ),
    security(("session_cookie" = []))
)]
#[get("/sauvegardes/{id}/download")]
pub async fn download_sauvegarde(
    req: HttpRequest,
    _ctx: RequestContext,
    pool: web::Data<DbPool>,
    service: web::Data<BackupService>,
    path: web::Path<i32>,
    query: web::Query<DownloadParams>,
) -> AppResult<HttpResponse> {
    let sauvegarde = pool.require_sauvegarde(path.into_inner()).await?;
    let fichier = match query.part.as_deref() {
        Some("files") => sauvegarde
            .fichier_fichiers
            .ok_or_else(|| AppError::NotFound("Archive des fichiers".into()))?,
        _ => sauvegarde.fichier,
    };
    let file_path = service.resolve(&fichier)?;
    let file = NamedFile::open_async(&file_path)
        .await
        .map_err(|_| AppError::NotFound(format!("Fichier de sauvegarde {}", fichier)))?
        .set_content_disposition(actix_web::http::header::ContentDisposition::attachment(
            fichier.clone(),
        ));
    Ok(file.into_response(&req))
}

/// The stored file names are resolved inside the backup directory before
/// anything runs; an escaping path is rejected with 400.
#[utoipa::path(
    post,
    path = "/api/v1/sauvegardes/{id}/restore",
    tag = "Sauvegardes",
    params(
        ("id" = i32, Path, description = "Backup ID")
    ),
    responses(
        (status = 200, description = "Backup restored"),
        (status = 400, description = "Stored path escapes the backup directory", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Missing or invalid CSRF token", body = ErrorResponse),
        (status = 404, description = "Backup not found", body = ErrorResponse)
    ),
    security(("session_cookie" = [], "csrf_token" = []))
)]
#[post("/sauvegardes/{id}/restore")]
pub async fn restore_sauvegarde(
    mut ctx: RequestContext,
    service: web::Data<BackupService>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let ip = ctx.ip.clone();
    let sauvegarde = service.restore(path.into_inner(), ip.as_deref()).await?;
    ctx.notice(NoticeLevel::Success, "Sauvegarde restaurée");
    Ok(ctx.ok(sauvegarde))
}

#[utoipa::path(
    delete,
    path = "/api/v1/sauvegardes/{id}",
    tag = "Sauvegardes",
    params(
        ("id" = i32, Path, description = "Backup ID")
    ),
    responses(
        (status = 200, description = "Backup deleted"),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Missing or invalid CSRF token", body = ErrorResponse),
        (status = 404, description = "Backup not found", body = ErrorResponse)
    ),
    security(("session_cookie" = [], "csrf_token" = []))
)]
#[delete("/sauvegardes/{id}")]
pub async fn delete_sauvegarde(
    mut ctx: RequestContext,
    service: web::Data<BackupService>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let ip = ctx.ip.clone();
    service.delete(path.into_inner(), ip.as_deref()).await?;
    ctx.notice(NoticeLevel::Success, "Sauvegarde supprimée");
    Ok(ctx.ok(serde_json::json!({ "deleted": true })))
}
