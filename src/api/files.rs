//! Authenticated access to uploaded files.

use actix_files::NamedFile;
use actix_web::{HttpRequest, HttpResponse, get, web};

use crate::auth::RequestContext;
use crate::config::Config;
use crate::error::{AppError, AppResult, ErrorResponse};
use crate::services::paths;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(serve_upload);
}

/// GET /uploads/{path}; the path must resolve inside the uploads directory.
#[utoipa::path(
    get,
    path = "/uploads/{path}",
    tag = "Files",
    params(
        ("path" = String, Path, description = "Path relative to the uploads directory")
    ),
    responses(
        (status = 200, description = "Uploaded file"),
        (status = 400, description = "Path outside the uploads directory", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "File not found", body = ErrorResponse)
    ),
    security(("session_cookie" = []))
)]
#[get("/uploads/{path:.*}")]
pub async fn serve_upload(
    req: HttpRequest,
    _ctx: RequestContext,
    config: web::Data<Config>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let relative = path.into_inner();
    let file_path = paths::resolve_within(&config.uploads_dir, &relative)?;
    if !file_path.is_file() {
        return Err(AppError::NotFound(format!("Fichier {}", relative)));
    }
    let file = NamedFile::open_async(&file_path)
        .await
        .map_err(|e| AppError::FileSystem(format!("Failed to open {}: {}", relative, e)))?;
    Ok(file.into_response(&req))
}
