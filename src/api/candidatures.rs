//! Candidature endpoints: list, create, detail, status changes and document
//! uploads.

use actix_multipart::Multipart;
use actix_web::{HttpResponse, get, post, put, web};
use tracing::warn;

use crate::auth::RequestContext;
use crate::config::Config;
use crate::db::DbPool;
use crate::error::{AppError, AppResult, ErrorResponse};
use crate::models::candidature::is_document_type;
use crate::models::{
    CandidatureFilters, CreateCandidatureRequest, DOCUMENT_EXTENSIONS, NewDocument, NoticeLevel,
    UpdateCandidatureStatutRequest,
};
use crate::services::{paths, uploads};

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_candidatures)
        .service(create_candidature)
        .service(get_candidature)
        .service(update_statut)
        .service(upload_document);
}

/// GET /api/v1/candidatures?statut=en_cours&logement_id=3&q=martin
#[utoipa::path(
    get,
    path = "/api/v1/candidatures",
    tag = "Candidatures",
    params(
        ("statut" = Option<String>, Query, description = "Filter by status"),
        ("logement_id" = Option<i32>, Query, description = "Filter by logement"),
        ("q" = Option<String>, Query, description = "Search on name, email and reference")
    ),
    responses(
        (status = 200, description = "Candidatures matching the filters"),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("session_cookie" = []))
)]
#[get("/candidatures")]
pub async fn list_candidatures(
    mut ctx: RequestContext,
    pool: web::Data<DbPool>,
    query: web::Query<CandidatureFilters>,
) -> AppResult<HttpResponse> {
    let candidatures = pool.list_candidatures(&query).await?;
    Ok(ctx.ok(candidatures))
}

#[utoipa::path(
    post,
    path = "/api/v1/candidatures",
    tag = "Candidatures",
    responses(
        (status = 201, description = "Candidature created"),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Missing or invalid CSRF token", body = ErrorResponse)
    ),
    security(("session_cookie" = [], "csrf_token" = []))
)]
#[post("/candidatures")]
pub async fn create_candidature(
    mut ctx: RequestContext,
    pool: web::Data<DbPool>,
    body: web::Json<CreateCandidatureRequest>,
) -> AppResult<HttpResponse> {
    let candidature = pool.insert_candidature(&body, ctx.ip()).await?;
    ctx.notice(
        NoticeLevel::Success,
        format!("Candidature {} enregistrée", candidature.reference_unique),
    );
    Ok(ctx.created(candidature))
}

/// Candidature with its logement, documents grouped by type and logs.
#[utoipa::path(
    get,
    path = "/api/v1/candidatures/{id}",
    tag = "Candidatures",
    params(
        ("id" = i32, Path, description = "Candidature ID")
    ),
    responses(
        (status = 200, description = "Candidature with documents and logs"),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Candidature not found", body = ErrorResponse)
    ),
    security(("session_cookie" = []))
)]
#[get("/candidatures/{id}")]
pub async fn get_candidature(
    mut ctx: RequestContext,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let detail = pool.get_candidature_detail(path.into_inner()).await?;
    Ok(ctx.ok(detail))
}

#[utoipa::path(
    put,
    path = "/api/v1/candidatures/{id}/statut",
    tag = "Candidatures",
    params(
        ("id" = i32, Path, description = "Candidature ID")
    ),
    responses(
        (status = 200, description = "Status updated"),
        (status = 400, description = "Invalid status", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Missing or invalid CSRF token", body = ErrorResponse),
        (status = 404, description = "Candidature not found", body = ErrorResponse)
    ),
    security(("session_cookie" = [], "csrf_token" = []))
)]
#[put("/candidatures/{id}/statut")]
pub async fn update_statut(
    mut ctx: RequestContext,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    body: web::Json<UpdateCandidatureStatutRequest>,
) -> AppResult<HttpResponse> {
    let UpdateCandidatureStatutRequest { statut, commentaire } = body.into_inner();
    let candidature = pool
        .update_candidature_statut(path.into_inner(), statut, commentaire, ctx.ip())
        .await?;
    ctx.notice(NoticeLevel::Success, "Statut mis à jour");
    Ok(ctx.ok(candidature))
}

/// Multipart: `type_document` field and one `fichier` file.
///
/// POST /api/v1/candidatures/{id}/documents
#[utoipa::path(
    post,
    path = "/api/v1/candidatures/{id}/documents",
    tag = "Candidatures",
    params(
        ("id" = i32, Path, description = "Candidature ID")
    ),
    responses(
        (status = 201, description = "Document stored"),
        (status = 400, description = "Invalid upload", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Missing or invalid CSRF token", body = ErrorResponse),
        (status = 404, description = "Candidature not found", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse)
    ),
    security(("session_cookie" = [], "csrf_token" = []))
)]
#[post("/candidatures/{id}/documents")]
pub async fn upload_document(
    mut ctx: RequestContext,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    path: web::Path<i32>,
    mut payload: Multipart,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let mut form = uploads::read_multipart(&mut payload, config.max_upload_size).await?;

    let type_document = form
        .field("type_document")
        .filter(|t| is_document_type(t))
        .map(str::to_string)
        .ok_or_else(|| AppError::InvalidInput("Type de document invalide".into()))?;
    let file = form.require_file()?;
    let extension = file
        .extension()
        .filter(|ext| DOCUMENT_EXTENSIONS.contains(&ext.as_str()))
        .ok_or_else(|| {
            AppError::InvalidInput(format!(
                "Format non accepté (formats: {})",
                DOCUMENT_EXTENSIONS.join(", ")
            ))
        })?;
    pool.require_candidature(id).await?;

    let prefix = format!("cand_{}_{}", id, type_document);
    let chemin =
        uploads::store_file(&config.uploads_dir, "candidatures", &prefix, &extension, &file.bytes)
            .await?;
    let document = NewDocument {
        type_document,
        nom_fichier: chemin.rsplit('/').next().unwrap_or(&chemin).to_string(),
        nom_original: uploads::sanitize_filename(&file.filename),
        chemin_fichier: chemin.clone(),
        taille: file.size() as i64,
    };

    match pool.insert_candidature_document(id, document, ctx.ip()).await {
        Ok(document) => {
            ctx.notice(NoticeLevel::Success, "Document ajouté");
            Ok(ctx.created(document))
        }
        Err(e) => {
            if let Ok(stored) = paths::resolve_within(&config.uploads_dir, &chemin)
                && let Err(remove_err) = uploads::remove_file(&stored).await
            {
                warn!("Failed to remove orphan upload {}: {}", chemin, remove_err);
            }
            Err(e)
        }
    }
}
