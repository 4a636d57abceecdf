//! Lease endpoints: creation, signatures, review transitions and the lease
//! document.

use actix_files::NamedFile;
use actix_web::{HttpRequest, HttpResponse, get, post, web};
use chrono::Utc;

use crate::auth::RequestContext;
use crate::config::Config;
use crate::db::DbPool;
use crate::error::{AppError, AppResult, ErrorResponse};
use crate::models::{
    CancelContratRequest, ContratDetail, ContratFilters, CreateContratRequest, EtatLieuxSummary,
    LocataireView, LogementSummary, NoticeLevel, SignContratRequest, ValidateContratRequest,
};
use crate::services::{ContratService, Outcome, paths};

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_contrats)
        .service(create_contrat)
        .service(get_contrat)
        .service(sign_contrat)
        .service(request_verification)
        .service(validate_contrat)
        .service(cancel_contrat)
        .service(regenerate_document)
        .service(download_document);
}

/// Move the workflow notices onto the response.
pub(crate) fn forward_notices<T>(ctx: &mut RequestContext, outcome: Outcome<T>) -> T {
    for notice in outcome.notices {
        ctx.notice(notice.level, notice.message);
    }
    outcome.value
}

/// Public URL of a stored upload, only when it stays inside the uploads
/// directory.
pub(crate) fn upload_url(config: &Config, stored: Option<&str>) -> Option<String> {
    stored
        .filter(|p| paths::is_within(&config.uploads_dir, p))
        .map(|p| format!("/uploads/{}", p))
}

async fn contrat_detail(pool: &DbPool, config: &Config, id: i32) -> AppResult<ContratDetail> {
    let contrat = pool.require_contrat(id).await?;
    let logement = pool.require_logement(contrat.logement_id).await?;
    let locataires = pool
        .list_locataires(id)
        .await?
        .into_iter()
        .map(|l| LocataireView {
            signature_url: upload_url(config, l.signature_data.as_deref()),
            id: l.id,
            ordre: l.ordre,
            nom: l.nom,
            prenom: l.prenom,
            date_naissance: l.date_naissance,
            email: l.email,
            telephone: l.telephone,
            signature_timestamp: l.signature_timestamp,
            mention_lu_approuve: l.mention_lu_approuve,
        })
        .collect();

    let mut etats_lieux = Vec::new();
    for etat in pool.list_etats_lieux_for_contrat(id).await? {
        let complet = pool.etat_lieux_signatures_completes(etat.id).await?;
        etats_lieux.push(EtatLieuxSummary::new(&etat, complet));
    }

    Ok(ContratDetail {
        fichier_bail_url: upload_url(config, contrat.fichier_bail.as_deref()),
        logement: LogementSummary::from(&logement),
        contrat,
        locataires,
        etats_lieux,
    })
}

/// Expired signing windows are closed before listing.
///
/// GET /api/v1/contrats?statut=signe&logement_id=2
#[utoipa::path(
    get,
    path = "/api/v1/contrats",
    tag = "Contrats",
    params(
        ("statut" = Option<String>, Query, description = "Filter by status"),
        ("logement_id" = Option<i32>, Query, description = "Filter by logement")
    ),
    responses(
        (status = 200, description = "Contrats matching the filters"),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("session_cookie" = []))
)]
#[get("/contrats")]
pub async fn list_contrats(
    mut ctx: RequestContext,
    pool: web::Data<DbPool>,
    query: web::Query<ContratFilters>,
) -> AppResult<HttpResponse> {
    let expired = pool.expire_contrats(Utc::now()).await?;
    if expired > 0 {
        ctx.notice(
            NoticeLevel::Info,
            format!("{} contrat(s) non signé(s) passé(s) au statut expiré", expired),
        );
    }
    let contrats = pool.list_contrats(&query).await?;
    Ok(ctx.ok(contrats))
}

#[utoipa::path(
    post,
    path = "/api/v1/contrats",
    tag = "Contrats",
    responses(
        (status = 201, description = "Contrat created"),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Missing or invalid CSRF token", body = ErrorResponse),
        (status = 409, description = "Logement already under contract", body = ErrorResponse)
    ),
    security(("session_cookie" = [], "csrf_token" = []))
)]
#[post("/contrats")]
pub async fn create_contrat(
    mut ctx: RequestContext,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    body: web::Json<CreateContratRequest>,
) -> AppResult<HttpResponse> {
    let validite = pool.get_parametre_i64("contrat_validite_heures", 48).await?;
    let (contrat, _) = pool.insert_contrat(&body, validite.max(1)).await?;
    pool.insert_log(
        crate::db::contrats::LOG_ENTITY,
        Some(contrat.id),
        "contrat_cree",
        Some(format!("Référence {}", contrat.reference_unique)),
        ctx.ip(),
    )
    .await?;
    ctx.notice(
        NoticeLevel::Success,
        format!("Contrat {} créé", contrat.reference_unique),
    );
    let detail = contrat_detail(&pool, &config, contrat.id).await?;
    Ok(ctx.created(detail))
}

#[utoipa::path(
    get,
    path = "/api/v1/contrats/{id}",
    tag = "Contrats",
    params(
        ("id" = i32, Path, description = "Contrat ID")
    ),
    responses(
        (status = 200, description = "Contrat with tenants"),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Contrat not found", body = ErrorResponse)
    ),
    security(("session_cookie" = []))
)]
#[get("/contrats/{id}")]
pub async fn get_contrat(
    mut ctx: RequestContext,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let detail = contrat_detail(&pool, &config, path.into_inner()).await?;
    Ok(ctx.ok(detail))
}

/// Record one tenant's signature (`data:image/png;base64,...`).
#[utoipa::path(
    post,
    path = "/api/v1/contrats/{id}/signatures",
    tag = "Contrats",
    params(
        ("id" = i32, Path, description = "Contrat ID")
    ),
    responses(
        (status = 200, description = "Signature recorded"),
        (status = 400, description = "Invalid signature", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Missing or invalid CSRF token", body = ErrorResponse),
        (status = 404, description = "Contrat not found", body = ErrorResponse),
        (status = 409, description = "Contrat not awaiting signatures", body = ErrorResponse)
    ),
    security(("session_cookie" = [], "csrf_token" = []))
)]
#[post("/contrats/{id}/signatures")]
pub async fn sign_contrat(
    mut ctx: RequestContext,
    service: web::Data<ContratService>,
    path: web::Path<i32>,
    body: web::Json<SignContratRequest>,
) -> AppResult<HttpResponse> {
    let contrat = service.sign(path.into_inner(), &body, ctx.ip()).await?;
    ctx.notice(NoticeLevel::Success, "Signature enregistrée");
    Ok(ctx.ok(contrat))
}

#[utoipa::path(
    post,
    path = "/api/v1/contrats/{id}/verification",
    tag = "Contrats",
    params(
        ("id" = i32, Path, description = "Contrat ID")
    ),
    responses(
        (status = 200, description = "Verification requested"),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Missing or invalid CSRF token", body = ErrorResponse),
        (status = 404, description = "Contrat not found", body = ErrorResponse),
        (status = 409, description = "Invalid transition", body = ErrorResponse)
    ),
    security(("session_cookie" = [], "csrf_token" = []))
)]
#[post("/contrats/{id}/verification")]
pub async fn request_verification(
    mut ctx: RequestContext,
    service: web::Data<ContratService>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let contrat = service
        .request_verification(path.into_inner(), ctx.ip())
        .await?;
    ctx.notice(NoticeLevel::Success, "Contrat mis en vérification");
    Ok(ctx.ok(contrat))
}

#[utoipa::path(
    post,
    path = "/api/v1/contrats/{id}/valider",
    tag = "Contrats",
    params(
        ("id" = i32, Path, description = "Contrat ID")
    ),
    responses(
        (status = 200, description = "Contrat validated"),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Missing or invalid CSRF token", body = ErrorResponse),
        (status = 404, description = "Contrat not found", body = ErrorResponse),
        (status = 409, description = "Invalid transition", body = ErrorResponse)
    ),
    security(("session_cookie" = [], "csrf_token" = []))
)]
#[post("/contrats/{id}/valider")]
pub async fn validate_contrat(
    mut ctx: RequestContext,
    service: web::Data<ContratService>,
    path: web::Path<i32>,
    body: Option<web::Json<ValidateContratRequest>>,
) -> AppResult<HttpResponse> {
    let notes = body.and_then(|b| b.into_inner().notes);
    let admin = ctx.admin.clone();
    let ip = ctx.ip.clone();
    let outcome = service
        .validate(path.into_inner(), &admin, notes, ip.as_deref())
        .await?;
    let contrat = forward_notices(&mut ctx, outcome);
    Ok(ctx.ok(contrat))
}

/// `motif_annulation` is mandatory.
#[utoipa::path(
    post,
    path = "/api/v1/contrats/{id}/annuler",
    tag = "Contrats",
    params(
        ("id" = i32, Path, description = "Contrat ID")
    ),
    responses(
        (status = 200, description = "Contrat cancelled"),
        (status = 400, description = "Missing motif_annulation", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Missing or invalid CSRF token", body = ErrorResponse),
        (status = 404, description = "Contrat not found", body = ErrorResponse),
        (status = 409, description = "Invalid transition", body = ErrorResponse)
    ),
    security(("session_cookie" = [], "csrf_token" = []))
)]
#[post("/contrats/{id}/annuler")]
pub async fn cancel_contrat(
    mut ctx: RequestContext,
    service: web::Data<ContratService>,
    path: web::Path<i32>,
    body: web::Json<CancelContratRequest>,
) -> AppResult<HttpResponse> {
    let admin = ctx.admin.clone();
    let ip = ctx.ip.clone();
    let outcome = service
        .cancel(path.into_inner(), &admin, &body.motif_annulation, ip.as_deref())
        .await?;
    let contrat = forward_notices(&mut ctx, outcome);
    Ok(ctx.ok(contrat))
}

#[utoipa::path(
    post,
    path = "/api/v1/contrats/{id}/document",
    tag = "Contrats",
    params(
        ("id" = i32, Path, description = "Contrat ID")
    ),
    responses(
        (status = 200, description = "Lease document regenerated"),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Missing or invalid CSRF token", body = ErrorResponse),
        (status = 404, description = "Contrat not found", body = ErrorResponse)
    ),
    security(("session_cookie" = [], "csrf_token" = []))
)]
#[post("/contrats/{id}/document")]
pub async fn regenerate_document(
    mut ctx: RequestContext,
    service: web::Data<ContratService>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let fichier = service.regenerate_document(path.into_inner()).await?;
    ctx.notice(NoticeLevel::Success, "Document du bail régénéré");
    Ok(ctx.ok(serde_json::json!({ "fichier_bail": fichier })))
}

#[utoipa::path(
    get,
    path = "/api/v1/contrats/{id}/document",
    tag = "Contrats",
    params(
        ("id" = i32, Path, description = "Contrat ID")
    ),
    responses(
        (status = 200, description = "Lease document"),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Contrat or document not found", body = ErrorResponse)
    ),
    security(("session_cookie" = []))
)]
#[get("/contrats/{id}/document")]
pub async fn download_document(
    req: HttpRequest,
    _ctx: RequestContext,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let contrat = pool.require_contrat(path.into_inner()).await?;
    let fichier = contrat
        .fichier_bail
        .ok_or_else(|| AppError::NotFound(format!("Document du bail {}", contrat.reference_unique)))?;
    let file_path = paths::resolve_within(&config.uploads_dir, &fichier)?;
    let file = NamedFile::open_async(&file_path)
        .await
        .map_err(|_| AppError::NotFound(format!("Document du bail {}", contrat.reference_unique)))?;
    Ok(file.into_response(&req))
}
