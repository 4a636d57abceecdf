//! État des lieux endpoints: editor load/save, photos, bilan and
//! finalisation.

use std::collections::BTreeMap;

use actix_multipart::Multipart;
use actix_web::{HttpResponse, delete, get, post, put, web};

use super::contrats::{forward_notices, upload_url};
use crate::auth::RequestContext;
use crate::config::Config;
use crate::db::DbPool;
use crate::entity::etat_lieux::{self, EtatLieuxType};
use crate::entity::etat_lieux_photo;
use crate::error::{AppError, AppResult, ErrorResponse};
use crate::models::{
    Bilan, BilanUpdate, EntreeReference, EtatLieuxDetail, EtatLieuxLocataireView, EtatLieuxUpdate,
    NoticeLevel,
};
use crate::services::{EtatLieuxService, uploads};

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(open_for_contrat)
        .service(get_etat_lieux)
        .service(save_etat_lieux)
        .service(upload_photo)
        .service(delete_photo)
        .service(update_bilan)
        .service(send_bilan)
        .service(finalize);
}

async fn etat_lieux_detail(
    pool: &DbPool,
    config: &Config,
    etat: etat_lieux::Model,
) -> AppResult<EtatLieuxDetail> {
    let locataires = pool
        .list_etat_lieux_locataires(etat.id)
        .await?
        .into_iter()
        .map(|r| EtatLieuxLocataireView {
            signature_url: upload_url(config, r.signature_data.as_deref()),
            id: r.id,
            locataire_id: r.locataire_id,
            ordre: r.ordre,
            nom: r.nom,
            prenom: r.prenom,
            email: r.email,
            signature_timestamp: r.signature_timestamp,
            certifie_exact: r.certifie_exact,
        })
        .collect();

    let mut photos: BTreeMap<String, Vec<etat_lieux_photo::Model>> = BTreeMap::new();
    for photo in pool.list_etat_lieux_photos(etat.id).await? {
        photos.entry(photo.categorie.clone()).or_default().push(photo);
    }

    let (reference_entree, bilan) = if etat.type_etat == EtatLieuxType::Sortie {
        let entree = pool
            .find_etat_lieux(etat.contrat_id, EtatLieuxType::Entree)
            .await?;
        (
            entree.as_ref().map(EntreeReference::from),
            Some(Bilan::from_model(&etat)),
        )
    } else {
        (None, None)
    };

    Ok(EtatLieuxDetail {
        etat_lieux: etat,
        locataires,
        photos,
        reference_entree,
        bilan,
    })
}

/// Load the report of a lease, creating it on first access.
///
/// GET /api/v1/contrats/{id}/etats-lieux/{type}
#[utoipa::path(
    get,
    path = "/api/v1/contrats/{id}/etats-lieux/{type_etat}",
    tag = "Etats des lieux",
    params(
        ("id" = i32, Path, description = "Contrat ID"),
        ("type_etat" = String, Path, description = "entree or sortie")
    ),
    responses(
        (status = 200, description = "Report of the lease, created on first access"),
        (status = 400, description = "Unknown report type", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Contrat not found", body = ErrorResponse)
    ),
    security(("session_cookie" = []))
)]
#[get("/contrats/{id}/etats-lieux/{type_etat}")]
pub async fn open_for_contrat(
    mut ctx: RequestContext,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    path: web::Path<(i32, String)>,
) -> AppResult<HttpResponse> {
    let (contrat_id, type_raw) = path.into_inner();
    let type_etat = EtatLieuxType::parse(&type_raw)
        .ok_or_else(|| AppError::InvalidInput(format!("Type d'état des lieux invalide: {}", type_raw)))?;
    let (etat, created) = pool.load_or_create_etat_lieux(contrat_id, type_etat).await?;
    if created {
        ctx.notice(
            NoticeLevel::Info,
            format!("État des lieux {} créé", type_etat.libelle()),
        );
    }
    let detail = etat_lieux_detail(&pool, &config, etat).await?;
    Ok(ctx.ok(detail))
}

#[utoipa::path(
    get,
    path = "/api/v1/etats-lieux/{id}",
    tag = "Etats des lieux",
    params(
        ("id" = i32, Path, description = "Etat des lieux ID")
    ),
    responses(
        (status = 200, description = "Report with rooms, photos and signatures"),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Report not found", body = ErrorResponse)
    ),
    security(("session_cookie" = []))
)]
#[get("/etats-lieux/{id}")]
pub async fn get_etat_lieux(
    mut ctx: RequestContext,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let etat = pool.require_etat_lieux(path.into_inner()).await?;
    let detail = etat_lieux_detail(&pool, &config, etat).await?;
    Ok(ctx.ok(detail))
}

/// Save the editor. Signatures not present in the body are cleared.
#[utoipa::path(
    put,
    path = "/api/v1/etats-lieux/{id}",
    tag = "Etats des lieux",
    params(
        ("id" = i32, Path, description = "Etat des lieux ID")
    ),
    responses(
        (status = 200, description = "Report saved"),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Missing or invalid CSRF token", body = ErrorResponse),
        (status = 404, description = "Report not found", body = ErrorResponse),
        (status = 409, description = "Report already finalized", body = ErrorResponse)
    ),
    security(("session_cookie" = [], "csrf_token" = []))
)]
#[put("/etats-lieux/{id}")]
pub async fn save_etat_lieux(
    mut ctx: RequestContext,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    service: web::Data<EtatLieuxService>,
    path: web::Path<i32>,
    body: web::Json<EtatLieuxUpdate>,
) -> AppResult<HttpResponse> {
    let etat = service.save(path.into_inner(), &body, ctx.ip()).await?;
    ctx.notice(NoticeLevel::Success, "État des lieux enregistré");
    let detail = etat_lieux_detail(&pool, &config, etat).await?;
    Ok(ctx.ok(detail))
}

/// Multipart: `categorie`, optional `description`, one `photo` file.
///
/// POST /api/v1/etats-lieux/{id}/photos
#[utoipa::path(
    post,
    path = "/api/v1/etats-lieux/{id}/photos",
    tag = "Etats des lieux",
    params(
        ("id" = i32, Path, description = "Etat des lieux ID")
    ),
    responses(
        (status = 201, description = "Photo stored"),
        (status = 400, description = "Invalid upload", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Missing or invalid CSRF token", body = ErrorResponse),
        (status = 404, description = "Report not found", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse)
    ),
    security(("session_cookie" = [], "csrf_token" = []))
)]
#[post("/etats-lieux/{id}/photos")]
pub async fn upload_photo(
    mut ctx: RequestContext,
    config: web::Data<Config>,
    service: web::Data<EtatLieuxService>,
    path: web::Path<i32>,
    mut payload: Multipart,
) -> AppResult<HttpResponse> {
    let mut form = uploads::read_multipart(&mut payload, config.max_upload_size).await?;
    let file = form.require_file()?;
    let photo = service
        .add_photo(
            path.into_inner(),
            form.field("categorie"),
            form.field("description"),
            file,
        )
        .await?;
    Ok(ctx.created(photo))
}

#[utoipa::path(
    delete,
    path = "/api/v1/etats-lieux/{id}/photos/{photo_id}",
    tag = "Etats des lieux",
    params(
        ("id" = i32, Path, description = "Etat des lieux ID"),
        ("photo_id" = i32, Path, description = "Photo identifier")
    ),
    responses(
        (status = 200, description = "Photo deleted"),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Missing or invalid CSRF token", body = ErrorResponse),
        (status = 404, description = "Photo not found", body = ErrorResponse)
    ),
    security(("session_cookie" = [], "csrf_token" = []))
)]
#[delete("/etats-lieux/{id}/photos/{photo_id}")]
pub async fn delete_photo(
    mut ctx: RequestContext,
    service: web::Data<EtatLieuxService>,
    path: web::Path<(i32, i32)>,
) -> AppResult<HttpResponse> {
    let (id, photo_id) = path.into_inner();
    service.delete_photo(id, photo_id).await?;
    Ok(ctx.ok(serde_json::json!({ "deleted": true })))
}

/// Replace the bilan rows; 409 once the bilan has been sent.
#[utoipa::path(
    put,
    path = "/api/v1/etats-lieux/{id}/bilan",
    tag = "Etats des lieux",
    params(
        ("id" = i32, Path, description = "Etat des lieux ID")
    ),
    responses(
        (status = 200, description = "Bilan updated"),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Missing or invalid CSRF token", body = ErrorResponse),
        (status = 404, description = "Report not found", body = ErrorResponse),
        (status = 409, description = "Bilan already sent", body = ErrorResponse)
    ),
    security(("session_cookie" = [], "csrf_token" = []))
)]
#[put("/etats-lieux/{id}/bilan")]
pub async fn update_bilan(
    mut ctx: RequestContext,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    body: web::Json<BilanUpdate>,
) -> AppResult<HttpResponse> {
    let (rows, commentaire) = body.into_inner().into_rows()?;
    let etat = pool
        .update_bilan(path.into_inner(), &rows, commentaire)
        .await?;
    ctx.notice(NoticeLevel::Success, "Bilan enregistré");
    Ok(ctx.ok(Bilan::from_model(&etat)))
}

#[utoipa::path(
    post,
    path = "/api/v1/etats-lieux/{id}/bilan/envoyer",
    tag = "Etats des lieux",
    params(
        ("id" = i32, Path, description = "Etat des lieux ID")
    ),
    responses(
        (status = 200, description = "Bilan sent to the tenants"),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Missing or invalid CSRF token", body = ErrorResponse),
        (status = 404, description = "Report not found", body = ErrorResponse),
        (status = 409, description = "Bilan already sent", body = ErrorResponse)
    ),
    security(("session_cookie" = [], "csrf_token" = []))
)]
#[post("/etats-lieux/{id}/bilan/envoyer")]
pub async fn send_bilan(
    mut ctx: RequestContext,
    service: web::Data<EtatLieuxService>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let outcome = service.send_bilan(path.into_inner()).await?;
    let etat = forward_notices(&mut ctx, outcome);
    Ok(ctx.ok(Bilan::from_model(&etat)))
}

#[utoipa::path(
    post,
    path = "/api/v1/etats-lieux/{id}/finaliser",
    tag = "Etats des lieux",
    params(
        ("id" = i32, Path, description = "Etat des lieux ID")
    ),
    responses(
        (status = 200, description = "Report finalized"),
        (status = 400, description = "Signatures missing", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Missing or invalid CSRF token", body = ErrorResponse),
        (status = 404, description = "Report not found", body = ErrorResponse),
        (status = 409, description = "Report already finalized", body = ErrorResponse)
    ),
    security(("session_cookie" = [], "csrf_token" = []))
)]
#[post("/etats-lieux/{id}/finaliser")]
pub async fn finalize(
    mut ctx: RequestContext,
    service: web::Data<EtatLieuxService>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let outcome = service.finalize(path.into_inner()).await?;
    let etat = forward_notices(&mut ctx, outcome);
    Ok(ctx.ok(etat))
}
