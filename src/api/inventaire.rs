//! Inventory endpoints: category catalog, per-logement equipment and the
//! entree/sortie checklists.

use actix_web::{HttpResponse, delete, get, post, put, web};
use tracing::info;

use crate::auth::RequestContext;
use crate::db::DbPool;
use crate::error::{AppResult, ErrorResponse};
use crate::models::{
    CategorieInput, CreateInventaireRequest, CreateSousCategorieRequest, DefaultEquipement,
    DeleteCategorieParams, EquipementInput, InventaireDetail, NoticeLevel, ReorderRequest,
    UpdateInventaireRequest, UpdateSousCategorieRequest,
};

/// Parameter holding the equipment list used to seed an empty inventory.
const DEFAULT_EQUIPEMENTS_PARAM: &str = "inventaire_equipements_defaut";

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_categories)
        .service(create_categorie)
        .service(reorder_categories)
        .service(update_categorie)
        .service(delete_categorie)
        .service(create_sous_categorie)
        .service(reorder_sous_categories)
        .service(update_sous_categorie)
        .service(delete_sous_categorie)
        .service(list_equipements)
        .service(create_equipement)
        .service(reorder_equipements)
        .service(update_equipement)
        .service(delete_equipement)
        .service(list_inventaires)
        .service(create_inventaire)
        .service(get_inventaire)
        .service(update_inventaire)
        .service(finalize_inventaire);
}

// ============================================================================
// Categories
// ============================================================================

#[utoipa::path(
    get,
    path = "/api/v1/inventaire/categories",
    tag = "Inventaire",
    responses(
        (status = 200, description = "Categories with their subcategories"),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("session_cookie" = []))
)]
#[get("/inventaire/categories")]
pub async fn list_categories(
    mut ctx: RequestContext,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let categories = pool.list_categories_with_details().await?;
    Ok(ctx.ok(categories))
}

#[utoipa::path(
    post,
    path = "/api/v1/inventaire/categories",
    tag = "Inventaire",
    responses(
        (status = 201, description = "Category created"),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Missing or invalid CSRF token", body = ErrorResponse)
    ),
    security(("session_cookie" = [], "csrf_token" = []))
)]
#[post("/inventaire/categories")]
pub async fn create_categorie(
    mut ctx: RequestContext,
    pool: web::Data<DbPool>,
    body: web::Json<CategorieInput>,
) -> AppResult<HttpResponse> {
    let categorie = pool.insert_categorie(&body).await?;
    ctx.notice(NoticeLevel::Success, "Catégorie créée");
    Ok(ctx.created(categorie))
}

#[utoipa::path(
    post,
    path = "/api/v1/inventaire/categories/reorder",
    tag = "Inventaire",
    responses(
        (status = 200, description = "Categories reordered"),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Missing or invalid CSRF token", body = ErrorResponse)
    ),
    security(("session_cookie" = [], "csrf_token" = []))
)]
#[post("/inventaire/categories/reorder")]
pub async fn reorder_categories(
    mut ctx: RequestContext,
    pool: web::Data<DbPool>,
    body: web::Json<ReorderRequest>,
) -> AppResult<HttpResponse> {
    pool.reorder_categories(&body.ids).await?;
    Ok(ctx.ok(serde_json::json!({ "reordered": body.ids.len() })))
}

#[utoipa::path(
    put,
    path = "/api/v1/inventaire/categories/{id}",
    tag = "Inventaire",
    params(
        ("id" = i32, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Category updated"),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Missing or invalid CSRF token", body = ErrorResponse),
        (status = 404, description = "Category not found", body = ErrorResponse)
    ),
    security(("session_cookie" = [], "csrf_token" = []))
)]
#[put("/inventaire/categories/{id}")]
pub async fn update_categorie(
    mut ctx: RequestContext,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    body: web::Json<CategorieInput>,
) -> AppResult<HttpResponse> {
    let categorie = pool.update_categorie(path.into_inner(), &body).await?;
    ctx.notice(NoticeLevel::Success, "Catégorie mise à jour");
    Ok(ctx.ok(categorie))
}

/// A non-empty category is only deleted with `?confirmed=1`; otherwise the
/// response carries `needs_confirmation` and the counts.
///
/// DELETE /api/v1/inventaire/categories/{id}?confirmed=1
#[utoipa::path(
    delete,
    path = "/api/v1/inventaire/categories/{id}",
    tag = "Inventaire",
    params(
        ("id" = i32, Path, description = "Category ID"),
        ("confirmed" = Option<String>, Query, description = "1 or true to delete a category that still holds equipment")
    ),
    responses(
        (status = 200, description = "Category deleted, or confirmation required"),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Missing or invalid CSRF token", body = ErrorResponse),
        (status = 404, description = "Category not found", body = ErrorResponse)
    ),
    security(("session_cookie" = [], "csrf_token" = []))
)]
#[delete("/inventaire/categories/{id}")]
pub async fn delete_categorie(
    mut ctx: RequestContext,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    query: web::Query<DeleteCategorieParams>,
) -> AppResult<HttpResponse> {
    let outcome = pool
        .delete_categorie(path.into_inner(), query.is_confirmed())
        .await?;
    if outcome.needs_confirmation {
        ctx.notice(
            NoticeLevel::Warning,
            format!(
                "Cette catégorie contient {} sous-catégorie(s) et {} équipement(s)",
                outcome.nb_sous_categories, outcome.nb_equipements
            ),
        );
    } else {
        ctx.notice(NoticeLevel::Success, "Catégorie supprimée");
    }
    Ok(ctx.ok(outcome))
}

// ============================================================================
// Subcategories
// ============================================================================

#[utoipa::path(
    post,
    path = "/api/v1/inventaire/sous-categories",
    tag = "Inventaire",
    responses(
        (status = 201, description = "Subcategory created"),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Missing or invalid CSRF token", body = ErrorResponse)
    ),
    security(("session_cookie" = [], "csrf_token" = []))
)]
#[post("/inventaire/sous-categories")]
pub async fn create_sous_categorie(
    mut ctx: RequestContext,
    pool: web::Data<DbPool>,
    body: web::Json<CreateSousCategorieRequest>,
) -> AppResult<HttpResponse> {
    let sous_categorie = pool.insert_sous_categorie(&body).await?;
    Ok(ctx.created(sous_categorie))
}

#[utoipa::path(
    post,
    path = "/api/v1/inventaire/categories/{id}/sous-categories/reorder",
    tag = "Inventaire",
    params(
        ("id" = i32, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Subcategories reordered"),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Missing or invalid CSRF token", body = ErrorResponse)
    ),
    security(("session_cookie" = [], "csrf_token" = []))
)]
#[post("/inventaire/categories/{id}/sous-categories/reorder")]
pub async fn reorder_sous_categories(
    mut ctx: RequestContext,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    body: web::Json<ReorderRequest>,
) -> AppResult<HttpResponse> {
    pool.reorder_sous_categories(path.into_inner(), &body.ids)
        .await?;
    Ok(ctx.ok(serde_json::json!({ "reordered": body.ids.len() })))
}

#[utoipa::path(
    put,
    path = "/api/v1/inventaire/sous-categories/{id}",
    tag = "Inventaire",
    params(
        ("id" = i32, Path, description = "Subcategory ID")
    ),
    responses(
        (status = 200, description = "Subcategory updated"),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Missing or invalid CSRF token", body = ErrorResponse),
        (status = 404, description = "Subcategory not found", body = ErrorResponse)
    ),
    security(("session_cookie" = [], "csrf_token" = []))
)]
#[put("/inventaire/sous-categories/{id}")]
pub async fn update_sous_categorie(
    mut ctx: RequestContext,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    body: web::Json<UpdateSousCategorieRequest>,
) -> AppResult<HttpResponse> {
    let sous_categorie = pool
        .update_sous_categorie(path.into_inner(), &body)
        .await?;
    Ok(ctx.ok(sous_categorie))
}

/// Equipment of the subcategory stays attached to its category.
#[utoipa::path(
    delete,
    path = "/api/v1/inventaire/sous-categories/{id}",
    tag = "Inventaire",
    params(
        ("id" = i32, Path, description = "Subcategory ID")
    ),
    responses(
        (status = 200, description = "Subcategory deleted"),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Missing or invalid CSRF token", body = ErrorResponse),
        (status = 404, description = "Subcategory not found", body = ErrorResponse)
    ),
    security(("session_cookie" = [], "csrf_token" = []))
)]
#[delete("/inventaire/sous-categories/{id}")]
pub async fn delete_sous_categorie(
    mut ctx: RequestContext,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    pool.delete_sous_categorie(path.into_inner()).await?;
    Ok(ctx.ok(serde_json::json!({ "deleted": true })))
}

// ============================================================================
// Equipment
// ============================================================================

/// The first view of a logement that never had equipment seeds the default
/// list.
#[utoipa::path(
    get,
    path = "/api/v1/logements/{id}/equipements",
    tag = "Inventaire",
    params(
        ("id" = i32, Path, description = "Logement ID")
    ),
    responses(
        (status = 200, description = "Equipment of the logement"),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Logement not found", body = ErrorResponse)
    ),
    security(("session_cookie" = []))
)]
#[get("/logements/{id}/equipements")]
pub async fn list_equipements(
    mut ctx: RequestContext,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let logement_id = path.into_inner();
    pool.require_logement(logement_id).await?;

    if pool.count_equipements_including_deleted(logement_id).await? == 0
        && let Some(defaults) = pool
            .get_parametre_json::<Vec<DefaultEquipement>>(DEFAULT_EQUIPEMENTS_PARAM)
            .await?
    {
        let inserted = pool
            .populate_default_equipements(logement_id, &defaults)
            .await?;
        if inserted > 0 {
            info!(logement_id, inserted, "Default equipment list applied");
            ctx.notice(
                NoticeLevel::Info,
                format!("{} équipement(s) par défaut ajouté(s)", inserted),
            );
        }
    }

    let equipements = pool.list_equipements(logement_id).await?;
    Ok(ctx.ok(equipements))
}

#[utoipa::path(
    post,
    path = "/api/v1/logements/{id}/equipements",
    tag = "Inventaire",
    params(
        ("id" = i32, Path, description = "Logement ID")
    ),
    responses(
        (status = 201, description = "Equipment created"),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Missing or invalid CSRF token", body = ErrorResponse),
        (status = 404, description = "Logement not found", body = ErrorResponse)
    ),
    security(("session_cookie" = [], "csrf_token" = []))
)]
#[post("/logements/{id}/equipements")]
pub async fn create_equipement(
    mut ctx: RequestContext,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    body: web::Json<EquipementInput>,
) -> AppResult<HttpResponse> {
    let equipement = pool.insert_equipement(path.into_inner(), &body).await?;
    Ok(ctx.created(equipement))
}

#[utoipa::path(
    post,
    path = "/api/v1/logements/{id}/equipements/reorder",
    tag = "Inventaire",
    params(
        ("id" = i32, Path, description = "Logement ID")
    ),
    responses(
        (status = 200, description = "Equipment reordered"),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Missing or invalid CSRF token", body = ErrorResponse)
    ),
    security(("session_cookie" = [], "csrf_token" = []))
)]
#[post("/logements/{id}/equipements/reorder")]
pub async fn reorder_equipements(
    mut ctx: RequestContext,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    body: web::Json<ReorderRequest>,
) -> AppResult<HttpResponse> {
    pool.reorder_equipements(path.into_inner(), &body.ids).await?;
    Ok(ctx.ok(serde_json::json!({ "reordered": body.ids.len() })))
}

#[utoipa::path(
    put,
    path = "/api/v1/equipements/{id}",
    tag = "Inventaire",
    params(
        ("id" = i32, Path, description = "Equipment ID")
    ),
    responses(
        (status = 200, description = "Equipment updated"),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Missing or invalid CSRF token", body = ErrorResponse),
        (status = 404, description = "Equipment not found", body = ErrorResponse)
    ),
    security(("session_cookie" = [], "csrf_token" = []))
)]
#[put("/equipements/{id}")]
pub async fn update_equipement(
    mut ctx: RequestContext,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    body: web::Json<EquipementInput>,
) -> AppResult<HttpResponse> {
    let equipement = pool.update_equipement(path.into_inner(), &body).await?;
    Ok(ctx.ok(equipement))
}

/// Soft delete: the row keeps its history through `deleted_at`.
#[utoipa::path(
    delete,
    path = "/api/v1/equipements/{id}",
    tag = "Inventaire",
    params(
        ("id" = i32, Path, description = "Equipment ID")
    ),
    responses(
        (status = 200, description = "Equipment deleted"),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Missing or invalid CSRF token", body = ErrorResponse),
        (status = 404, description = "Equipment not found", body = ErrorResponse)
    ),
    security(("session_cookie" = [], "csrf_token" = []))
)]
#[delete("/equipements/{id}")]
pub async fn delete_equipement(
    mut ctx: RequestContext,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    pool.soft_delete_equipement(path.into_inner()).await?;
    Ok(ctx.ok(serde_json::json!({ "deleted": true })))
}

// ============================================================================
// Checklists
// ============================================================================

#[utoipa::path(
    get,
    path = "/api/v1/logements/{id}/inventaires",
    tag = "Inventaire",
    params(
        ("id" = i32, Path, description = "Logement ID")
    ),
    responses(
        (status = 200, description = "Checklists of the logement"),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Logement not found", body = ErrorResponse)
    ),
    security(("session_cookie" = []))
)]
#[get("/logements/{id}/inventaires")]
pub async fn list_inventaires(
    mut ctx: RequestContext,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let inventaires = pool
        .list_inventaires(path.into_inner())
        .await?
        .into_iter()
        .map(InventaireDetail::from_model)
        .collect::<AppResult<Vec<_>>>()?;
    Ok(ctx.ok(inventaires))
}

/// Snapshot the current equipment list into a new checklist.
#[utoipa::path(
    post,
    path = "/api/v1/inventaires",
    tag = "Inventaire",
    responses(
        (status = 201, description = "Checklist created from the current equipment"),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Missing or invalid CSRF token", body = ErrorResponse)
    ),
    security(("session_cookie" = [], "csrf_token" = []))
)]
#[post("/inventaires")]
pub async fn create_inventaire(
    mut ctx: RequestContext,
    pool: web::Data<DbPool>,
    body: web::Json<CreateInventaireRequest>,
) -> AppResult<HttpResponse> {
    let inventaire = pool.insert_inventaire(&body).await?;
    ctx.notice(
        NoticeLevel::Success,
        format!("Inventaire {} créé", inventaire.reference_unique),
    );
    Ok(ctx.created(InventaireDetail::from_model(inventaire)?))
}

#[utoipa::path(
    get,
    path = "/api/v1/inventaires/{id}",
    tag = "Inventaire",
    params(
        ("id" = i32, Path, description = "Checklist ID")
    ),
    responses(
        (status = 200, description = "Checklist"),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Checklist not found", body = ErrorResponse)
    ),
    security(("session_cookie" = []))
)]
#[get("/inventaires/{id}")]
pub async fn get_inventaire(
    mut ctx: RequestContext,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let inventaire = pool.require_inventaire(path.into_inner()).await?;
    Ok(ctx.ok(InventaireDetail::from_model(inventaire)?))
}

#[utoipa::path(
    put,
    path = "/api/v1/inventaires/{id}",
    tag = "Inventaire",
    params(
        ("id" = i32, Path, description = "Checklist ID")
    ),
    responses(
        (status = 200, description = "Checklist saved"),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Missing or invalid CSRF token", body = ErrorResponse),
        (status = 404, description = "Checklist not found", body = ErrorResponse),
        (status = 409, description = "Checklist already finalized", body = ErrorResponse)
    ),
    security(("session_cookie" = [], "csrf_token" = []))
)]
#[put("/inventaires/{id}")]
pub async fn update_inventaire(
    mut ctx: RequestContext,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    body: web::Json<UpdateInventaireRequest>,
) -> AppResult<HttpResponse> {
    let inventaire = pool.update_inventaire(path.into_inner(), &body).await?;
    ctx.notice(NoticeLevel::Success, "Inventaire enregistré");
    Ok(ctx.ok(InventaireDetail::from_model(inventaire)?))
}

#[utoipa::path(
    post,
    path = "/api/v1/inventaires/{id}/finaliser",
    tag = "Inventaire",
    params(
        ("id" = i32, Path, description = "Checklist ID")
    ),
    responses(
        (status = 200, description = "Checklist finalized"),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Missing or invalid CSRF token", body = ErrorResponse),
        (status = 404, description = "Checklist not found", body = ErrorResponse),
        (status = 409, description = "Checklist already finalized", body = ErrorResponse)
    ),
    security(("session_cookie" = [], "csrf_token" = []))
)]
#[post("/inventaires/{id}/finaliser")]
pub async fn finalize_inventaire(
    mut ctx: RequestContext,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let inventaire = pool.finalize_inventaire(path.into_inner()).await?;
    ctx.notice(NoticeLevel::Success, "Inventaire finalisé");
    Ok(ctx.ok(InventaireDetail::from_model(inventaire)?))
}
