//! OpenAPI documentation, served by Swagger UI under `/api/docs`.

use utoipa::OpenApi;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};

use crate::config::{CSRF_HEADER, SESSION_COOKIE};
use crate::{api, error};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Locatif Server",
        version = "0.3.0",
        description = "Back-office API for residential rental management: logements, candidatures, leases, inspection reports, inventories, rents and backups"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        // Health
        api::health::health,
        api::health::ready,
        // Auth
        api::auth::login,
        api::auth::logout,
        api::auth::me,
        // Logements
        api::logements::list_logements,
        api::logements::create_logement,
        api::logements::get_logement,
        api::logements::update_logement,
        // Candidatures
        api::candidatures::list_candidatures,
        api::candidatures::create_candidature,
        api::candidatures::get_candidature,
        api::candidatures::update_statut,
        api::candidatures::upload_document,
        // Contrats
        api::contrats::list_contrats,
        api::contrats::create_contrat,
        api::contrats::get_contrat,
        api::contrats::sign_contrat,
        api::contrats::request_verification,
        api::contrats::validate_contrat,
        api::contrats::cancel_contrat,
        api::contrats::regenerate_document,
        api::contrats::download_document,
        // Etats des lieux
        api::etats_lieux::open_for_contrat,
        api::etats_lieux::get_etat_lieux,
        api::etats_lieux::save_etat_lieux,
        api::etats_lieux::upload_photo,
        api::etats_lieux::delete_photo,
        api::etats_lieux::update_bilan,
        api::etats_lieux::send_bilan,
        api::etats_lieux::finalize,
        // Inventaire
        api::inventaire::list_categories,
        api::inventaire::create_categorie,
        api::inventaire::reorder_categories,
        api::inventaire::update_categorie,
        api::inventaire::delete_categorie,
        api::inventaire::create_sous_categorie,
        api::inventaire::reorder_sous_categories,
        api::inventaire::update_sous_categorie,
        api::inventaire::delete_sous_categorie,
        api::inventaire::list_equipements,
        api::inventaire::create_equipement,
        api::inventaire::reorder_equipements,
        api::inventaire::update_equipement,
        api::inventaire::delete_equipement,
        api::inventaire::list_inventaires,
        api::inventaire::create_inventaire,
        api::inventaire::get_inventaire,
        api::inventaire::update_inventaire,
        api::inventaire::finalize_inventaire,
        // Loyers
        api::loyers::grid,
        api::loyers::toggle,
        api::loyers::remind_tenant,
        api::loyers::remind_admins,
        // Sauvegardes
        api::sauvegardes::list_sauvegardes,
        api::sauvegardes::create_sauvegarde,
        api::sauvegardes::get_schedule,
        api::sauvegardes::update_schedule,
        api::sauvegardes::upload_and_restore,
        api::sauvegardes::download_sauvegarde,
        api::sauvegardes::restore_sauvegarde,
        api::sauvegardes::delete_sauvegarde,
        // Parametres
        api::parametres::list_parametres,
        api::parametres::update_parametre,
        api::parametres::list_cron_jobs,
        api::parametres::toggle_cron_job,
        api::parametres::list_email_templates,
        // Uploaded files
        api::files::serve_upload,
    ),
    components(
        schemas(
            error::ErrorResponse,
            api::health::HealthResponse,
            api::health::ReadyResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Auth", description = "Administrator sessions"),
        (name = "Logements", description = "Rental units"),
        (name = "Candidatures", description = "Rental applications and their documents"),
        (name = "Contrats", description = "Leases, signatures and lease documents"),
        (name = "Etats des lieux", description = "Move-in and move-out inspection reports"),
        (name = "Inventaire", description = "Equipment catalogue and inventory checklists"),
        (name = "Loyers", description = "Monthly rent tracking and reminders"),
        (name = "Sauvegardes", description = "Database and file backups"),
        (name = "Parametres", description = "Settings, scheduled jobs and email templates"),
        (name = "Files", description = "Uploaded files")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Session cookie plus the CSRF header required on state-changing requests.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(SESSION_COOKIE))),
            );
            components.add_security_scheme(
                "csrf_token",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(CSRF_HEADER))),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_route_is_documented() {
        let doc = ApiDoc::openapi();
        assert_eq!(doc.info.title, "Locatif Server");
        for path in [
            "/api/v1/health",
            "/api/v1/auth/login",
            "/api/v1/contrats/{id}/etats-lieux/{type_etat}",
            "/api/v1/etats-lieux/{id}/photos/{photo_id}",
            "/api/v1/loyers/toggle",
            "/api/v1/sauvegardes/{id}/restore",
            "/uploads/{path}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
        let operations: usize = doc
            .paths
            .paths
            .values()
            .map(|item| {
                [&item.get, &item.post, &item.put, &item.delete]
                    .iter()
                    .filter(|op| op.is_some())
                    .count()
            })
            .sum();
        assert_eq!(operations, 68);
    }

    #[test]
    fn test_security_schemes_match_the_session_layer() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("session_cookie"));
        assert!(components.security_schemes.contains_key("csrf_token"));
        assert!(components.schemas.contains_key("ErrorResponse"));
    }

    #[test]
    fn test_login_is_public_and_writes_need_csrf() {
        let doc = ApiDoc::openapi();
        let login = doc.paths.paths["/api/v1/auth/login"].post.as_ref().expect("login");
        assert!(login.security.is_none());

        let toggle = doc.paths.paths["/api/v1/loyers/toggle"].post.as_ref().expect("toggle");
        let json = serde_json::to_value(&toggle.security).expect("serialize");
        assert_eq!(json[0]["csrf_token"], serde_json::json!([]));
        assert_eq!(json[0]["session_cookie"], serde_json::json!([]));
    }
}
