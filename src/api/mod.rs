//! API endpoint modules.
//!
//! Every route lives under `/api/v1` except the authenticated `/uploads`
//! file server.

use actix_web::web;

use crate::error::AppError;

pub mod auth;
pub mod candidatures;
pub mod contrats;
pub mod etats_lieux;
pub mod files;
pub mod health;
pub mod inventaire;
pub mod logements;
pub mod loyers;
pub mod openapi;
pub mod parametres;
pub mod sauvegardes;

pub use openapi::ApiDoc;

/// JSON bodies carry signature images as data URLs.
pub const JSON_LIMIT: usize = 4 * 1024 * 1024;

/// Register the `/api/v1` scope and the uploads file server.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config()).app_data(query_config()).service(
        web::scope("/api/v1")
            .configure(health::configure_routes)
            .configure(auth::configure_routes)
            .configure(logements::configure_routes)
            .configure(candidatures::configure_routes)
            .configure(contrats::configure_routes)
            .configure(etats_lieux::configure_routes)
            .configure(inventaire::configure_routes)
            .configure(loyers::configure_routes)
            .configure(sauvegardes::configure_routes)
            .configure(parametres::configure_routes),
    )
    .configure(files::configure_routes);
}

/// Malformed JSON is reported with the regular error envelope.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_LIMIT)
        .error_handler(|err, _req| AppError::InvalidInput(err.to_string()).into())
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| AppError::InvalidInput(err.to_string()).into())
}
