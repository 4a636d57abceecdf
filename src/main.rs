//! Rental back-office server - main entry point.
//!
//! Starts the Actix-web server with configured routes and middleware.

use std::path::PathBuf;

use actix_cors::Cors;
use actix_files::{Files, NamedFile};
use actix_web::{App, HttpRequest, HttpServer, Result as ActixResult, http::header, web};
use tracing::{error, info, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use locatif_lib::api::{self, ApiDoc};
use locatif_lib::config::{CSRF_HEADER, Config};
use locatif_lib::db::DbPool;
use locatif_lib::middleware::RequestLogger;
use locatif_lib::services::mailer_from_config;
use locatif_lib::state::AppState;

/// Static directory of the built front-end, registered only when configured.
#[derive(Clone)]
struct StaticDir(PathBuf);

/// SPA fallback handler - serves index.html for client-side routing.
async fn spa_fallback(req: HttpRequest) -> ActixResult<NamedFile> {
    let dir = req
        .app_data::<web::Data<StaticDir>>()
        .ok_or_else(|| actix_web::error::ErrorNotFound("Static files not configured"))?;
    Ok(NamedFile::open(dir.0.join("index.html"))?)
}

/// Perform health check (for Docker healthcheck).
fn health_check() -> bool {
    Config::from_env().is_ok()
}

fn exit_with(message: &str, err: impl std::fmt::Display) -> ! {
    error!("{}: {}", message, err);
    std::process::exit(1);
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    if std::env::args().any(|arg| arg == "--health-check") {
        std::process::exit(if health_check() { 0 } else { 1 });
    }

    locatif_lib::init_tracing();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            error!("");
            error!("Please check your environment variables:");
            error!("  - RUST_ENV must be set to 'development' or 'production'");
            error!("  - In production, DATABASE_URL, LOC_ADMIN_EMAIL and SMTP_HOST must be set");
            error!("  - In production, values must not match development defaults");
            std::process::exit(1);
        }
    };

    info!("========================================");
    info!("  Locatif back-office");
    info!("  Environment: {}", config.environment);
    info!("========================================");

    if config.is_development() {
        warn!("Running in DEVELOPMENT mode - do not use in production!");
        if config.smtp.is_none() {
            info!("SMTP_HOST not set, outgoing email is logged only");
        }
    }

    for dir in [&config.uploads_dir, &config.backup_dir] {
        if let Err(e) = tokio::fs::create_dir_all(dir).await {
            exit_with(&format!("Failed to create directory {}", dir.display()), e);
        }
    }

    let pool = match DbPool::new(&config).await {
        Ok(pool) => pool,
        Err(e) => exit_with("Failed to initialize database", e),
    };
    info!("Database connection established");

    if let Err(e) = pool.run_migrations().await {
        exit_with("Failed to run migrations", e);
    }

    let mailer = match mailer_from_config(config.smtp.as_ref()) {
        Ok(mailer) => mailer,
        Err(e) => exit_with("Failed to configure the mail transport", e),
    };

    let bind_address = config.bind_address();
    let static_dir = config.static_dir.clone();
    let is_development = config.is_development();
    let max_upload_size = config.max_upload_size;
    let state = AppState::new(config, pool, mailer);

    info!("Upload limit: {}MB per request", max_upload_size / 1024 / 1024);
    if static_dir.is_some() {
        info!("Static file serving enabled from {:?}", static_dir);
    }
    let openapi = is_development.then(|| {
        info!("API documentation at http://{}/api/docs/", bind_address);
        ApiDoc::openapi()
    });

    let worker_count = if is_development {
        info!(
            "Starting server at http://{} (4 workers - development mode)",
            bind_address
        );
        4
    } else {
        let cpus = num_cpus::get();
        info!(
            "Starting server at http://{} ({} workers)",
            bind_address, cpus
        );
        cpus
    };

    let server = HttpServer::new(move || {
        let allowed_headers = vec![
            header::ACCEPT,
            header::CONTENT_TYPE,
            header::HeaderName::from_static("x-csrf-token"),
        ];
        let cors = if is_development {
            Cors::default()
                .allowed_origin("http://localhost:5173")
                .allowed_origin("http://127.0.0.1:5173")
                .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
                .allowed_headers(allowed_headers)
                .expose_headers(vec![CSRF_HEADER])
                .supports_credentials()
                .max_age(3600)
        } else {
            // Same-origin only
            Cors::default()
                .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
                .allowed_headers(allowed_headers)
                .max_age(3600)
        };

        let state = state.clone();
        let mut app = App::new()
            .wrap(cors)
            .wrap(RequestLogger)
            .app_data(web::PayloadConfig::new(max_upload_size))
            .configure(|cfg| state.register(cfg))
            .configure(api::configure_routes);

        if let Some(ref openapi) = openapi {
            app = app.service(
                SwaggerUi::new("/api/docs/{_:.*}").url("/api/openapi.json", openapi.clone()),
            );
        }

        if let Some(ref dir) = static_dir {
            app = app
                .app_data(web::Data::new(StaticDir(dir.clone())))
                .service(Files::new("/assets", dir.join("assets")).prefer_utf8(true))
                .service(Files::new("/favicon", dir.clone()).index_file("favicon.ico"))
                .default_service(web::route().to(spa_fallback));
        }

        app
    });

    server
        .workers(worker_count)
        .bind(&bind_address)?
        .run()
        .await
}
