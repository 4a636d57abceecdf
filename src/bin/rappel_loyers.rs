//! Monthly rent reminder, run from the system crontab.
//!
//! Usage:
//!   rappel-loyers            # send the summary for the current month
//!   rappel-loyers --force    # send even when the job is disabled
//!
//! Also closes expired signing windows and purges dead sessions.

use chrono::Utc;
use tracing::{error, info, warn};

use locatif_lib::config::Config;
use locatif_lib::db::DbPool;
use locatif_lib::db::cron_jobs::{RAPPEL_LOYERS_JOB, RunStatus};
use locatif_lib::db::sessions;
use locatif_lib::error::AppResult;
use locatif_lib::services::{EmailService, LoyerService, mailer_from_config};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    locatif_lib::init_tracing();

    let force = std::env::args().any(|arg| arg == "--force");

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Error loading config: {}", e);
            std::process::exit(1);
        }
    };

    let pool = match DbPool::new(&config).await {
        Ok(p) => p,
        Err(e) => {
            error!("Error connecting to database: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = housekeeping(&pool).await {
        warn!("Housekeeping failed: {}", e);
    }

    // The broadcast records its own run; only earlier failures land here.
    if let Err(e) = run(&config, &pool, force).await {
        error!("Rent reminder failed: {}", e);
        std::process::exit(1);
    }
}

async fn housekeeping(pool: &DbPool) -> AppResult<()> {
    let expired = pool.expire_contrats(Utc::now()).await?;
    if expired > 0 {
        info!(expired, "Unsigned leases moved to expire");
    }
    let purged = sessions::purge_expired(pool.connection()).await?;
    if purged > 0 {
        info!(purged, "Expired sessions purged");
    }
    Ok(())
}

async fn run(config: &Config, pool: &DbPool, force: bool) -> AppResult<()> {
    let job_actif = pool
        .get_cron_job(RAPPEL_LOYERS_JOB)
        .await?
        .map(|job| job.actif)
        .unwrap_or(true);
    let param_actif = pool.get_parametre_bool("rappel_loyers_actif", true).await?;
    if !force && !(job_actif && param_actif) {
        info!("Rent reminder disabled, nothing to do");
        return Ok(());
    }

    let mailer = match mailer_from_config(config.smtp.as_ref()) {
        Ok(mailer) => mailer,
        Err(e) => {
            pool.record_cron_run(RAPPEL_LOYERS_JOB, RunStatus::Error, &e.to_string())
                .await?;
            return Err(e);
        }
    };
    let email = EmailService::new(pool.clone(), mailer);
    let service = LoyerService::new(config, pool.clone(), email);

    let outcome = service.broadcast(Utc::now().date_naive()).await?;
    for notice in &outcome.notices {
        info!(level = ?notice.level, "{}", notice.message);
    }
    let report = outcome.value;
    info!(
        periode = %report.periode,
        payes = report.nb_payes,
        attente = report.nb_attente,
        impayes = report.nb_impayes,
        "Rent summary sent to {}/{} administrator(s)",
        report.envoyes,
        report.destinataires
    );
    Ok(())
}
