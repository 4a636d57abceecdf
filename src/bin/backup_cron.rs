//! Scheduled backup, run from the system crontab.
//!
//! Usage:
//!   backup-cron            # full backup when the schedule is active
//!   backup-cron --force    # back up even when the schedule is inactive
//!
//! The crontab line itself is derived from the `backup` cron job row.

use tracing::{error, info};

use locatif_lib::config::Config;
use locatif_lib::db::DbPool;
use locatif_lib::db::cron_jobs::{BACKUP_JOB, RunStatus};
use locatif_lib::entity::sauvegarde::SauvegardeType;
use locatif_lib::error::AppResult;
use locatif_lib::services::{BackupService, backup};

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

    let (status, log) = match run(&config, &pool, force).await {
        Ok(Some(log)) => (RunStatus::Success, log),
        Ok(None) => {
            info!("Automatic backup disabled, nothing to do");
            return;
        }
        Err(e) => {
            error!("Scheduled backup failed: {}", e);
            (RunStatus::Error, e.to_string())
        }
    };

    if let Err(e) = pool.record_cron_run(BACKUP_JOB, status, &log).await {
        error!("Failed to record cron run: {}", e);
    }
    if status == RunStatus::Error {
        std::process::exit(1);
    }
}

/// Returns the run log, or `None` when the schedule is inactive.
async fn run(config: &Config, pool: &DbPool, force: bool) -> AppResult<Option<String>> {
    let schedule = backup::load_schedule(pool).await?;
    if !schedule.actif && !force {
        return Ok(None);
    }

    let service = BackupService::new(config, pool.clone());
    let sauvegarde = service.create(SauvegardeType::Full, None, None).await?;
    let removed = service.apply_retention(schedule.retention_jours).await?;

    let log = format!(
        "Sauvegarde {} créée ({} octets); {} ancienne(s) supprimée(s)",
        sauvegarde.fichier, sauvegarde.taille, removed
    );
    info!("{}", log);
    Ok(Some(log))
}
