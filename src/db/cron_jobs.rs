//! Cron job registry. Jobs run from the system crontab; this table only
//! records their configuration and last run.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::entity::cron_job::{self, Entity as CronJob};
use crate::error::{AppError, AppResult};

use super::DbPool;

pub const RAPPEL_LOYERS_JOB: &str = "rappel_loyers";
pub const BACKUP_JOB: &str = "backup";

/// Outcome recorded for the last run of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    Error,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

impl DbPool {
    pub async fn list_cron_jobs(&self) -> AppResult<Vec<cron_job::Model>> {
        CronJob::find()
            .order_by_asc(cron_job::Column::Nom)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list cron jobs: {}", e)))
    }

    pub async fn get_cron_job(&self, nom: &str) -> AppResult<Option<cron_job::Model>> {
        CronJob::find()
            .filter(cron_job::Column::Nom.eq(nom))
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get cron job: {}", e)))
    }

    async fn require_cron_job_by_id(&self, id: i32) -> AppResult<cron_job::Model> {
        CronJob::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get cron job: {}", e)))?
            .ok_or_else(|| AppError::NotFound(format!("Tâche planifiée {}", id)))
    }

    /// Flip `actif` and return the updated job.
    pub async fn toggle_cron_job(&self, id: i32) -> AppResult<cron_job::Model> {
        let job = self.require_cron_job_by_id(id).await?;
        let actif = !job.actif;
        let mut active: cron_job::ActiveModel = job.into();
        active.actif = Set(actif);
        active
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to toggle cron job: {}", e)))
    }

    /// Record the last run of `nom`. Unknown jobs are ignored.
    pub async fn record_cron_run(&self, nom: &str, status: RunStatus, log: &str) -> AppResult<()> {
        let Some(job) = self.get_cron_job(nom).await? else {
            tracing::warn!("Cron job {} is not registered; run not recorded", nom);
            return Ok(());
        };
        let mut active: cron_job::ActiveModel = job.into();
        active.derniere_execution = Set(Some(Utc::now()));
        active.statut_derniere_execution = Set(Some(status.as_str().to_string()));
        active.log_derniere_execution = Set(Some(log.to_string()));
        active
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to record cron run: {}", e)))?;
        Ok(())
    }

    /// Mirror a schedule onto a job row.
    pub async fn update_cron_schedule(
        &self,
        nom: &str,
        frequence: &str,
        cron_expression: &str,
        actif: bool,
    ) -> AppResult<cron_job::Model> {
        let job = self
            .get_cron_job(nom)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tâche planifiée {}", nom)))?;
        let mut active: cron_job::ActiveModel = job.into();
        active.frequence = Set(frequence.to_string());
        active.cron_expression = Set(cron_expression.to_string());
        active.actif = Set(actif);
        active
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to update cron job: {}", e)))
    }
}
