//! Shared application state registered on every worker.

use std::sync::Arc;

use actix_web::web;

use crate::config::Config;
use crate::db::DbPool;
use crate::services::{
    BackupService, ContratService, EmailService, EtatLieuxService, LoyerService, Mailer,
};

/// Everything the handlers pull from `app_data`.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub pool: DbPool,
    pub email: EmailService,
    pub backups: BackupService,
    pub contrats: ContratService,
    pub etats_lieux: EtatLieuxService,
    pub loyers: LoyerService,
}

impl AppState {
    pub fn new(config: Config, pool: DbPool, mailer: Arc<dyn Mailer>) -> Self {
        let email = EmailService::new(pool.clone(), mailer);
        Self {
            backups: BackupService::new(&config, pool.clone()),
            contrats: ContratService::new(&config, pool.clone(), email.clone()),
            etats_lieux: EtatLieuxService::new(&config, pool.clone(), email.clone()),
            loyers: LoyerService::new(&config, pool.clone(), email.clone()),
            email,
            pool,
            config,
        }
    }

    /// Register each piece as its own `web::Data`.
    pub fn register(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.config.clone()))
            .app_data(web::Data::new(self.pool.clone()))
            .app_data(web::Data::new(self.email.clone()))
            .app_data(web::Data::new(self.backups.clone()))
            .app_data(web::Data::new(self.contrats.clone()))
            .app_data(web::Data::new(self.etats_lieux.clone()))
            .app_data(web::Data::new(self.loyers.clone()));
    }
}
