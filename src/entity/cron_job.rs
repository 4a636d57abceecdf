//! Externally scheduled jobs and their last run.

use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "cron_jobs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub nom: String,
    pub commande: String,
    pub description: Option<String>,
    pub frequence: String,
    pub cron_expression: String,
    pub actif: bool,
    pub derniere_execution: Option<DateTimeUtc>,
    pub statut_derniere_execution: Option<String>,
    pub log_derniere_execution: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
