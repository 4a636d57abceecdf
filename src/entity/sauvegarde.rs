//! Backup archive metadata.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum SauvegardeType {
    #[sea_orm(string_value = "database")]
    Database,
    #[sea_orm(string_value = "files")]
    Files,
    #[sea_orm(string_value = "full")]
    Full,
}

impl SauvegardeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Database => "database",
            Self::Files => "files",
            Self::Full => "full",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "sauvegardes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_name = "type")]
    pub type_sauvegarde: SauvegardeType,
    pub fichier: String,
    pub fichier_fichiers: Option<String>,
    pub taille: i64,
    pub created_by: Option<i32>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
