//! Monthly rent payment status, one row per logement and month.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum StatutPaiement {
    #[sea_orm(string_value = "attente")]
    Attente,
    #[sea_orm(string_value = "paye")]
    Paye,
    #[sea_orm(string_value = "impaye")]
    Impaye,
}

impl StatutPaiement {
    /// Next status on a grid click: `attente → paye → impaye → attente`.
    pub fn next(self) -> Self {
        match self {
            Self::Attente => Self::Paye,
            Self::Paye => Self::Impaye,
            Self::Impaye => Self::Attente,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Attente => "attente",
            Self::Paye => "paye",
            Self::Impaye => "impaye",
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "loyers_tracking")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub logement_id: i32,
    pub contrat_id: Option<i32>,
    pub mois: i32,
    pub annee: i32,
    pub montant_attendu: f64,
    pub statut_paiement: StatutPaiement,
    pub date_paiement: Option<Date>,
    pub rappel_envoye: bool,
    pub date_rappel: Option<DateTimeUtc>,
    pub nb_rappels: i32,
    pub notes: Option<String>,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::logement::Entity",
        from = "Column::LogementId",
        to = "super::logement::Column::Id"
    )]
    Logement,
}

impl Related<super::logement::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Logement.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_order() {
        let first = StatutPaiement::Attente.next();
        let second = first.next();
        let third = second.next();
        assert_eq!(first, StatutPaiement::Paye);
        assert_eq!(second, StatutPaiement::Impaye);
        assert_eq!(third, StatutPaiement::Attente);
    }
}
