//! Migration: monthly rent tracking and backup metadata.

use sea_orm_migration::prelude::*;

use super::m20260301_000002_create_logements_candidatures::Logements;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LoyersTracking::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LoyersTracking::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LoyersTracking::LogementId).integer().not_null())
                    .col(ColumnDef::new(LoyersTracking::ContratId).integer())
                    .col(ColumnDef::new(LoyersTracking::Mois).integer().not_null())
                    .col(ColumnDef::new(LoyersTracking::Annee).integer().not_null())
                    .col(
                        ColumnDef::new(LoyersTracking::MontantAttendu)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(LoyersTracking::StatutPaiement)
                            .string_len(10)
                            .not_null()
                            .default("attente"),
                    )
                    .col(ColumnDef::new(LoyersTracking::DatePaiement).date())
                    .col(
                        ColumnDef::new(LoyersTracking::RappelEnvoye)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(LoyersTracking::DateRappel).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(LoyersTracking::NbRappels)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(LoyersTracking::Notes).text())
                    .col(
                        ColumnDef::new(LoyersTracking::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_loyers_tracking_logement")
                            .from(LoyersTracking::Table, LoyersTracking::LogementId)
                            .to(Logements::Table, Logements::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_loyers_tracking_mois")
                    .table(LoyersTracking::Table)
                    .col(LoyersTracking::LogementId)
                    .col(LoyersTracking::Annee)
                    .col(LoyersTracking::Mois)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Sauvegardes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Sauvegardes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Sauvegardes::Type).string_len(10).not_null())
                    .col(ColumnDef::new(Sauvegardes::Fichier).string_len(255).not_null())
                    .col(ColumnDef::new(Sauvegardes::FichierFichiers).string_len(255))
                    .col(
                        ColumnDef::new(Sauvegardes::Taille)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Sauvegardes::CreatedBy).integer())
                    .col(
                        ColumnDef::new(Sauvegardes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Sauvegardes::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LoyersTracking::Table).if_exists().to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum LoyersTracking {
    Table,
    Id,
    LogementId,
    ContratId,
    Mois,
    Annee,
    MontantAttendu,
    StatutPaiement,
    DatePaiement,
    RappelEnvoye,
    DateRappel,
    NbRappels,
    Notes,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Sauvegardes {
    Table,
    Id,
    Type,
    Fichier,
    FichierFichiers,
    Taille,
    CreatedBy,
    CreatedAt,
}
