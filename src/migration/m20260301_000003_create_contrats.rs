//! Migration: leases and their signing tenants.
//!
//! Validation and cancellation columns are part of the base table.

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
                    .table(Contrats::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Contrats::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Contrats::ReferenceUnique)
                            .string_len(50)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Contrats::LogementId).integer().not_null())
                    .col(ColumnDef::new(Contrats::CandidatureId).integer())
                    .col(
                        ColumnDef::new(Contrats::Statut)
                            .string_len(20)
                            .not_null()
                            .default("en_attente"),
                    )
                    .col(
                        ColumnDef::new(Contrats::NbLocataires)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ColumnDef::new(Contrats::DatePriseEffet).date())
                    .col(ColumnDef::new(Contrats::DateExpiration).timestamp_with_time_zone())
                    .col(ColumnDef::new(Contrats::DateSignature).timestamp_with_time_zone())
                    .col(ColumnDef::new(Contrats::DateValidation).timestamp_with_time_zone())
                    .col(ColumnDef::new(Contrats::ValidatedBy).integer())
                    .col(ColumnDef::new(Contrats::ValidationNotes).text())
                    .col(ColumnDef::new(Contrats::MotifAnnulation).text())
                    .col(ColumnDef::new(Contrats::DateAnnulation).timestamp_with_time_zone())
                    .col(ColumnDef::new(Contrats::FichierBail).string_len(512))
                    .col(
                        ColumnDef::new(Contrats::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Contrats::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_contrats_logement")
                            .from(Contrats::Table, Contrats::LogementId)
                            .to(Logements::Table, Logements::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_contrats_statut")
                    .table(Contrats::Table)
                    .col(Contrats::Statut)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Locataires::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Locataires::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Locataires::ContratId).integer().not_null())
                    .col(ColumnDef::new(Locataires::Ordre).integer().not_null().default(1))
                    .col(ColumnDef::new(Locataires::Nom).string_len(100).not_null())
                    .col(ColumnDef::new(Locataires::Prenom).string_len(100).not_null())
                    .col(ColumnDef::new(Locataires::DateNaissance).date())
                    .col(ColumnDef::new(Locataires::Email).string_len(255))
                    .col(ColumnDef::new(Locataires::Telephone).string_len(30))
                    .col(ColumnDef::new(Locataires::SignatureData).string_len(512))
                    .col(ColumnDef::new(Locataires::SignatureTimestamp).timestamp_with_time_zone())
                    .col(ColumnDef::new(Locataires::SignatureIp).string_len(64))
                    .col(ColumnDef::new(Locataires::MentionLuApprouve).string_len(100))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_locataires_contrat")
                            .from(Locataires::Table, Locataires::ContratId)
                            .to(Contrats::Table, Contrats::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Locataires::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Contrats::Table).if_exists().to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(super) enum Contrats {
    Table,
    Id,
    ReferenceUnique,
    LogementId,
    CandidatureId,
    Statut,
    NbLocataires,
    DatePriseEffet,
    DateExpiration,
    DateSignature,
    DateValidation,
    ValidatedBy,
    ValidationNotes,
    MotifAnnulation,
    DateAnnulation,
    FichierBail,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Locataires {
    Table,
    Id,
    ContratId,
    Ordre,
    Nom,
    Prenom,
    DateNaissance,
    Email,
    Telephone,
    SignatureData,
    SignatureTimestamp,
    SignatureIp,
    MentionLuApprouve,
}
