//! Migration: logements, candidatures and their uploaded documents.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Logements::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Logements::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Logements::Reference)
                            .string_len(50)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Logements::Adresse).string_len(255).not_null())
                    .col(ColumnDef::new(Logements::Appartement).string_len(50))
                    .col(ColumnDef::new(Logements::TypeLogement).string_len(50))
                    .col(ColumnDef::new(Logements::Surface).double())
                    .col(ColumnDef::new(Logements::Loyer).double().not_null().default(0.0))
                    .col(ColumnDef::new(Logements::Charges).double().not_null().default(0.0))
                    .col(
                        ColumnDef::new(Logements::DepotGarantie)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Logements::Parking)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Logements::Statut)
                            .string_len(20)
                            .not_null()
                            .default("disponible"),
                    )
                    .col(
                        ColumnDef::new(Logements::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Logements::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Candidatures::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Candidatures::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Candidatures::ReferenceUnique)
                            .string_len(50)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Candidatures::LogementId).integer())
                    .col(ColumnDef::new(Candidatures::Nom).string_len(100).not_null())
                    .col(ColumnDef::new(Candidatures::Prenom).string_len(100).not_null())
                    .col(ColumnDef::new(Candidatures::Email).string_len(255).not_null())
                    .col(ColumnDef::new(Candidatures::Telephone).string_len(30))
                    .col(ColumnDef::new(Candidatures::StatutProfessionnel).string_len(50))
                    .col(ColumnDef::new(Candidatures::RevenusMensuels).double())
                    .col(
                        ColumnDef::new(Candidatures::NbOccupants)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(Candidatures::GarantieVisale)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Candidatures::Statut)
                            .string_len(30)
                            .not_null()
                            .default("en_cours"),
                    )
                    .col(ColumnDef::new(Candidatures::Notes).text())
                    .col(
                        ColumnDef::new(Candidatures::DateSoumission)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Candidatures::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_candidatures_logement")
                            .from(Candidatures::Table, Candidatures::LogementId)
                            .to(Logements::Table, Logements::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_candidatures_statut")
                    .table(Candidatures::Table)
                    .col(Candidatures::Statut)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CandidatureDocuments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CandidatureDocuments::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CandidatureDocuments::CandidatureId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CandidatureDocuments::TypeDocument)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CandidatureDocuments::NomFichier)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CandidatureDocuments::NomOriginal)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CandidatureDocuments::CheminFichier)
                            .string_len(512)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CandidatureDocuments::Taille)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(CandidatureDocuments::UploadedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_candidature_documents_candidature")
                            .from(
                                CandidatureDocuments::Table,
                                CandidatureDocuments::CandidatureId,
                            )
                            .to(Candidatures::Table, Candidatures::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CandidatureDocuments::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Candidatures::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Logements::Table).if_exists().to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(super) enum Logements {
    Table,
    Id,
    Reference,
    Adresse,
    Appartement,
    TypeLogement,
    Surface,
    Loyer,
    Charges,
    DepotGarantie,
    Parking,
    Statut,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Candidatures {
    Table,
    Id,
    ReferenceUnique,
    LogementId,
    Nom,
    Prenom,
    Email,
    Telephone,
    StatutProfessionnel,
    RevenusMensuels,
    NbOccupants,
    GarantieVisale,
    Statut,
    Notes,
    DateSoumission,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum CandidatureDocuments {
    Table,
    Id,
    CandidatureId,
    TypeDocument,
    NomFichier,
    NomOriginal,
    CheminFichier,
    Taille,
    UploadedAt,
}
