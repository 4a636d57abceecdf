//! Migration: move-in/move-out reports, their tenant signature rows and
//! categorized photos.

use sea_orm_migration::prelude::*;

use super::m20260301_000002_create_logements_candidatures::Logements;
use super::m20260301_000003_create_contrats::Contrats;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EtatsLieux::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EtatsLieux::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(EtatsLieux::ContratId).integer().not_null())
                    .col(ColumnDef::new(EtatsLieux::LogementId).integer().not_null())
                    .col(ColumnDef::new(EtatsLieux::Type).string_len(10).not_null())
                    .col(
                        ColumnDef::new(EtatsLieux::ReferenceUnique)
                            .string_len(50)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(EtatsLieux::DateEtat).date().not_null())
                    .col(ColumnDef::new(EtatsLieux::Adresse).string_len(255).not_null())
                    .col(ColumnDef::new(EtatsLieux::BailleurNom).string_len(255))
                    .col(ColumnDef::new(EtatsLieux::LocataireNomComplet).string_len(255))
                    .col(ColumnDef::new(EtatsLieux::LocataireEmail).string_len(255))
                    .col(ColumnDef::new(EtatsLieux::CompteurElectricite).string_len(50))
                    .col(ColumnDef::new(EtatsLieux::CompteurEauFroide).string_len(50))
                    .col(
                        ColumnDef::new(EtatsLieux::ClesAppartement)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(EtatsLieux::ClesBoiteLettres)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(EtatsLieux::ClesAutre).integer().not_null().default(0))
                    .col(ColumnDef::new(EtatsLieux::ClesTotal).integer().not_null().default(0))
                    .col(ColumnDef::new(EtatsLieux::PiecePrincipale).text())
                    .col(ColumnDef::new(EtatsLieux::CoinCuisine).text())
                    .col(ColumnDef::new(EtatsLieux::SalleEauWc).text())
                    .col(ColumnDef::new(EtatsLieux::EtatGeneral).text())
                    .col(ColumnDef::new(EtatsLieux::Observations).text())
                    .col(ColumnDef::new(EtatsLieux::LieuSignature).string_len(100))
                    .col(ColumnDef::new(EtatsLieux::DepotGarantieStatus).string_len(30))
                    .col(ColumnDef::new(EtatsLieux::DepotGarantieMontantRetenu).double())
                    .col(ColumnDef::new(EtatsLieux::DepotGarantieMotifRetenue).text())
                    .col(ColumnDef::new(EtatsLieux::BilanLogementData).text())
                    .col(ColumnDef::new(EtatsLieux::BilanLogementCommentaire).text())
                    .col(
                        ColumnDef::new(EtatsLieux::BilanEnvoye)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(EtatsLieux::BilanEnvoyeAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(EtatsLieux::Statut)
                            .string_len(20)
                            .not_null()
                            .default("brouillon"),
                    )
                    .col(ColumnDef::new(EtatsLieux::DateFinalisation).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(EtatsLieux::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EtatsLieux::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_etats_lieux_contrat")
                            .from(EtatsLieux::Table, EtatsLieux::ContratId)
                            .to(Contrats::Table, Contrats::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_etats_lieux_logement")
                            .from(EtatsLieux::Table, EtatsLieux::LogementId)
                            .to(Logements::Table, Logements::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_etats_lieux_contrat_type")
                    .table(EtatsLieux::Table)
                    .col(EtatsLieux::ContratId)
                    .col(EtatsLieux::Type)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(EtatLieuxLocataires::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EtatLieuxLocataires::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(EtatLieuxLocataires::EtatLieuxId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(EtatLieuxLocataires::LocataireId).integer())
                    .col(
                        ColumnDef::new(EtatLieuxLocataires::Ordre)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ColumnDef::new(EtatLieuxLocataires::Nom).string_len(100).not_null())
                    .col(
                        ColumnDef::new(EtatLieuxLocataires::Prenom)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(ColumnDef::new(EtatLieuxLocataires::Email).string_len(255))
                    .col(ColumnDef::new(EtatLieuxLocataires::SignatureData).string_len(512))
                    .col(
                        ColumnDef::new(EtatLieuxLocataires::SignatureTimestamp)
                            .timestamp_with_time_zone(),
                    )
                    .col(ColumnDef::new(EtatLieuxLocataires::SignatureIp).string_len(64))
                    .col(
                        ColumnDef::new(EtatLieuxLocataires::CertifieExact)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_etat_lieux_locataires_etat")
                            .from(EtatLieuxLocataires::Table, EtatLieuxLocataires::EtatLieuxId)
                            .to(EtatsLieux::Table, EtatsLieux::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(EtatLieuxPhotos::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EtatLieuxPhotos::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(EtatLieuxPhotos::EtatLieuxId).integer().not_null())
                    .col(ColumnDef::new(EtatLieuxPhotos::Categorie).string_len(50).not_null())
                    .col(
                        ColumnDef::new(EtatLieuxPhotos::NomFichier)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EtatLieuxPhotos::CheminFichier)
                            .string_len(512)
                            .not_null(),
                    )
                    .col(ColumnDef::new(EtatLieuxPhotos::Description).text())
                    .col(ColumnDef::new(EtatLieuxPhotos::Ordre).integer().not_null().default(0))
                    .col(
                        ColumnDef::new(EtatLieuxPhotos::UploadedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_etat_lieux_photos_etat")
                            .from(EtatLieuxPhotos::Table, EtatLieuxPhotos::EtatLieuxId)
                            .to(EtatsLieux::Table, EtatsLieux::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EtatLieuxPhotos::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(EtatLieuxLocataires::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(EtatsLieux::Table).if_exists().to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum EtatsLieux {
    Table,
    Id,
    ContratId,
    LogementId,
    Type,
    ReferenceUnique,
    DateEtat,
    Adresse,
    BailleurNom,
    LocataireNomComplet,
    LocataireEmail,
    CompteurElectricite,
    CompteurEauFroide,
    ClesAppartement,
    ClesBoiteLettres,
    ClesAutre,
    ClesTotal,
    PiecePrincipale,
    CoinCuisine,
    SalleEauWc,
    EtatGeneral,
    Observations,
    LieuSignature,
    DepotGarantieStatus,
    DepotGarantieMontantRetenu,
    DepotGarantieMotifRetenue,
    BilanLogementData,
    BilanLogementCommentaire,
    BilanEnvoye,
    BilanEnvoyeAt,
    Statut,
    DateFinalisation,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum EtatLieuxLocataires {
    Table,
    Id,
    EtatLieuxId,
    LocataireId,
    Ordre,
    Nom,
    Prenom,
    Email,
    SignatureData,
    SignatureTimestamp,
    SignatureIp,
    CertifieExact,
}

#[derive(DeriveIden)]
enum EtatLieuxPhotos {
    Table,
    Id,
    EtatLieuxId,
    Categorie,
    NomFichier,
    CheminFichier,
    Description,
    Ordre,
    UploadedAt,
}
