//! Migration: inventory catalog (categories, subcategories, equipment per
//! logement) and inventory checklists.

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
                    .table(InventaireCategories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InventaireCategories::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(InventaireCategories::Nom).string_len(100).not_null())
                    .col(ColumnDef::new(InventaireCategories::Icone).string_len(50))
                    .col(
                        ColumnDef::new(InventaireCategories::Ordre)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(InventaireCategories::Actif)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(InventaireCategories::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(InventaireSousCategories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InventaireSousCategories::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(InventaireSousCategories::CategorieId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InventaireSousCategories::Nom)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InventaireSousCategories::Ordre)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(InventaireSousCategories::Actif)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sous_categories_categorie")
                            .from(
                                InventaireSousCategories::Table,
                                InventaireSousCategories::CategorieId,
                            )
                            .to(InventaireCategories::Table, InventaireCategories::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(InventaireEquipements::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InventaireEquipements::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(InventaireEquipements::LogementId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(InventaireEquipements::CategorieId).integer())
                    .col(ColumnDef::new(InventaireEquipements::SousCategorieId).integer())
                    .col(
                        ColumnDef::new(InventaireEquipements::Nom)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(InventaireEquipements::Description).text())
                    .col(
                        ColumnDef::new(InventaireEquipements::Quantite)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ColumnDef::new(InventaireEquipements::ValeurEstimee).double())
                    .col(
                        ColumnDef::new(InventaireEquipements::Ordre)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(InventaireEquipements::DeletedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(InventaireEquipements::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InventaireEquipements::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_equipements_logement")
                            .from(InventaireEquipements::Table, InventaireEquipements::LogementId)
                            .to(Logements::Table, Logements::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_equipements_categorie")
                            .from(InventaireEquipements::Table, InventaireEquipements::CategorieId)
                            .to(InventaireCategories::Table, InventaireCategories::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_equipements_logement")
                    .table(InventaireEquipements::Table)
                    .col(InventaireEquipements::LogementId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Inventaires::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Inventaires::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Inventaires::LogementId).integer().not_null())
                    .col(ColumnDef::new(Inventaires::ContratId).integer())
                    .col(ColumnDef::new(Inventaires::Type).string_len(10).not_null())
                    .col(
                        ColumnDef::new(Inventaires::ReferenceUnique)
                            .string_len(50)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Inventaires::DateInventaire).date().not_null())
                    .col(ColumnDef::new(Inventaires::EquipementsData).text().not_null())
                    .col(ColumnDef::new(Inventaires::ObservationsGenerales).text())
                    .col(
                        ColumnDef::new(Inventaires::Statut)
                            .string_len(20)
                            .not_null()
                            .default("brouillon"),
                    )
                    .col(
                        ColumnDef::new(Inventaires::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Inventaires::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_inventaires_logement")
                            .from(Inventaires::Table, Inventaires::LogementId)
                            .to(Logements::Table, Logements::Id),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Inventaires::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(InventaireEquipements::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .table(InventaireSousCategories::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(InventaireCategories::Table).if_exists().to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum InventaireCategories {
    Table,
    Id,
    Nom,
    Icone,
    Ordre,
    Actif,
    CreatedAt,
}

#[derive(DeriveIden)]
enum InventaireSousCategories {
    Table,
    Id,
    CategorieId,
    Nom,
    Ordre,
    Actif,
}

#[derive(DeriveIden)]
enum InventaireEquipements {
    Table,
    Id,
    LogementId,
    CategorieId,
    SousCategorieId,
    Nom,
    Description,
    Quantite,
    ValeurEstimee,
    Ordre,
    DeletedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Inventaires {
    Table,
    Id,
    LogementId,
    ContratId,
    Type,
    ReferenceUnique,
    DateInventaire,
    EquipementsData,
    ObservationsGenerales,
    Statut,
    CreatedAt,
    UpdatedAt,
}
