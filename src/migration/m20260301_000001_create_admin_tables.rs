//! Migration: administrators, sessions, activity logs, parameters, email
//! templates and cron jobs.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Administrateurs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Administrateurs::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Administrateurs::Username)
                            .string_len(100)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Administrateurs::Email).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Administrateurs::PasswordHash)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Administrateurs::Nom).string_len(255))
                    .col(
                        ColumnDef::new(Administrateurs::Actif)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Administrateurs::LastLoginAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Administrateurs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AdminSessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AdminSessions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AdminSessions::AdminId).integer().not_null())
                    .col(
                        ColumnDef::new(AdminSessions::TokenHash)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(AdminSessions::CsrfToken).string_len(64).not_null())
                    .col(ColumnDef::new(AdminSessions::IpAddress).string_len(64))
                    .col(
                        ColumnDef::new(AdminSessions::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AdminSessions::RevokedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(AdminSessions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_admin_sessions_admin")
                            .from(AdminSessions::Table, AdminSessions::AdminId)
                            .to(Administrateurs::Table, Administrateurs::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Logs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Logs::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Logs::TypeEntite).string_len(50).not_null())
                    .col(ColumnDef::new(Logs::EntiteId).integer())
                    .col(ColumnDef::new(Logs::Action).string_len(100).not_null())
                    .col(ColumnDef::new(Logs::Details).text())
                    .col(ColumnDef::new(Logs::IpAddress).string_len(64))
                    .col(
                        ColumnDef::new(Logs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_logs_entite")
                    .table(Logs::Table)
                    .col(Logs::TypeEntite)
                    .col(Logs::EntiteId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Parametres::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Parametres::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Parametres::Cle)
                            .string_len(100)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Parametres::Valeur).text())
                    .col(
                        ColumnDef::new(Parametres::Type)
                            .string_len(20)
                            .not_null()
                            .default("string"),
                    )
                    .col(
                        ColumnDef::new(Parametres::Groupe)
                            .string_len(50)
                            .not_null()
                            .default("general"),
                    )
                    .col(ColumnDef::new(Parametres::Description).text())
                    .col(
                        ColumnDef::new(Parametres::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(EmailTemplates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EmailTemplates::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(EmailTemplates::Identifiant)
                            .string_len(100)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(EmailTemplates::Nom).string_len(255).not_null())
                    .col(ColumnDef::new(EmailTemplates::Sujet).string_len(255).not_null())
                    .col(ColumnDef::new(EmailTemplates::CorpsHtml).text().not_null())
                    .col(
                        ColumnDef::new(EmailTemplates::Actif)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(EmailTemplates::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CronJobs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CronJobs::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CronJobs::Nom)
                            .string_len(100)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(CronJobs::Commande).string_len(255).not_null())
                    .col(ColumnDef::new(CronJobs::Description).text())
                    .col(ColumnDef::new(CronJobs::Frequence).string_len(20).not_null())
                    .col(
                        ColumnDef::new(CronJobs::CronExpression)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CronJobs::Actif)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(CronJobs::DerniereExecution).timestamp_with_time_zone())
                    .col(ColumnDef::new(CronJobs::StatutDerniereExecution).string_len(20))
                    .col(ColumnDef::new(CronJobs::LogDerniereExecution).text())
                    .col(
                        ColumnDef::new(CronJobs::CreatedAt)
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
            .drop_table(Table::drop().table(CronJobs::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(EmailTemplates::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Parametres::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Logs::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AdminSessions::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Administrateurs::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Administrateurs {
    Table,
    Id,
    Username,
    Email,
    PasswordHash,
    Nom,
    Actif,
    LastLoginAt,
    CreatedAt,
}

#[derive(DeriveIden)]
enum AdminSessions {
    Table,
    Id,
    AdminId,
    TokenHash,
    CsrfToken,
    IpAddress,
    ExpiresAt,
    RevokedAt,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Logs {
    Table,
    Id,
    TypeEntite,
    EntiteId,
    Action,
    Details,
    IpAddress,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Parametres {
    Table,
    Id,
    Cle,
    Valeur,
    Type,
    Groupe,
    Description,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum EmailTemplates {
    Table,
    Id,
    Identifiant,
    Nom,
    Sujet,
    CorpsHtml,
    Actif,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum CronJobs {
    Table,
    Id,
    Nom,
    Commande,
    Description,
    Frequence,
    CronExpression,
    Actif,
    DerniereExecution,
    StatutDerniereExecution,
    LogDerniereExecution,
    CreatedAt,
}
