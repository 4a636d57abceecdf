//! SeaORM database migrations.
//!
//! Written with the schema builder so the same migrations run against MySQL,
//! PostgreSQL and the SQLite database used by the test-suite.

pub use sea_orm_migration::prelude::*;

mod m20260301_000001_create_admin_tables;
mod m20260301_000002_create_logements_candidatures;
mod m20260301_000003_create_contrats;
mod m20260301_000004_create_etats_lieux;
mod m20260301_000005_create_inventaire;
mod m20260301_000006_create_loyers_sauvegardes;
mod m20260301_000007_seed_defaults;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_admin_tables::Migration),
            Box::new(m20260301_000002_create_logements_candidatures::Migration),
            Box::new(m20260301_000003_create_contrats::Migration),
            Box::new(m20260301_000004_create_etats_lieux::Migration),
            Box::new(m20260301_000005_create_inventaire::Migration),
            Box::new(m20260301_000006_create_loyers_sauvegardes::Migration),
            Box::new(m20260301_000007_seed_defaults::Migration),
        ]
    }
}
