//! Database module providing connection management, migrations, and queries.
//!
//! Each submodule adds `impl DbPool` methods for one business area.

pub mod administrateurs;
pub mod candidatures;
pub mod contrats;
pub mod cron_jobs;
pub mod email_templates;
pub mod etats_lieux;
pub mod inventaire;
pub mod logements;
pub mod logs;
pub mod loyers;
pub mod parametres;
pub mod sauvegardes;
pub mod sessions;

use std::time::Duration;

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbBackend};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::migration::Migrator;

/// Database connection pool wrapper.
///
/// `DatabaseConnection` is already a pool, so cloning is cheap.
#[derive(Clone, Debug)]
pub struct DbPool {
    conn: DatabaseConnection,
}

impl DbPool {
    /// Create a new database pool from configuration.
    pub async fn new(config: &Config) -> AppResult<Self> {
        Self::connect(&config.database_url, config.db_max_connections).await
    }

    /// Connect to the given URL with a bounded pool.
    pub async fn connect(database_url: &str, max_connections: u32) -> AppResult<Self> {
        let mut options = ConnectOptions::new(database_url.to_string());
        options
            .max_connections(max_connections.max(1))
            .min_connections(1)
            .connect_timeout(Duration::from_secs(10))
            .sqlx_logging(false);

        let conn = Database::connect(options)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to database: {}", e)))?;

        Ok(DbPool { conn })
    }

    /// Get access to the connection for executing queries.
    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    pub fn backend(&self) -> DbBackend {
        self.conn.get_database_backend()
    }

    /// Apply all pending migrations.
    pub async fn run_migrations(&self) -> AppResult<()> {
        Migrator::up(&self.conn, None)
            .await
            .map_err(|e| AppError::Database(format!("Failed to run migrations: {}", e)))?;
        info!("Database migrations complete");
        Ok(())
    }
}

/// Build a `PREFIX-YYYYMMDD-XXXXXXXX` reference from the current date and a
/// random suffix.
pub fn generate_reference(prefix: &str) -> String {
    let suffix: [u8; 4] = rand::random();
    format!(
        "{}-{}-{}",
        prefix,
        chrono::Utc::now().format("%Y%m%d"),
        hex::encode_upper(suffix)
    )
}

/// Translate a list of ids into `(id, ordre)` pairs, rejecting duplicates.
pub(crate) fn ordering(ids: &[i32]) -> AppResult<Vec<(i32, i32)>> {
    let mut seen = std::collections::HashSet::new();
    ids.iter()
        .enumerate()
        .map(|(index, id)| {
            if !seen.insert(*id) {
                return Err(AppError::InvalidInput(format!(
                    "Identifiant {} présent plusieurs fois",
                    id
                )));
            }
            Ok((*id, index as i32))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_reference_shape() {
        let reference = generate_reference("CAND");
        let parts: Vec<&str> = reference.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "CAND");
        assert_eq!(parts[1].len(), 8);
        assert_eq!(parts[2].len(), 8);
        assert!(parts[2].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_ordering_rejects_duplicates() {
        assert_eq!(ordering(&[4, 2, 9]).unwrap(), vec![(4, 0), (2, 1), (9, 2)]);
        assert!(ordering(&[1, 1]).is_err());
    }
}
