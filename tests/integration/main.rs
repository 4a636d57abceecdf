//! HTTP integration suite.
//!
//! Every test builds the full router over a fresh in-memory SQLite database
//! migrated with the real migrator, temporary upload/backup directories and a
//! recording mailer.
//!
//! Run with: cargo test --test integration

mod test_helpers;

mod test_auth;
mod test_candidatures;
mod test_contrats;
mod test_etats_lieux;
mod test_inventaire;
mod test_loyers;
mod test_sauvegardes;
