//! Back-office server library for residential rental management.
//!
//! Holds the HTTP API, the database layer, the shared services and the
//! pieces the cron binaries reuse.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod middleware;
pub mod migration;
pub mod models;
pub mod services;
pub mod state;

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Install the global fmt subscriber; `RUST_LOG` overrides the default level.
pub fn init_tracing() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("A tracing subscriber is already installed");
    }
}
