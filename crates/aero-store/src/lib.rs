//! Aero Store - SQLite backing store for aero repositories
//!
//! Provides:
//! - `StoreConfig` (TOML + environment overrides)
//! - Connection management and embedded, checksummed migrations
//! - `SqliteRepository`, a `Repository<E, K>` over any `SqliteEntity`
//! - Factory functions that hand back a ready `Authority` repository

pub mod config;
pub mod db;
pub mod errors;
pub mod migrations;
pub mod repo;

pub use config::{JournalMode, StoreConfig};
pub use errors::Result;
pub use repo::{SqliteEntity, SqliteRepository};

use aero_core::Authority;
use rusqlite::Connection;

/// Build an `Authority` repository over an existing connection
///
/// Configures the connection from `config` and applies pending migrations.
///
/// # Errors
///
/// `StorageError` if configuration or migration fails.
pub fn authority_repository(
    mut conn: Connection,
    config: &StoreConfig,
) -> Result<SqliteRepository<Authority>> {
    db::configure(&conn, config)?;
    migrations::apply_migrations(&mut conn)?;
    Ok(SqliteRepository::new(conn, config))
}

/// Open the database named by `config` and build an `Authority` repository
///
/// # Errors
///
/// `StorageError` if the database cannot be opened, configured or migrated.
pub fn open_authority_repository(config: &StoreConfig) -> Result<SqliteRepository<Authority>> {
    let conn = db::open(config)?;
    authority_repository(conn, config)
}
