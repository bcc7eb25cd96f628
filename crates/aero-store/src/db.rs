//! Database connection management

use rusqlite::Connection;

use crate::config::StoreConfig;
use crate::errors::{from_rusqlite, Result};

/// Open the database named by `config` (in-memory when no path is set)
///
/// # Errors
///
/// `Connection` storage error if SQLite cannot open the file.
pub fn open(config: &StoreConfig) -> Result<Connection> {
    match &config.path {
        Some(path) => Connection::open(path).map_err(|e| from_rusqlite("open", e)),
        None => open_in_memory(),
    }
}

/// # Errors
///
/// Storage error if SQLite cannot allocate the database.
pub fn open_in_memory() -> Result<Connection> {
    Connection::open_in_memory().map_err(|e| from_rusqlite("open", e))
}

/// Apply busy timeout, foreign keys and journal mode from `config`
///
/// # Errors
///
/// Storage error if a pragma is rejected.
pub fn configure(conn: &Connection, config: &StoreConfig) -> Result<()> {
    conn.busy_timeout(config.busy_timeout())
        .map_err(|e| from_rusqlite("configure", e))?;

    conn.pragma_update(None, "foreign_keys", config.foreign_keys)
        .map_err(|e| from_rusqlite("configure", e))?;

    // in-memory databases answer "memory" whatever was asked
    let journal_mode: String = conn
        .pragma_update_and_check(None, "journal_mode", config.journal_mode.as_pragma(), |row| {
            row.get(0)
        })
        .map_err(|e| from_rusqlite("configure", e))?;

    tracing::debug!(
        journal_mode = %journal_mode,
        busy_timeout_ms = config.busy_timeout_ms,
        "sqlite connection configured"
    );

    Ok(())
}
