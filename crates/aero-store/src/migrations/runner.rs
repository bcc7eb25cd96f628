//! Applies embedded migrations with checksum verification

use rusqlite::{Connection, OptionalExtension};

use crate::errors::{from_rusqlite, MigrationError, Result};
use crate::migrations::checksums::compute_checksum;
use crate::migrations::embedded::get_migrations;

/// Apply all pending migrations
///
/// Already-applied migrations are skipped after their checksum is checked.
///
/// # Errors
///
/// `Migration` storage error on a failed script, a checksum mismatch, or a
/// recorded migration this build does not know.
pub fn apply_migrations(conn: &mut Connection) -> Result<()> {
    create_schema_version_table(conn)?;

    let migrations = get_migrations();
    let known: Vec<&str> = migrations.iter().map(|m| m.id).collect();
    for (id, _) in applied_migrations(conn)? {
        if !known.contains(&id.as_str()) {
            return Err(MigrationError::UnknownMigration { id }.into());
        }
    }

    for migration in migrations {
        apply_migration(conn, migration.id, migration.sql)?;
    }

    Ok(())
}

/// Applied migration ids with their recorded checksums, in application order
///
/// # Errors
///
/// Storage error if `schema_version` cannot be read.
pub fn applied_migrations(conn: &Connection) -> Result<Vec<(String, String)>> {
    let mut stmt = conn
        .prepare("SELECT migration_id, checksum FROM schema_version ORDER BY id")
        .map_err(|e| from_rusqlite("migration", e))?;
    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .map_err(|e| from_rusqlite("migration", e))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| from_rusqlite("migration", e))?;
    Ok(rows)
}

fn create_schema_version_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            id INTEGER PRIMARY KEY,
            migration_id TEXT NOT NULL UNIQUE,
            applied_at INTEGER NOT NULL,
            checksum TEXT NOT NULL
        )",
        [],
    )
    .map_err(|e| from_rusqlite("migration", e))?;

    Ok(())
}

fn apply_migration(conn: &mut Connection, migration_id: &str, sql: &str) -> Result<()> {
    let checksum = compute_checksum(sql);

    let recorded: Option<String> = conn
        .query_row(
            "SELECT checksum FROM schema_version WHERE migration_id = ?1",
            [migration_id],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| from_rusqlite("migration", e))?;

    if let Some(found) = recorded {
        if found != checksum {
            return Err(MigrationError::ChecksumMismatch {
                id: migration_id.to_string(),
                expected: checksum,
                found,
            }
            .into());
        }
        return Ok(());
    }

    let tx = conn
        .transaction()
        .map_err(|e| from_rusqlite("migration", e))?;

    tx.execute_batch(sql)
        .map_err(|e| MigrationError::Failed {
            id: migration_id.to_string(),
            reason: e.to_string(),
        })?;

    tx.execute(
        "INSERT INTO schema_version (migration_id, applied_at, checksum) VALUES (?1, ?2, ?3)",
        rusqlite::params![migration_id, chrono::Utc::now().timestamp(), checksum],
    )
    .map_err(|e| from_rusqlite("migration", e))?;

    tx.commit().map_err(|e| from_rusqlite("migration", e))?;

    tracing::debug!(migration_id, "migration applied");
    Ok(())
}
