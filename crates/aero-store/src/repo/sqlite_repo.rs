//! SQLite repository implementation
//!
//! One owned connection behind a `parking_lot::Mutex`. Lock waits and
//! SQLite busy waits share the configured timeout. Writes run in
//! `BEGIN IMMEDIATE` transactions; listings read count and rows inside one
//! deferred transaction so `total` and the page agree.

use std::fmt::Debug;
use std::marker::PhantomData;
use std::time::Duration;

use aero_core::errors::{StorageError, StorageErrorKind};
use aero_core::logging_facility::observe;
use aero_core::{Page, PageRequest, Repository};
use parking_lot::{Mutex, MutexGuard};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, TransactionBehavior};

use crate::config::StoreConfig;
use crate::errors::{from_rusqlite, Result};
use crate::repo::mapping::{SqliteEntity, Statements};

const BACKEND: &str = "sqlite";

/// Keys bound per `IN (...)` statement
const KEY_CHUNK: usize = 500;

pub struct SqliteRepository<E: SqliteEntity> {
    conn: Mutex<Connection>,
    statements: Statements,
    timeout: Duration,
    _entity: PhantomData<fn() -> E>,
}

impl<E: SqliteEntity> SqliteRepository<E> {
    /// Wrap a connection whose schema is already migrated
    pub fn new(conn: Connection, config: &StoreConfig) -> Self {
        Self {
            conn: Mutex::new(conn),
            statements: Statements::for_entity::<E>(),
            timeout: config.busy_timeout(),
            _entity: PhantomData,
        }
    }

    /// Give the connection back, e.g. to close it explicitly
    pub fn into_connection(self) -> Connection {
        self.conn.into_inner()
    }

    fn lock(&self, op: &str) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .try_lock_for(self.timeout)
            .ok_or_else(|| StorageError::timeout(op, self.timeout.as_millis()))
    }

    /// Upsert then read the row back, so store-populated columns are returned
    fn upsert(&self, conn: &Connection, op: &str, entity: &E) -> Result<E> {
        let key = entity.key();
        let key_context = || format!("{:?}", key);

        conn.execute(&self.statements.upsert, params_from_iter(entity.to_values()))
            .map_err(|e| from_rusqlite(op, e).with_key(key_context()))?;

        self.select_by_key(conn, op, &key)?.ok_or_else(|| {
            StorageError::new(StorageErrorKind::Backend)
                .with_op(op)
                .with_key(key_context())
                .with_message("row missing immediately after write")
        })
    }

    fn select_by_key(&self, conn: &Connection, op: &str, key: &E::Key) -> Result<Option<E>> {
        conn.query_row(&self.statements.select_by_key, [E::key_value(key)], |row| {
            E::from_row(row)
        })
        .optional()
        .map_err(|e| from_rusqlite(op, e).with_key(format!("{:?}", key)))
    }

    fn sort_column<'r>(request: Option<&'r PageRequest>) -> Result<Option<(&'r str, &'static str)>> {
        let Some(request) = request else {
            return Ok(None);
        };
        request.validate::<E>("find_all")?;

        match &request.sort {
            Some(sort) if E::COLUMNS.contains(&sort.property.as_str()) => {
                Ok(Some((sort.property.as_str(), sort.direction.as_sql())))
            }
            Some(sort) => Err(StorageError::invalid_sort("find_all", &sort.property)),
            None => Ok(None),
        }
    }
}

impl<E, K> Repository<E, K> for SqliteRepository<E>
where
    E: SqliteEntity<Key = K>,
    K: Clone + Eq + Ord + std::hash::Hash + Debug + Send + Sync + 'static,
{
    fn save(&self, entity: E) -> Result<E> {
        let key = entity.key();
        observe(BACKEND, E::ENTITY_NAME, "save", Some(&key), || {
            let mut conn = self.lock("save")?;
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(|e| from_rusqlite("save", e))?;
            let saved = self.upsert(&tx, "save", &entity)?;
            tx.commit().map_err(|e| from_rusqlite("save", e))?;
            Ok(saved)
        })
    }

    fn save_all(&self, entities: Vec<E>) -> Result<Vec<E>> {
        observe(BACKEND, E::ENTITY_NAME, "save_all", None, || {
            let mut conn = self.lock("save_all")?;
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(|e| from_rusqlite("save_all", e))?;

            let saved = entities
                .iter()
                .map(|entity| self.upsert(&tx, "save_all", entity))
                .collect::<Result<Vec<_>>>()?;

            tx.commit().map_err(|e| from_rusqlite("save_all", e))?;
            tracing::debug!(rows = saved.len(), "batch saved");
            Ok(saved)
        })
    }

    fn find_by_key(&self, key: &K) -> Result<Option<E>> {
        observe(BACKEND, E::ENTITY_NAME, "find_by_key", Some(key), || {
            let conn = self.lock("find_by_key")?;
            self.select_by_key(&conn, "find_by_key", key)
        })
    }

    fn find_all_by_keys(&self, keys: &[K]) -> Result<Vec<E>> {
        observe(BACKEND, E::ENTITY_NAME, "find_all_by_keys", None, || {
            let mut wanted: Vec<&K> = keys.iter().collect();
            wanted.sort();
            wanted.dedup();

            let mut conn = self.lock("find_all_by_keys")?;
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Deferred)
                .map_err(|e| from_rusqlite("find_all_by_keys", e))?;

            let mut found = Vec::new();
            for chunk in wanted.chunks(KEY_CHUNK) {
                let sql = self.statements.select_by_keys::<E>(chunk.len());
                let mut stmt = tx
                    .prepare(&sql)
                    .map_err(|e| from_rusqlite("find_all_by_keys", e))?;
                let rows = stmt
                    .query_map(params_from_iter(chunk.iter().map(|k| E::key_value(k))), |row| {
                        E::from_row(row)
                    })
                    .map_err(|e| from_rusqlite("find_all_by_keys", e))?;
                for row in rows {
                    found.push(row.map_err(|e| from_rusqlite("find_all_by_keys", e))?);
                }
            }

            tx.commit()
                .map_err(|e| from_rusqlite("find_all_by_keys", e))?;
            Ok(found)
        })
    }

    fn find_all(&self, request: Option<&PageRequest>) -> Result<Page<E>> {
        observe(BACKEND, E::ENTITY_NAME, "find_all", None, || {
            let sort = Self::sort_column(request)?;
            let offset = request.map_or(0, |r| r.offset);
            let limit = request.and_then(|r| r.limit);
            // SQLite reads a negative LIMIT as "no limit"
            let limit_param = limit.map_or(-1, |l| i64::try_from(l).unwrap_or(i64::MAX));
            let offset_param = i64::try_from(offset).unwrap_or(i64::MAX);

            let mut conn = self.lock("find_all")?;
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Deferred)
                .map_err(|e| from_rusqlite("find_all", e))?;

            let total: i64 = tx
                .query_row(&self.statements.count, [], |row| row.get(0))
                .map_err(|e| from_rusqlite("find_all", e))?;

            let sql = self.statements.select_page::<E>(sort);
            let mut stmt = tx.prepare(&sql).map_err(|e| from_rusqlite("find_all", e))?;
            let content = stmt
                .query_map(params![limit_param, offset_param], |row| E::from_row(row))
                .map_err(|e| from_rusqlite("find_all", e))?
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| from_rusqlite("find_all", e))?;
            drop(stmt);

            tx.commit().map_err(|e| from_rusqlite("find_all", e))?;
            Ok(Page::new(content, offset, limit, total.max(0) as u64))
        })
    }

    fn exists_by_key(&self, key: &K) -> Result<bool> {
        observe(BACKEND, E::ENTITY_NAME, "exists_by_key", Some(key), || {
            let conn = self.lock("exists_by_key")?;
            conn.query_row(&self.statements.exists_by_key, [E::key_value(key)], |row| {
                row.get(0)
            })
            .map_err(|e| from_rusqlite("exists_by_key", e))
        })
    }

    fn delete_by_key(&self, key: &K) -> Result<()> {
        observe(BACKEND, E::ENTITY_NAME, "delete_by_key", Some(key), || {
            let conn = self.lock("delete_by_key")?;
            let removed = conn
                .execute(&self.statements.delete_by_key, [E::key_value(key)])
                .map_err(|e| from_rusqlite("delete_by_key", e).with_key(format!("{:?}", key)))?;
            tracing::debug!(rows = removed, "delete_by_key applied");
            Ok(())
        })
    }

    fn delete_all_by_keys(&self, keys: &[K]) -> Result<()> {
        observe(BACKEND, E::ENTITY_NAME, "delete_all_by_keys", None, || {
            let mut conn = self.lock("delete_all_by_keys")?;
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(|e| from_rusqlite("delete_all_by_keys", e))?;
            for key in keys {
                tx.execute(&self.statements.delete_by_key, [E::key_value(key)])
                    .map_err(|e| {
                        from_rusqlite("delete_all_by_keys", e).with_key(format!("{:?}", key))
                    })?;
            }
            tx.commit()
                .map_err(|e| from_rusqlite("delete_all_by_keys", e))?;
            Ok(())
        })
    }

    fn delete_all(&self) -> Result<()> {
        observe(BACKEND, E::ENTITY_NAME, "delete_all", None, || {
            let conn = self.lock("delete_all")?;
            conn.execute(&self.statements.delete_all, [])
                .map_err(|e| from_rusqlite("delete_all", e))?;
            Ok(())
        })
    }

    fn count(&self) -> Result<u64> {
        observe(BACKEND, E::ENTITY_NAME, "count", None, || {
            let conn = self.lock("count")?;
            let count: i64 = conn
                .query_row(&self.statements.count, [], |row| row.get(0))
                .map_err(|e| from_rusqlite("count", e))?;
            Ok(count.max(0) as u64)
        })
    }
}
