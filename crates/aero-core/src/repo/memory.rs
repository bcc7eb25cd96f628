//! In-memory repository
//!
//! Records live in a `BTreeMap` behind a `parking_lot::RwLock`, so unsorted
//! listings come back in key order. Lock waits are bounded by the
//! repository timeout; running past it is a `Timeout` storage error.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::time::Duration;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{Page, PageRequest, Repository};
use crate::errors::{Result, StorageError};
use crate::model::{Authority, Entity};
use crate::logging_facility::observe;

const BACKEND: &str = "memory";

/// Default bound on lock waits
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

pub struct InMemoryRepository<E: Entity> {
    records: RwLock<BTreeMap<E::Key, E>>,
    timeout: Duration,
}

/// Build an empty in-memory `Authority` repository
pub fn authority_repository() -> InMemoryRepository<Authority> {
    InMemoryRepository::new()
}

impl<E: Entity> InMemoryRepository<E> {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
            timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn read(&self, op: &str) -> Result<RwLockReadGuard<'_, BTreeMap<E::Key, E>>> {
        self.records
            .try_read_for(self.timeout)
            .ok_or_else(|| StorageError::timeout(op, self.timeout.as_millis()))
    }

    fn write(&self, op: &str) -> Result<RwLockWriteGuard<'_, BTreeMap<E::Key, E>>> {
        self.records
            .try_write_for(self.timeout)
            .ok_or_else(|| StorageError::timeout(op, self.timeout.as_millis()))
    }
}

impl<E: Entity> Default for InMemoryRepository<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E, K> Repository<E, K> for InMemoryRepository<E>
where
    E: Entity<Key = K>,
    K: Clone + Eq + Ord + std::hash::Hash + Debug + Send + Sync + 'static,
{
    fn save(&self, entity: E) -> Result<E> {
        let key = entity.key();
        observe(BACKEND, E::ENTITY_NAME, "save", Some(&key), || {
            let mut records = self.write("save")?;
            records.insert(key.clone(), entity.clone());
            Ok(entity)
        })
    }

    fn save_all(&self, entities: Vec<E>) -> Result<Vec<E>> {
        observe(BACKEND, E::ENTITY_NAME, "save_all", None, || {
            let mut records = self.write("save_all")?;
            for entity in &entities {
                records.insert(entity.key(), entity.clone());
            }
            Ok(entities)
        })
    }

    fn find_by_key(&self, key: &K) -> Result<Option<E>> {
        observe(BACKEND, E::ENTITY_NAME, "find_by_key", Some(key), || {
            Ok(self.read("find_by_key")?.get(key).cloned())
        })
    }

    fn find_all_by_keys(&self, keys: &[K]) -> Result<Vec<E>> {
        observe(BACKEND, E::ENTITY_NAME, "find_all_by_keys", None, || {
            let mut wanted: Vec<&K> = keys.iter().collect();
            wanted.sort();
            wanted.dedup();

            let records = self.read("find_all_by_keys")?;
            Ok(wanted
                .into_iter()
                .filter_map(|k| records.get(k).cloned())
                .collect())
        })
    }

    fn find_all(&self, request: Option<&PageRequest>) -> Result<Page<E>> {
        observe(BACKEND, E::ENTITY_NAME, "find_all", None, || {
            let snapshot: Vec<E> = self.read("find_all")?.values().cloned().collect();
            Page::from_snapshot(snapshot, request, "find_all")
        })
    }

    fn exists_by_key(&self, key: &K) -> Result<bool> {
        observe(BACKEND, E::ENTITY_NAME, "exists_by_key", Some(key), || {
            Ok(self.read("exists_by_key")?.contains_key(key))
        })
    }

    fn delete_by_key(&self, key: &K) -> Result<()> {
        observe(BACKEND, E::ENTITY_NAME, "delete_by_key", Some(key), || {
            self.write("delete_by_key")?.remove(key);
            Ok(())
        })
    }

    fn delete_all_by_keys(&self, keys: &[K]) -> Result<()> {
        observe(BACKEND, E::ENTITY_NAME, "delete_all_by_keys", None, || {
            let mut records = self.write("delete_all_by_keys")?;
            for key in keys {
                records.remove(key);
            }
            Ok(())
        })
    }

    fn delete_all(&self) -> Result<()> {
        observe(BACKEND, E::ENTITY_NAME, "delete_all", None, || {
            self.write("delete_all")?.clear();
            Ok(())
        })
    }

    fn count(&self) -> Result<u64> {
        observe(BACKEND, E::ENTITY_NAME, "count", None, || Ok(self.read("count")?.len() as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::StorageErrorKind;
    use crate::logging_facility::init_test_capture;
    use crate::repo::Sort;
    use aero_core_types::schema::{EVENT_END_ERROR, FIELD_ERR_CODE, FIELD_REQUEST_ID};

    #[test]
    fn test_save_then_find() {
        let repo = authority_repository();
        let saved = repo.save(Authority::new("A1", "Alpha")).unwrap();
        assert_eq!(saved, Authority::new("A1", "Alpha"));
        assert_eq!(
            repo.find_by_key(&"A1".to_string()).unwrap(),
            Some(Authority::new("A1", "Alpha"))
        );
    }

    #[test]
    fn test_save_all_later_entry_wins() {
        let repo = authority_repository();
        repo.save_all(vec![
            Authority::new("A1", "first"),
            Authority::new("A2", "other"),
            Authority::new("A1", "second"),
        ])
        .unwrap();

        assert_eq!(repo.count().unwrap(), 2);
        assert_eq!(
            repo.find_by_key(&"A1".to_string()).unwrap().unwrap().name,
            "second"
        );
    }

    #[test]
    fn test_find_all_by_keys_skips_missing() {
        let repo = authority_repository();
        repo.save(Authority::new("B", "b")).unwrap();
        repo.save(Authority::new("A", "a")).unwrap();

        let keys = vec!["B".to_string(), "X".to_string(), "A".to_string(), "B".to_string()];
        let found = repo.find_all_by_keys(&keys).unwrap();
        assert_eq!(found, vec![Authority::new("A", "a"), Authority::new("B", "b")]);
    }

    #[test]
    fn test_invalid_sort_fails_on_empty_store() {
        let repo = authority_repository();
        let request = PageRequest::unpaged().with_sort(Sort::asc("missing"));
        let err = repo.find_all(Some(&request)).unwrap_err();
        assert_eq!(err.kind(), StorageErrorKind::InvalidSort);
    }

    #[test]
    fn test_read_times_out_while_writer_holds_lock() {
        let repo = authority_repository().with_timeout(Duration::from_millis(20));
        let _guard = repo.records.write();

        let err = repo.count().unwrap_err();
        assert_eq!(err.kind(), StorageErrorKind::Timeout);
        assert_eq!(err.op(), Some("count"));
    }

    #[test]
    fn test_write_times_out_while_reader_holds_lock() {
        let repo = authority_repository().with_timeout(Duration::from_millis(20));
        let _guard = repo.records.read();

        let err = repo.save(Authority::new("A1", "Alpha")).unwrap_err();
        assert_eq!(err.kind(), StorageErrorKind::Timeout);
    }

    #[test]
    fn test_failed_operation_logs_end_error() {
        let capture = init_test_capture();
        let repo = authority_repository().with_timeout(Duration::from_millis(5));
        let _guard = repo.records.write();

        let err = repo
            .exists_by_key(&"memory-log-timeout".to_string())
            .unwrap_err();
        let id = err.request_id().expect("request id attached");

        let errors = capture.events_for("exists_by_key", EVENT_END_ERROR);
        assert!(errors.iter().any(|e| {
            e.field(FIELD_ERR_CODE) == Some("ERR_TIMEOUT")
                && e.field(FIELD_REQUEST_ID) == Some(id.as_str())
        }));
    }
}
