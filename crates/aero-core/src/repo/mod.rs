//! Generic repository abstraction
//!
//! `Repository<E, K>` is the whole call surface: save, lookup, paged
//! listing, existence, deletion and count. Implementations:
//! - `memory::InMemoryRepository` (this crate)
//! - `aero_store::SqliteRepository` (durable)
//!
//! Every operation is atomic with respect to the record it touches, or the
//! snapshot it reads. Failures surface as `StorageError` and are never
//! retried here. Absence of a record is not an error.

pub mod memory;
pub mod page;

pub use page::{Direction, Page, PageRequest, Sort};

use crate::errors::Result;
use crate::model::Entity;

/// CRUD + paging access to entities of type `E` keyed by `K`
pub trait Repository<E, K>: Send + Sync
where
    E: Entity<Key = K>,
{
    /// Insert, or fully replace the record with the same key
    ///
    /// Returns the persisted representation.
    ///
    /// # Errors
    ///
    /// `StorageError` if the backing store fails or times out.
    fn save(&self, entity: E) -> Result<E>;

    /// Save every entity, in order; later entries win on duplicate keys
    ///
    /// # Errors
    ///
    /// `StorageError` if the backing store fails or times out.
    fn save_all(&self, entities: Vec<E>) -> Result<Vec<E>>;

    /// # Errors
    ///
    /// `StorageError` if the backing store fails or times out.
    fn find_by_key(&self, key: &K) -> Result<Option<E>>;

    /// Records present for `keys`, in key order; unknown keys are skipped
    ///
    /// # Errors
    ///
    /// `StorageError` if the backing store fails or times out.
    fn find_all_by_keys(&self, keys: &[K]) -> Result<Vec<E>>;

    /// Snapshot of all records, optionally sorted and sliced
    ///
    /// Without a sort the order is key order.
    ///
    /// # Errors
    ///
    /// `InvalidSort` for a sort on an unknown property, otherwise
    /// `StorageError` if the backing store fails or times out.
    fn find_all(&self, request: Option<&PageRequest>) -> Result<Page<E>>;

    /// # Errors
    ///
    /// `StorageError` if the backing store fails or times out.
    fn exists_by_key(&self, key: &K) -> Result<bool>;

    /// Remove the record if present
    ///
    /// # Errors
    ///
    /// `StorageError` if the backing store fails or times out.
    fn delete_by_key(&self, key: &K) -> Result<()>;

    /// Remove the record stored under `entity.key()`
    ///
    /// # Errors
    ///
    /// `StorageError` if the backing store fails or times out.
    fn delete(&self, entity: &E) -> Result<()> {
        self.delete_by_key(&entity.key())
    }

    /// # Errors
    ///
    /// `StorageError` if the backing store fails or times out.
    fn delete_all_by_keys(&self, keys: &[K]) -> Result<()>;

    /// # Errors
    ///
    /// `StorageError` if the backing store fails or times out.
    fn delete_all(&self) -> Result<()>;

    /// # Errors
    ///
    /// `StorageError` if the backing store fails or times out.
    fn count(&self) -> Result<u64>;
}
