//! Aero Core - generic repository abstraction
//!
//! This crate provides:
//! - The `Entity` contract and the `Authority` entity
//! - The `Repository<E, K>` CRUD + paging trait
//! - An in-memory repository implementation
//! - The `StorageError` facility and structured logging macros
//!
//! Durable storage lives in `aero-store`.

pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod repo;

#[doc(hidden)]
pub use aero_core_types;

// Re-export commonly used types
pub use errors::{Result, StorageError, StorageErrorKind};
pub use model::{Authority, Entity, PropertyValue};
pub use repo::memory::InMemoryRepository;
pub use repo::{Direction, Page, PageRequest, Repository, Sort};
