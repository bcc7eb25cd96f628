//! SQLite-backed repositories

pub mod mapping;
pub mod sqlite_repo;

pub use mapping::SqliteEntity;
pub use sqlite_repo::SqliteRepository;
