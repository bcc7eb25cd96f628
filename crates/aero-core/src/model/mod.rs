//! Domain model: the entity contract and persisted entities

pub mod authority;
pub mod entity;

pub use authority::Authority;
pub use entity::{Entity, PropertyValue};
