use std::fmt::Debug;
use std::hash::Hash;

/// A value an entity exposes for sorting
///
/// Ordering across variants is `Null < Integer < Text`, so a mixed column
/// still sorts deterministically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PropertyValue {
    Null,
    Integer(i64),
    Text(String),
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Text(value.to_string())
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Integer(value)
    }
}

impl<T: Into<PropertyValue>> From<Option<T>> for PropertyValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(PropertyValue::Null, Into::into)
    }
}

/// A record a repository can persist
///
/// `key()` must be pure and must return the same value for as long as the
/// record is stored. Two entities with equal keys are the same record.
pub trait Entity: Clone + Send + Sync + 'static {
    type Key: Clone + Eq + Ord + Hash + Debug + Send + Sync + 'static;

    /// Name used in log lines and error context
    const ENTITY_NAME: &'static str;

    /// Properties accepted as sort keys; `property()` answers for each
    const PROPERTIES: &'static [&'static str];

    fn key(&self) -> Self::Key;

    /// Value of a named property, or `None` if the entity has no such property
    fn property(&self, name: &str) -> Option<PropertyValue>;
}
