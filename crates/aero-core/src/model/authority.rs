use serde::{Deserialize, Serialize};

use super::entity::{Entity, PropertyValue};

/// A security authority (role) granted to users
///
/// Keyed by `id`; `name` is the human-readable label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Authority {
    pub id: String,
    pub name: String,
}

impl Authority {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl Entity for Authority {
    type Key = String;

    const ENTITY_NAME: &'static str = "authority";

    const PROPERTIES: &'static [&'static str] = &["id", "name"];

    fn key(&self) -> String {
        self.id.clone()
    }

    fn property(&self, name: &str) -> Option<PropertyValue> {
        match name {
            "id" => Some(self.id.as_str().into()),
            "name" => Some(self.name.as_str().into()),
            _ => None,
        }
    }
}
