//! Row mapping between entities and SQLite tables

use aero_core::{Authority, Entity};
use rusqlite::types::Value;
use rusqlite::Row;

/// An entity stored as one row of one table
///
/// `COLUMNS` lists the key column first; `to_values()` and `from_row()` use
/// the same order. Sortable properties must be column names.
pub trait SqliteEntity: Entity {
    const TABLE: &'static str;
    const KEY_COLUMN: &'static str;
    const COLUMNS: &'static [&'static str];

    fn to_values(&self) -> Vec<Value>;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    fn key_value(key: &Self::Key) -> Value;
}

impl SqliteEntity for Authority {
    const TABLE: &'static str = "authority";
    const KEY_COLUMN: &'static str = "id";
    const COLUMNS: &'static [&'static str] = &["id", "name"];

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.id.clone()),
            Value::Text(self.name.clone()),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Authority {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    }

    fn key_value(key: &String) -> Value {
        Value::Text(key.clone())
    }
}

/// SQL text for one entity type, built from its mapping
pub(crate) struct Statements {
    pub upsert: String,
    pub select_by_key: String,
    pub exists_by_key: String,
    pub delete_by_key: String,
    pub delete_all: String,
    pub count: String,
    select_all: String,
}

impl Statements {
    pub fn for_entity<E: SqliteEntity>() -> Self {
        let table = quote(E::TABLE);
        let key = quote(E::KEY_COLUMN);
        let columns = E::COLUMNS
            .iter()
            .map(|c| quote(c))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = (1..=E::COLUMNS.len())
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ");

        let assignments: Vec<String> = E::COLUMNS
            .iter()
            .filter(|c| **c != E::KEY_COLUMN)
            .map(|c| format!("{0} = excluded.{0}", quote(c)))
            .collect();
        let on_conflict = if assignments.is_empty() {
            format!("ON CONFLICT({}) DO NOTHING", key)
        } else {
            format!("ON CONFLICT({}) DO UPDATE SET {}", key, assignments.join(", "))
        };

        Self {
            upsert: format!(
                "INSERT INTO {} ({}) VALUES ({}) {}",
                table, columns, placeholders, on_conflict
            ),
            select_by_key: format!("SELECT {} FROM {} WHERE {} = ?1", columns, table, key),
            exists_by_key: format!("SELECT EXISTS(SELECT 1 FROM {} WHERE {} = ?1)", table, key),
            delete_by_key: format!("DELETE FROM {} WHERE {} = ?1", table, key),
            delete_all: format!("DELETE FROM {}", table),
            count: format!("SELECT COUNT(*) FROM {}", table),
            select_all: format!("SELECT {} FROM {}", columns, table),
        }
    }

    /// `SELECT ... WHERE key IN (?1..?n) ORDER BY key`
    pub fn select_by_keys<E: SqliteEntity>(&self, n: usize) -> String {
        let placeholders = (1..=n)
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "{} WHERE {} IN ({}) ORDER BY {}",
            self.select_all,
            quote(E::KEY_COLUMN),
            placeholders,
            quote(E::KEY_COLUMN)
        )
    }

    /// Ordered, windowed listing; `sort_column` must already be validated
    pub fn select_page<E: SqliteEntity>(&self, sort_column: Option<(&str, &str)>) -> String {
        let key = quote(E::KEY_COLUMN);
        let order = match sort_column {
            Some((column, direction)) if column != E::KEY_COLUMN => {
                format!("{} {}, {} ASC", quote(column), direction, key)
            }
            Some((_, direction)) => format!("{} {}", key, direction),
            None => format!("{} ASC", key),
        };
        format!("{} ORDER BY {} LIMIT ?1 OFFSET ?2", self.select_all, order)
    }
}

fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}
