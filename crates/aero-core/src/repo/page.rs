//! Paging and sorting for `find_all`

use crate::errors::{Result, StorageError};
use crate::model::Entity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// Sort on one entity property; ties fall back to key order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub property: String,
    pub direction: Direction,
}

impl Sort {
    pub fn asc(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: Direction::Asc,
        }
    }

    pub fn desc(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: Direction::Desc,
        }
    }
}

/// Offset/limit window plus an optional sort
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageRequest {
    pub offset: u64,
    /// `None` means no upper bound
    pub limit: Option<u64>,
    pub sort: Option<Sort>,
}

impl PageRequest {
    pub fn new(offset: u64, limit: u64) -> Self {
        Self {
            offset,
            limit: Some(limit),
            sort: None,
        }
    }

    /// Every record, no window
    pub fn unpaged() -> Self {
        Self::default()
    }

    /// Page `number` (zero-based) of `size` records
    pub fn of_size(number: u64, size: u64) -> Self {
        Self::new(number.saturating_mul(size), size)
    }

    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Reject sorts on properties `E` does not declare
    ///
    /// # Errors
    ///
    /// `InvalidSort` naming the unknown property.
    pub fn validate<E: Entity>(&self, op: &str) -> Result<()> {
        match &self.sort {
            Some(sort) if !E::PROPERTIES.contains(&sort.property.as_str()) => {
                Err(StorageError::invalid_sort(op, &sort.property))
            }
            _ => Ok(()),
        }
    }
}

/// A finite snapshot slice returned by `find_all`
///
/// Iterating does not consume the page, so it can be walked any number of
/// times.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<E> {
    content: Vec<E>,
    offset: u64,
    limit: Option<u64>,
    total: u64,
}

impl<E> Page<E> {
    pub fn new(content: Vec<E>, offset: u64, limit: Option<u64>, total: u64) -> Self {
        Self {
            content,
            offset,
            limit,
            total,
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, E> {
        self.content.iter()
    }

    pub fn content(&self) -> &[E] {
        &self.content
    }

    pub fn into_content(self) -> Vec<E> {
        self.content
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    /// Records in the snapshot before the window was applied
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Whether records remain past this window
    ///
    /// A zero-size window never advances, so it has no next page.
    pub fn has_next(&self) -> bool {
        if self.limit == Some(0) {
            return false;
        }
        self.offset.saturating_add(self.content.len() as u64) < self.total
    }
}

impl<E: Entity> Page<E> {
    /// Sort and slice a key-ordered snapshot held in memory
    ///
    /// # Errors
    ///
    /// `InvalidSort` if the request sorts on an unknown property.
    pub fn from_snapshot(
        mut snapshot: Vec<E>,
        request: Option<&PageRequest>,
        op: &str,
    ) -> Result<Self> {
        let total = snapshot.len() as u64;
        let Some(request) = request else {
            return Ok(Self::new(snapshot, 0, None, total));
        };
        request.validate::<E>(op)?;

        if let Some(sort) = &request.sort {
            // stable: equal values stay in key order
            snapshot.sort_by(|a, b| {
                let ord = a.property(&sort.property).cmp(&b.property(&sort.property));
                match sort.direction {
                    Direction::Asc => ord,
                    Direction::Desc => ord.reverse(),
                }
            });
        }

        let start = usize::try_from(request.offset).unwrap_or(usize::MAX);
        let content: Vec<E> = match request.limit {
            Some(limit) => snapshot
                .into_iter()
                .skip(start)
                .take(usize::try_from(limit).unwrap_or(usize::MAX))
                .collect(),
            None => snapshot.into_iter().skip(start).collect(),
        };

        Ok(Self::new(content, request.offset, request.limit, total))
    }
}

impl<E> IntoIterator for Page<E> {
    type Item = E;
    type IntoIter = std::vec::IntoIter<E>;

    fn into_iter(self) -> Self::IntoIter {
        self.content.into_iter()
    }
}

impl<'a, E> IntoIterator for &'a Page<E> {
    type Item = &'a E;
    type IntoIter = std::slice::Iter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.content.iter()
    }
}
