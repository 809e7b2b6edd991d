//! Ordering descriptors for collection queries.

/// Sort direction for ordering results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Ascending order (A-Z, 0-9).
    Asc,
    /// Descending order (Z-A, 9-0).
    Desc,
}

/// One ordering fragment: a field and its direction.
///
/// Collection queries accumulate these through
/// [`CollectionQuery::order_by`](super::CollectionQuery::order_by), but they
/// are not written to the query string. See
/// [`CollectionFragments::order_by_fragments`](super::CollectionFragments::order_by_fragments).
///
/// # Example
///
/// ```
/// use odata_query::api::query::{Direction, OrderBy};
///
/// let order = OrderBy::desc("LastName");
/// assert_eq!(order.field(), "LastName");
/// assert_eq!(order.direction(), Direction::Desc);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrderBy {
    field: String,
    direction: Direction,
}

impl OrderBy {
    /// Creates an ordering on a field with an explicit direction.
    pub fn new(field: impl Into<String>, direction: Direction) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    /// Creates an ascending order on a field.
    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, Direction::Asc)
    }

    /// Creates a descending order on a field.
    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, Direction::Desc)
    }

    /// Returns the field name.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Returns the direction.
    pub fn direction(&self) -> Direction {
        self.direction
    }
}
