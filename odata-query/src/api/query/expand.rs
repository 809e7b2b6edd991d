//! `$expand` descriptors with optional nested query options.

use std::fmt;

use crate::error::ValidationError;

use super::fragments::QueryFragments;

/// One `$expand` target: a navigation property, optionally with a nested
/// query.
///
/// Without a nested query the descriptor renders as the bare property name.
/// With one, the nested options are rendered inside parentheses and separated
/// by `;`.
///
/// # Example
///
/// ```
/// use odata_query::api::query::Expand;
///
/// let expand = Expand::nested("Friends", |q| {
///     q.select("UserName,FirstName")?.filter("Age gt 30");
///     Ok(())
/// })
/// .unwrap();
///
/// assert_eq!(
///     expand.to_odata(),
///     "Friends($filter=Age gt 30;$select=UserName,FirstName)"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expand {
    /// The navigation property name to expand.
    field: String,
    /// Nested options applied to the expanded records.
    query: Option<QueryFragments>,
}

impl Expand {
    /// Creates a plain expand of a navigation property.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            query: None,
        }
    }

    /// Creates an expand carrying an already built nested query.
    pub fn with_query(field: impl Into<String>, query: QueryFragments) -> Self {
        Self {
            field: field.into(),
            query: Some(query),
        }
    }

    /// Creates an expand and builds its nested query in a closure.
    ///
    /// Validation errors from the nested builder are passed through.
    pub fn nested<F>(field: impl Into<String>, build: F) -> Result<Self, ValidationError>
    where
        F: FnOnce(&mut QueryFragments) -> Result<(), ValidationError>,
    {
        let mut query = QueryFragments::new();
        build(&mut query)?;
        Ok(Self::with_query(field, query))
    }

    /// Returns the navigation property name.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Returns the nested query, if any.
    pub fn query(&self) -> Option<&QueryFragments> {
        self.query.as_ref()
    }

    /// Renders this descriptor as an `$expand` item.
    pub fn to_odata(&self) -> String {
        match &self.query {
            Some(query) if !query.is_empty() => format!("{}({})", self.field, query.queries()),
            _ => self.field.clone(),
        }
    }
}

impl fmt::Display for Expand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_odata())
    }
}

impl From<&str> for Expand {
    fn from(field: &str) -> Self {
        Self::new(field)
    }
}

impl From<String> for Expand {
    fn from(field: String) -> Self {
        Self::new(field)
    }
}
