//! Assembled OData query parameters.

use std::fmt;

/// `$filter`
pub const FILTER: &str = "$filter";
/// `$expand`
pub const EXPAND: &str = "$expand";
/// `$select`
pub const SELECT: &str = "$select";
/// `$top`
pub const TOP: &str = "$top";
/// `$skip`
pub const SKIP: &str = "$skip";
/// `$search`
pub const SEARCH: &str = "$search";
/// `$count`
pub const COUNT: &str = "$count";

/// Ordered mapping from OData parameter name to its value.
///
/// Produced by `queries()` on every query type. Keys appear in assembly order
/// and each key appears at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(&'static str, String)>,
}

impl QueryParams {
    /// Creates an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a parameter, replacing an earlier value for the same key.
    pub(crate) fn insert(&mut self, key: &'static str, value: impl Into<String>) {
        let value = value.into();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some(pair) => pair.1 = value,
            None => self.pairs.push((key, value)),
        }
    }

    /// Returns the value for a parameter name.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns `true` if the parameter is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Returns the parameter names in assembly order.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.pairs.iter().map(|(k, _)| *k)
    }

    /// Iterates over `(name, value)` pairs in assembly order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.pairs.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// Returns the number of parameters.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns `true` if no parameter is set.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Renders `name=value` pairs joined with `;`, the form used inside a nested
/// `$expand`. Values are not percent-encoded.
impl fmt::Display for QueryParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.pairs.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            write!(f, "{}={}", key, value)?;
        }
        Ok(())
    }
}
