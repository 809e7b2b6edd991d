//! Fragment model shared by entity and collection queries.

use crate::error::ValidationError;

use super::expand::Expand;
use super::params;
use super::params::QueryParams;

/// Accumulated `$filter`, `$select` and `$expand` intent.
///
/// Each list behaves as a set: adding a value that is already present is a
/// no-op. Insertion order is kept so that the assembled query string is
/// stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryFragments {
    select: Vec<String>,
    filter: Vec<String>,
    expand: Vec<Expand>,
    select_all: bool,
}

impl QueryFragments {
    /// Creates an empty fragment set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects fields from a comma separated list, e.g. `"FirstName,LastName"`.
    ///
    /// Only `[A-Za-z0-9_]` and the separating comma are accepted. Fails if
    /// [`select_all`](Self::select_all) was already enabled.
    pub fn select(&mut self, fields: &str) -> Result<&mut Self, ValidationError> {
        if self.select_all {
            return Err(ValidationError::SelectAllConflict);
        }
        if let Some(character) = fields.chars().find(|c| !is_field_char(*c) && *c != ',') {
            return Err(ValidationError::invalid_field(fields, character));
        }
        let names: Vec<&str> = fields.split(',').collect();
        if names.iter().any(|name| name.is_empty()) {
            return Err(ValidationError::EmptyField {
                fields: fields.to_string(),
            });
        }
        self.select_list(names)
    }

    /// Selects fields from an already split list.
    ///
    /// Every name is validated before any of them is added.
    pub fn select_list<I, S>(&mut self, fields: I) -> Result<&mut Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.select_all {
            return Err(ValidationError::SelectAllConflict);
        }
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        for field in &fields {
            validate_field(field)?;
        }
        for field in fields {
            union(&mut self.select, field);
        }
        Ok(self)
    }

    /// Selects all fields (`$select=*`).
    ///
    /// Never fails, even when explicit fields were selected earlier. The
    /// wildcard wins when the query string is assembled.
    pub fn select_all(&mut self) -> &mut Self {
        self.select_all = true;
        self
    }

    /// Adds a raw filter expression, e.g. `"Age gt 30"`.
    pub fn filter(&mut self, expression: impl Into<String>) -> &mut Self {
        union(&mut self.filter, expression.into());
        self
    }

    /// Adds an expand descriptor.
    pub fn expand(&mut self, expand: impl Into<Expand>) -> &mut Self {
        union(&mut self.expand, expand.into());
        self
    }

    /// Returns the selected field names.
    pub fn selected(&self) -> &[String] {
        &self.select
    }

    /// Returns `true` if all fields are selected.
    pub fn is_select_all(&self) -> bool {
        self.select_all
    }

    /// Returns the filter expressions.
    pub fn filters(&self) -> &[String] {
        &self.filter
    }

    /// Returns the expand descriptors.
    pub fn expands(&self) -> &[Expand] {
        &self.expand
    }

    /// Returns `true` if nothing has been added.
    pub fn is_empty(&self) -> bool {
        self.select.is_empty() && self.filter.is_empty() && self.expand.is_empty() && !self.select_all
    }

    /// Assembles `$filter`, `$expand` and `$select`.
    pub fn queries(&self) -> QueryParams {
        let mut params = QueryParams::new();

        if !self.filter.is_empty() {
            params.insert(params::FILTER, self.filter.join(","));
        }

        if !self.expand.is_empty() {
            let clauses: Vec<_> = self.expand.iter().map(Expand::to_odata).collect();
            params.insert(params::EXPAND, clauses.join(","));
        }

        if self.select_all {
            params.insert(params::SELECT, "*");
        } else if !self.select.is_empty() {
            params.insert(params::SELECT, self.select.join(","));
        }

        params
    }
}

fn is_field_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn validate_field(field: &str) -> Result<(), ValidationError> {
    if field.is_empty() {
        return Err(ValidationError::EmptyField {
            fields: field.to_string(),
        });
    }
    match field.chars().find(|c| !is_field_char(*c)) {
        Some(character) => Err(ValidationError::invalid_field(field, character)),
        None => Ok(()),
    }
}

pub(crate) fn union<T: PartialEq>(set: &mut Vec<T>, item: T) {
    if !set.contains(&item) {
        set.push(item);
    }
}
