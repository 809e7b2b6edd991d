//! Validation error types

/// Errors raised synchronously by query builder mutators.
///
/// A mutator that returns one of these leaves the builder untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A paging parameter (`$top` / `$skip`) was negative.
    #[error("{parameter} must not be negative, got {value}")]
    Negative {
        /// Wire name of the parameter.
        parameter: &'static str,
        /// The rejected value.
        value: i64,
    },

    /// A select field contains a character outside `[A-Za-z0-9_]`.
    #[error("Invalid character {character:?} in select field '{field}'")]
    InvalidField {
        /// The offending field (or comma separated list) as given.
        field: String,
        /// The first disallowed character.
        character: char,
    },

    /// A select list contained an empty field name.
    #[error("Empty field name in select list '{fields}'")]
    EmptyField {
        /// The select input as given.
        fields: String,
    },

    /// Explicit fields were selected after `select_all()`.
    #[error("Cannot select explicit fields when all fields are already selected")]
    SelectAllConflict,
}

impl ValidationError {
    /// Creates a new negative value error.
    pub fn negative(parameter: &'static str, value: i64) -> Self {
        Self::Negative { parameter, value }
    }

    /// Creates a new invalid field error.
    pub fn invalid_field(field: impl Into<String>, character: char) -> Self {
        Self::InvalidField {
            field: field.into(),
            character,
        }
    }
}
