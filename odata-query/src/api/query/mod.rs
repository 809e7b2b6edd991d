//! Query builders for OData services.
//!
//! Both query kinds share one fragment model ([`QueryFragments`]) for
//! `$filter`, `$select` and `$expand`. Collection queries add paging,
//! counting, search and ordering through [`CollectionFragments`].
//!
//! # Traits
//!
//! - [`FragmentBuilder`] - the fluent mutators both query kinds share
//! - [`ODataQuery`] - parameter assembly and fetch
//!
//! # Example
//!
//! ```ignore
//! use odata_query::{FragmentBuilder, ODataQuery};
//!
//! let mut people = client.collection("/V4/TripPinServiceRW/People", options);
//! people
//!     .select("UserName,FirstName")?
//!     .filter("FirstName eq 'Scott'")
//!     .top(10)?
//!     .count();
//!
//! let response = people.fetch().await?;
//! ```

mod collection;
mod entity;
mod expand;
mod fragments;
mod order;
pub mod params;
pub(crate) mod url;

use async_trait::async_trait;

use crate::error::Error;
use crate::error::ValidationError;

pub use collection::CollectionFragments;
pub use collection::CollectionQuery;
pub use entity::EntityQuery;
pub use expand::Expand;
pub use fragments::QueryFragments;
pub use order::Direction;
pub use order::OrderBy;
pub use params::QueryParams;
pub use self::url::encode_query;
pub use self::url::escape_string;

/// Fluent mutators shared by every query kind.
///
/// Implementors only expose their [`QueryFragments`]; the mutators are
/// provided and return the query itself so calls can be chained. Mutators
/// that validate return `Err` and leave the query untouched on failure.
pub trait FragmentBuilder {
    /// Returns the accumulated fragments.
    fn fragments(&self) -> &QueryFragments;

    /// Returns the accumulated fragments for mutation.
    fn fragments_mut(&mut self) -> &mut QueryFragments;

    /// Selects fields from a comma separated list.
    ///
    /// See [`QueryFragments::select`].
    fn select(&mut self, fields: &str) -> Result<&mut Self, ValidationError> {
        self.fragments_mut().select(fields)?;
        Ok(self)
    }

    /// Selects fields from an already split list.
    fn select_list<I, S>(&mut self, fields: I) -> Result<&mut Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fragments_mut().select_list(fields)?;
        Ok(self)
    }

    /// Selects all fields (`$select=*`).
    fn select_all(&mut self) -> &mut Self {
        self.fragments_mut().select_all();
        self
    }

    /// Adds a raw filter expression.
    fn filter(&mut self, expression: impl Into<String>) -> &mut Self {
        self.fragments_mut().filter(expression);
        self
    }

    /// Adds an expand descriptor.
    fn expand(&mut self, expand: impl Into<Expand>) -> &mut Self {
        self.fragments_mut().expand(expand);
        self
    }
}

/// A query that can assemble its parameters and fetch.
///
/// `fetch` reads the fragments as they are at call time, so each call is
/// independent of earlier ones. It returns `Err` only when no HTTP response
/// was obtained; an undecodable body or a failed conversion yields a
/// response without data.
#[async_trait]
pub trait ODataQuery: Send + Sync {
    /// The response type produced by [`fetch`](Self::fetch).
    type Output: Send;

    /// Assembles the OData query parameters from the current fragments.
    fn queries(&self) -> QueryParams;

    /// Sends the query and parses the response.
    async fn fetch(&self) -> Result<Self::Output, Error>;
}
