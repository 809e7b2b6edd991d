//! Single-entity query.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::ODataClient;
use crate::QueryOptions;
use crate::error::Error;
use crate::response::ODataResponse;

use super::FragmentBuilder;
use super::ODataQuery;
use super::fragments::QueryFragments;
use super::params::QueryParams;

/// Query for a single resource.
///
/// Use [`ODataClient::entity`] to create one.
///
/// # Example
///
/// ```ignore
/// use odata_query::{FragmentBuilder, ODataQuery, QueryOptions};
///
/// let mut person = client.entity(
///     "/V4/TripPinServiceRW/People('russellwhyte')",
///     QueryOptions::<Person>::deserialize(),
/// );
/// person.select("UserName,FirstName")?.expand("Friends");
///
/// let response = person.fetch().await?;
/// if let Some(person) = response.data() {
///     println!("{}", person.first_name);
/// }
/// ```
pub struct EntityQuery<T> {
    client: ODataClient,
    path: String,
    fragments: QueryFragments,
    options: Arc<QueryOptions<T>>,
}

impl<T> EntityQuery<T> {
    /// Creates a new entity query on a path.
    pub fn new(client: ODataClient, path: impl Into<String>, options: QueryOptions<T>) -> Self {
        Self {
            client,
            path: path.into(),
            fragments: QueryFragments::new(),
            options: Arc::new(options),
        }
    }

    /// Returns the resource path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the options.
    pub fn options(&self) -> &QueryOptions<T> {
        &self.options
    }
}

impl<T> FragmentBuilder for EntityQuery<T> {
    fn fragments(&self) -> &QueryFragments {
        &self.fragments
    }

    fn fragments_mut(&mut self) -> &mut QueryFragments {
        &mut self.fragments
    }
}

#[async_trait]
impl<T: Send + 'static> ODataQuery for EntityQuery<T> {
    type Output = ODataResponse<T>;

    fn queries(&self) -> QueryParams {
        self.fragments.queries()
    }

    async fn fetch(&self) -> Result<ODataResponse<T>, Error> {
        let (request, response) = self
            .client
            .dispatch(
                self.options.method(),
                &self.path,
                &self.queries(),
                self.options.request_body(),
            )
            .await?;

        Ok(ODataResponse::new(request, response, |json| {
            self.options.convert(json)
        }))
    }
}

impl<T> fmt::Debug for EntityQuery<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityQuery")
            .field("path", &self.path)
            .field("fragments", &self.fragments)
            .field("options", &self.options)
            .finish()
    }
}
