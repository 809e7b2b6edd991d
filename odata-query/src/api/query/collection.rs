//! Collection query: paging, counting, search and ordering on top of the
//! shared fragments.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::CollectionQueryOptions;
use crate::ODataClient;
use crate::error::Error;
use crate::error::ValidationError;
use crate::response::ODataCollectionResponse;

use super::FragmentBuilder;
use super::ODataQuery;
use super::fragments::QueryFragments;
use super::fragments::union;
use super::order::OrderBy;
use super::params;
use super::params::QueryParams;

/// Collection-only fragments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionFragments {
    top: Option<u64>,
    skip: Option<u64>,
    count: bool,
    order_by: Vec<OrderBy>,
    search: Option<String>,
}

impl CollectionFragments {
    /// Creates empty collection fragments.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `$top`, replacing any earlier value.
    pub fn top(&mut self, n: i64) -> Result<&mut Self, ValidationError> {
        self.top = Some(non_negative(params::TOP, n)?);
        Ok(self)
    }

    /// Sets `$skip`, replacing any earlier value.
    pub fn skip(&mut self, n: i64) -> Result<&mut Self, ValidationError> {
        self.skip = Some(non_negative(params::SKIP, n)?);
        Ok(self)
    }

    /// Sets `$skip` and `$top` together.
    ///
    /// Both values are checked before either is stored.
    pub fn skip_and_top(&mut self, skip: i64, top: i64) -> Result<&mut Self, ValidationError> {
        let skip = non_negative(params::SKIP, skip)?;
        let top = non_negative(params::TOP, top)?;
        self.skip = Some(skip);
        self.top = Some(top);
        Ok(self)
    }

    /// Requests the total count (`$count=true`).
    pub fn count(&mut self) -> &mut Self {
        self.count = true;
        self
    }

    /// Adds an ordering fragment.
    pub fn order_by(&mut self, order: OrderBy) -> &mut Self {
        union(&mut self.order_by, order);
        self
    }

    /// Sets the free-text `$search`, replacing any earlier value.
    pub fn search(&mut self, text: impl Into<String>) -> &mut Self {
        self.search = Some(text.into());
        self
    }

    /// Returns `$top`, if set.
    pub fn top_value(&self) -> Option<u64> {
        self.top
    }

    /// Returns `$skip`, if set.
    pub fn skip_value(&self) -> Option<u64> {
        self.skip
    }

    /// Returns `true` if the total count is requested.
    pub fn is_count(&self) -> bool {
        self.count
    }

    /// Returns the search text, if set.
    pub fn search_text(&self) -> Option<&str> {
        self.search.as_deref()
    }

    /// Returns the accumulated ordering fragments.
    ///
    /// These are kept for inspection but are not written to the query
    /// string: no `$orderby` parameter is ever emitted.
    pub fn order_by_fragments(&self) -> &[OrderBy] {
        &self.order_by
    }

    /// Appends `$top`, `$skip`, `$search` and `$count`, in that order.
    pub fn extend_queries(&self, params: &mut QueryParams) {
        if let Some(top) = self.top {
            params.insert(params::TOP, top.to_string());
        }

        if let Some(skip) = self.skip {
            params.insert(params::SKIP, skip.to_string());
        }

        if let Some(ref search) = self.search {
            params.insert(params::SEARCH, search.clone());
        }

        if self.count {
            params.insert(params::COUNT, "true");
        }
    }
}

fn non_negative(parameter: &'static str, n: i64) -> Result<u64, ValidationError> {
    u64::try_from(n).map_err(|_| ValidationError::negative(parameter, n))
}

/// Query for a set of resources.
///
/// Use [`ODataClient::collection`] to create one. The conversion function of
/// its [`CollectionQueryOptions`] runs on the payload's `value` array.
///
/// # Example
///
/// ```ignore
/// use odata_query::{CollectionQueryOptions, FragmentBuilder, ODataQuery};
///
/// let mut airlines = client.collection(
///     "/V4/TripPinServiceRW/Airlines",
///     CollectionQueryOptions::<Airline>::deserialize(),
/// );
/// airlines.select("AirlineCode,Name")?.skip_and_top(0, 20)?.count();
///
/// let response = airlines.fetch().await?;
/// println!("{:?} airlines in total", response.count());
/// ```
pub struct CollectionQuery<T> {
    client: ODataClient,
    path: String,
    fragments: QueryFragments,
    collection: CollectionFragments,
    options: Arc<CollectionQueryOptions<T>>,
}

impl<T> CollectionQuery<T> {
    /// Creates a new collection query on a path.
    pub fn new(
        client: ODataClient,
        path: impl Into<String>,
        options: CollectionQueryOptions<T>,
    ) -> Self {
        Self {
            client,
            path: path.into(),
            fragments: QueryFragments::new(),
            collection: CollectionFragments::new(),
            options: Arc::new(options),
        }
    }

    /// Limits the number of returned records.
    pub fn top(&mut self, n: i64) -> Result<&mut Self, ValidationError> {
        self.collection.top(n)?;
        Ok(self)
    }

    /// Skips the first `n` records.
    pub fn skip(&mut self, n: i64) -> Result<&mut Self, ValidationError> {
        self.collection.skip(n)?;
        Ok(self)
    }

    /// Sets skip and top at once; nothing changes if either is negative.
    pub fn skip_and_top(&mut self, skip: i64, top: i64) -> Result<&mut Self, ValidationError> {
        self.collection.skip_and_top(skip, top)?;
        Ok(self)
    }

    /// Requests the total count of matching records.
    pub fn count(&mut self) -> &mut Self {
        self.collection.count();
        self
    }

    /// Adds an ordering fragment. See
    /// [`CollectionFragments::order_by_fragments`].
    pub fn order_by(&mut self, order: OrderBy) -> &mut Self {
        self.collection.order_by(order);
        self
    }

    /// Sets the free-text search.
    pub fn search(&mut self, text: impl Into<String>) -> &mut Self {
        self.collection.search(text);
        self
    }

    /// Returns the collection-only fragments.
    pub fn collection_fragments(&self) -> &CollectionFragments {
        &self.collection
    }

    /// Returns the resource path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the options.
    pub fn options(&self) -> &CollectionQueryOptions<T> {
        &self.options
    }
}

impl<T> FragmentBuilder for CollectionQuery<T> {
    fn fragments(&self) -> &QueryFragments {
        &self.fragments
    }

    fn fragments_mut(&mut self) -> &mut QueryFragments {
        &mut self.fragments
    }
}

#[async_trait]
impl<T: Send + 'static> ODataQuery for CollectionQuery<T> {
    type Output = ODataCollectionResponse<T>;

    fn queries(&self) -> QueryParams {
        let mut params = self.fragments.queries();
        self.collection.extend_queries(&mut params);
        params
    }

    async fn fetch(&self) -> Result<ODataCollectionResponse<T>, Error> {
        let (request, response) = self
            .client
            .dispatch(
                self.options.method(),
                &self.path,
                &self.queries(),
                self.options.request_body(),
            )
            .await?;

        Ok(ODataCollectionResponse::new(request, response, |values| {
            self.options.convert(values)
        }))
    }
}

impl<T> fmt::Debug for CollectionQuery<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionQuery")
            .field("path", &self.path)
            .field("fragments", &self.fragments)
            .field("collection", &self.collection)
            .field("options", &self.options)
            .finish()
    }
}
