//! OData query client library
//!
//! A Rust async client for OData-style HTTP services: build `$filter`,
//! `$select`, `$expand`, paging, search and count parameters fluently, fetch,
//! and get back a typed payload together with the raw JSON, status code and
//! request echo.

pub mod api;
pub mod error;

mod client;
mod options;
mod response;
mod transport;

pub use api::query::CollectionQuery;
pub use api::query::EntityQuery;
pub use api::query::FragmentBuilder;
pub use api::query::ODataQuery;
pub use client::*;
pub use options::CollectionQueryOptions;
pub use options::QueryOptions;
pub use response::ODataCollectionResponse;
pub use response::ODataResponse;
pub use transport::HttpRequest;
pub use transport::HttpResponse;
pub use transport::HttpTransport;
pub use transport::ReqwestTransport;
