//! OData query API

pub mod query;
