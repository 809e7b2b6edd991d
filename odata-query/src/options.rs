//! Per-query options: method, body and conversion function.

use std::fmt;
use std::sync::Arc;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ConvertError;

type EntityConverter<T> = dyn Fn(&Value) -> Result<T, ConvertError> + Send + Sync;
type CollectionConverter<T> = dyn Fn(&[Value]) -> Result<Vec<T>, ConvertError> + Send + Sync;

/// Options for a single-entity query.
///
/// Options are configured once, then handed to a query which keeps them behind
/// an `Arc` and reuses them for every fetch.
///
/// # Example
///
/// ```
/// use odata_query::QueryOptions;
/// use serde_json::Value;
///
/// let options = QueryOptions::new(|json: &Value| {
///     json.get("UserName")
///         .and_then(Value::as_str)
///         .map(str::to_string)
///         .ok_or_else(|| odata_query::error::ConvertError::new("missing UserName"))
/// });
/// ```
pub struct QueryOptions<T> {
    method: Method,
    request_body: Option<Value>,
    convert: Arc<EntityConverter<T>>,
}

impl<T> QueryOptions<T> {
    /// Creates options with the given conversion function and a GET method.
    pub fn new<F>(convert: F) -> Self
    where
        F: Fn(&Value) -> Result<T, ConvertError> + Send + Sync + 'static,
    {
        Self {
            method: Method::GET,
            request_body: None,
            convert: Arc::new(convert),
        }
    }

    /// Sets the HTTP method.
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets the request body.
    pub fn with_body(mut self, body: impl Into<Value>) -> Self {
        self.request_body = Some(body.into());
        self
    }

    /// Returns the HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request body, if any.
    pub fn request_body(&self) -> Option<&Value> {
        self.request_body.as_ref()
    }

    /// Runs the conversion function on a decoded payload.
    pub fn convert(&self, json: &Value) -> Result<T, ConvertError> {
        (self.convert)(json)
    }
}

impl<T: DeserializeOwned> QueryOptions<T> {
    /// Creates options that deserialize the payload with serde.
    pub fn deserialize() -> Self {
        Self::new(|json| Ok(T::deserialize(json)?))
    }
}

impl<T> Clone for QueryOptions<T> {
    fn clone(&self) -> Self {
        Self {
            method: self.method.clone(),
            request_body: self.request_body.clone(),
            convert: Arc::clone(&self.convert),
        }
    }
}

impl<T> fmt::Debug for QueryOptions<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryOptions")
            .field("method", &self.method)
            .field("request_body", &self.request_body)
            .finish_non_exhaustive()
    }
}

/// Options for a collection query.
///
/// The conversion function receives the elements of the payload's `value`
/// array and produces the typed sequence.
pub struct CollectionQueryOptions<T> {
    method: Method,
    request_body: Option<Value>,
    convert: Arc<CollectionConverter<T>>,
}

impl<T> CollectionQueryOptions<T> {
    /// Creates options with the given conversion function and a GET method.
    pub fn new<F>(convert: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Vec<T>, ConvertError> + Send + Sync + 'static,
    {
        Self {
            method: Method::GET,
            request_body: None,
            convert: Arc::new(convert),
        }
    }

    /// Creates options from a per-element conversion function.
    ///
    /// The first failing element fails the whole sequence.
    pub fn each<F>(convert: F) -> Self
    where
        F: Fn(&Value) -> Result<T, ConvertError> + Send + Sync + 'static,
    {
        Self::new(move |values| values.iter().map(&convert).collect())
    }

    /// Sets the HTTP method.
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets the request body.
    pub fn with_body(mut self, body: impl Into<Value>) -> Self {
        self.request_body = Some(body.into());
        self
    }

    /// Returns the HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request body, if any.
    pub fn request_body(&self) -> Option<&Value> {
        self.request_body.as_ref()
    }

    /// Runs the conversion function on the `value` array of a payload.
    pub fn convert(&self, values: &[Value]) -> Result<Vec<T>, ConvertError> {
        (self.convert)(values)
    }
}

impl<T: DeserializeOwned> CollectionQueryOptions<T> {
    /// Creates options that deserialize every element with serde.
    pub fn deserialize() -> Self {
        Self::each(|json| Ok(T::deserialize(json)?))
    }
}

impl<T> Clone for CollectionQueryOptions<T> {
    fn clone(&self) -> Self {
        Self {
            method: self.method.clone(),
            request_body: self.request_body.clone(),
            convert: Arc::clone(&self.convert),
        }
    }
}

impl<T> fmt::Debug for CollectionQueryOptions<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionQueryOptions")
            .field("method", &self.method)
            .field("request_body", &self.request_body)
            .finish_non_exhaustive()
    }
}
