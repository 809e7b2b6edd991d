//! Response wrappers for entity and collection fetches.

use reqwest::header::HeaderMap;
use serde_json::Map;
use serde_json::Value;
use url::Url;

use crate::error::ConvertError;
use crate::error::DataError;
use crate::transport::HttpRequest;
use crate::transport::HttpResponse;

const CONTEXT: &str = "@odata.context";
const COUNT: &str = "@odata.count";
const NEXT_LINK: &str = "@odata.nextLink";
const VALUE: &str = "value";

/// The result of a single-entity fetch.
///
/// `data` is absent when the body was not a JSON object or when the
/// conversion function failed; [`data_error`](Self::data_error) says which.
/// The status code is passed through untouched, so a non-success response
/// with a JSON error body still has its JSON available.
///
/// # Example
///
/// ```ignore
/// let response = query.fetch().await?;
///
/// match response.data() {
///     Some(person) => println!("{}", person.user_name),
///     None => eprintln!("HTTP {}: {:?}", response.status_code(), response.json()),
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ODataResponse<T> {
    request: HttpRequest,
    status: u16,
    headers: HeaderMap,
    body: String,
    json: Map<String, Value>,
    data: Option<T>,
    data_error: Option<DataError>,
    context: Option<String>,
}

impl<T> ODataResponse<T> {
    /// Decodes the raw response and converts the payload.
    pub(crate) fn new<F>(request: HttpRequest, response: HttpResponse, convert: F) -> Self
    where
        F: FnOnce(&Value) -> Result<T, ConvertError>,
    {
        let (json, outcome) = match decode_object(&response.body) {
            Ok(value) => {
                let outcome = convert(&value).map_err(DataError::from);
                (into_map(value), outcome)
            }
            Err(e) => (Map::new(), Err(e)),
        };

        let (data, data_error) = split_outcome(&request.url, outcome);

        Self {
            context: string_field(&json, CONTEXT),
            request,
            status: response.status,
            headers: response.headers,
            body: response.body,
            json,
            data,
            data_error,
        }
    }

    /// Returns the request that produced this response.
    pub fn request(&self) -> &HttpRequest {
        &self.request
    }

    /// Returns the final request URL.
    pub fn url(&self) -> &Url {
        &self.request.url
    }

    /// Returns the HTTP status code.
    pub fn status_code(&self) -> u16 {
        self.status
    }

    /// Returns `true` for a 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns the response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the raw response body.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Returns the decoded JSON object, empty if the body was not one.
    pub fn json(&self) -> &Map<String, Value> {
        &self.json
    }

    /// Returns the typed data, if decoding and conversion succeeded.
    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    /// Consumes the response and returns the typed data.
    pub fn into_data(self) -> Option<T> {
        self.data
    }

    /// Returns why [`data`](Self::data) is absent.
    pub fn data_error(&self) -> Option<&DataError> {
        self.data_error.as_ref()
    }

    /// Returns `@odata.context`, if present.
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// Maps the typed data using the provided function.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> ODataResponse<U> {
        ODataResponse {
            request: self.request,
            status: self.status,
            headers: self.headers,
            body: self.body,
            json: self.json,
            data: self.data.map(f),
            data_error: self.data_error,
            context: self.context,
        }
    }
}

/// The result of a collection fetch.
///
/// Carries everything [`ODataResponse`] does, with the converted `value`
/// array as data, plus `@odata.count` and `@odata.nextLink`.
#[derive(Debug, Clone)]
pub struct ODataCollectionResponse<T> {
    inner: ODataResponse<Vec<T>>,
    count: Option<u64>,
    next_link: Option<String>,
}

impl<T> ODataCollectionResponse<T> {
    /// Decodes the raw response and converts its `value` array.
    ///
    /// A payload without a `value` array counts as a conversion failure.
    pub(crate) fn new<F>(request: HttpRequest, response: HttpResponse, convert: F) -> Self
    where
        F: FnOnce(&[Value]) -> Result<Vec<T>, ConvertError>,
    {
        let inner = ODataResponse::new(request, response, |json| {
            let values = json
                .get(VALUE)
                .and_then(Value::as_array)
                .ok_or_else(|| ConvertError::new("payload has no `value` array"))?;
            convert(values)
        });

        Self {
            count: count_field(&inner.json),
            next_link: string_field(&inner.json, NEXT_LINK),
            inner,
        }
    }

    /// Returns the request that produced this response.
    pub fn request(&self) -> &HttpRequest {
        self.inner.request()
    }

    /// Returns the final request URL.
    pub fn url(&self) -> &Url {
        self.inner.url()
    }

    /// Returns the HTTP status code.
    pub fn status_code(&self) -> u16 {
        self.inner.status_code()
    }

    /// Returns `true` for a 2xx status.
    pub fn is_success(&self) -> bool {
        self.inner.is_success()
    }

    /// Returns the response headers.
    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    /// Returns the raw response body.
    pub fn body(&self) -> &str {
        self.inner.body()
    }

    /// Returns the decoded JSON object, empty if the body was not one.
    pub fn json(&self) -> &Map<String, Value> {
        self.inner.json()
    }

    /// Returns the converted records, if decoding and conversion succeeded.
    pub fn data(&self) -> Option<&Vec<T>> {
        self.inner.data()
    }

    /// Consumes the response and returns the converted records.
    pub fn into_data(self) -> Option<Vec<T>> {
        self.inner.into_data()
    }

    /// Returns why [`data`](Self::data) is absent.
    pub fn data_error(&self) -> Option<&DataError> {
        self.inner.data_error()
    }

    /// Returns `@odata.context`, if present.
    pub fn context(&self) -> Option<&str> {
        self.inner.context()
    }

    /// Returns the total count (`@odata.count`), if the service sent one.
    ///
    /// Requires [`count`](crate::api::query::CollectionQuery::count) on the
    /// query for most services.
    pub fn count(&self) -> Option<u64> {
        self.count
    }

    /// Returns `@odata.nextLink`, if more results are available.
    pub fn next_link(&self) -> Option<&str> {
        self.next_link.as_deref()
    }

    /// Returns `true` if the service announced another page.
    pub fn has_more(&self) -> bool {
        self.next_link.is_some()
    }

    /// Returns the number of converted records, zero if there are none.
    pub fn len(&self) -> usize {
        self.data().map_or(0, Vec::len)
    }

    /// Returns `true` if no records were converted.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Decodes a body that must be a JSON object.
fn decode_object(body: &str) -> Result<Value, DataError> {
    match serde_json::from_str::<Value>(body) {
        Ok(value @ Value::Object(_)) => Ok(value),
        Ok(other) => Err(DataError::Decode(format!(
            "expected an object, got {}",
            kind(&other)
        ))),
        Err(e) => Err(DataError::Decode(e.to_string())),
    }
}

fn into_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn split_outcome<T>(url: &Url, outcome: Result<T, DataError>) -> (Option<T>, Option<DataError>) {
    match outcome {
        Ok(data) => (Some(data), None),
        Err(e) => {
            log::warn!("{}: {}", url, e);
            (None, Some(e))
        }
    }
}

fn string_field(json: &Map<String, Value>, key: &str) -> Option<String> {
    json.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Reads `@odata.count`, which some services send as a string.
fn count_field(json: &Map<String, Value>) -> Option<u64> {
    let count = json.get(COUNT)?;
    count
        .as_u64()
        .or_else(|| count.as_str().and_then(|s| s.parse().ok()))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
