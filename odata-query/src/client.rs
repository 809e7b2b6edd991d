//! Main ODataClient

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use reqwest::Method;
use reqwest::header;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderValue;
use serde_json::Value;

use crate::CollectionQueryOptions;
use crate::QueryOptions;
use crate::api::query::CollectionQuery;
use crate::api::query::EntityQuery;
use crate::api::query::QueryParams;
use crate::api::query::url::build_target;
use crate::error::Error;
use crate::transport::HttpRequest;
use crate::transport::HttpResponse;
use crate::transport::HttpTransport;
use crate::transport::ReqwestTransport;

/// Client for an OData service.
///
/// Holds the service host, the optional cookie and bearer token, and the
/// transport. Queries are created from it with [`entity`](Self::entity) and
/// [`collection`](Self::collection).
///
/// This client is cheap to clone (uses `Arc` internally) and can be shared
/// across threads safely.
///
/// # Example
///
/// ```ignore
/// use odata_query::{CollectionQueryOptions, ODataClient, ODataQuery};
///
/// let client = ODataClient::builder()
///     .host("services.odata.org")
///     .build()?;
///
/// let mut people = client.collection(
///     "/V4/TripPinServiceRW/People",
///     CollectionQueryOptions::<serde_json::Value>::deserialize(),
/// );
/// people.top(5)?;
///
/// let response = people.fetch().await?;
/// println!("{} people", response.data().map_or(0, Vec::len));
/// ```
#[derive(Clone)]
pub struct ODataClient {
    inner: Arc<ODataClientInner>,
}

struct ODataClientInner {
    host: String,
    cookie: Option<String>,
    bearer_token: Option<String>,
    headers: HeaderMap,
    transport: Arc<dyn HttpTransport>,
}

impl ODataClient {
    /// Creates a new builder for constructing a client.
    pub fn builder() -> ODataClientBuilder<Missing> {
        ODataClientBuilder::new()
    }

    /// Returns the service host.
    pub fn host(&self) -> &str {
        &self.inner.host
    }

    /// Returns the cookie sent with every request, if any.
    pub fn cookie(&self) -> Option<&str> {
        self.inner.cookie.as_deref()
    }

    /// Returns the bearer token sent with every request, if any.
    pub fn bearer_token(&self) -> Option<&str> {
        self.inner.bearer_token.as_deref()
    }

    /// Returns the headers sent with every request.
    pub fn headers(&self) -> &HeaderMap {
        &self.inner.headers
    }

    /// Creates a single-entity query on a path.
    pub fn entity<T>(&self, path: impl Into<String>, options: QueryOptions<T>) -> EntityQuery<T> {
        EntityQuery::new(self.clone(), path, options)
    }

    /// Creates a collection query on a path.
    pub fn collection<T>(
        &self,
        path: impl Into<String>,
        options: CollectionQueryOptions<T>,
    ) -> CollectionQuery<T> {
        CollectionQuery::new(self.clone(), path, options)
    }

    /// Builds the request and sends it through the transport.
    ///
    /// Fails only if the target cannot be built or the transport returns no
    /// response.
    pub(crate) async fn dispatch(
        &self,
        method: &Method,
        path: &str,
        params: &QueryParams,
        body: Option<&Value>,
    ) -> Result<(HttpRequest, HttpResponse), Error> {
        let url = build_target(&self.inner.host, path, params)?;
        let request = HttpRequest {
            method: method.clone(),
            url,
            headers: self.inner.headers.clone(),
            body: stringify_body(body),
        };

        log::debug!("{} {}", request.method, request.url);

        let response = self.inner.transport.send(request.clone()).await.map_err(|e| {
            log::debug!("{} {} failed: {}", request.method, request.url, e);
            e
        })?;

        log::debug!(
            "{} {} -> {} ({} bytes)",
            request.method,
            request.url,
            response.status,
            response.body.len()
        );

        Ok((request, response))
    }
}

impl fmt::Debug for ODataClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ODataClient")
            .field("host", &self.inner.host)
            .field("cookie", &self.inner.cookie.as_ref().map(|_| "<set>"))
            .field("bearer_token", &self.inner.bearer_token.as_ref().map(|_| "<set>"))
            .finish_non_exhaustive()
    }
}

/// Turns the configured body into the outgoing text.
///
/// JSON strings are sent verbatim, `null` means no body, anything else is
/// sent as its JSON text.
fn stringify_body(body: Option<&Value>) -> Option<String> {
    match body? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn default_headers(cookie: Option<&str>, bearer_token: Option<&str>) -> Result<HeaderMap, Error> {
    let mut headers = HeaderMap::new();
    headers.insert(header::ACCEPT_CHARSET, HeaderValue::from_static("utf-8"));
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json;odata=verbose"),
    );

    if let Some(cookie) = cookie {
        let value = HeaderValue::from_str(cookie).map_err(|_| Error::InvalidHeader("Cookie"))?;
        headers.insert(header::COOKIE, value);
    }

    if let Some(token) = bearer_token {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| Error::InvalidHeader("Authorization"))?;
        value.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, value);
    }

    Ok(headers)
}

// =============================================================================
// Typestate Builder
// =============================================================================

/// Marker type for missing required builder fields.
pub struct Missing;

/// Marker type for set builder fields.
pub struct Set<T>(T);

/// Builder for constructing an [`ODataClient`].
///
/// Uses the typestate pattern to ensure the host is set at compile time.
///
/// # Required Fields
///
/// - `host` - The service host, e.g. `services.odata.org`
///
/// # Example
///
/// ```ignore
/// let client = ODataClient::builder()
///     .host("services.odata.org")
///     .bearer_token(token)
///     .timeout(Duration::from_secs(30))
///     .build()?;
/// ```
pub struct ODataClientBuilder<Host> {
    host: Host,
    cookie: Option<String>,
    bearer_token: Option<String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    http_client: Option<Client>,
    transport: Option<Arc<dyn HttpTransport>>,
}

impl ODataClientBuilder<Missing> {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            host: Missing,
            cookie: None,
            bearer_token: None,
            timeout: None,
            connect_timeout: None,
            http_client: None,
            transport: None,
        }
    }

    /// Sets the service host.
    ///
    /// Requests always use `https`. A leading `https://` is accepted and
    /// ignored; a port may be included.
    pub fn host(self, host: impl Into<String>) -> ODataClientBuilder<Set<String>> {
        ODataClientBuilder {
            host: Set(host.into()),
            cookie: self.cookie,
            bearer_token: self.bearer_token,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            http_client: self.http_client,
            transport: self.transport,
        }
    }
}

impl Default for ODataClientBuilder<Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> ODataClientBuilder<H> {
    /// Sets the `Cookie` header sent with every request.
    pub fn cookie(mut self, cookie: impl Into<String>) -> Self {
        self.cookie = Some(cookie.into());
        self
    }

    /// Sets the bearer token sent as `Authorization: Bearer <token>`.
    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Sets the request timeout of the default transport.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connection timeout of the default transport.
    ///
    /// This is applied when building the HTTP client.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets a custom HTTP client for the default transport.
    pub fn http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Replaces the default `reqwest` transport.
    ///
    /// When set, `timeout`, `connect_timeout` and `http_client` are ignored.
    pub fn transport<T: HttpTransport + 'static>(mut self, transport: T) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }
}

impl ODataClientBuilder<Set<String>> {
    /// Builds the [`ODataClient`].
    ///
    /// This method is only available once `host` has been set. Fails if the
    /// cookie or token cannot be sent as a header, or the HTTP client cannot
    /// be created.
    pub fn build(self) -> Result<ODataClient, Error> {
        let headers = default_headers(self.cookie.as_deref(), self.bearer_token.as_deref())?;

        let transport = match self.transport {
            Some(transport) => transport,
            None => {
                let client = match self.http_client {
                    Some(client) => client,
                    None => {
                        let mut builder = Client::builder();
                        if let Some(timeout) = self.connect_timeout {
                            builder = builder.connect_timeout(timeout);
                        }
                        builder.build()?
                    }
                };
                let mut transport = ReqwestTransport::new(client);
                if let Some(timeout) = self.timeout {
                    transport = transport.with_timeout(timeout);
                }
                Arc::new(transport)
            }
        };

        Ok(ODataClient {
            inner: Arc::new(ODataClientInner {
                host: self.host.0,
                cookie: self.cookie,
                bearer_token: self.bearer_token,
                headers,
                transport,
            }),
        })
    }
}
