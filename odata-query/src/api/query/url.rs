//! Request target and query string generation.

use url::Url;

use crate::error::Error;

use super::params::QueryParams;

/// Escapes a string for use as an OData string literal.
///
/// OData strings are enclosed in single quotes, with internal single quotes
/// doubled.
///
/// ```
/// use odata_query::api::query::escape_string;
///
/// let filter = format!("LastName eq {}", escape_string("O'Brien"));
/// assert_eq!(filter, "LastName eq 'O''Brien'");
/// ```
pub fn escape_string(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Encodes parameters as a query string.
///
/// Names are written as is (`$filter`), values are percent-encoded.
pub fn encode_query(params: &QueryParams) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Builds the `https` request target from a host, a path and the parameters.
pub(crate) fn build_target(host: &str, path: &str, params: &QueryParams) -> Result<Url, Error> {
    let host = host.trim_start_matches("https://").trim_end_matches('/');
    if host.is_empty() {
        return Err(Error::InvalidUrl("empty host".to_string()));
    }

    let mut url = Url::parse(&format!("https://{}", host))
        .map_err(|e| Error::InvalidUrl(format!("{}: {}", host, e)))?;
    if url.path() != "/" || url.query().is_some() {
        return Err(Error::InvalidUrl(format!(
            "host must not carry a path or query: {}",
            host
        )));
    }

    url.set_path(path);
    if !params.is_empty() {
        url.set_query(Some(&encode_query(params)));
    }

    Ok(url)
}
