//! Fetch pipeline tests against an in-memory transport.

use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use odata_query::CollectionQueryOptions;
use odata_query::FragmentBuilder;
use odata_query::HttpRequest;
use odata_query::HttpResponse;
use odata_query::HttpTransport;
use odata_query::ODataClient;
use odata_query::ODataQuery;
use odata_query::QueryOptions;
use odata_query::api::query::Expand;
use odata_query::api::query::OrderBy;
use odata_query::error::ConvertError;
use odata_query::error::Error;
use odata_query::error::TransportError;
use reqwest::Method;
use reqwest::header::HeaderMap;
use serde::Deserialize;
use serde_json::Value;
use serde_json::json;

/// Replies with a fixed status and body and records every request.
#[derive(Clone)]
struct MockTransport {
    status: u16,
    body: String,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

impl MockTransport {
    fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        Ok(HttpResponse {
            status: self.status,
            headers: HeaderMap::new(),
            body: self.body.clone(),
        })
    }
}

/// Fails every request without a response.
struct DownTransport;

#[async_trait]
impl HttpTransport for DownTransport {
    async fn send(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
        Err(TransportError::other("connection refused"))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct Person {
    #[serde(rename = "UserName")]
    user_name: String,
    #[serde(rename = "Age", default)]
    age: Option<u32>,
}

fn client(transport: MockTransport) -> ODataClient {
    ODataClient::builder()
        .host("services.odata.org")
        .transport(transport)
        .build()
        .unwrap()
}

// =============================================================================
// Entity queries
// =============================================================================

mod entity {
    use super::*;

    #[tokio::test]
    async fn test_fetch_converts_payload() {
        let transport = MockTransport::new(
            200,
            r#"{"@odata.context":"$metadata#People/$entity","UserName":"russellwhyte","Age":31}"#,
        );
        let client = client(transport.clone());

        let mut query = client.entity(
            "/V4/TripPinServiceRW/People('russellwhyte')",
            QueryOptions::<Person>::deserialize(),
        );
        query.select("UserName,Age").unwrap();

        let response = query.fetch().await.unwrap();

        assert_eq!(
            response.data(),
            Some(&Person {
                user_name: "russellwhyte".to_string(),
                age: Some(31),
            })
        );
        assert_eq!(response.context(), Some("$metadata#People/$entity"));
        assert_eq!(response.status_code(), 200);
        assert_eq!(
            response.url().as_str(),
            "https://services.odata.org/V4/TripPinServiceRW/People('russellwhyte')?$select=UserName%2CAge"
        );

        let sent = transport.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method, Method::GET);
        assert_eq!(sent[0].url, *response.url());
        assert!(sent[0].body.is_none());
    }

    #[tokio::test]
    async fn test_malformed_body_resolves_without_data() {
        let transport = MockTransport::new(503, "Service Unavailable");
        let query = client(transport).entity("/People('x')", QueryOptions::<Person>::deserialize());

        let response = query.fetch().await.unwrap();

        assert!(response.data().is_none());
        assert!(response.json().is_empty());
        assert_eq!(response.status_code(), 503);
        assert_eq!(response.body(), "Service Unavailable");
        assert!(response.data_error().unwrap().is_decode());
    }

    #[tokio::test]
    async fn test_conversion_failure_keeps_json() {
        let transport = MockTransport::new(
            404,
            r#"{"error":{"code":"","message":"Resource not found"}}"#,
        );
        let query = client(transport).entity("/People('nobody')", QueryOptions::<Person>::deserialize());

        let response = query.fetch().await.unwrap();

        assert!(response.data().is_none());
        assert!(response.data_error().unwrap().is_convert());
        assert_eq!(
            response.json()["error"]["message"],
            json!("Resource not found")
        );
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn test_custom_converter_error() {
        let transport = MockTransport::new(200, r#"{"UserName":"x"}"#);
        let options = QueryOptions::new(|_: &Value| -> Result<Person, ConvertError> {
            Err(ConvertError::new("rejected"))
        });
        let response = client(transport).entity("/Me", options).fetch().await.unwrap();

        assert!(response.data().is_none());
        assert_eq!(response.json().len(), 1);
    }

    #[tokio::test]
    async fn test_headers_body_and_method() {
        let transport = MockTransport::new(200, r#"{"UserName":"new"}"#);
        let client = ODataClient::builder()
            .host("services.odata.org")
            .cookie("ASP.NET_SessionId=abc")
            .bearer_token("secret")
            .transport(transport.clone())
            .build()
            .unwrap();

        let options = QueryOptions::<Person>::deserialize()
            .with_method(Method::POST)
            .with_body(json!({"UserName": "new"}));
        client.entity("/People", options).fetch().await.unwrap();

        let sent = transport.requests().remove(0);
        assert_eq!(sent.method, Method::POST);
        assert_eq!(sent.body.as_deref(), Some(r#"{"UserName":"new"}"#));
        assert_eq!(sent.headers["Accept-Charset"], "utf-8");
        assert_eq!(sent.headers["Content-Type"], "application/json;odata=verbose");
        assert_eq!(sent.headers["Cookie"], "ASP.NET_SessionId=abc");
        assert_eq!(sent.headers["Authorization"], "Bearer secret");
    }

    #[tokio::test]
    async fn test_no_optional_headers_by_default() {
        let transport = MockTransport::new(200, "{}");
        let client = client(transport.clone());
        client
            .entity("/People", QueryOptions::<Person>::deserialize())
            .fetch()
            .await
            .unwrap();

        let sent = transport.requests().remove(0);
        assert!(!sent.headers.contains_key("Cookie"));
        assert!(!sent.headers.contains_key("Authorization"));
        assert!(sent.url.query().is_none());
    }

    #[tokio::test]
    async fn test_transport_failure_is_error() {
        let client = ODataClient::builder()
            .host("services.odata.org")
            .transport(DownTransport)
            .build()
            .unwrap();

        let result = client
            .entity("/People", QueryOptions::<Person>::deserialize())
            .fetch()
            .await;

        assert!(matches!(result, Err(Error::Transport(_))));
    }

    #[tokio::test]
    async fn test_each_fetch_reads_current_fragments() {
        let transport = MockTransport::new(200, r#"{"UserName":"x"}"#);
        let client = client(transport.clone());
        let mut query = client.entity("/People('x')", QueryOptions::<Person>::deserialize());

        query.fetch().await.unwrap();
        query.filter("Age gt 3").expand("Friends");
        query.fetch().await.unwrap();

        let sent = transport.requests();
        assert!(sent[0].url.query().is_none());
        assert_eq!(
            sent[1].url.query(),
            Some("$filter=Age%20gt%203&$expand=Friends")
        );
    }

    #[tokio::test]
    async fn test_concurrent_fetches_are_independent() {
        let transport = MockTransport::new(200, r#"{"UserName":"x"}"#);
        let client = client(transport.clone());
        let query = client.entity("/People('x')", QueryOptions::<Person>::deserialize());

        let results = futures::future::join_all((0..3).map(|_| query.fetch())).await;

        assert!(results.iter().all(|r| r.as_ref().unwrap().data().is_some()));
        assert_eq!(transport.requests().len(), 3);
    }
}

// =============================================================================
// Collection queries
// =============================================================================

mod collection {
    use super::*;

    #[tokio::test]
    async fn test_fetch_reads_count_and_context() {
        let transport = MockTransport::new(
            200,
            r#"{"@odata.context":"ctx","@odata.count":5,"value":[{"UserName":"a"},{"UserName":"b","Age":40}]}"#,
        );
        let client = client(transport.clone());

        let mut people = client.collection(
            "/V4/TripPinServiceRW/People",
            CollectionQueryOptions::<Person>::deserialize(),
        );
        people.top(2).unwrap().count();

        let response = people.fetch().await.unwrap();

        assert_eq!(response.count(), Some(5));
        assert_eq!(response.context(), Some("ctx"));
        assert_eq!(
            response.data().unwrap(),
            &vec![
                Person {
                    user_name: "a".to_string(),
                    age: None,
                },
                Person {
                    user_name: "b".to_string(),
                    age: Some(40),
                },
            ]
        );
        assert_eq!(
            transport.requests()[0].url.query(),
            Some("$top=2&$count=true")
        );
    }

    #[tokio::test]
    async fn test_full_query_string() {
        let transport = MockTransport::new(200, r#"{"value":[]}"#);
        let client = client(transport.clone());

        let mut people = client.collection("/People", CollectionQueryOptions::<Person>::deserialize());
        people
            .select("UserName,Age")
            .unwrap()
            .filter("Age gt 30")
            .expand(Expand::new("Trips"))
            .skip_and_top(10, 5)
            .unwrap()
            .search("blue")
            .order_by(OrderBy::desc("Age"))
            .count();

        let response = people.fetch().await.unwrap();

        assert_eq!(
            response.url().query(),
            Some(
                "$filter=Age%20gt%2030&$expand=Trips&$select=UserName%2CAge\
                 &$top=5&$skip=10&$search=blue&$count=true"
            )
        );
        assert!(response.data().unwrap().is_empty());
        assert!(!response.url().as_str().contains("orderby"));
    }

    #[tokio::test]
    async fn test_missing_value_array() {
        let transport = MockTransport::new(200, r#"{"@odata.context":"ctx"}"#);
        let response = client(transport)
            .collection("/People", CollectionQueryOptions::<Person>::deserialize())
            .fetch()
            .await
            .unwrap();

        assert!(response.data().is_none());
        assert!(response.data_error().unwrap().is_convert());
        assert_eq!(response.context(), Some("ctx"));
        assert_eq!(response.count(), None);
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let transport = MockTransport::new(500, "{not json");
        let response = client(transport)
            .collection("/People", CollectionQueryOptions::<Person>::deserialize())
            .fetch()
            .await
            .unwrap();

        assert!(response.data().is_none());
        assert!(response.json().is_empty());
        assert_eq!(response.status_code(), 500);
        assert_eq!(response.count(), None);
    }

    #[tokio::test]
    async fn test_next_link() {
        let transport = MockTransport::new(
            200,
            r#"{"value":[{"UserName":"a"}],"@odata.nextLink":"https://services.odata.org/People?$skiptoken=8"}"#,
        );
        let response = client(transport)
            .collection("/People", CollectionQueryOptions::<Person>::deserialize())
            .fetch()
            .await
            .unwrap();

        assert!(response.has_more());
        assert_eq!(
            response.next_link(),
            Some("https://services.odata.org/People?$skiptoken=8")
        );
        assert_eq!(response.len(), 1);
    }

    #[tokio::test]
    async fn test_rejected_mutations_leave_query_unchanged() {
        let transport = MockTransport::new(200, r#"{"value":[]}"#);
        let client = client(transport.clone());
        let mut people = client.collection("/People", CollectionQueryOptions::<Person>::deserialize());

        people.select_all();
        assert!(people.select("UserName").is_err());
        assert!(people.top(-1).is_err());

        let response = people.fetch().await.unwrap();
        assert_eq!(response.url().query(), Some("$select=%2A"));
    }
}
