//! Integration tests against a live OData service.
//!
//! These tests hit the network and are ignored by default. To run them,
//! create a `.env` file in the odata-query directory with:
//!
//! ```env
//! ODATA_HOST=services.odata.org
//! ODATA_PEOPLE_PATH=/V4/TripPinServiceRW/People
//! # Optional
//! ODATA_BEARER_TOKEN=your-token
//! ```
//!
//! Then run: `cargo test -p odata-query -- --ignored`

use std::env;
use std::time::Duration;

use odata_query::CollectionQueryOptions;
use odata_query::ODataClient;
use odata_query::ODataQuery;
use odata_query::QueryOptions;
use serde_json::Value;

fn load_env() -> Option<(ODataClient, String)> {
    let _ = dotenvy::dotenv();

    let host = env::var("ODATA_HOST").ok()?;
    let path = env::var("ODATA_PEOPLE_PATH").ok()?;

    let mut builder = ODataClient::builder()
        .host(host)
        .timeout(Duration::from_secs(30));
    if let Ok(token) = env::var("ODATA_BEARER_TOKEN") {
        builder = builder.bearer_token(token);
    }

    let client = builder.build().expect("Failed to build client");
    Some((client, path))
}

#[tokio::test]
#[ignore = "requires a live OData service configured in .env"]
async fn test_collection_with_count() {
    let (client, path) = load_env().expect("Missing required environment variables. See module docs.");

    let mut people = client.collection(path, CollectionQueryOptions::<Value>::deserialize());
    people.top(3).unwrap().count();

    let response = people.fetch().await.expect("Request failed");

    assert!(response.is_success(), "HTTP {}", response.status_code());
    assert!(response.data().is_some(), "{:?}", response.data_error());
    assert!(response.len() <= 3);
    assert!(response.context().is_some());

    println!("Fetched {} of {:?} records", response.len(), response.count());
}

#[tokio::test]
#[ignore = "requires a live OData service configured in .env"]
async fn test_first_entity_by_key() {
    let (client, path) = load_env().expect("Missing required environment variables. See module docs.");

    let mut people = client.collection(path.clone(), CollectionQueryOptions::<Value>::deserialize());
    people.top(1).unwrap();
    let first = people
        .fetch()
        .await
        .expect("Request failed")
        .into_data()
        .and_then(|mut values| values.pop())
        .expect("Service returned no records");

    let key = first
        .get("UserName")
        .and_then(Value::as_str)
        .expect("Record has no UserName");

    let response = client
        .entity(format!("{}('{}')", path, key), QueryOptions::<Value>::deserialize())
        .fetch()
        .await
        .expect("Request failed");

    assert!(response.is_success(), "HTTP {}", response.status_code());
    assert_eq!(
        response.data().and_then(|v| v.get("UserName")),
        first.get("UserName")
    );
}
