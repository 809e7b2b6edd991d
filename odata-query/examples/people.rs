//! Lists people from the public TripPin sample service.
//!
//! Run with: cargo run --example people
//!
//! Optional .env overrides:
//! - ODATA_HOST (default `services.odata.org`)
//! - ODATA_PEOPLE_PATH (default `/V4/TripPinServiceRW/People`)

use std::env;

use odata_query::CollectionQueryOptions;
use odata_query::FragmentBuilder;
use odata_query::ODataClient;
use odata_query::ODataQuery;
use odata_query::api::query::Expand;
use serde::Deserialize;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

#[derive(Debug, Deserialize)]
struct Person {
    #[serde(rename = "UserName")]
    user_name: String,
    #[serde(rename = "FirstName")]
    first_name: String,
    #[serde(rename = "LastName")]
    last_name: String,
    #[serde(rename = "Trips", default)]
    trips: Vec<serde_json::Value>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    TermLogger::init(
        LevelFilter::Debug,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )?;

    let host = env::var("ODATA_HOST").unwrap_or_else(|_| "services.odata.org".to_string());
    let path = env::var("ODATA_PEOPLE_PATH")
        .unwrap_or_else(|_| "/V4/TripPinServiceRW/People".to_string());

    let client = ODataClient::builder().host(host).build()?;

    let mut people = client.collection(path, CollectionQueryOptions::<Person>::deserialize());
    people
        .select("UserName,FirstName,LastName")?
        .expand(Expand::nested("Trips", |q| {
            q.select("Name")?;
            Ok(())
        })?)
        .top(5)?
        .count();

    let response = people.fetch().await?;

    println!("HTTP {}", response.status_code());
    println!("Total people: {:?}", response.count());

    match response.data() {
        Some(people) => {
            for person in people {
                println!(
                    "{} ({} {}) - {} trips",
                    person.user_name,
                    person.first_name,
                    person.last_name,
                    person.trips.len()
                );
            }
        }
        None => println!("No data: {:?}", response.data_error()),
    }

    Ok(())
}
