/// End-to-end tests for the HTTP surface.
///
/// Each test binds a server on an ephemeral port, backed by the in-memory
/// store, and talks to it over real HTTP. No database is needed.
///
/// Run with: cargo test --test api_http

use climate_service::config::ApiSettings;
use climate_service::endpoint::EndpointServer;
use climate_service::model::{Measurement, Station};
use climate_service::store::{MemoryStore, MemoryStoreProvider};
use serde_json::{json, Value};
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

fn station(id: &str, name: &str) -> Station {
    Station {
        station: id.to_string(),
        name: name.to_string(),
        latitude: 21.3,
        longitude: -157.8,
        elevation: 10.0,
    }
}

fn measurement(station: &str, date: &str, prcp: Option<f64>, tobs: f64) -> Measurement {
    Measurement {
        station: station.to_string(),
        date: date.to_string(),
        prcp,
        tobs,
    }
}

fn test_store() -> MemoryStore {
    MemoryStore::new(
        vec![
            measurement("USC00519281", "2015-06-01", Some(0.1), 70.0),
            measurement("USC00519281", "2016-09-01", Some(0.2), 75.0),
            measurement("USC00519397", "2016-09-01", None, 80.0),
            measurement("USC00519281", "2017-03-01", Some(0.0), 66.0),
            measurement("USC00519397", "2017-08-23", Some(0.5), 83.0),
        ],
        vec![
            station("USC00519397", "WAIKIKI 717.2, HI US"),
            station("USC00519281", "WAIHEE 837.5, HI US"),
        ],
    )
}

/// Starts a server in the background and returns its base URL.
fn spawn_server(settings: ApiSettings) -> String {
    let provider = Arc::new(MemoryStoreProvider::new(test_store()));
    let server =
        EndpointServer::bind("127.0.0.1:0", 2, provider, settings).expect("bind test server");
    let addr = server.local_addr().expect("server should listen on TCP");

    std::thread::spawn(move || server.serve());
    format!("http://{}", addr)
}

fn get_json(base: &str, path: &str) -> (u16, Value) {
    let response =
        reqwest::blocking::get(format!("{}{}", base, path)).expect("request should succeed");
    let status = response.status().as_u16();
    let body: Value = response.json().expect("body should be JSON");
    (status, body)
}

// ---------------------------------------------------------------------------
// Routes
// ---------------------------------------------------------------------------

#[test]
fn test_home_is_html_route_listing() {
    let base = spawn_server(ApiSettings::default());
    let response = reqwest::blocking::get(format!("{}/", base)).unwrap();

    assert_eq!(response.status().as_u16(), 200);
    let content_type = response.headers()["content-type"].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/html"), "unexpected content type {}", content_type);

    let text = response.text().unwrap();
    assert!(text.contains("/api/v1.0/precipitation"));
    assert!(text.contains("/api/v1.0/tobs"));
}

#[test]
fn test_precipitation_over_http() {
    let base = spawn_server(ApiSettings::default());
    let (status, body) = get_json(&base, "/api/v1.0/precipitation");

    assert_eq!(status, 200);
    assert_eq!(body, json!({
        "2016-09-01": [0.2, null],
        "2017-03-01": [0.0],
        "2017-08-23": [0.5],
    }));
}

#[test]
fn test_stations_over_http() {
    let base = spawn_server(ApiSettings::default());
    let (status, body) = get_json(&base, "/api/v1.0/stations");

    assert_eq!(status, 200);
    assert_eq!(body, json!([
        ["USC00519397", "WAIKIKI 717.2, HI US"],
        ["USC00519281", "WAIHEE 837.5, HI US"],
    ]));
}

#[test]
fn test_tobs_over_http() {
    let base = spawn_server(ApiSettings::default());
    let (_, body) = get_json(&base, "/api/v1.0/tobs");

    // USC00519281 has 3 rows; 2 fall inside the window starting 2016-08-23
    assert_eq!(body, json!([75.0, 66.0]));
}

#[test]
fn test_temperature_stats_over_http() {
    let base = spawn_server(ApiSettings::default());

    let (status, body) = get_json(&base, "/api/v1.0/2016-09-01");
    assert_eq!(status, 200);
    let stats = body.as_array().unwrap();
    let values: Vec<f64> = stats.iter().map(|v| v.as_f64().unwrap()).collect();
    let (min, max, avg) = (values[0], values[1], values[2]);
    assert_eq!((min, max), (66.0, 83.0));
    assert!(min <= avg && avg <= max);

    let (_, body) = get_json(&base, "/api/v1.0/2016-09-01/2017-03-01");
    let stats = body.as_array().unwrap();
    assert_eq!(stats[0], json!(66.0));
    assert_eq!(stats[1], json!(80.0));
    assert!((stats[2].as_f64().unwrap() - 221.0 / 3.0).abs() < 1e-9);
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[test]
fn test_bad_dates_are_400_with_error_body() {
    let base = spawn_server(ApiSettings::default());

    let (status, body) = get_json(&base, "/api/v1.0/2020-99-99");
    assert_eq!(status, 400);
    assert_eq!(body, json!({ "error": "Date must be in YYYY-MM-DD format." }));

    let (status, body) = get_json(&base, "/api/v1.0/2017-01-01/2016-01-01");
    assert_eq!(status, 400);
    assert_eq!(body, json!({ "error": "End date must be later than start date." }));
}

#[test]
fn test_legacy_mode_serves_errors_with_200() {
    let settings = ApiSettings {
        validation_errors_as_ok: true,
        ..ApiSettings::default()
    };
    let base = spawn_server(settings);

    let (status, body) = get_json(&base, "/api/v1.0/yesterday");
    assert_eq!(status, 200);
    assert_eq!(body["error"], "Date must be in YYYY-MM-DD format.");
}

#[test]
fn test_unknown_path_is_404() {
    let base = spawn_server(ApiSettings::default());
    let (status, body) = get_json(&base, "/api/v1.0/a/b/c");

    assert_eq!(status, 404);
    assert_eq!(body["error"], "Not found");
}

#[test]
fn test_non_get_is_405() {
    let base = spawn_server(ApiSettings::default());
    let response = reqwest::blocking::Client::new()
        .post(format!("{}/api/v1.0/stations", base))
        .send()
        .unwrap();

    assert_eq!(response.status().as_u16(), 405);
    assert_eq!(response.headers()["allow"], "GET, HEAD, OPTIONS");
}

#[test]
fn test_head_returns_status_without_body() {
    let base = spawn_server(ApiSettings::default());
    let client = reqwest::blocking::Client::new();

    let response = client.head(format!("{}/api/v1.0/stations", base)).send().unwrap();
    assert_eq!(response.status().as_u16(), 200);
    assert!(response.text().unwrap().is_empty());

    let response = client.head(format!("{}/api/v1.0/not-a-date", base)).send().unwrap();
    assert_eq!(response.status().as_u16(), 400);
}

#[test]
fn test_options_lists_allowed_methods() {
    let base = spawn_server(ApiSettings::default());
    let response = reqwest::blocking::Client::new()
        .request(reqwest::Method::OPTIONS, format!("{}/api/v1.0/tobs", base))
        .send()
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.headers()["allow"], "GET, HEAD, OPTIONS");
}

#[test]
fn test_repeated_requests_are_identical() {
    let base = spawn_server(ApiSettings::default());
    let first = get_json(&base, "/api/v1.0/precipitation");
    let second = get_json(&base, "/api/v1.0/precipitation");
    assert_eq!(first, second);
}
