//! HTTP endpoint for querying the climate dataset
//!
//! Endpoints (GET or HEAD; OPTIONS answers with the allowed methods):
//! - GET /                           - HTML listing of the API routes
//! - GET /health                     - Service health check
//! - GET /api/v1.0/precipitation     - Precipitation by date over the trailing year
//! - GET /api/v1.0/stations          - `[station_id, name]` pairs
//! - GET /api/v1.0/tobs              - Trailing-year temperatures of the most active station
//! - GET /api/v1.0/{start}           - `[min, max, avg]` temperature from start
//! - GET /api/v1.0/{start}/{end}     - `[min, max, avg]` temperature from start to end
//!
//! The accept loop hands each request to a worker pool. A worker acquires
//! its own store from the `StoreProvider`, so requests never share a
//! database session.

use crate::config::ApiSettings;
use crate::dates::DateRange;
use crate::queries::{self, ApiError};
use crate::store::{ClimateStore, StoreProvider};
use serde::Serialize;
use serde_json::json;
use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use threadpool::ThreadPool;
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};

pub const API_PREFIX: &str = "/api/v1.0/";

/// Body of `GET /`.
pub const ROUTE_LISTING: &str = "Available Routes:<br/>\
/api/v1.0/precipitation - dictionary of precipitation by date of last year<br/>\
/api/v1.0/stations - list of stations<br/>\
/api/v1.0/tobs - list of temperature observations for most active station<br/>\
/api/v1.0/start - min,max, and avg temperature from start date (must be in YYYY-MM-DD format)<br/>\
/api/v1.0/start/end - min,max, and avg temperature from start date to end date \
(must be in YYYY-MM-DD format)";

/// Value of the `Allow` header on OPTIONS and 405 responses.
pub const ALLOWED_METHODS: &str = "GET, HEAD, OPTIONS";

/// Body of every 500 response; the details go to the log only.
const INTERNAL_ERROR: &str = "Internal server error";

const AVAILABLE_ENDPOINTS: &[&str] = &[
    "/",
    "/health",
    "/api/v1.0/precipitation",
    "/api/v1.0/stations",
    "/api/v1.0/tobs",
    "/api/v1.0/{start}",
    "/api/v1.0/{start}/{end}",
];

#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("Failed to start HTTP server on {address}: {message}")]
    Bind { address: String, message: String },
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

/// A parsed request path. Date segments are percent-decoded but not yet validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Health,
    Precipitation,
    Stations,
    Tobs,
    TemperaturesFrom { start: String },
    TemperaturesBetween { start: String, end: String },
    NotFound,
}

impl Route {
    /// Matches a request URL. The query string is ignored and the fixed
    /// API names win over the `{start}` pattern.
    pub fn parse(url: &str) -> Route {
        let path = url.split_once('?').map_or(url, |(path, _)| path);

        match path {
            "/" => return Route::Home,
            "/health" => return Route::Health,
            _ => {}
        }

        let Some(rest) = path.strip_prefix(API_PREFIX) else {
            return Route::NotFound;
        };

        let segments: Vec<String> = rest.split('/').map(decode_segment).collect();
        if segments.iter().any(String::is_empty) {
            return Route::NotFound;
        }

        match segments.as_slice() {
            [only] => match only.as_str() {
                "precipitation" => Route::Precipitation,
                "stations" => Route::Stations,
                "tobs" => Route::Tobs,
                _ => Route::TemperaturesFrom { start: only.clone() },
            },
            [start, end] => Route::TemperaturesBetween {
                start: start.clone(),
                end: end.clone(),
            },
            _ => Route::NotFound,
        }
    }
}

/// Percent-decodes one path segment; undecodable input is kept as-is
/// and later fails date validation.
fn decode_segment(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(serde_json::Value),
    Html(String),
    Empty,
}

/// Transport-independent response produced by the route handlers.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: ResponseBody,
    /// Methods to advertise in an `Allow` header.
    pub allow: Option<&'static str>,
}

impl ApiResponse {
    pub fn json(status: u16, value: serde_json::Value) -> Self {
        Self {
            status,
            body: ResponseBody::Json(value),
            allow: None,
        }
    }

    pub fn html(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: ResponseBody::Html(body.into()),
            allow: None,
        }
    }

    pub fn empty(status: u16) -> Self {
        Self {
            status,
            body: ResponseBody::Empty,
            allow: None,
        }
    }

    pub fn with_allow(mut self, methods: &'static str) -> Self {
        self.allow = Some(methods);
        self
    }

    /// Converts into a tiny_http response with the matching headers.
    pub fn into_http(self) -> Response<Cursor<Vec<u8>>> {
        let (content_type, body) = match self.body {
            ResponseBody::Json(value) => (Some("application/json"), format!("{:#}", value)),
            ResponseBody::Html(text) => (Some("text/html; charset=utf-8"), text),
            ResponseBody::Empty => (None, String::new()),
        };

        let mut response =
            Response::from_data(body.into_bytes()).with_status_code(StatusCode::from(self.status));

        let headers = [("Content-Type", content_type), ("Allow", self.allow)];
        for (name, value) in headers {
            let Some(value) = value else { continue };
            match Header::from_bytes(name.as_bytes(), value.as_bytes()) {
                Ok(header) => response.add_header(header),
                Err(()) => log::warn!("Invalid {} header value: {}", name, value),
            }
        }

        response
    }
}

fn error_response(err: &ApiError, settings: &ApiSettings) -> ApiResponse {
    match err {
        ApiError::InvalidInput(e) => {
            let status = if settings.validation_errors_as_ok {
                200
            } else {
                err.status_code()
            };
            ApiResponse::json(status, json!({ "error": e.to_string() }))
        }
        ApiError::Store(e) => {
            log::error!("Store failure: {}", e);
            internal_error()
        }
    }
}

fn internal_error() -> ApiResponse {
    ApiResponse::json(500, json!({ "error": INTERNAL_ERROR }))
}

fn not_found() -> ApiResponse {
    ApiResponse::json(
        404,
        json!({
            "error": "Not found",
            "available_endpoints": AVAILABLE_ENDPOINTS,
        }),
    )
}

fn method_not_allowed() -> ApiResponse {
    ApiResponse::json(405, json!({ "error": "Method not allowed" })).with_allow(ALLOWED_METHODS)
}

fn handle_health() -> ApiResponse {
    ApiResponse::json(
        200,
        json!({
            "status": "ok",
            "service": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
        }),
    )
}

/// Acquires a store, runs `query` on it and serializes the result.
fn respond_with<T, F>(
    provider: &dyn StoreProvider,
    settings: &ApiSettings,
    query: F,
) -> ApiResponse
where
    T: Serialize,
    F: FnOnce(&mut dyn ClimateStore) -> Result<T, ApiError>,
{
    let result = provider
        .acquire()
        .map_err(ApiError::from)
        .and_then(|mut store| query(store.as_mut()));

    match result {
        Ok(payload) => match serde_json::to_value(&payload) {
            Ok(value) => ApiResponse::json(200, value),
            Err(e) => {
                log::error!("Failed to serialize response: {}", e);
                internal_error()
            }
        },
        Err(e) => error_response(&e, settings),
    }
}

/// Produces the response for a parsed route.
pub fn handle_route(
    route: &Route,
    provider: &dyn StoreProvider,
    settings: &ApiSettings,
) -> ApiResponse {
    let window_days = settings.window_days;

    match route {
        Route::Home => ApiResponse::html(ROUTE_LISTING),
        Route::Health => handle_health(),
        Route::NotFound => not_found(),
        Route::Precipitation => respond_with(provider, settings, |store| {
            Ok(queries::precipitation_by_date(store, window_days)?)
        }),
        Route::Stations => {
            respond_with(provider, settings, |store| Ok(queries::list_stations(store)?))
        }
        Route::Tobs => respond_with(provider, settings, |store| {
            Ok(queries::most_active_station_temperatures(store, window_days)?)
        }),
        Route::TemperaturesFrom { start } => match DateRange::from_start(start) {
            Ok(range) => stats_response(&range, provider, settings),
            Err(e) => error_response(&ApiError::from(e), settings),
        },
        Route::TemperaturesBetween { start, end } => match DateRange::between(start, end) {
            Ok(range) => stats_response(&range, provider, settings),
            Err(e) => error_response(&ApiError::from(e), settings),
        },
    }
}

fn stats_response(
    range: &DateRange,
    provider: &dyn StoreProvider,
    settings: &ApiSettings,
) -> ApiResponse {
    respond_with(provider, settings, |store| {
        Ok(queries::temperature_stats(store, range)?.as_array())
    })
}

// ---------------------------------------------------------------------------
// HTTP Server
// ---------------------------------------------------------------------------

/// Bound listener plus the worker pool that serves it.
pub struct EndpointServer {
    server: Server,
    pool: ThreadPool,
    provider: Arc<dyn StoreProvider>,
    settings: Arc<ApiSettings>,
}

impl EndpointServer {
    /// Binds `address` (`host:port`; port 0 picks a free port).
    pub fn bind(
        address: &str,
        workers: usize,
        provider: Arc<dyn StoreProvider>,
        settings: ApiSettings,
    ) -> Result<Self, EndpointError> {
        let server = Server::http(address).map_err(|e| EndpointError::Bind {
            address: address.to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            server,
            pool: ThreadPool::new(workers.max(1)),
            provider,
            settings: Arc::new(settings),
        })
    }

    /// Address actually bound, if listening on TCP.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.server_addr().to_ip()
    }

    /// Serves requests until the listener shuts down.
    pub fn serve(self) {
        for request in self.server.incoming_requests() {
            let provider = Arc::clone(&self.provider);
            let settings = Arc::clone(&self.settings);

            self.pool.execute(move || dispatch(request, provider.as_ref(), &settings));
        }

        self.pool.join();
    }
}

/// Produces the response for a method and URL.
///
/// HEAD is routed like GET; tiny_http drops the body when responding.
pub fn handle_request(
    method: &Method,
    url: &str,
    provider: &dyn StoreProvider,
    settings: &ApiSettings,
) -> ApiResponse {
    match method {
        Method::Get | Method::Head => handle_route(&Route::parse(url), provider, settings),
        Method::Options => ApiResponse::empty(200).with_allow(ALLOWED_METHODS),
        _ => method_not_allowed(),
    }
}

fn dispatch(request: Request, provider: &dyn StoreProvider, settings: &ApiSettings) {
    let response = handle_request(request.method(), request.url(), provider, settings);

    log::info!("{} {} -> {}", request.method(), request.url(), response.status);

    if let Err(e) = request.respond(response.into_http()) {
        log::warn!("Failed to send response: {}", e);
    }
}

/// Bind and serve on `address` with the given store.
pub fn start_endpoint_server(
    address: &str,
    workers: usize,
    provider: Arc<dyn StoreProvider>,
    settings: ApiSettings,
) -> Result<(), EndpointError> {
    let server = EndpointServer::bind(address, workers, provider, settings)?;
    log::info!("HTTP endpoint listening on http://{}", address);
    server.serve();
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
