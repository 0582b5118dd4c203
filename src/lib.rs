//! climate_service: read-only HTTP API over a daily climate-observation dataset.
//!
//! # Module structure
//!
//! ```text
//! climate_service
//! ├── model    — typed records (Measurement, Station, TemperatureStats) and table layout
//! ├── dates    — strict YYYY-MM-DD validation, date ranges, trailing-window arithmetic
//! ├── config   — service configuration loader (climate_service.toml)
//! ├── db       — DATABASE_URL discovery, connection, schema verification
//! ├── store
//! │   ├── pg     — PostgreSQL store, one connection per request
//! │   └── memory — in-memory store with the same semantics
//! ├── queries  — the precipitation, stations, tobs and temperature-stats operations
//! ├── endpoint — routing, worker-pool HTTP server, JSON/HTML responses
//! └── fixtures (test only) — sample Hawaii station rows
//! ```

// Public modules
pub mod config;
pub mod dates;
pub mod db;
pub mod endpoint;
pub mod model;
pub mod queries;
pub mod store;

#[cfg(test)]
pub(crate) mod fixtures;
