//! Data access layer.
//!
//! `ClimateStore` is the seam between the query operations and the
//! storage engine. Each request acquires its own store through a
//! `StoreProvider`, so no connection is ever shared between requests.
//!
//! Implementations:
//! - `pg`: PostgreSQL, one short-lived connection per request
//! - `memory`: in-process rows with the same ordering rules

pub mod memory;
pub mod pg;

use crate::model::{Station, StationActivity, TemperatureStats};
use chrono::NaiveDate;
use thiserror::Error;

pub use memory::{MemoryStore, MemoryStoreProvider};
pub use pg::{PgStore, PgStoreProvider};

/// Failures raised by a storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database connection failed: {0}")]
    Connection(#[source] postgres::Error),
    #[error("Database query failed: {0}")]
    Query(#[from] postgres::Error),
    #[error("Unexpected value in database row: {0}")]
    Decode(#[source] postgres::Error),
    #[error("Stored date '{0}' is not in YYYY-MM-DD format")]
    MalformedDate(String),
}

/// Read-only access to the `measurement` and `station` tables.
///
/// Ordering contracts:
/// - `precipitation_since` returns rows by date, newest first; rows sharing
///   a date keep the store's default order.
/// - `stations` and `temperatures_since` use the store's default row order.
/// - `most_active_station` picks the highest count; ties resolve to
///   whichever station the store yields first, which is not guaranteed.
pub trait ClimateStore {
    /// Most recent measurement date, or `None` for an empty table.
    fn latest_date(&mut self) -> Result<Option<NaiveDate>, StoreError>;

    /// `(date, prcp)` for every measurement on or after `since`.
    fn precipitation_since(
        &mut self,
        since: &str,
    ) -> Result<Vec<(String, Option<f64>)>, StoreError>;

    /// All station records.
    fn stations(&mut self) -> Result<Vec<Station>, StoreError>;

    /// Station with the most measurement rows.
    fn most_active_station(&mut self) -> Result<Option<StationActivity>, StoreError>;

    /// Temperatures observed at `station` on or after `since`.
    fn temperatures_since(&mut self, station: &str, since: &str) -> Result<Vec<f64>, StoreError>;

    /// Min/max/avg temperature over `start <= date` and, if given, `date <= end`.
    fn temperature_stats(
        &mut self,
        start: &str,
        end: Option<&str>,
    ) -> Result<TemperatureStats, StoreError>;
}

/// Hands out a fresh store for each request.
pub trait StoreProvider: Send + Sync {
    fn acquire(&self) -> Result<Box<dyn ClimateStore>, StoreError>;
}
