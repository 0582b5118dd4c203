//! Shared data types for the climate query service.
//!
//! The `measurement` and `station` tables are owned by the upstream dataset.
//! Their expected shape is declared here rather than discovered at runtime;
//! `db::verify_schema` checks the live database against these column lists
//! on startup.

use serde::Serialize;

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

pub const MEASUREMENT_TABLE: &str = "measurement";
pub const STATION_TABLE: &str = "station";

/// Columns the service reads from `measurement`.
pub const MEASUREMENT_COLUMNS: &[&str] = &["station", "date", "prcp", "tobs"];

/// Columns the service reads from `station`.
pub const STATION_COLUMNS: &[&str] = &["station", "name", "latitude", "longitude", "elevation"];

/// Every table the service depends on, paired with its required columns.
pub const REQUIRED_TABLES: &[(&str, &[&str])] = &[
    (MEASUREMENT_TABLE, MEASUREMENT_COLUMNS),
    (STATION_TABLE, STATION_COLUMNS),
];

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One daily observation at one station.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub station: String,
    /// Calendar date as stored, `YYYY-MM-DD`.
    pub date: String,
    /// Precipitation; missing for some station-days.
    pub prcp: Option<f64>,
    /// Observed temperature.
    pub tobs: f64,
}

/// One physical monitoring site.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub station: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: f64,
}

/// `(station_id, name)` pair; serializes as a two-element JSON array.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationSummary(pub String, pub String);

impl From<&Station> for StationSummary {
    fn from(station: &Station) -> Self {
        StationSummary(station.station.clone(), station.name.clone())
    }
}

/// Station id together with its number of measurement rows.
#[derive(Debug, Clone, PartialEq)]
pub struct StationActivity {
    pub station: String,
    pub count: i64,
}

/// Aggregate temperature figures over a date range.
///
/// All three are `None` when no measurement falls in the range.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TemperatureStats {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub avg: Option<f64>,
}

impl TemperatureStats {
    /// Computes min/max/avg over a sequence of temperatures.
    pub fn from_values<I: IntoIterator<Item = f64>>(values: I) -> Self {
        let mut stats = TemperatureStats::default();
        let mut sum = 0.0;
        let mut count = 0usize;

        for value in values {
            stats.min = Some(stats.min.map_or(value, |m| m.min(value)));
            stats.max = Some(stats.max.map_or(value, |m| m.max(value)));
            sum += value;
            count += 1;
        }

        if count > 0 {
            stats.avg = Some(sum / count as f64);
        }
        stats
    }

    /// `[min, max, avg]`, the response shape of the stats routes.
    pub fn as_array(&self) -> [Option<f64>; 3] {
        [self.min, self.max, self.avg]
    }
}
