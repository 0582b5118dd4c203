//! Query operations behind the API routes.
//!
//! Each operation runs against a single `ClimateStore` handle and returns
//! the response payload in its final shape. Date parameters arrive
//! already validated as a `DateRange`.

use crate::dates::{self, DateError, DateRange};
use crate::model::{StationSummary, TemperatureStats};
use crate::store::{ClimateStore, StoreError};
use std::collections::BTreeMap;
use thiserror::Error;

/// Precipitation values keyed by date. A date maps to one value per
/// reporting station, `None` where a station recorded no precipitation.
pub type PrecipitationByDate = BTreeMap<String, Vec<Option<f64>>>;

/// Request-level failure, split by who is at fault.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    InvalidInput(#[from] DateError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    /// 400 for bad input, 500 for anything the store raised.
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::InvalidInput(_) => 400,
            ApiError::Store(_) => 500,
        }
    }
}

/// First date of the trailing window, or `None` if there are no measurements.
fn window_start<S: ClimateStore + ?Sized>(
    store: &mut S,
    window_days: i64,
) -> Result<Option<String>, StoreError> {
    Ok(store
        .latest_date()?
        .map(|latest| dates::format_date(dates::window_start(latest, window_days))))
}

/// Precipitation for every date in the trailing window.
pub fn precipitation_by_date<S: ClimateStore + ?Sized>(
    store: &mut S,
    window_days: i64,
) -> Result<PrecipitationByDate, StoreError> {
    let mut by_date = PrecipitationByDate::new();

    let Some(since) = window_start(&mut *store, window_days)? else {
        return Ok(by_date);
    };

    for (date, prcp) in store.precipitation_since(&since)? {
        by_date.entry(date).or_default().push(prcp);
    }

    log::info!("Successful precipitation query ({} dates since {})", by_date.len(), since);
    Ok(by_date)
}

/// Every station as an `(id, name)` pair.
pub fn list_stations<S: ClimateStore + ?Sized>(
    store: &mut S,
) -> Result<Vec<StationSummary>, StoreError> {
    let stations: Vec<StationSummary> =
        store.stations()?.iter().map(StationSummary::from).collect();

    log::info!("Successful stations query ({} stations)", stations.len());
    Ok(stations)
}

/// Temperatures from the most active station within the trailing window.
///
/// The window is anchored on the latest date across all stations, not
/// the selected station's own latest date.
pub fn most_active_station_temperatures<S: ClimateStore + ?Sized>(
    store: &mut S,
    window_days: i64,
) -> Result<Vec<f64>, StoreError> {
    let Some(since) = window_start(&mut *store, window_days)? else {
        return Ok(Vec::new());
    };
    let Some(active) = store.most_active_station()? else {
        return Ok(Vec::new());
    };

    let temps = store.temperatures_since(&active.station, &since)?;

    log::info!(
        "Successful tobs query ({} observations from {}, {} rows total)",
        temps.len(),
        active.station,
        active.count
    );
    Ok(temps)
}

/// Min, max and average temperature over a validated date range.
pub fn temperature_stats<S: ClimateStore + ?Sized>(
    store: &mut S,
    range: &DateRange,
) -> Result<TemperatureStats, StoreError> {
    let stats = store.temperature_stats(&range.start, range.end.as_deref())?;

    match &range.end {
        Some(end) => log::info!("Successful start-end date query ({} to {})", range.start, end),
        None => log::info!("Successful start date query (from {})", range.start),
    }
    Ok(stats)
}
