//! In-memory store with the same query semantics as the PostgreSQL store.
//!
//! "Default row order" here is insertion order, which makes the
//! most-active tie-break deterministic: among stations sharing the
//! highest count, the one seen first wins.

use super::{ClimateStore, StoreError, StoreProvider};
use crate::dates::{self, DateRange};
use crate::model::{Measurement, Station, StationActivity, TemperatureStats};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    measurements: Arc<Vec<Measurement>>,
    stations: Arc<Vec<Station>>,
}

impl MemoryStore {
    pub fn new(measurements: Vec<Measurement>, stations: Vec<Station>) -> Self {
        Self {
            measurements: Arc::new(measurements),
            stations: Arc::new(stations),
        }
    }
}

impl ClimateStore for MemoryStore {
    fn latest_date(&mut self) -> Result<Option<NaiveDate>, StoreError> {
        match self.measurements.iter().map(|m| m.date.as_str()).max() {
            Some(date) => dates::parse_iso_date(date)
                .map(Some)
                .map_err(|_| StoreError::MalformedDate(date.to_string())),
            None => Ok(None),
        }
    }

    fn precipitation_since(
        &mut self,
        since: &str,
    ) -> Result<Vec<(String, Option<f64>)>, StoreError> {
        let mut rows: Vec<&Measurement> = self
            .measurements
            .iter()
            .filter(|m| m.date.as_str() >= since)
            .collect();

        // Stable sort keeps insertion order among equal dates
        rows.sort_by(|a, b| b.date.cmp(&a.date));

        Ok(rows.into_iter().map(|m| (m.date.clone(), m.prcp)).collect())
    }

    fn stations(&mut self) -> Result<Vec<Station>, StoreError> {
        Ok(self.stations.to_vec())
    }

    fn most_active_station(&mut self) -> Result<Option<StationActivity>, StoreError> {
        let mut order: Vec<&str> = Vec::new();
        let mut counts: HashMap<&str, i64> = HashMap::new();

        for m in self.measurements.iter() {
            let count = counts.entry(m.station.as_str()).or_insert_with(|| {
                order.push(m.station.as_str());
                0
            });
            *count += 1;
        }

        let mut best: Option<StationActivity> = None;
        for station in order {
            let count = counts[station];
            if best.as_ref().is_none_or(|b| count > b.count) {
                best = Some(StationActivity {
                    station: station.to_string(),
                    count,
                });
            }
        }

        Ok(best)
    }

    fn temperatures_since(&mut self, station: &str, since: &str) -> Result<Vec<f64>, StoreError> {
        Ok(self
            .measurements
            .iter()
            .filter(|m| m.station == station && m.date.as_str() >= since)
            .map(|m| m.tobs)
            .collect())
    }

    fn temperature_stats(
        &mut self,
        start: &str,
        end: Option<&str>,
    ) -> Result<TemperatureStats, StoreError> {
        let range = DateRange {
            start: start.to_string(),
            end: end.map(str::to_string),
        };

        Ok(TemperatureStats::from_values(
            self.measurements
                .iter()
                .filter(|m| range.contains(&m.date))
                .map(|m| m.tobs),
        ))
    }
}

/// Hands each request its own handle onto shared rows.
#[derive(Debug, Clone, Default)]
pub struct MemoryStoreProvider {
    store: MemoryStore,
}

impl MemoryStoreProvider {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

impl StoreProvider for MemoryStoreProvider {
    fn acquire(&self) -> Result<Box<dyn ClimateStore>, StoreError> {
        Ok(Box::new(self.store.clone()))
    }
}
