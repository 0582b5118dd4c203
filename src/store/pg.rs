//! PostgreSQL-backed store.
//!
//! Dates are compared as `YYYY-MM-DD` text. The `date` column is cast to
//! `text` in every query so it may be stored as `TEXT` or `DATE`, and
//! numeric columns are cast to `float8` so they may be `REAL` or
//! `DOUBLE PRECISION`. Values are read with `try_get`; a row that still
//! does not fit (a NULL station name, say) fails the request with
//! `StoreError::Decode` instead of panicking the worker.

use super::{ClimateStore, StoreError, StoreProvider};
use crate::dates;
use crate::model::{Station, StationActivity, TemperatureStats};
use chrono::NaiveDate;
use postgres::types::FromSql;
use postgres::{Client, NoTls, Row};

/// A store bound to one open connection.
pub struct PgStore {
    client: Client,
}

impl PgStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Opens a new connection to `database_url`.
    pub fn connect(database_url: &str) -> Result<Self, StoreError> {
        let client = Client::connect(database_url, NoTls).map_err(StoreError::Connection)?;
        Ok(Self::new(client))
    }
}

/// Reads column `idx`, turning type mismatches and unexpected NULLs into errors.
fn column<'a, T: FromSql<'a>>(row: &'a Row, idx: usize) -> Result<T, StoreError> {
    row.try_get(idx).map_err(StoreError::Decode)
}

impl ClimateStore for PgStore {
    fn latest_date(&mut self) -> Result<Option<NaiveDate>, StoreError> {
        let row = self
            .client
            .query_one("SELECT MAX(date::text) FROM measurement", &[])?;

        let latest: Option<String> = column(&row, 0)?;
        match latest {
            Some(date) => dates::parse_iso_date(&date)
                .map(Some)
                .map_err(|_| StoreError::MalformedDate(date)),
            None => Ok(None),
        }
    }

    fn precipitation_since(
        &mut self,
        since: &str,
    ) -> Result<Vec<(String, Option<f64>)>, StoreError> {
        let rows = self.client.query(
            "SELECT date::text, prcp::float8
             FROM measurement
             WHERE date::text >= $1
             ORDER BY date::text DESC",
            &[&since],
        )?;

        rows.iter()
            .map(|row| Ok((column(row, 0)?, column(row, 1)?)))
            .collect()
    }

    fn stations(&mut self) -> Result<Vec<Station>, StoreError> {
        let rows = self.client.query(
            "SELECT station, name, latitude::float8, longitude::float8, elevation::float8
             FROM station",
            &[],
        )?;

        rows.iter()
            .map(|row| {
                Ok(Station {
                    station: column(row, 0)?,
                    name: column(row, 1)?,
                    latitude: column(row, 2)?,
                    longitude: column(row, 3)?,
                    elevation: column(row, 4)?,
                })
            })
            .collect()
    }

    fn most_active_station(&mut self) -> Result<Option<StationActivity>, StoreError> {
        // No secondary sort: ties go to whichever group the planner emits first.
        let rows = self.client.query(
            "SELECT station, COUNT(station)
             FROM measurement
             GROUP BY station
             ORDER BY COUNT(station) DESC
             LIMIT 1",
            &[],
        )?;

        rows.first()
            .map(|row| {
                Ok(StationActivity {
                    station: column(row, 0)?,
                    count: column(row, 1)?,
                })
            })
            .transpose()
    }

    fn temperatures_since(&mut self, station: &str, since: &str) -> Result<Vec<f64>, StoreError> {
        let rows = self.client.query(
            "SELECT tobs::float8
             FROM measurement
             WHERE station = $1 AND date::text >= $2",
            &[&station, &since],
        )?;

        rows.iter().map(|row| column(row, 0)).collect()
    }

    fn temperature_stats(
        &mut self,
        start: &str,
        end: Option<&str>,
    ) -> Result<TemperatureStats, StoreError> {
        let row = match end {
            Some(end) => self.client.query_one(
                "SELECT MIN(tobs)::float8, MAX(tobs)::float8, AVG(tobs)::float8
                 FROM measurement
                 WHERE date::text >= $1 AND date::text <= $2",
                &[&start, &end],
            )?,
            None => self.client.query_one(
                "SELECT MIN(tobs)::float8, MAX(tobs)::float8, AVG(tobs)::float8
                 FROM measurement
                 WHERE date::text >= $1",
                &[&start],
            )?,
        };

        Ok(TemperatureStats {
            min: column(&row, 0)?,
            max: column(&row, 1)?,
            avg: column(&row, 2)?,
        })
    }
}

/// Opens one connection per `acquire` call; the connection closes when
/// the returned store is dropped at the end of the request.
#[derive(Debug, Clone)]
pub struct PgStoreProvider {
    database_url: String,
}

impl PgStoreProvider {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
        }
    }
}

impl StoreProvider for PgStoreProvider {
    fn acquire(&self) -> Result<Box<dyn ClimateStore>, StoreError> {
        Ok(Box::new(PgStore::connect(&self.database_url)?))
    }
}
