//! Test fixtures: a small slice of the Hawaii station dataset.
//!
//! Latest date is 2017-08-23, so the 365-day window starts 2016-08-23.
//!
//! | station     | rows | rows in window |
//! |-------------|------|----------------|
//! | USC00519281 | 5    | 3              |
//! | USC00519397 | 2    | 2              |
//! | USC00513117 | 2    | 2              |

use crate::model::{Measurement, Station};
use crate::store::MemoryStore;

pub(crate) fn measurement(station: &str, date: &str, prcp: Option<f64>, tobs: f64) -> Measurement {
    Measurement {
        station: station.to_string(),
        date: date.to_string(),
        prcp,
        tobs,
    }
}

pub(crate) fn sample_stations() -> Vec<Station> {
    vec![
        Station {
            station: "USC00519397".to_string(),
            name: "WAIKIKI 717.2, HI US".to_string(),
            latitude: 21.2716,
            longitude: -157.8168,
            elevation: 3.0,
        },
        Station {
            station: "USC00513117".to_string(),
            name: "KANEOHE 838.1, HI US".to_string(),
            latitude: 21.4234,
            longitude: -157.8015,
            elevation: 14.6,
        },
        Station {
            station: "USC00519281".to_string(),
            name: "WAIHEE 837.5, HI US".to_string(),
            latitude: 21.45167,
            longitude: -157.84889,
            elevation: 32.9,
        },
    ]
}

pub(crate) fn sample_measurements() -> Vec<Measurement> {
    vec![
        measurement("USC00519281", "2010-01-01", Some(0.08), 65.0),
        measurement("USC00519281", "2016-08-22", Some(0.4), 78.0),
        measurement("USC00519281", "2016-08-23", Some(1.79), 77.0),
        measurement("USC00519397", "2016-08-23", Some(0.0), 81.0),
        measurement("USC00513117", "2016-08-23", None, 76.0),
        measurement("USC00519281", "2017-01-15", Some(0.0), 68.0),
        measurement("USC00519281", "2017-08-18", None, 79.0),
        measurement("USC00519397", "2017-08-23", Some(0.0), 81.0),
        measurement("USC00513117", "2017-08-23", Some(0.02), 82.0),
    ]
}

pub(crate) fn sample_store() -> MemoryStore {
    MemoryStore::new(sample_measurements(), sample_stations())
}
