use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::GeoPosition;

/// One telemetry sample for a flight. Fields beyond the ones used here are
/// carried through untouched in `extra`, so re-serialized records keep
/// whatever the upstream feed provided (velocities, frequency, uploader...).
///
/// SondeHub amateur dumps name the flight identifier `payload_callsign`
/// rather than `serial`; both spellings are accepted.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TelemetryRecord {
    #[serde(alias = "payload_callsign")]
    pub serial: String,
    pub datetime: DateTime<Utc>,
    pub lat: f64,
    pub lon: f64,
    pub alt: f64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl TelemetryRecord {
    pub fn position(&self) -> GeoPosition {
        GeoPosition::new(self.lat, self.lon, self.alt)
    }
}

/// A whole flight reduced from a telemetry log: samples de-duplicated by
/// timestamp and ordered in time.
#[derive(Debug, Clone)]
pub struct Flight {
    pub serial: String,
    pub last_time: DateTime<Utc>,
    pub path: Vec<GeoPosition>,
}

impl Flight {
    /// Final reported position, normally the landing site.
    pub fn landing(&self) -> &GeoPosition {
        self.path
            .last()
            .expect("a flight always has at least one sample")
    }
}
