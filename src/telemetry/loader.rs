use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use super::error::TelemetryError;
use super::types::{Flight, TelemetryRecord};

/// Entries in a sonde summary file: launch, burst, landing.
const SUMMARY_ENTRIES: usize = 3;

/// Parse a sonde summary file: a JSON array of exactly three records.
/// Anything else (including a full telemetry log) is rejected so the caller
/// can skip it explicitly.
pub fn parse_summary(json: &str) -> Result<Vec<TelemetryRecord>, TelemetryError> {
    let records: Vec<TelemetryRecord> = serde_json::from_str(json)?;
    if records.len() != SUMMARY_ENTRIES {
        return Err(TelemetryError::NotSummary(records.len()));
    }
    Ok(records)
}

pub fn read_summary(path: &Path) -> Result<Vec<TelemetryRecord>, TelemetryError> {
    let content = fs::read_to_string(path)?;
    parse_summary(&content)
}

/// Parse a telemetry log into flights. Two shapes exist in the wild:
///
/// - a JSON array of records, one flight per file (sonde log export);
/// - a JSON object keyed by callsign, each value a datetime -> record map
///   (amateur balloon dump).
///
/// For the object shape, a flight that fails to parse is logged and skipped
/// rather than failing the whole file.
pub fn parse_flights(json: &str) -> Result<Vec<Flight>, TelemetryError> {
    let value: serde_json::Value = serde_json::from_str(json)?;

    match value {
        serde_json::Value::Array(_) => {
            let records: Vec<TelemetryRecord> = serde_json::from_value(value)?;
            Ok(vec![collect_flight(records)?])
        }
        serde_json::Value::Object(map) => {
            let mut flights = Vec::new();
            for (callsign, entries) in map {
                let result = serde_json::from_value::<BTreeMap<String, TelemetryRecord>>(entries)
                    .map_err(TelemetryError::from)
                    .and_then(|by_time| collect_flight(by_time.into_values().collect()));
                match result {
                    Ok(flight) => flights.push(flight),
                    Err(e) => log::warn!("Skipping flight {}: {}", callsign, e),
                }
            }
            Ok(flights)
        }
        _ => Err(TelemetryError::Empty),
    }
}

pub fn read_flights(path: &Path) -> Result<Vec<Flight>, TelemetryError> {
    let content = fs::read_to_string(path)?;
    parse_flights(&content)
}

/// Reduce raw samples to a flight: de-duplicate by timestamp (later samples
/// replace earlier ones) and order the path in time.
fn collect_flight(records: Vec<TelemetryRecord>) -> Result<Flight, TelemetryError> {
    let mut by_time: BTreeMap<DateTime<Utc>, TelemetryRecord> = BTreeMap::new();
    for record in records {
        by_time.insert(record.datetime, record);
    }

    let first = by_time.values().next().ok_or(TelemetryError::Empty)?;
    let serial = first.serial.clone();
    let last_time = *by_time.keys().next_back().ok_or(TelemetryError::Empty)?;
    let path = by_time.values().map(|r| r.position()).collect();

    Ok(Flight {
        serial,
        last_time,
        path,
    })
}

/// Recursively collect the `.json` files under a folder, sorted by path so
/// runs process files in a stable order.
pub fn json_files(folder: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![folder.to_path_buf()];

    while let Some(dir) = pending.pop() {
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().is_some_and(|ext| ext == "json") {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}
