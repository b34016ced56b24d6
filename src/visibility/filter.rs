use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use log::info;

use crate::geo::{look_angle, GeoPosition};
use crate::telemetry::TelemetryRecord;

/// Observation site and the window a sample must fall inside to count.
#[derive(Debug, Clone)]
pub struct SearchCriteria {
    pub observer: GeoPosition,
    pub observer_time: DateTime<Utc>,
    /// Samples must sit strictly above this elevation, in degrees. Negative
    /// thresholds admit sondes slightly below the geometric horizon.
    pub min_elevation_deg: f64,
    pub window: Duration,
}

/// Matching records keyed by flight serial, sorted for stable output.
pub type MatchSet = BTreeMap<String, TelemetryRecord>;

/// Fold telemetry records into the set of flights visible from the observer.
///
/// A record matches when its elevation is strictly above the threshold and
/// its timestamp is strictly within the window around the observation time;
/// a record exactly on either boundary is excluded. When several records
/// share a serial, the last satisfying record in input order is kept. That
/// tie-break is a contract relied on by downstream consumers, not an
/// artifact of the map type.
pub fn find_visible(records: &[TelemetryRecord], criteria: &SearchCriteria) -> MatchSet {
    let window_seconds = duration_seconds(criteria.window).abs();
    let mut matches = MatchSet::new();

    for record in records {
        let look = look_angle(criteria.observer, record.position());
        if look.elevation_deg <= criteria.min_elevation_deg {
            continue;
        }

        let offset_seconds = duration_seconds(criteria.observer_time - record.datetime).abs();
        if offset_seconds < window_seconds {
            info!(
                "Match! - {}: {} at {:.1} degrees elevation, {:.1} degrees azimuth.",
                record.datetime, record.serial, look.elevation_deg, look.bearing_deg
            );
            matches.insert(record.serial.clone(), record.clone());
        }
    }

    matches
}

fn duration_seconds(duration: Duration) -> f64 {
    duration.num_milliseconds() as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn observer() -> GeoPosition {
        GeoPosition::new(37.4300, -89.6436, 161.0)
    }

    fn observer_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 8, 19, 0, 15).unwrap()
    }

    fn criteria() -> SearchCriteria {
        SearchCriteria {
            observer: observer(),
            observer_time: observer_time(),
            min_elevation_deg: -5.0,
            window: Duration::hours(4),
        }
    }

    fn record(serial: &str, datetime: DateTime<Utc>, lat: f64, lon: f64, alt: f64) -> TelemetryRecord {
        TelemetryRecord {
            serial: serial.to_string(),
            datetime,
            lat,
            lon,
            alt,
            extra: serde_json::Map::new(),
        }
    }

    #[test]
    fn includes_a_visible_record() {
        // Straight overhead, an hour before the observation time.
        let records = vec![record(
            "V1854223",
            observer_time() - Duration::hours(1),
            37.4300,
            -89.6436,
            24000.0,
        )];

        let matches = find_visible(&records, &criteria());
        assert_eq!(matches.len(), 1);
        assert!(matches.contains_key("V1854223"));
    }

    #[test]
    fn drops_records_below_the_elevation_threshold() {
        // A grounded sonde a long way off sits far below the horizon.
        let records = vec![record(
            "V1854223",
            observer_time(),
            48.0,
            2.0,
            100.0,
        )];

        assert!(find_visible(&records, &criteria()).is_empty());
    }

    #[test]
    fn drops_records_outside_the_time_window() {
        let records = vec![record(
            "V1854223",
            observer_time() - Duration::hours(5),
            37.4300,
            -89.6436,
            24000.0,
        )];

        assert!(find_visible(&records, &criteria()).is_empty());
    }

    #[test]
    fn boundaries_are_exclusive_in_both_dimensions() {
        // Exactly on the window edge.
        let on_window_edge = record(
            "A1",
            observer_time() - Duration::hours(4),
            37.4300,
            -89.6436,
            24000.0,
        );
        assert!(find_visible(&[on_window_edge], &criteria()).is_empty());

        // Exactly on the elevation threshold.
        let zenith = record("A2", observer_time(), 37.4300, -89.6436, 24000.0);
        let at_threshold = look_angle(observer(), zenith.position()).elevation_deg;
        let strict = SearchCriteria {
            min_elevation_deg: at_threshold,
            ..criteria()
        };
        assert!(find_visible(&[zenith], &strict).is_empty());
    }

    #[test]
    fn last_satisfying_record_wins_per_serial() {
        let earlier = record(
            "V1854223",
            observer_time() - Duration::hours(2),
            37.4300,
            -89.6436,
            28000.0,
        );
        let later = record(
            "V1854223",
            observer_time() - Duration::hours(1),
            37.5100,
            -89.5800,
            9000.0,
        );
        let records = vec![earlier, later.clone()];

        let matches = find_visible(&records, &criteria());
        assert_eq!(matches.len(), 1);
        assert_eq!(matches["V1854223"], later);
    }

    #[test]
    fn reruns_are_identical() {
        let records = vec![
            record(
                "V1854223",
                observer_time() - Duration::hours(1),
                37.4300,
                -89.6436,
                24000.0,
            ),
            record(
                "W2050112",
                observer_time() + Duration::hours(2),
                37.9000,
                -89.1000,
                15000.0,
            ),
        ];
        let criteria = criteria();

        assert_eq!(
            find_visible(&records, &criteria),
            find_visible(&records, &criteria)
        );
    }
}
