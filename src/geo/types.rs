use serde::Serialize;

/// A position on (or above) the earth: geodetic degrees plus altitude AMSL.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPosition {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_m: f64,
}

impl GeoPosition {
    pub fn new(latitude_deg: f64, longitude_deg: f64, altitude_m: f64) -> Self {
        Self {
            latitude_deg,
            longitude_deg,
            altitude_m,
        }
    }

    /// Parse a "lat, lon" coordinate string, with altitude supplied separately.
    pub fn from_coordinates(coordinates: &str, altitude_m: Option<f64>) -> Option<Self> {
        let parts: Vec<_> = coordinates.split(',').map(|s| s.trim()).collect();
        if parts.len() < 2 {
            return None;
        }
        let lat = parts[0].parse().ok()?;
        let lon = parts[1].parse().ok()?;
        Some(Self {
            latitude_deg: lat,
            longitude_deg: lon,
            altitude_m: altitude_m.unwrap_or(0.0),
        })
    }

    pub fn lat_rad(&self) -> f64 {
        self.latitude_deg.to_radians()
    }

    pub fn lon_rad(&self) -> f64 {
        self.longitude_deg.to_radians()
    }
}

/// Observer-to-target geometry on the sphere model.
///
/// Angles are kept in both degrees and radians; distances are in metres.
/// `elevation_deg` is negative below the observer's local horizon.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct LookAngle {
    pub bearing_deg: f64,
    pub bearing_rad: f64,
    pub elevation_deg: f64,
    pub elevation_rad: f64,
    pub great_circle_m: f64,
    pub straight_line_m: f64,
}
