use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::geo::GeoPosition;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid coordinates: {0:?} (expected \"lat, lon\")")]
    Coordinates(String),
}

/// Observation site definition, loadable from a YAML file:
///
/// ```yaml
/// name: Cape Girardeau
/// coordinates: "37.4300, -89.6436"
/// altitude_m: 161
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    pub name: Option<String>,
    pub coordinates: String,
    #[serde(default)]
    pub altitude_m: f64,
}

impl SiteConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    pub fn observer(&self) -> Result<GeoPosition, ConfigError> {
        GeoPosition::from_coordinates(&self.coordinates, Some(self.altitude_m))
            .ok_or_else(|| ConfigError::Coordinates(self.coordinates.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_site_file() {
        let yaml = "name: Cape Girardeau\ncoordinates: \"37.4300, -89.6436\"\naltitude_m: 161\n";
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();

        let observer = config.observer().unwrap();
        assert_eq!(config.name.as_deref(), Some("Cape Girardeau"));
        assert_eq!(observer.latitude_deg, 37.43);
        assert_eq!(observer.longitude_deg, -89.6436);
        assert_eq!(observer.altitude_m, 161.0);
    }

    #[test]
    fn altitude_defaults_to_sea_level() {
        let config: SiteConfig =
            serde_yaml::from_str("coordinates: \"37.43, -89.64\"\n").unwrap();
        assert_eq!(config.observer().unwrap().altitude_m, 0.0);
    }

    #[test]
    fn bad_coordinates_are_an_error() {
        let config: SiteConfig = serde_yaml::from_str("coordinates: \"37.43\"\n").unwrap();
        assert!(matches!(
            config.observer().unwrap_err(),
            ConfigError::Coordinates(_)
        ));
    }
}
