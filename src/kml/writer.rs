use std::fmt::Write as _;
use std::io;

use crate::geo::GeoPosition;
use crate::telemetry::Flight;

const PLACEMARK_ICON: &str = "https://maps.google.com/mapfiles/kml/shapes/placemark_circle.png";
const ICON_SCALE: f64 = 1.0;
const TRACK_COLOR: &str = "ff03bafc";
const POLY_COLOR: &str = "8003bafc";
const TRACK_WIDTH: f64 = 2.0;

#[derive(Debug, Clone, Copy)]
pub struct KmlOptions {
    /// Altitudes as absolute AMSL rather than clamped to the ground.
    pub absolute: bool,
    /// Extrude the track down to the ground surface.
    pub extrude: bool,
    /// Emit only the landing placemark, no track line.
    pub last_only: bool,
}

impl Default for KmlOptions {
    fn default() -> Self {
        Self {
            absolute: true,
            extrude: true,
            last_only: false,
        }
    }
}

/// Render a KML document with one folder per flight: a landing placemark
/// named after the serial, plus the flight track unless `last_only` is set.
pub fn document(flights: &[Flight], options: &KmlOptions) -> String {
    let mut kml = String::new();
    kml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    kml.push('\n');
    kml.push_str(r#"<kml xmlns="http://www.opengis.net/kml/2.2">"#);
    kml.push('\n');
    kml.push_str("<Document>\n");
    for flight in flights {
        flight_folder(&mut kml, flight, options);
    }
    kml.push_str("</Document>\n");
    kml.push_str("</kml>\n");
    kml
}

pub fn write_document<W: io::Write>(
    mut writer: W,
    flights: &[Flight],
    options: &KmlOptions,
) -> io::Result<()> {
    writer.write_all(document(flights, options).as_bytes())
}

fn flight_folder(kml: &mut String, flight: &Flight, options: &KmlOptions) {
    let landing_time = flight.last_time.format("%Y-%m-%dT%H:%M:%SZ").to_string();

    kml.push_str("<Folder>\n");
    let _ = writeln!(kml, "<name>{}</name>", escape(&flight.serial));
    point_placemark(
        kml,
        &flight.serial,
        &landing_time,
        flight.landing(),
        options.absolute,
    );
    if !options.last_only {
        track_placemark(kml, "Track", &flight.path, options);
    }
    kml.push_str("</Folder>\n");
}

fn point_placemark(
    kml: &mut String,
    name: &str,
    description: &str,
    position: &GeoPosition,
    absolute: bool,
) {
    kml.push_str("<Placemark>\n");
    let _ = writeln!(kml, "<name>{}</name>", escape(name));
    let _ = writeln!(kml, "<description>{}</description>", escape(description));
    kml.push_str("<Style><IconStyle>\n");
    let _ = writeln!(kml, "<scale>{}</scale>", ICON_SCALE);
    let _ = writeln!(kml, "<Icon><href>{}</href></Icon>", PLACEMARK_ICON);
    kml.push_str("</IconStyle></Style>\n");
    kml.push_str("<Point>\n");
    if absolute {
        kml.push_str("<altitudeMode>absolute</altitudeMode>\n");
    }
    let _ = writeln!(kml, "<coordinates>{}</coordinates>", coordinate(position));
    kml.push_str("</Point>\n");
    kml.push_str("</Placemark>\n");
}

fn track_placemark(kml: &mut String, name: &str, path: &[GeoPosition], options: &KmlOptions) {
    kml.push_str("<Placemark>\n");
    let _ = writeln!(kml, "<name>{}</name>", escape(name));
    kml.push_str("<Style>\n<LineStyle>\n");
    let _ = writeln!(kml, "<color>{}</color>", TRACK_COLOR);
    let _ = writeln!(kml, "<width>{}</width>", TRACK_WIDTH);
    kml.push_str("</LineStyle>\n");
    if options.extrude {
        kml.push_str("<PolyStyle>\n");
        let _ = writeln!(kml, "<color>{}</color>", POLY_COLOR);
        kml.push_str("<fill>1</fill>\n<outline>1</outline>\n");
        kml.push_str("</PolyStyle>\n");
    }
    kml.push_str("</Style>\n");
    kml.push_str("<LineString>\n");
    if options.absolute {
        if options.extrude {
            kml.push_str("<extrude>1</extrude>\n");
        }
        kml.push_str("<altitudeMode>absolute</altitudeMode>\n");
    } else {
        kml.push_str("<tessellate>1</tessellate>\n");
    }
    let coordinates: Vec<String> = path.iter().map(coordinate).collect();
    let _ = writeln!(kml, "<coordinates>{}</coordinates>", coordinates.join(" "));
    kml.push_str("</LineString>\n");
    kml.push_str("</Placemark>\n");
}

/// KML coordinate order is lon,lat,alt.
fn coordinate(position: &GeoPosition) -> String {
    format!(
        "{:.6},{:.6},{:.6}",
        position.longitude_deg, position.latitude_deg, position.altitude_m
    )
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn flight() -> Flight {
        Flight {
            serial: "V1854223".to_string(),
            last_time: Utc.with_ymd_and_hms(2024, 4, 8, 13, 58, 12).unwrap(),
            path: vec![
                GeoPosition::new(36.7629, -90.4344, 128.0),
                GeoPosition::new(37.0112, -89.8871, 28211.0),
                GeoPosition::new(37.2204, -89.4501, 312.0),
            ],
        }
    }

    #[test]
    fn document_structure() {
        let kml = document(&[flight()], &KmlOptions::default());

        assert!(kml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(kml.contains(r#"<kml xmlns="http://www.opengis.net/kml/2.2">"#));
        assert!(kml.contains("<name>V1854223</name>"));
        assert!(kml.contains("<description>2024-04-08T13:58:12Z</description>"));
        assert!(kml.contains("<name>Track</name>"));
        // Landing placemark carries the final position, lon first.
        assert!(kml.contains("<coordinates>-89.450100,37.220400,312.000000</coordinates>"));
        assert!(kml.contains("<altitudeMode>absolute</altitudeMode>"));
        assert!(kml.contains("<extrude>1</extrude>"));
        assert!(kml.ends_with("</kml>\n"));
    }

    #[test]
    fn track_lists_every_point_in_order() {
        let kml = document(&[flight()], &KmlOptions::default());

        let track = kml
            .lines()
            .find(|l| l.starts_with("<coordinates>") && l.contains(' '))
            .unwrap();
        let points: Vec<&str> = track
            .trim_start_matches("<coordinates>")
            .trim_end_matches("</coordinates>")
            .split(' ')
            .collect();
        assert_eq!(points.len(), 3);
        assert_eq!(points[0], "-90.434400,36.762900,128.000000");
        assert_eq!(points[2], "-89.450100,37.220400,312.000000");
    }

    #[test]
    fn last_only_skips_the_track() {
        let options = KmlOptions {
            last_only: true,
            ..KmlOptions::default()
        };
        let kml = document(&[flight()], &options);

        assert!(!kml.contains("<LineString>"));
        assert!(kml.contains("<Point>"));
    }

    #[test]
    fn clamped_tracks_tessellate_instead_of_extruding() {
        let options = KmlOptions {
            absolute: false,
            ..KmlOptions::default()
        };
        let kml = document(&[flight()], &options);

        assert!(kml.contains("<tessellate>1</tessellate>"));
        assert!(!kml.contains("<altitudeMode>absolute</altitudeMode>"));
        assert!(!kml.contains("<extrude>1</extrude>"));
    }

    #[test]
    fn escapes_markup_in_names() {
        let mut tagged = flight();
        tagged.serial = "V18<54&223>".to_string();
        let kml = document(&[tagged], &KmlOptions::default());

        assert!(kml.contains("<name>V18&lt;54&amp;223&gt;</name>"));
    }
}
