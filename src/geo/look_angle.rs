use super::types::{GeoPosition, LookAngle};

/// Spherical earth radius in metres, tuned for mid-latitude sonde work
/// rather than the IUGG mean.
pub const EARTH_RADIUS_M: f64 = 6_364_963.0;

/// Compute bearing, elevation and distances from an observer to a target.
///
/// Great-circle geometry uses Vincenty's formulae with flattening zero (a
/// sphere); elevation and straight-line range come from the planar triangle
/// with sides `radius + alt` on either end of the central angle. Inputs are
/// not range-checked. Coincident positions yield bearing 0 and, when only
/// the altitudes differ, an elevation of exactly +90 degrees.
pub fn look_angle(observer: GeoPosition, target: GeoPosition) -> LookAngle {
    let lat1 = observer.lat_rad();
    let lat2 = target.lat_rad();
    let d_lon = target.lon_rad() - observer.lon_rad();

    let sa = lat2.cos() * d_lon.sin();
    let sb = (lat1.cos() * lat2.sin()) - (lat1.sin() * lat2.cos() * d_lon.cos());
    let mut bearing = sa.atan2(sb);

    let aa = (sa * sa + sb * sb).sqrt();
    let ab = (lat1.sin() * lat2.sin()) + (lat1.cos() * lat2.cos() * d_lon.cos());
    let angle_at_centre = aa.atan2(ab);
    let great_circle_m = angle_at_centre * EARTH_RADIUS_M;

    // The triangle with sides (r + alt1), (r + alt2) and the chord. The
    // angle between the two radial sides is the central angle; the angle
    // between the chord and (r + alt1) is the elevation plus pi/2.
    let ta = EARTH_RADIUS_M + observer.altitude_m;
    let tb = EARTH_RADIUS_M + target.altitude_m;
    let ea = (angle_at_centre.cos() * tb) - ta;
    let eb = angle_at_centre.sin() * tb;
    let elevation = ea.atan2(eb);

    let straight_line_m = (ta * ta + tb * tb - 2.0 * ta * tb * angle_at_centre.cos()).sqrt();

    if bearing < 0.0 {
        bearing += 2.0 * std::f64::consts::PI;
    }

    LookAngle {
        bearing_deg: bearing.to_degrees(),
        bearing_rad: bearing,
        elevation_deg: elevation.to_degrees(),
        elevation_rad: elevation,
        great_circle_m,
        straight_line_m,
    }
}
