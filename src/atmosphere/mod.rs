//! US Standard Atmosphere 1976 density model, eight bands up to 84 852 m.

pub const SEA_LEVEL_DENSITY_KG_M3: f64 = 1.225;
pub const SEA_LEVEL_TEMPERATURE_K: f64 = 288.15;

const GRAVITY_M_S2: f64 = 9.80665;
const AIR_MOLAR_MASS: f64 = 28.9644;
const GAS_CONSTANT: f64 = 8.31432;

/// An isothermal band has a zero lapse rate below this magnitude.
const ISOTHERMAL_EPS: f64 = 1e-10;

struct Band {
    base_altitude_m: f64,
    pressure_ratio: f64,
    base_temperature_k: f64,
    lapse_rate_k_per_km: f64,
}

static BANDS: [Band; 8] = [
    Band {
        base_altitude_m: 0.0,
        pressure_ratio: 1.0,
        base_temperature_k: 288.15,
        lapse_rate_k_per_km: -6.5,
    },
    Band {
        base_altitude_m: 11000.0,
        pressure_ratio: 2.23361105092158e-1,
        base_temperature_k: 216.65,
        lapse_rate_k_per_km: 0.0,
    },
    Band {
        base_altitude_m: 20000.0,
        pressure_ratio: 5.403295010784876e-2,
        base_temperature_k: 216.65,
        lapse_rate_k_per_km: 1.0,
    },
    Band {
        base_altitude_m: 32000.0,
        pressure_ratio: 8.566678359291667e-3,
        base_temperature_k: 228.65,
        lapse_rate_k_per_km: 2.8,
    },
    Band {
        base_altitude_m: 47000.0,
        pressure_ratio: 1.0945601337771144e-3,
        base_temperature_k: 270.65,
        lapse_rate_k_per_km: 0.0,
    },
    Band {
        base_altitude_m: 51000.0,
        pressure_ratio: 6.606353132858367e-4,
        base_temperature_k: 270.65,
        lapse_rate_k_per_km: -2.8,
    },
    Band {
        base_altitude_m: 71000.0,
        pressure_ratio: 3.904683373343926e-5,
        base_temperature_k: 214.65,
        lapse_rate_k_per_km: -2.0,
    },
    Band {
        base_altitude_m: 84852.0,
        pressure_ratio: 3.6850095235747942e-6,
        base_temperature_k: 186.946,
        lapse_rate_k_per_km: 0.0,
    },
];

/// Last band whose base altitude is at or below the given altitude.
/// Negative altitudes fall into the ground band; altitudes above the top
/// band extrapolate with the top band's formula.
fn band_for(altitude_m: f64) -> &'static Band {
    let mut i = 0;
    while i + 1 < BANDS.len() && altitude_m > BANDS[i + 1].base_altitude_m {
        i += 1;
    }
    &BANDS[i]
}

/// Air density in kg/m^3 at the given altitude AMSL.
pub fn density(altitude_m: f64) -> f64 {
    let band = band_for(altitude_m);
    let lapse_k_per_m = band.lapse_rate_k_per_km / 1000.0;
    let delta_m = altitude_m - band.base_altitude_m;
    let temperature_k = band.base_temperature_k + lapse_k_per_m * delta_m;

    let g_m_r = GRAVITY_M_S2 * AIR_MOLAR_MASS / GAS_CONSTANT;
    let pressure_ratio = if lapse_k_per_m.abs() < ISOTHERMAL_EPS {
        band.pressure_ratio * (-g_m_r * delta_m / 1000.0 / band.base_temperature_k).exp()
    } else {
        band.pressure_ratio
            * (band.base_temperature_k / temperature_k).powf(g_m_r / lapse_k_per_m / 1000.0)
    };

    SEA_LEVEL_DENSITY_KG_M3 * pressure_ratio * SEA_LEVEL_TEMPERATURE_K / temperature_k
}

/// Rescale a descent rate measured at altitude to the rate the same body
/// would exhibit in sea-level air. Terminal velocity under quadratic drag
/// scales with the square root of density.
pub fn sea_level_descent_rate(descent_rate_m_s: f64, altitude_m: f64) -> f64 {
    descent_rate_m_s * (density(altitude_m) / SEA_LEVEL_DENSITY_KG_M3).sqrt()
}
