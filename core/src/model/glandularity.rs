use crate::error::{MgdError, Result};
use crate::types::round_to;

/// Youngest supported age, inclusive
pub const MIN_AGE: u32 = 30;
/// Oldest supported age, inclusive
pub const MAX_AGE: u32 = 88;

/// Cubic glandularity coefficients for one age band
///
/// `G = a·t³ + b·t² + c·t + k` with `t` the compressed thickness in mm.
struct AgeBand {
    min_age: u32,
    max_age: u32,
    a: f64,
    b: f64,
    c: f64,
    k: f64,
}

const AGE_BANDS: [AgeBand; 4] = [
    AgeBand {
        min_age: 30,
        max_age: 49,
        a: -0.000196,
        b: 0.0666,
        c: -7.45,
        k: 278.0,
    },
    AgeBand {
        min_age: 50,
        max_age: 54,
        a: -0.000255,
        b: 0.0768,
        c: -7.67,
        k: 259.0,
    },
    AgeBand {
        min_age: 55,
        max_age: 59,
        a: -0.000199,
        b: 0.0593,
        c: -6.00,
        k: 207.0,
    },
    AgeBand {
        min_age: 60,
        max_age: 88,
        a: -0.000186,
        b: 0.0572,
        c: -5.99,
        k: 208.0,
    },
];

/// Estimates the glandular tissue percentage from age and thickness
///
/// Selects the coefficient quadruple for the patient's age band, evaluates
/// the cubic at the thickness in millimeters, clamps to ≥ 0 and rounds to
/// two decimals. The estimate is treated as exact: the published fit does
/// not carry coefficient uncertainties, so none are propagated here.
///
/// # Errors
///
/// Returns `AgeOutOfRange` when the age falls outside [30, 88]; there is no
/// extrapolated band.
pub fn estimate_glandularity(age: u32, thickness_cm: f64) -> Result<f64> {
    let band = AGE_BANDS
        .iter()
        .find(|b| (b.min_age..=b.max_age).contains(&age))
        .ok_or(MgdError::AgeOutOfRange {
            age,
            min: MIN_AGE,
            max: MAX_AGE,
        })?;

    let t = thickness_cm * 10.0;
    let g = band.a * t.powi(3) + band.b * t.powi(2) + band.c * t + band.k;
    Ok(round_to(g.max(0.0), 2))
}
