use crate::error::{MgdError, Result};
use crate::model::nearest_by_key;
use crate::types::{propagate_uncertainty, round_to, UncertainValue};

/// Cubic g-Factor coefficients for one CSR band
///
/// `g = a0 + a1·t + a2·t² + a3·t³` with `t` in cm. Each coefficient
/// carries its own fitted absolute uncertainty.
struct GFactorBand {
    csr: f64,
    a: [f64; 4],
    da: [f64; 4],
}

const G_FACTOR_BANDS: [GFactorBand; 7] = [
    GFactorBand {
        csr: 0.30,
        a: [0.686_241_4, -0.190_385_1, 0.021_154_9, -0.000_817_0],
        da: [0.021_577_1, 0.012_205_9, 0.002_059_8, 0.000_105_5],
    },
    GFactorBand {
        csr: 0.35,
        a: [0.752_092_4, -0.204_004_5, 0.022_351_4, -0.000_855_3],
        da: [0.021_465_8, 0.012_142_9, 0.002_049_2, 0.000_105_0],
    },
    GFactorBand {
        csr: 0.40,
        a: [0.813_515_9, -0.216_739_1, 0.023_494_9, -0.000_892_5],
        da: [0.020_815_2, 0.011_774_9, 0.001_987_1, 0.000_101_8],
    },
    GFactorBand {
        csr: 0.45,
        a: [0.858_779_2, -0.221_354_2, 0.023_506_1, -0.000_881_7],
        da: [0.020_300_96, 0.011_483_95, 0.001_938_00, 0.000_099_29],
    },
    GFactorBand {
        csr: 0.50,
        a: [0.892_686_5, -0.219_287_0, 0.022_416_4, -0.000_817_1],
        da: [0.019_228_6, 0.010_877_3, 0.001_835_6, 0.000_094_0],
    },
    GFactorBand {
        csr: 0.55,
        a: [0.923_736_7, -0.218_993_1, 0.022_124_1, -0.000_805_0],
        da: [0.018_425_9, 0.010_423_3, 0.001_759_0, 0.000_090_1],
    },
    GFactorBand {
        csr: 0.60,
        a: [0.913_142_2, -0.199_671_3, 0.019_096_5, -0.000_669_6],
        da: [0.009_761_0, 0.005_521_7, 0.000_931_8, 0.000_047_7],
    },
];

/// Estimates the g-Factor dose-conversion correction
///
/// Selects the nearest tabulated CSR band (ties toward the lower band),
/// evaluates the cubic in thickness, clamps to ≥ 0 and rounds to four
/// decimals. Five uncertainty terms are propagated: ∂g/∂t against the
/// thickness uncertainty plus the four coefficient uncertainties against
/// their partials (1, t, t², t³).
pub fn estimate_g_factor(
    csr: f64,
    thickness_cm: f64,
    thickness_uncertainty: f64,
) -> Result<UncertainValue> {
    let band = nearest_by_key(&G_FACTOR_BANDS, |b| b.csr, csr)
        .ok_or_else(|| MgdError::UnknownBandOrGroup(format!("CSR band near {csr}")))?;

    let t = thickness_cm;
    let [a0, a1, a2, a3] = band.a;
    let [da0, da1, da2, da3] = band.da;

    let g = a0 + a1 * t + a2 * t.powi(2) + a3 * t.powi(3);
    let g = round_to(g, 4).max(0.0);

    let dg_dt = a1 + 2.0 * a2 * t + 3.0 * a3 * t.powi(2);
    let uncertainty = propagate_uncertainty(&[
        (dg_dt, thickness_uncertainty),
        (1.0, da0),
        (t, da1),
        (t.powi(2), da2),
        (t.powi(3), da3),
    ]);

    Ok(UncertainValue::new(g, round_to(uncertainty, 4)))
}
