use crate::error::{MgdError, Result};
use crate::model::nearest_by_key;
use crate::types::{propagate_uncertainty, round_to, GlandularityGroup, UncertainValue};

/// Relative uncertainty assigned to every c-Factor coefficient
///
/// The published tables carry no per-coefficient uncertainties; the
/// calibration policy assigns 5% of each coefficient's magnitude.
pub const C_COEFFICIENT_UNCERTAINTY: f64 = 0.05;

/// Cubic c-Factor coefficients for one CSR band
///
/// `c = a·t³ + b·t² + c·t + d` with `t` in cm; one `[a, b, c, d]` quadruple
/// per glandularity group 1-4.
struct CFactorBand {
    csr: f64,
    groups: [[f64; 4]; 4],
}

const C_FACTOR_BANDS: [CFactorBand; 16] = [
    CFactorBand {
        csr: 0.34,
        groups: [
            [0.0004, -0.0105, 0.093, 0.9449],
            [0.0001, -0.0035, 0.0295, 0.9831],
            [-0.0001, 0.0028, -0.0242, 1.0105],
            [-0.0005, 0.0103, -0.0773, 1.0343],
        ],
    },
    CFactorBand {
        csr: 0.35,
        groups: [
            [0.0004, -0.0105, 0.093, 0.9449],
            [0.0001, -0.0035, 0.0295, 0.9831],
            [-0.0001, 0.0028, -0.0242, 1.0105],
            [-0.0005, 0.0103, -0.0773, 1.0343],
        ],
    },
    CFactorBand {
        csr: 0.36,
        groups: [
            [0.0004, -0.0103, 0.0915, 0.9443],
            [0.0002, -0.0044, 0.0338, 0.9768],
            [-0.0001, 0.0029, -0.0248, 1.0118],
            [-0.0004, 0.0093, -0.0726, 1.03],
        ],
    },
    CFactorBand {
        csr: 0.37,
        groups: [
            [0.0005, -0.0117, 0.098, 0.9345],
            [0.0002, -0.0041, 0.0325, 0.9783],
            [-0.0001, 0.003, -0.0247, 1.0117],
            [-0.0004, 0.0091, -0.0718, 1.0304],
        ],
    },
    CFactorBand {
        csr: 0.38,
        groups: [
            [0.0005, -0.0117, 0.0978, 0.9342],
            [0.0002, -0.0041, 0.0324, 0.9782],
            [-0.0001, 0.0031, -0.0252, 1.0126],
            [-0.0004, 0.009, -0.0715, 1.0306],
        ],
    },
    CFactorBand {
        csr: 0.39,
        groups: [
            [0.0005, -0.0116, 0.0974, 0.934],
            [0.0002, -0.0041, 0.0324, 0.9782],
            [-0.0001, 0.0031, -0.0251, 1.0126],
            [-0.0004, 0.0089, -0.0712, 1.0311],
        ],
    },
    CFactorBand {
        csr: 0.40,
        groups: [
            [0.0005, -0.0114, 0.0959, 0.9335],
            [0.0002, -0.0041, 0.0322, 0.9779],
            [-0.0001, 0.0031, -0.0248, 1.0128],
            [-0.0004, 0.0087, -0.0703, 1.0324],
        ],
    },
    CFactorBand {
        csr: 0.41,
        groups: [
            [0.0007, -0.0154, 0.1207, 0.8822],
            [0.0002, -0.0036, 0.0299, 0.9801],
            [-0.0001, 0.0031, -0.0248, 1.0125],
            [-0.0004, 0.009, -0.0716, 1.0352],
        ],
    },
    CFactorBand {
        csr: 0.42,
        groups: [
            [0.0007, -0.0165, 0.1278, 0.8677],
            [0.0001, -0.0034, 0.0293, 0.9807],
            [-0.0001, 0.0031, -0.0247, 1.0124],
            [-0.0004, 0.0091, -0.0719, 1.0358],
        ],
    },
    CFactorBand {
        csr: 0.43,
        groups: [
            [0.0008, -0.0177, 0.1349, 0.853],
            [0.0001, -0.0033, 0.0286, 0.9815],
            [-0.0001, 0.0031, -0.0247, 1.0124],
            [-0.0004, 0.0092, -0.0724, 1.0368],
        ],
    },
    CFactorBand {
        csr: 0.44,
        groups: [
            [0.0009, -0.0188, 0.1419, 0.8384],
            [0.0001, -0.0032, 0.0279, 0.9822],
            [-0.0001, 0.0031, -0.0246, 1.0122],
            [-0.0004, 0.0092, -0.0727, 1.0375],
        ],
    },
    CFactorBand {
        csr: 0.45,
        groups: [
            [0.0011, -0.0229, 0.1669, 0.787],
            [0.00009, -0.0026, 0.0252, 0.9851],
            [-0.0001, 0.0029, -0.0238, 1.0109],
            [-0.0004, 0.009, -0.0719, 1.0374],
        ],
    },
    CFactorBand {
        csr: 0.46,
        groups: [
            [0.0007, -0.0162, 0.1292, 0.8523],
            [0.00008, -0.0024, 0.0241, 0.9865],
            [-0.0001, 0.0029, -0.0241, 1.0127],
            [-0.0004, 0.0087, -0.0706, 1.0377],
        ],
    },
    CFactorBand {
        csr: 0.47,
        groups: [
            [0.0006, -0.015, 0.1216, 0.8666],
            [0.00008, -0.0024, 0.0238, 0.9869],
            [-0.0001, 0.0029, -0.0242, 1.0132],
            [-0.0004, 0.0086, -0.07, 1.0375],
        ],
    },
    CFactorBand {
        csr: 0.48,
        groups: [
            [0.0008, -0.0177, 0.1349, 0.853],
            [0.0008, -0.0177, 0.1349, 0.853],
            [0.0004, -0.0105, 0.093, 1.077],
            [-0.0004, 0.0093, -0.0726, 1.03],
        ],
    },
    // The published 0.50 table squares the linear term for group 2
    // (0.1349·t² where every other row is linear). The entry is a copy of
    // the 0.48 group-1 row, so the linear form is used here.
    CFactorBand {
        csr: 0.50,
        groups: [
            [0.0004, -0.0105, 0.093, 1.077],
            [0.0008, -0.0177, 0.1349, 0.853],
            [0.0004, -0.0105, 0.093, 1.077],
            [-0.0004, 0.0093, -0.0726, 1.03],
        ],
    },
];

/// Estimates the c-Factor breast-composition correction
///
/// Resolves the glandularity group, selects the nearest tabulated CSR band
/// (ties toward the lower band), evaluates the group's cubic in thickness
/// and rounds to four decimals. Five uncertainty terms are propagated:
/// ∂c/∂t against the thickness uncertainty plus 5%-of-magnitude
/// uncertainties for the four coefficients against their partials
/// (t³, t², t, 1).
pub fn estimate_c_factor(
    csr: f64,
    thickness_cm: f64,
    glandularity_percent: f64,
    thickness_uncertainty: f64,
) -> Result<UncertainValue> {
    let group = GlandularityGroup::from_percent(glandularity_percent);
    let band = nearest_by_key(&C_FACTOR_BANDS, |b| b.csr, csr).ok_or_else(|| {
        MgdError::UnknownBandOrGroup(format!("CSR band near {csr}, glandularity group {group}"))
    })?;

    let t = thickness_cm;
    let [a, b, c, d] = band.groups[group.index()];

    let value = round_to(a * t.powi(3) + b * t.powi(2) + c * t + d, 4);

    let dc_dt = 3.0 * a * t.powi(2) + 2.0 * b * t + c;
    let uncertainty = propagate_uncertainty(&[
        (dc_dt, thickness_uncertainty),
        (t.powi(3), a * C_COEFFICIENT_UNCERTAINTY),
        (t.powi(2), b * C_COEFFICIENT_UNCERTAINTY),
        (t, c * C_COEFFICIENT_UNCERTAINTY),
        (1.0, d * C_COEFFICIENT_UNCERTAINTY),
    ]);

    Ok(UncertainValue::new(value, round_to(uncertainty, 4)))
}
