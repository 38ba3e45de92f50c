use std::collections::BTreeMap;

use crate::error::{MgdError, Result};
use crate::types::{propagate_uncertainty, round_to, TargetFilter, UncertainValue};

/// Linear CSR coefficients for one target/filter combination
///
/// `CSR = slope·kV + intercept`
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct CsrCoefficients {
    pub slope: f64,
    pub intercept: f64,
}

/// Default CSR coefficient table
///
/// Rh/Al deliberately has no entry: no fitted line exists for it, and the
/// estimator reports `UnknownTargetFilter` rather than guessing.
pub fn default_csr_coefficients() -> BTreeMap<TargetFilter, CsrCoefficients> {
    BTreeMap::from([
        (
            TargetFilter::MoMo,
            CsrCoefficients {
                slope: 0.01,
                intercept: 0.08,
            },
        ),
        (
            TargetFilter::MoRh,
            CsrCoefficients {
                slope: 0.0067,
                intercept: 0.2333,
            },
        ),
        (
            TargetFilter::RhRh,
            CsrCoefficients {
                slope: 0.0167,
                intercept: -0.0367,
            },
        ),
        (
            TargetFilter::WRh,
            CsrCoefficients {
                slope: 0.0067,
                intercept: 0.3533,
            },
        ),
    ])
}

/// Estimates the CSR beam-quality proxy from tube voltage
///
/// Evaluates the fitted line for the target/filter and rounds to two
/// decimals. Only the kV uncertainty is propagated; the coefficients and
/// the table lookup are treated as exact at this stage.
///
/// # Errors
///
/// Returns `UnknownTargetFilter` when the active table has no coefficients
/// for the combination.
pub fn estimate_csr(
    kv: f64,
    target_filter: TargetFilter,
    kv_uncertainty: f64,
    coefficients: &BTreeMap<TargetFilter, CsrCoefficients>,
) -> Result<UncertainValue> {
    let coeffs = coefficients
        .get(&target_filter)
        .ok_or(MgdError::UnknownTargetFilter(target_filter))?;

    let csr = round_to(coeffs.slope * kv + coeffs.intercept, 2);
    let uncertainty = propagate_uncertainty(&[(coeffs.slope, kv_uncertainty)]);
    Ok(UncertainValue::new(csr, round_to(uncertainty, 4)))
}
