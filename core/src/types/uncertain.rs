use std::fmt;

/// Scalar value paired with its absolute uncertainty
///
/// The unit of currency passed between pipeline stages. The uncertainty is
/// always non-negative; a stage either produces a complete `UncertainValue`
/// or fails, never a partially populated one.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct UncertainValue {
    pub value: f64,
    pub uncertainty: f64,
}

impl UncertainValue {
    /// Creates a new value; the uncertainty is taken by magnitude
    pub fn new(value: f64, uncertainty: f64) -> Self {
        Self {
            value,
            uncertainty: uncertainty.abs(),
        }
    }

    /// A value with zero uncertainty
    pub fn exact(value: f64) -> Self {
        Self {
            value,
            uncertainty: 0.0,
        }
    }
}

impl fmt::Display for UncertainValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ± {}", self.value, self.uncertainty)
    }
}

/// First-order uncertainty propagation for uncorrelated inputs
///
/// Given `(partial derivative, absolute input uncertainty)` pairs, returns
/// `sqrt(Σ (dᵢ · uᵢ)²)`. Every empirical model supplies its own analytic
/// partials and calls this once.
pub fn propagate_uncertainty(terms: &[(f64, f64)]) -> f64 {
    terms
        .iter()
        .map(|(deriv, unc)| (deriv * unc).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// Rounds to a fixed number of decimal places, half away from zero
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (value * scale).round() / scale
}
