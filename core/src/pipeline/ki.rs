use crate::calibration::CalibrationSite;
use crate::error::{MgdError, Result};
use crate::types::{propagate_uncertainty, round_to, TargetFilter, UncertainValue};

/// Fixed relative uncertainty of tabulated calibration factors x
pub const X_FACTOR_UNCERTAINTY_FRACTION: f64 = 0.02;

/// Estimates the incident air kerma Ki for one exposure
///
/// Looks up the calibration factor x at (target/filter, integer-truncated
/// kV) in the site's table, then evaluates
/// `Ki = x·mAs·conv / (ref - t)²` with the site's geometry constants,
/// rounded to two decimals. Three uncertainty terms are propagated:
/// ∂Ki/∂x against 2% of x, ∂Ki/∂mAs against the mAs uncertainty, and
/// ∂Ki/∂t (cubic in the denominator) against the thickness uncertainty.
///
/// # Errors
///
/// Returns `CalibrationNotFound` (listing the kV values tabulated for the
/// target/filter) on a lookup miss, and `DegenerateGeometry` when the
/// denominator is exactly zero.
pub fn estimate_ki(
    kv: f64,
    target_filter: TargetFilter,
    mas: f64,
    thickness_cm: f64,
    mas_uncertainty: f64,
    thickness_uncertainty: f64,
    site: &CalibrationSite,
) -> Result<UncertainValue> {
    let kv_key = kv.trunc() as u32;
    let x = site
        .factor(target_filter, kv_key)
        .ok_or_else(|| MgdError::CalibrationNotFound {
            site: site.name().to_string(),
            target_filter,
            kv: kv_key,
            available: site.available_kvs(target_filter),
        })?;

    let geometry = site.geometry();
    let conv = geometry.conversion_factor;
    let gap = geometry.reference_thickness - thickness_cm;
    let divisor = gap.powi(2);
    if divisor == 0.0 {
        return Err(MgdError::DegenerateGeometry);
    }

    let ki = round_to(x * mas * conv / divisor, 2);

    let x_uncertainty = x * X_FACTOR_UNCERTAINTY_FRACTION;
    let dki_dx = mas * conv / divisor;
    let dki_dmas = x * conv / divisor;
    let dki_dt = x * mas * conv * 2.0 / gap.powi(3);

    let uncertainty = propagate_uncertainty(&[
        (dki_dx, x_uncertainty),
        (dki_dmas, mas_uncertainty),
        (dki_dt, thickness_uncertainty),
    ]);

    Ok(UncertainValue::new(ki, round_to(uncertainty, 4)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::{CalibrationSite, CalibrationStore, SiteGeometry};
    use std::collections::BTreeMap;

    fn store() -> CalibrationStore {
        CalibrationStore::with_builtins()
    }

    #[test]
    fn test_ufrj_mo_mo_28() {
        let binding = store();
        let ufrj = binding.site("UFRJ").unwrap();
        // x = 0.175158, conv = 1892.25, ref = 64, t = 6 → (64-6)² = 3364
        let ki = estimate_ki(28.0, TargetFilter::MoMo, 50.0, 6.0, 2.5, 0.3, ufrj).unwrap();
        assert_eq!(ki.value, 4.93);
        assert_eq!(ki.uncertainty, 0.2701);
    }

    #[test]
    fn test_kv_is_integer_truncated() {
        let binding = store();
        let ufrj = binding.site("UFRJ").unwrap();
        let exact = estimate_ki(28.0, TargetFilter::MoMo, 50.0, 6.0, 0.0, 0.0, ufrj).unwrap();
        let fractional = estimate_ki(28.9, TargetFilter::MoMo, 50.0, 6.0, 0.0, 0.0, ufrj).unwrap();
        assert_eq!(exact.value, fractional.value);
    }

    #[test]
    fn test_lookup_miss_lists_available_kvs() {
        let binding = store();
        let ird = binding.site("IRD").unwrap();
        let err = estimate_ki(28.0, TargetFilter::MoMo, 50.0, 6.0, 2.5, 0.3, ird).unwrap_err();
        match err {
            MgdError::CalibrationNotFound {
                site,
                target_filter,
                kv,
                available,
            } => {
                assert_eq!(site, "IRD");
                assert_eq!(target_filter, TargetFilter::MoMo);
                assert_eq!(kv, 28);
                assert_eq!(available, vec![26, 27]);
            }
            other => panic!("expected CalibrationNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_degenerate_geometry() {
        let site = CalibrationSite::new(
            "FLAT",
            SiteGeometry {
                conversion_factor: 2500.0,
                reference_thickness: 6.0,
            },
            BTreeMap::from([((TargetFilter::MoMo, 28), 0.15)]),
        );
        let err = estimate_ki(28.0, TargetFilter::MoMo, 50.0, 6.0, 0.0, 0.0, &site).unwrap_err();
        assert!(matches!(err, MgdError::DegenerateGeometry));
    }

    #[test]
    fn test_uncertainty_zero_for_exact_inputs_and_exact_x() {
        let site = CalibrationSite::new(
            "EXACT",
            SiteGeometry::IRD,
            BTreeMap::from([((TargetFilter::MoMo, 28), 0.15)]),
        );
        let ki = estimate_ki(28.0, TargetFilter::MoMo, 50.0, 6.0, 0.0, 0.0, &site).unwrap();
        // The 2% x uncertainty always contributes
        assert!(ki.uncertainty > 0.0);
    }
}
