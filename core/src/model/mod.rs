//! Empirical model library
//!
//! Independent scalar models fitted from published mammography dosimetry
//! data: the age-based glandularity estimate, the CSR (half-value-layer
//! proxy) line, and the g- and c-Factor conversion cubics. Coefficient
//! tables are read-only constants; band selection is a nearest-key search
//! over the tabulated CSR breakpoints.

pub mod c_factor;
pub mod csr;
pub mod g_factor;
pub mod glandularity;

pub use c_factor::estimate_c_factor;
pub use csr::{default_csr_coefficients, estimate_csr, CsrCoefficients};
pub use g_factor::estimate_g_factor;
pub use glandularity::estimate_glandularity;

/// Selects the item whose key is closest to `target`
///
/// Ties break toward the earlier item, matching the tabulated band order.
pub(crate) fn nearest_by_key<T>(items: &[T], key: impl Fn(&T) -> f64, target: f64) -> Option<&T> {
    let mut best: Option<(&T, f64)> = None;
    for item in items {
        let distance = (key(item) - target).abs();
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((item, distance)),
        }
    }
    best.map(|(item, _)| item)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearest_picks_closest() {
        let keys = [0.30, 0.35, 0.40];
        let nearest = nearest_by_key(&keys, |k| *k, 0.36).unwrap();
        assert_eq!(*nearest, 0.35);
    }

    #[test]
    fn test_nearest_tie_breaks_to_first() {
        let keys = [0.30, 0.40];
        // 0.35 is equidistant from both; the earlier key wins
        let nearest = nearest_by_key(&keys, |k| *k, 0.35).unwrap();
        assert_eq!(*nearest, 0.30);
    }

    #[test]
    fn test_nearest_is_idempotent_on_keys() {
        let keys = [0.30, 0.35, 0.40];
        for k in keys {
            assert_eq!(*nearest_by_key(&keys, |x| *x, k).unwrap(), k);
        }
    }

    #[test]
    fn test_nearest_empty() {
        let keys: [f64; 0] = [];
        assert!(nearest_by_key(&keys, |k| *k, 0.5).is_none());
    }
}
