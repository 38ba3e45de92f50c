//! Per-session calibration state
//!
//! Holds the Ki calibration tables and geometry constants for every known
//! site, plus the active CSR coefficient table. The store is an explicit
//! per-session value passed into the pipeline; mutation happens only
//! through [`CalibrationStore::commit_import`], which installs a
//! fully-built site in a single replace-or-insert.

pub mod import;

use std::collections::BTreeMap;

use log::info;

use crate::model::csr::{default_csr_coefficients, CsrCoefficients};
use crate::types::TargetFilter;

pub use import::EquipmentImport;

/// Geometry constants resolved per calibration site
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct SiteGeometry {
    /// Multiplicative conversion factor applied to x·mAs
    pub conversion_factor: f64,

    /// Reference thickness subtracted from the compressed thickness to
    /// form the inverse-square denominator
    pub reference_thickness: f64,
}

impl SiteGeometry {
    /// IRD preset, also the default for newly registered equipment
    pub const IRD: SiteGeometry = SiteGeometry {
        conversion_factor: 2500.0,
        reference_thickness: 63.0,
    };

    /// UFRJ preset
    pub const UFRJ: SiteGeometry = SiteGeometry {
        conversion_factor: 1892.25,
        reference_thickness: 64.0,
    };
}

/// One site's calibration data: a Ki factor table plus geometry
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationSite {
    name: String,
    geometry: SiteGeometry,
    ki_table: BTreeMap<(TargetFilter, u32), f64>,
}

impl CalibrationSite {
    /// Builds a site from its factor table and geometry
    pub fn new(
        name: impl Into<String>,
        geometry: SiteGeometry,
        ki_table: BTreeMap<(TargetFilter, u32), f64>,
    ) -> Self {
        Self {
            name: name.into(),
            geometry,
            ki_table,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn geometry(&self) -> SiteGeometry {
        self.geometry
    }

    /// Looks up the calibration factor x for (target/filter, integer kV)
    pub fn factor(&self, target_filter: TargetFilter, kv: u32) -> Option<f64> {
        self.ki_table.get(&(target_filter, kv)).copied()
    }

    /// Sorted kV values tabulated for a target/filter, for diagnostics
    pub fn available_kvs(&self, target_filter: TargetFilter) -> Vec<u32> {
        self.ki_table
            .keys()
            .filter(|(tf, _)| *tf == target_filter)
            .map(|(_, kv)| *kv)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.ki_table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ki_table.is_empty()
    }
}

fn ird_ki_table() -> BTreeMap<(TargetFilter, u32), f64> {
    BTreeMap::from([
        ((TargetFilter::MoMo, 26), 0.1357),
        ((TargetFilter::MoMo, 27), 0.1530),
        ((TargetFilter::MoRh, 29), 0.1540),
        ((TargetFilter::MoRh, 31), 0.1830),
    ])
}

fn ufrj_ki_table() -> BTreeMap<(TargetFilter, u32), f64> {
    BTreeMap::from([
        ((TargetFilter::MoMo, 25), 0.119094),
        ((TargetFilter::MoMo, 26), 0.136889),
        ((TargetFilter::MoMo, 27), 0.155258),
        ((TargetFilter::MoMo, 28), 0.175158),
        ((TargetFilter::MoRh, 26), 0.114301),
        ((TargetFilter::MoRh, 27), 0.131012),
        ((TargetFilter::MoRh, 28), 0.148476),
        ((TargetFilter::MoRh, 29), 0.166423),
        ((TargetFilter::RhRh, 28), 0.126825),
        ((TargetFilter::RhRh, 29), 0.142299),
        ((TargetFilter::RhRh, 30), 0.158490),
        ((TargetFilter::RhRh, 31), 0.175164),
    ])
}

/// Session-scoped store of calibration sites and CSR coefficients
#[derive(Debug, Clone)]
pub struct CalibrationStore {
    sites: BTreeMap<String, CalibrationSite>,
    csr_coefficients: BTreeMap<TargetFilter, CsrCoefficients>,
}

impl CalibrationStore {
    /// Creates a store holding the built-in IRD and UFRJ sites and the
    /// default CSR coefficient table
    pub fn with_builtins() -> Self {
        let mut sites = BTreeMap::new();
        sites.insert(
            "IRD".to_string(),
            CalibrationSite::new("IRD", SiteGeometry::IRD, ird_ki_table()),
        );
        sites.insert(
            "UFRJ".to_string(),
            CalibrationSite::new("UFRJ", SiteGeometry::UFRJ, ufrj_ki_table()),
        );
        Self {
            sites,
            csr_coefficients: default_csr_coefficients(),
        }
    }

    pub fn site(&self, name: &str) -> Option<&CalibrationSite> {
        self.sites.get(name)
    }

    /// Registered site names, sorted
    pub fn site_names(&self) -> Vec<&str> {
        self.sites.keys().map(String::as_str).collect()
    }

    /// Active CSR coefficient table
    pub fn csr_coefficients(&self) -> &BTreeMap<TargetFilter, CsrCoefficients> {
        &self.csr_coefficients
    }

    /// Registers or replaces a site from a parsed equipment import
    ///
    /// The import is already validated as a whole, so the new Ki table and
    /// any CSR coefficient updates are installed together; no partial
    /// state is observable. Sites are never removed during a session.
    pub fn commit_import(
        &mut self,
        name: impl Into<String>,
        import: EquipmentImport,
        geometry: SiteGeometry,
    ) {
        let name = name.into();
        let (ki_table, csr_updates) = import.into_tables();

        info!(
            "registering site '{}': {} Ki entries, {} CSR coefficient updates",
            name,
            ki_table.len(),
            csr_updates.len()
        );

        self.sites.insert(
            name.clone(),
            CalibrationSite::new(name, geometry, ki_table),
        );
        self.csr_coefficients.extend(csr_updates);
    }
}

impl Default for CalibrationStore {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_sites_present() {
        let store = CalibrationStore::with_builtins();
        assert_eq!(store.site_names(), vec!["IRD", "UFRJ"]);
        assert_eq!(store.site("IRD").unwrap().len(), 4);
        assert_eq!(store.site("UFRJ").unwrap().len(), 12);
    }

    #[test]
    fn test_builtin_geometry() {
        let store = CalibrationStore::with_builtins();
        assert_eq!(store.site("IRD").unwrap().geometry(), SiteGeometry::IRD);
        assert_eq!(store.site("UFRJ").unwrap().geometry(), SiteGeometry::UFRJ);
    }

    #[test]
    fn test_factor_lookup() {
        let store = CalibrationStore::with_builtins();
        let ird = store.site("IRD").unwrap();
        assert_eq!(ird.factor(TargetFilter::MoMo, 26), Some(0.1357));
        assert_eq!(ird.factor(TargetFilter::MoMo, 28), None);
    }

    #[test]
    fn test_available_kvs_sorted() {
        let store = CalibrationStore::with_builtins();
        let ird = store.site("IRD").unwrap();
        assert_eq!(ird.available_kvs(TargetFilter::MoMo), vec![26, 27]);
        assert_eq!(ird.available_kvs(TargetFilter::MoRh), vec![29, 31]);
        assert!(ird.available_kvs(TargetFilter::WRh).is_empty());
    }

    #[test]
    fn test_commit_import_installs_csr_coefficients() {
        use crate::model::estimate_csr;

        let mut store = CalibrationStore::with_builtins();
        assert!(!store.csr_coefficients().contains_key(&TargetFilter::RhAl));

        let data = "Alvo/Filtro,kV,Ki,CSR_a,CSR_b\nRh/Al,28,0.1500,0.0167,0.08\n";
        let import = EquipmentImport::from_reader(data.as_bytes()).unwrap();
        store.commit_import("CLINIC-C", import, SiteGeometry::IRD);

        let coeffs = store.csr_coefficients().get(&TargetFilter::RhAl).unwrap();
        assert_eq!(coeffs.slope, 0.0167);
        assert_eq!(coeffs.intercept, 0.08);

        // The previously unsupported combination now estimates
        let csr = estimate_csr(28.0, TargetFilter::RhAl, 0.28, store.csr_coefficients()).unwrap();
        assert_eq!(csr.value, 0.55);
        assert_eq!(csr.uncertainty, 0.0047);
    }

    #[test]
    fn test_unknown_site() {
        let store = CalibrationStore::with_builtins();
        assert!(store.site("CLINIC-X").is_none());
    }
}
