//! Dose computation pipeline
//!
//! Sequences the empirical models in their fixed order (glandularity →
//! CSR → g-Factor → c-Factor → Ki → dose), short-circuiting on the first
//! stage failure. Only a run that completes every stage produces a
//! [`ComputationRecord`].

pub mod dose;
pub mod ki;

use std::fmt;

use chrono::Local;
use log::debug;
use thiserror::Error;

use crate::calibration::CalibrationStore;
use crate::error::MgdError;
use crate::history::ComputationRecord;
use crate::model::{estimate_c_factor, estimate_csr, estimate_g_factor, estimate_glandularity};
use crate::types::{ExposureInput, GlandularityGroup};

pub use dose::{compose_dose, compose_dose_with_scale, DOSE_UNCERTAINTY_SCALE};
pub use ki::estimate_ki;

/// Relative uncertainty assumed for the entered tube voltage
pub const KV_UNCERTAINTY_FRACTION: f64 = 0.01;
/// Relative uncertainty assumed for the entered tube charge
pub const MAS_UNCERTAINTY_FRACTION: f64 = 0.05;
/// Relative uncertainty assumed for the entered compressed thickness
pub const THICKNESS_UNCERTAINTY_FRACTION: f64 = 0.05;

/// Pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum Stage {
    Input,
    Glandularity,
    Csr,
    GFactor,
    CFactor,
    Ki,
    Dose,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Input => "input",
            Stage::Glandularity => "glandularity",
            Stage::Csr => "CSR",
            Stage::GFactor => "g-factor",
            Stage::CFactor => "c-factor",
            Stage::Ki => "air kerma",
            Stage::Dose => "dose",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A pipeline failure tagged with the stage that produced it
///
/// Downstream stages never execute once a stage has failed, and nothing is
/// appended to the session history.
#[derive(Error, Debug)]
#[error("{stage} stage failed: {source}")]
pub struct StageError {
    pub stage: Stage,
    #[source]
    pub source: MgdError,
}

impl StageError {
    fn wrap(stage: Stage) -> impl FnOnce(MgdError) -> StageError {
        move |source| StageError { stage, source }
    }
}

/// Runs the full dose pipeline for one exposure
///
/// A caller-supplied manual glandularity percent short-circuits the
/// age-based estimate entirely. Identical input against an identical store
/// yields a bit-identical record (apart from the timestamp).
pub fn run(
    input: &ExposureInput,
    store: &CalibrationStore,
) -> Result<ComputationRecord, StageError> {
    input.validate().map_err(StageError::wrap(Stage::Input))?;

    let glandularity = match input.manual_glandularity {
        Some(percent) => percent,
        None => {
            let age = input.age.ok_or(StageError {
                stage: Stage::Glandularity,
                source: MgdError::MissingAge,
            })?;
            estimate_glandularity(age, input.thickness_cm)
                .map_err(StageError::wrap(Stage::Glandularity))?
        }
    };
    let group = GlandularityGroup::from_percent(glandularity);
    debug!("glandularity resolved: {glandularity}% (group {group})");

    let kv_uncertainty = input.kv * KV_UNCERTAINTY_FRACTION;
    let mas_uncertainty = input.mas * MAS_UNCERTAINTY_FRACTION;
    let thickness_uncertainty = input.thickness_cm * THICKNESS_UNCERTAINTY_FRACTION;

    let csr = estimate_csr(
        input.kv,
        input.target_filter,
        kv_uncertainty,
        store.csr_coefficients(),
    )
    .map_err(StageError::wrap(Stage::Csr))?;
    debug!("CSR resolved: {csr}");

    let g_factor = estimate_g_factor(csr.value, input.thickness_cm, thickness_uncertainty)
        .map_err(StageError::wrap(Stage::GFactor))?;
    let c_factor = estimate_c_factor(
        csr.value,
        input.thickness_cm,
        glandularity,
        thickness_uncertainty,
    )
    .map_err(StageError::wrap(Stage::CFactor))?;
    debug!("factors resolved: g = {g_factor}, c = {c_factor}");

    let site = store
        .site(&input.site)
        .ok_or_else(|| StageError::wrap(Stage::Ki)(MgdError::UnknownSite(input.site.clone())))?;
    let air_kerma = estimate_ki(
        input.kv,
        input.target_filter,
        input.mas,
        input.thickness_cm,
        mas_uncertainty,
        thickness_uncertainty,
        site,
    )
    .map_err(StageError::wrap(Stage::Ki))?;
    debug!("air kerma resolved: {air_kerma} mGy");

    let s_factor = input.target_filter.s_factor();
    let dose = compose_dose(air_kerma, s_factor, g_factor, c_factor);
    debug!("dose composed: {dose} mGy");

    Ok(ComputationRecord {
        timestamp: Local::now(),
        input: input.clone(),
        glandularity_pct: glandularity,
        glandularity_group: group,
        s_factor,
        csr,
        g_factor,
        c_factor,
        air_kerma,
        dose,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::{CalibrationStore, EquipmentImport, SiteGeometry};
    use crate::types::TargetFilter;

    fn input() -> ExposureInput {
        ExposureInput {
            kv: 28.0,
            mas: 50.0,
            target_filter: TargetFilter::MoMo,
            thickness_cm: 6.0,
            age: Some(45),
            manual_glandularity: None,
            site: "UFRJ".to_string(),
            patient_id: Some("12345".to_string()),
            initials: Some("J.S.".to_string()),
        }
    }

    #[test]
    fn test_full_pipeline_ufrj() {
        let store = CalibrationStore::with_builtins();
        let record = run(&input(), &store).unwrap();

        assert_eq!(record.glandularity_pct, 28.42);
        assert_eq!(record.glandularity_group, GlandularityGroup::Group2);
        assert_eq!(record.csr.value, 0.36);
        assert_eq!(record.g_factor.value, 0.148);
        assert_eq!(record.c_factor.value, 1.0644);
        assert_eq!(record.air_kerma.value, 4.93);
        assert_eq!(record.dose.value, 0.78);
        assert_eq!(record.dose.uncertainty, 0.0573);
    }

    #[test]
    fn test_deterministic() {
        let store = CalibrationStore::with_builtins();
        let first = run(&input(), &store).unwrap();
        let second = run(&input(), &store).unwrap();
        assert_eq!(first.dose, second.dose);
        assert_eq!(first.csr, second.csr);
        assert_eq!(first.air_kerma, second.air_kerma);
    }

    #[test]
    fn test_ird_missing_kv_fails_at_ki_stage() {
        let store = CalibrationStore::with_builtins();
        let mut exposure = input();
        exposure.site = "IRD".to_string();
        let err = run(&exposure, &store).unwrap_err();
        assert_eq!(err.stage, Stage::Ki);
        match err.source {
            MgdError::CalibrationNotFound { available, .. } => {
                assert_eq!(available, vec![26, 27]);
            }
            other => panic!("expected CalibrationNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_manual_glandularity_skips_age_estimate() {
        let store = CalibrationStore::with_builtins();
        let mut exposure = input();
        exposure.age = None; // would fail the age-based estimate
        exposure.manual_glandularity = Some(50.0);
        let record = run(&exposure, &store).unwrap();
        assert_eq!(record.glandularity_pct, 50.0);
        assert_eq!(record.glandularity_group, GlandularityGroup::Group2);
    }

    #[test]
    fn test_missing_age_without_manual_glandularity() {
        let store = CalibrationStore::with_builtins();
        let mut exposure = input();
        exposure.age = None;
        exposure.manual_glandularity = None;
        let err = run(&exposure, &store).unwrap_err();
        assert_eq!(err.stage, Stage::Glandularity);
        assert!(matches!(err.source, MgdError::MissingAge));
        assert_eq!(
            err.source.to_string(),
            "age is required when no manual glandularity is supplied"
        );
    }

    #[test]
    fn test_age_out_of_band_fails_at_glandularity_stage() {
        let store = CalibrationStore::with_builtins();
        let mut exposure = input();
        exposure.age = Some(25);
        let err = run(&exposure, &store).unwrap_err();
        assert_eq!(err.stage, Stage::Glandularity);
        assert!(matches!(err.source, MgdError::AgeOutOfRange { .. }));
    }

    #[test]
    fn test_rh_al_fails_at_csr_stage() {
        let store = CalibrationStore::with_builtins();
        let mut exposure = input();
        exposure.target_filter = TargetFilter::RhAl;
        let err = run(&exposure, &store).unwrap_err();
        assert_eq!(err.stage, Stage::Csr);
    }

    #[test]
    fn test_unknown_site_fails_at_ki_stage() {
        let store = CalibrationStore::with_builtins();
        let mut exposure = input();
        exposure.site = "NOWHERE".to_string();
        let err = run(&exposure, &store).unwrap_err();
        assert_eq!(err.stage, Stage::Ki);
        assert!(matches!(err.source, MgdError::UnknownSite(_)));
    }

    #[test]
    fn test_invalid_input_fails_before_any_stage() {
        let store = CalibrationStore::with_builtins();
        let mut exposure = input();
        exposure.thickness_cm = 0.2;
        let err = run(&exposure, &store).unwrap_err();
        assert_eq!(err.stage, Stage::Input);
    }

    #[test]
    fn test_imported_csr_coefficients_unlock_target_filter() {
        let mut store = CalibrationStore::with_builtins();
        let data = "Alvo/Filtro,kV,Ki,CSR_a,CSR_b\nRh/Al,28,0.1500,0.0167,0.08\n";
        let import = EquipmentImport::from_reader(data.as_bytes()).unwrap();
        store.commit_import("CLINIC-C", import, SiteGeometry::IRD);

        let mut exposure = input();
        exposure.target_filter = TargetFilter::RhAl;
        exposure.site = "CLINIC-C".to_string();
        let record = run(&exposure, &store).unwrap();
        assert_eq!(record.csr.value, 0.55);
        assert!(record.dose.value > 0.0);
    }

    #[test]
    fn test_registered_site_feeds_pipeline() {
        let mut store = CalibrationStore::with_builtins();
        let data = "Alvo/Filtro,kV,Ki\nMo/Mo,28,0.175158\n";
        let import = EquipmentImport::from_reader(data.as_bytes()).unwrap();
        store.commit_import("CLINIC-A", import, SiteGeometry::UFRJ);

        let mut exposure = input();
        exposure.site = "CLINIC-A".to_string();
        let record = run(&exposure, &store).unwrap();
        // Same x and geometry as the built-in UFRJ entry
        assert_eq!(record.air_kerma.value, 4.93);
    }
}
