use std::io::Write;
use std::path::Path;

use log::info;

use crate::calibration::{CalibrationStore, EquipmentImport, SiteGeometry};
use crate::history::{ComputationRecord, SessionHistory};
use crate::pipeline::{self, StageError};
use crate::types::ExposureInput;

/// One interactive dose-calculation session
///
/// Owns the session's calibration store and computation history. Each
/// session is fully isolated: registering equipment here never affects
/// another session's built-in tables.
///
/// # Example
///
/// ```
/// use mgdcalc_core::{DoseSession, ExposureInput, TargetFilter};
///
/// let mut session = DoseSession::new();
/// let input = ExposureInput {
///     kv: 28.0,
///     mas: 50.0,
///     target_filter: TargetFilter::MoMo,
///     thickness_cm: 6.0,
///     age: Some(45),
///     manual_glandularity: None,
///     site: "UFRJ".to_string(),
///     patient_id: None,
///     initials: None,
/// };
///
/// let record = session.calculate(&input).unwrap();
/// assert_eq!(record.dose.value, 0.78);
/// assert_eq!(session.history().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct DoseSession {
    store: CalibrationStore,
    history: SessionHistory,
}

impl DoseSession {
    /// Creates a session with the built-in calibration sites
    pub fn new() -> Self {
        Self {
            store: CalibrationStore::with_builtins(),
            history: SessionHistory::new(),
        }
    }

    /// Runs the dose pipeline for one exposure
    ///
    /// A completed computation is appended to the session history; a
    /// failed one leaves the history untouched.
    ///
    /// # Errors
    ///
    /// Returns the first stage failure, tagged with the stage name.
    pub fn calculate(
        &mut self,
        input: &ExposureInput,
    ) -> std::result::Result<ComputationRecord, StageError> {
        let record = pipeline::run(input, &self.store)?;
        info!(
            "computed MGD {} mGy for site '{}'",
            record.dose, input.site
        );
        self.history.append(record.clone());
        Ok(record)
    }

    /// Registers or replaces a calibration site from an import file
    pub fn register_equipment(
        &mut self,
        name: &str,
        path: impl AsRef<Path>,
        geometry: SiteGeometry,
    ) -> crate::error::Result<()> {
        let import = EquipmentImport::from_path(path)?;
        self.store.commit_import(name, import, geometry);
        Ok(())
    }

    pub fn store(&self) -> &CalibrationStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut CalibrationStore {
        &mut self.store
    }

    pub fn history(&self) -> &SessionHistory {
        &self.history
    }

    /// Discards the session history; irreversible
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Writes the session history as CSV
    pub fn export_history<W: Write>(&self, writer: W) -> crate::error::Result<()> {
        self.history.export(writer)
    }
}
