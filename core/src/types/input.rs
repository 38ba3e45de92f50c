use crate::error::{MgdError, Result};
use crate::types::TargetFilter;

/// Operator-entered parameters for one mammography exposure
///
/// Immutable once submitted to the pipeline. The entry form is expected to
/// enforce these ranges already; `validate` re-checks them so the core
/// never evaluates the empirical models outside their fitted domain.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ExposureInput {
    /// Tube voltage in kV
    pub kv: f64,

    /// Tube charge in mAs
    pub mas: f64,

    /// Target/filter combination
    pub target_filter: TargetFilter,

    /// Compressed breast thickness in cm
    pub thickness_cm: f64,

    /// Patient age in years (used for automatic glandularity)
    pub age: Option<u32>,

    /// Known glandularity percent; skips the age-based estimate
    pub manual_glandularity: Option<f64>,

    /// Name of the calibration site whose Ki table applies
    pub site: String,

    /// Patient identifier for the history record
    pub patient_id: Option<String>,

    /// Patient initials for the history record
    pub initials: Option<String>,
}

impl ExposureInput {
    /// Checks the form-level ranges
    ///
    /// # Errors
    ///
    /// Returns `OutOfRange` when kV, mAs, thickness, or a manual
    /// glandularity percent falls outside its supported interval.
    pub fn validate(&self) -> Result<()> {
        if !(self.kv > 0.0) {
            return Err(MgdError::OutOfRange {
                quantity: "kV",
                value: self.kv,
                min: 0.0,
                max: f64::INFINITY,
            });
        }
        if !(self.mas > 0.0) {
            return Err(MgdError::OutOfRange {
                quantity: "mAs",
                value: self.mas,
                min: 0.0,
                max: f64::INFINITY,
            });
        }
        if !(1.0..=20.0).contains(&self.thickness_cm) {
            return Err(MgdError::OutOfRange {
                quantity: "thickness (cm)",
                value: self.thickness_cm,
                min: 1.0,
                max: 20.0,
            });
        }
        if let Some(g) = self.manual_glandularity {
            if !(0.0..=100.0).contains(&g) {
                return Err(MgdError::OutOfRange {
                    quantity: "glandularity (%)",
                    value: g,
                    min: 0.0,
                    max: 100.0,
                });
            }
        }
        Ok(())
    }
}
