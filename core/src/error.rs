use crate::types::TargetFilter;
use thiserror::Error;

/// Result type for mgdcalc operations
pub type Result<T> = std::result::Result<T, MgdError>;

/// Error types for mgdcalc operations
#[derive(Error, Debug)]
pub enum MgdError {
    /// Patient age outside the supported glandularity bands
    #[error("age {age} is outside the supported range {min}-{max} years")]
    AgeOutOfRange { age: u32, min: u32, max: u32 },

    /// Age-based glandularity requested without an age
    #[error("age is required when no manual glandularity is supplied")]
    MissingAge,

    /// Numeric input outside the supported range
    #[error("{quantity} = {value} is outside the supported range [{min}, {max}]")]
    OutOfRange {
        quantity: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// No CSR coefficients registered for the target/filter combination
    #[error("no CSR coefficients for target/filter {0}")]
    UnknownTargetFilter(TargetFilter),

    /// No model coefficient set for the resolved band/group key
    #[error("no model coefficient set for {0}")]
    UnknownBandOrGroup(String),

    /// Calibration site not registered in the store
    #[error("unknown calibration site '{0}'")]
    UnknownSite(String),

    /// No calibration factor for the (target/filter, kV) key
    #[error(
        "no calibration factor for {target_filter} at {kv} kV on site '{site}' \
         (available kV: {available:?})"
    )]
    CalibrationNotFound {
        site: String,
        target_filter: TargetFilter,
        kv: u32,
        available: Vec<u32>,
    },

    /// Reference thickness equals the compressed thickness
    #[error("air kerma denominator is zero (compressed thickness equals reference thickness)")]
    DegenerateGeometry,

    /// Equipment import rejected as a unit
    #[error("malformed equipment import at row {row}: {reason}")]
    MalformedImport { row: usize, reason: String },

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV read/write error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
