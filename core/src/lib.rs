pub mod api;
pub mod calibration;
pub mod cli;
pub mod error;
pub mod history;
pub mod model;
pub mod pipeline;
pub mod types;

pub use api::DoseSession;
pub use calibration::{CalibrationSite, CalibrationStore, EquipmentImport, SiteGeometry};
pub use cli::report::TextReport;
pub use cli::{Cli, OutputFormat};
pub use error::{MgdError, Result};
pub use history::{ComputationRecord, SessionHistory};
pub use pipeline::{Stage, StageError};
pub use types::*;
