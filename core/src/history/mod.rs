//! Session computation history
//!
//! Append-only list of completed computations, cleared only by explicit
//! request and exportable to a fixed-schema CSV. History lives for the
//! session only; there is no persistence.

use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Local};

use crate::error::Result;
use crate::types::{ExposureInput, GlandularityGroup, UncertainValue};

/// Timestamp format used in reports and the CSV export
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Fixed header row of the history export
pub const EXPORT_HEADER: [&str; 22] = [
    "Timestamp",
    "Patient ID",
    "Initials",
    "Site",
    "Age",
    "Thickness (cm)",
    "Target/Filter",
    "kV",
    "mAs",
    "Glandularity (%)",
    "Glandularity Group",
    "s",
    "CSR",
    "CSR Uncertainty",
    "g-Factor",
    "g-Factor Uncertainty",
    "c-Factor",
    "c-Factor Uncertainty",
    "Ki (mGy)",
    "Ki Uncertainty",
    "MGD (mGy)",
    "MGD Uncertainty",
];

/// One completed computation: inputs, intermediates, and the final dose
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ComputationRecord {
    pub timestamp: DateTime<Local>,
    pub input: ExposureInput,
    pub glandularity_pct: f64,
    pub glandularity_group: GlandularityGroup,
    pub s_factor: f64,
    pub csr: UncertainValue,
    pub g_factor: UncertainValue,
    pub c_factor: UncertainValue,
    pub air_kerma: UncertainValue,
    pub dose: UncertainValue,
}

impl ComputationRecord {
    /// The record as one export row, in [`EXPORT_HEADER`] order
    fn export_row(&self) -> Vec<String> {
        vec![
            self.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            self.input.patient_id.clone().unwrap_or_default(),
            self.input.initials.clone().unwrap_or_default(),
            self.input.site.clone(),
            self.input.age.map(|a| a.to_string()).unwrap_or_default(),
            self.input.thickness_cm.to_string(),
            self.input.target_filter.label().to_string(),
            self.input.kv.to_string(),
            self.input.mas.to_string(),
            self.glandularity_pct.to_string(),
            self.glandularity_group.to_string(),
            self.s_factor.to_string(),
            self.csr.value.to_string(),
            self.csr.uncertainty.to_string(),
            self.g_factor.value.to_string(),
            self.g_factor.uncertainty.to_string(),
            self.c_factor.value.to_string(),
            self.c_factor.uncertainty.to_string(),
            self.air_kerma.value.to_string(),
            self.air_kerma.uncertainty.to_string(),
            self.dose.value.to_string(),
            self.dose.uncertainty.to_string(),
        ]
    }
}

/// Ordered history of the session's completed computations
#[derive(Debug, Clone, Default)]
pub struct SessionHistory {
    records: Vec<ComputationRecord>,
}

impl SessionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a completed computation
    pub fn append(&mut self, record: ComputationRecord) {
        self.records.push(record);
    }

    /// Discards every record; irreversible
    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn records(&self) -> &[ComputationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Writes the history as UTF-8 CSV with the fixed header row
    pub fn export<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(EXPORT_HEADER)?;
        for record in &self.records {
            csv_writer.write_record(record.export_row())?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    /// Writes the history CSV to a file path
    pub fn export_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        self.export(file)
    }
}
