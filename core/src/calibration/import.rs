use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{MgdError, Result};
use crate::model::csr::CsrCoefficients;
use crate::types::TargetFilter;

/// Required columns of an equipment import file
const REQUIRED_COLUMNS: [&str; 3] = ["Alvo/Filtro", "kV", "Ki"];

/// One parsed row of an equipment import
#[derive(Debug, Clone, PartialEq)]
struct EquipmentRow {
    target_filter: TargetFilter,
    kv: u32,
    factor: f64,
    csr: Option<CsrCoefficients>,
}

/// Fully-parsed equipment import, ready to commit
///
/// Parsing is all-or-nothing: any malformed row rejects the whole file, so
/// a commit never applies a partial table. Columns are `Alvo/Filtro`
/// (text), `kV` (integer), `Ki` (real), plus optional `CSR_a`/`CSR_b`
/// coefficient pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct EquipmentImport {
    rows: Vec<EquipmentRow>,
}

impl EquipmentImport {
    /// Parses an import from any reader of delimited text
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let column = |name: &str| headers.iter().position(|h| h == name);
        let required_column = |name: &str| {
            column(name).ok_or_else(|| MgdError::MalformedImport {
                row: 1,
                reason: format!("missing required column '{name}'"),
            })
        };
        let [tf_name, kv_name, ki_name] = REQUIRED_COLUMNS;
        let tf_idx = required_column(tf_name)?;
        let kv_idx = required_column(kv_name)?;
        let ki_idx = required_column(ki_name)?;
        let csr_a_idx = column("CSR_a");
        let csr_b_idx = column("CSR_b");

        let mut rows = Vec::new();
        for (i, record) in csv_reader.records().enumerate() {
            let row = i + 2; // 1-based, after the header row
            let record = record?;

            let target_filter = {
                let raw = required_field(&record, tf_idx, "Alvo/Filtro", row)?;
                TargetFilter::parse(raw).ok_or_else(|| MgdError::MalformedImport {
                    row,
                    reason: format!("unknown target/filter '{raw}'"),
                })?
            };
            let kv = required_field(&record, kv_idx, "kV", row)?
                .parse::<u32>()
                .map_err(|e| MgdError::MalformedImport {
                    row,
                    reason: format!("non-integer kV: {e}"),
                })?;
            let factor = required_field(&record, ki_idx, "Ki", row)?
                .parse::<f64>()
                .map_err(|e| MgdError::MalformedImport {
                    row,
                    reason: format!("non-numeric Ki: {e}"),
                })?;

            // CSR coefficients come as a pair or not at all
            let csr = match (csr_a_idx, csr_b_idx) {
                (Some(a_idx), Some(b_idx)) => {
                    let a = record.get(a_idx).unwrap_or_default();
                    let b = record.get(b_idx).unwrap_or_default();
                    if a.is_empty() && b.is_empty() {
                        None
                    } else {
                        let parse = |raw: &str, name: &str| -> Result<f64> {
                            raw.parse::<f64>().map_err(|e| MgdError::MalformedImport {
                                row,
                                reason: format!("non-numeric {name}: {e}"),
                            })
                        };
                        Some(CsrCoefficients {
                            slope: parse(a, "CSR_a")?,
                            intercept: parse(b, "CSR_b")?,
                        })
                    }
                }
                _ => None,
            };

            rows.push(EquipmentRow {
                target_filter,
                kv,
                factor,
                csr,
            });
        }

        if rows.is_empty() {
            return Err(MgdError::MalformedImport {
                row: 2,
                reason: "import contains no data rows".to_string(),
            });
        }

        Ok(Self { rows })
    }

    /// Parses an import file from disk
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_reader(File::open(path)?)
    }

    /// Number of parsed rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Splits the import into a Ki table and CSR coefficient updates
    ///
    /// Later rows overwrite earlier ones for a repeated key, matching the
    /// row-by-row insert semantics of the import format.
    pub(crate) fn into_tables(
        self,
    ) -> (
        BTreeMap<(TargetFilter, u32), f64>,
        BTreeMap<TargetFilter, CsrCoefficients>,
    ) {
        let mut ki_table = BTreeMap::new();
        let mut csr_updates = BTreeMap::new();
        for row in self.rows {
            ki_table.insert((row.target_filter, row.kv), row.factor);
            if let Some(csr) = row.csr {
                csr_updates.insert(row.target_filter, csr);
            }
        }
        (ki_table, csr_updates)
    }
}

/// Returns a non-empty field value or a row-tagged import error
fn required_field<'r>(
    record: &'r csv::StringRecord,
    idx: usize,
    name: &str,
    row: usize,
) -> Result<&'r str> {
    record
        .get(idx)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| MgdError::MalformedImport {
            row,
            reason: format!("missing value for '{name}'"),
        })
}
