pub mod report;

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::types::TargetFilter;

/// Command-line arguments for mgdcalc
#[derive(Parser, Debug)]
#[command(name = "mgdcalc")]
#[command(about = "Mean glandular dose calculator for mammography exposures")]
#[command(version)]
pub struct Cli {
    /// Tube voltage in kV
    #[arg(long)]
    pub kv: f64,

    /// Tube charge in mAs
    #[arg(long)]
    pub mas: f64,

    /// Target/filter combination
    #[arg(long, value_enum)]
    pub target_filter: TargetFilterArg,

    /// Compressed breast thickness in cm
    #[arg(long)]
    pub thickness: f64,

    /// Patient age in years (used for automatic glandularity)
    #[arg(long)]
    pub age: Option<u32>,

    /// Known glandularity percent; skips the age-based estimate
    #[arg(long)]
    pub glandularity: Option<f64>,

    /// Calibration site whose Ki table applies
    #[arg(long, default_value = "IRD")]
    pub site: String,

    /// Patient identifier for the report
    #[arg(long)]
    pub patient_id: Option<String>,

    /// Patient initials for the report
    #[arg(long)]
    pub initials: Option<String>,

    /// Equipment import file to register before computing
    #[arg(long, requires = "equipment_name")]
    pub equipment: Option<PathBuf>,

    /// Site name for the imported equipment
    #[arg(long, requires = "equipment")]
    pub equipment_name: Option<String>,

    /// Write the session history as CSV to this path
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format
    Text,
    /// JSON format
    Json,
}

/// Target/filter choices exposed on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TargetFilterArg {
    #[value(name = "mo-mo")]
    MoMo,
    #[value(name = "mo-rh")]
    MoRh,
    #[value(name = "rh-rh")]
    RhRh,
    #[value(name = "rh-al")]
    RhAl,
    #[value(name = "w-rh")]
    WRh,
}

impl From<TargetFilterArg> for TargetFilter {
    fn from(arg: TargetFilterArg) -> Self {
        match arg {
            TargetFilterArg::MoMo => TargetFilter::MoMo,
            TargetFilterArg::MoRh => TargetFilter::MoRh,
            TargetFilterArg::RhRh => TargetFilter::RhRh,
            TargetFilterArg::RhAl => TargetFilter::RhAl,
            TargetFilterArg::WRh => TargetFilter::WRh,
        }
    }
}
