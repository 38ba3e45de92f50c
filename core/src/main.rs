use clap::Parser;
use log::{error, info};
use std::process;

use mgdcalc_core::{
    Cli, DoseSession, ExposureInput, OutputFormat, SiteGeometry, TextReport,
};

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let mut session = DoseSession::new();

    if let (Some(path), Some(name)) = (&cli.equipment, &cli.equipment_name) {
        // Imported equipment shares the IRD geometry preset
        match session.register_equipment(name, path, SiteGeometry::IRD) {
            Ok(()) => info!("registered equipment '{}' from {}", name, path.display()),
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        }
    }

    let input = ExposureInput {
        kv: cli.kv,
        mas: cli.mas,
        target_filter: cli.target_filter.into(),
        thickness_cm: cli.thickness,
        age: cli.age,
        manual_glandularity: cli.glandularity,
        site: cli.site.clone(),
        patient_id: cli.patient_id.clone(),
        initials: cli.initials.clone(),
    };

    let record = match session.calculate(&input) {
        Ok(record) => record,
        Err(e) => {
            error!("computation failed: {}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    match cli.format {
        OutputFormat::Text => print!("{}", TextReport::new(&record)),
        OutputFormat::Json => match serde_json::to_string_pretty(&record) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: failed to serialize record: {}", e);
                process::exit(1);
            }
        },
    }

    if let Some(path) = &cli.export {
        if let Err(e) = session.history().export_to_path(path) {
            eprintln!("Error: failed to export history: {}", e);
            process::exit(1);
        }
        info!("history exported to {}", path.display());
    }
}

fn setup_logging(verbose: bool) {
    if verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Warn)
            .init();
    }
}
