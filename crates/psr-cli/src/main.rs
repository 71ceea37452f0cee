//! Operator CLI for the patient sources reference table.
//!
//! Reads and writes the YAML-backed table under the patient data directory, resolved from
//! `--data-dir`, then `PATIENT_DATA_DIR` (a `.env` file is honoured), then `patient_data`.

use anyhow::Context;
use clap::{Parser, Subcommand};
use psr_core::{
    CoreConfig, FilePatientSourceStore, PatientSourceService, DEFAULT_PATIENT_DATA_DIR,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log filter applied when `RUST_LOG` is unset or unparsable.
const DEFAULT_LOG_FILTER: &str = "psr=info,psr_core=info";

#[derive(Parser)]
#[command(name = "psr")]
#[command(about = "Patient source registry CLI")]
struct Cli {
    /// Patient data directory
    #[arg(long, env = "PATIENT_DATA_DIR", default_value = DEFAULT_PATIENT_DATA_DIR)]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a patient source
    Add {
        /// Name (1-100 characters)
        name: String,
        /// Free-text description
        #[arg(long)]
        description: Option<String>,
    },
    /// List all patient sources
    List,
    /// Print a patient source as JSON
    Show {
        /// Patient source id
        id: i64,
    },
    /// Rename a patient source
    Rename {
        /// Patient source id
        id: i64,
        /// New name (1-100 characters)
        name: String,
    },
    /// Set or clear the description of a patient source
    Describe {
        /// Patient source id
        id: i64,
        /// New description; omit to clear
        #[arg(long)]
        description: Option<String>,
    },
    /// Remove a patient source
    Remove {
        /// Patient source id
        id: i64,
    },
}

/// Builds the log filter from `RUST_LOG`, falling back to info for this workspace's crates.
fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("Use 'psr --help' for commands");
        return Ok(());
    };

    let cfg = Arc::new(CoreConfig::new(cli.data_dir)?);
    tracing::debug!("using patient data directory {}", cfg.patient_data_dir().display());
    let service = PatientSourceService::new(Arc::new(FilePatientSourceStore::new(cfg)));

    match command {
        Commands::Add { name, description } => {
            let record = service
                .create(name, description)
                .context("failed to add patient source")?;
            println!("Added patient source with ID: {}", record.id().unwrap_or_default());
        }
        Commands::List => {
            let records = service.list()?;
            if records.is_empty() {
                println!("No patient sources found.");
            }
            for record in records {
                let map = record.to_serializable_map()?;
                println!(
                    "ID: {}, Name: {}, Description: {}, Created: {}",
                    map["id"],
                    record.name(),
                    record.description().unwrap_or("-"),
                    map["created_at"].as_str().unwrap_or_default()
                );
            }
        }
        Commands::Show { id } => {
            let json = service.get(id)?.to_json()?;
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        Commands::Rename { id, name } => {
            service
                .rename(id, name)
                .with_context(|| format!("failed to rename patient source {id}"))?;
            println!("Renamed patient source {id}");
        }
        Commands::Describe { id, description } => {
            service.set_description(id, description)?;
            println!("Updated description of patient source {id}");
        }
        Commands::Remove { id } => {
            service.delete(id)?;
            println!("Removed patient source {id}");
        }
    }

    Ok(())
}
