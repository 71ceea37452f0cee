//! # PSR Core
//!
//! Core data model and storage adapters for the patient source registry.
//!
//! A patient source is a row in a small reference-data table describing where patient
//! data came from (for example "EHR Import"). This crate contains:
//! - [`PatientSourceRecord`], the in-memory entity, and its serializable map form
//! - the table's column constraints ([`schema`])
//! - the [`PatientSourceStore`] trait with in-memory and YAML file-backed adapters
//! - [`PatientSourceService`], a thin logging wrapper over a store
//!
//! **No transport concerns**: argument parsing and process setup belong in `psr-cli`.

pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
pub mod record;
pub mod schema;
pub mod service;
pub mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::CoreConfig;
pub use constants::DEFAULT_PATIENT_DATA_DIR;
pub use error::{PatientSourceError, PatientSourceResult};
pub use record::PatientSourceRecord;
pub use service::PatientSourceService;
pub use store::{FilePatientSourceStore, InMemoryPatientSourceStore, PatientSourceStore};

pub use psr_types::{ConstraintError, TextColumn};
