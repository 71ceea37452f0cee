//! Constants used throughout the PSR core crate.

/// Default directory for patient data storage when no explicit directory is configured.
pub const DEFAULT_PATIENT_DATA_DIR: &str = "patient_data";

/// Directory name for the patient sources table under the patient data directory.
pub const PATIENT_SOURCES_DIR_NAME: &str = "patient_sources";

/// Filename of the YAML-backed patient sources table.
pub const PATIENT_SOURCES_FILENAME: &str = "patient_sources.yaml";

/// Lock file guarding read-modify-write cycles on the patient sources table.
pub const PATIENT_SOURCES_LOCK_FILENAME: &str = "patient_sources.lock";

/// Maximum number of characters in a patient source name.
pub const NAME_MAX_CHARS: usize = 100;

/// Canonical text form of `created_at`. The fraction is omitted when zero.
pub const CREATED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
