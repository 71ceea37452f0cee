//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and passed into stores and services,
//! so nothing below the binary reads process-wide environment variables.

use crate::constants::{PATIENT_SOURCES_DIR_NAME, PATIENT_SOURCES_FILENAME};
use crate::{PatientSourceError, PatientSourceResult};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    patient_data_dir: PathBuf,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns `PatientSourceError::InvalidInput` if `patient_data_dir` is empty.
    pub fn new(patient_data_dir: PathBuf) -> PatientSourceResult<Self> {
        if patient_data_dir.as_os_str().is_empty() {
            return Err(PatientSourceError::InvalidInput(
                "patient_data_dir cannot be empty".into(),
            ));
        }

        Ok(Self { patient_data_dir })
    }

    pub fn patient_data_dir(&self) -> &Path {
        &self.patient_data_dir
    }

    pub fn patient_sources_dir(&self) -> PathBuf {
        self.patient_data_dir.join(PATIENT_SOURCES_DIR_NAME)
    }

    pub fn patient_sources_file(&self) -> PathBuf {
        self.patient_sources_dir().join(PATIENT_SOURCES_FILENAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_empty_dir() {
        let err = CoreConfig::new(PathBuf::new()).expect_err("empty dir should be rejected");
        assert!(matches!(err, PatientSourceError::InvalidInput(_)));
    }

    #[test]
    fn test_patient_sources_file_is_under_data_dir() {
        let cfg = CoreConfig::new(PathBuf::from("/data")).expect("CoreConfig::new should succeed");
        assert_eq!(
            cfg.patient_sources_file(),
            PathBuf::from("/data/patient_sources/patient_sources.yaml")
        );
    }
}
