//! YAML file-backed patient sources table.
//!
//! The whole table lives in a single file:
//!
//! ```text
//! <patient_data_dir>/
//!   patient_sources/
//!     patient_sources.yaml
//! ```
//!
//! ```yaml
//! next_id: 3
//! patient_sources:
//! - id: 1
//!   name: EHR Import
//!   description: Imported from EHR
//!   created_at: 2024-01-01T00:00:00
//! ```
//!
//! Every operation reads the file, and every mutation rewrites it through a uniquely named
//! temporary file that is renamed into place. A missing file is an empty table. Mutations
//! hold an exclusive advisory lock on `patient_sources.lock` for the whole read-modify-write,
//! so stores in other threads or processes sharing the directory never hand out the same id.

use super::{PatientSourceStore, Table};
use crate::config::CoreConfig;
use crate::constants::PATIENT_SOURCES_LOCK_FILENAME;
use crate::{Clock, PatientSourceError, PatientSourceRecord, PatientSourceResult, SystemClock};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::NamedTempFile;

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct TableWire {
    next_id: i64,
    #[serde(default)]
    patient_sources: Vec<RowWire>,
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RowWire {
    id: i64,
    name: String,
    #[serde(default)]
    description: Option<String>,
    created_at: NaiveDateTime,
}

/// Patient sources table stored as YAML under the patient data directory.
pub struct FilePatientSourceStore {
    cfg: Arc<CoreConfig>,
    clock: Arc<dyn Clock>,
}

impl FilePatientSourceStore {
    /// Creates a store stamping `created_at` from the system clock.
    ///
    /// No files are touched until the first operation.
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self::with_clock(cfg, Arc::new(SystemClock))
    }

    pub fn with_clock(cfg: Arc<CoreConfig>, clock: Arc<dyn Clock>) -> Self {
        Self { cfg, clock }
    }

    /// Path of the YAML table file.
    pub fn path(&self) -> PathBuf {
        self.cfg.patient_sources_file()
    }

    fn load(&self) -> PatientSourceResult<Table> {
        let path = self.path();
        if !path.is_file() {
            tracing::debug!("no patient sources file at {}, starting empty", path.display());
            return Ok(Table::default());
        }

        let contents = fs::read_to_string(&path).map_err(PatientSourceError::FileRead)?;
        let table = parse_table(&contents)?;
        tracing::debug!(
            "loaded {} patient sources from {}",
            table.rows().count(),
            path.display()
        );
        Ok(table)
    }

    /// Writes the table through a temporary file in the same directory.
    ///
    /// The temporary file is removed if writing or renaming fails.
    fn save(&self, table: &Table) -> PatientSourceResult<()> {
        let yaml = render_table(table)?;
        let path = self.path();

        let mut tmp = NamedTempFile::new_in(self.cfg.patient_sources_dir())
            .map_err(PatientSourceError::FileWrite)?;
        tmp.write_all(yaml.as_bytes())
            .map_err(PatientSourceError::FileWrite)?;
        tmp.persist(&path)
            .map_err(|e| PatientSourceError::FileWrite(e.error))?;

        tracing::debug!("saved patient sources to {}", path.display());
        Ok(())
    }

    /// Loads the table, applies `op`, and writes the table back if `op` succeeds.
    ///
    /// The whole sequence runs under an exclusive lock on the table's lock file.
    fn modify<T>(
        &self,
        op: impl FnOnce(&mut Table) -> PatientSourceResult<T>,
    ) -> PatientSourceResult<T> {
        let dir = self.cfg.patient_sources_dir();
        fs::create_dir_all(&dir).map_err(PatientSourceError::StorageDirCreation)?;

        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(dir.join(PATIENT_SOURCES_LOCK_FILENAME))
            .map_err(PatientSourceError::StoreLock)?;
        let mut lock = fd_lock::RwLock::new(lock_file);
        let _guard = lock.write().map_err(PatientSourceError::StoreLock)?;

        let mut table = self.load()?;
        let out = op(&mut table)?;
        self.save(&table)?;
        Ok(out)
    }
}

impl PatientSourceStore for FilePatientSourceStore {
    fn insert(&self, record: PatientSourceRecord) -> PatientSourceResult<PatientSourceRecord> {
        self.modify(|table| table.insert(record, self.clock.as_ref()))
    }

    fn get(&self, id: i64) -> PatientSourceResult<Option<PatientSourceRecord>> {
        Ok(self.load()?.get(id))
    }

    fn list(&self) -> PatientSourceResult<Vec<PatientSourceRecord>> {
        Ok(self.load()?.list())
    }

    fn update(&self, record: &PatientSourceRecord) -> PatientSourceResult<()> {
        self.modify(|table| table.update(record))
    }

    fn delete(&self, id: i64) -> PatientSourceResult<bool> {
        self.modify(|table| Ok(table.delete(id)))
    }
}

/// Parses the YAML table, reporting the path of the first field that does not match.
fn parse_table(yaml_text: &str) -> PatientSourceResult<Table> {
    let deserializer = serde_yaml::Deserializer::from_str(yaml_text);

    let wire = match serde_path_to_error::deserialize::<_, TableWire>(deserializer) {
        Ok(parsed) => parsed,
        Err(err) => {
            let path = err.path().to_string();
            let source = err.into_inner();
            let path = if path.is_empty() {
                "<root>"
            } else {
                path.as_str()
            };
            return Err(PatientSourceError::TableSchemaMismatch(format!(
                "at {path}: {source}"
            )));
        }
    };

    let rows = wire.patient_sources.into_iter().map(|row| {
        PatientSourceRecord::from_stored(row.id, row.name, row.description, row.created_at)
    });
    Table::from_rows(wire.next_id, rows)
}

fn render_table(table: &Table) -> PatientSourceResult<String> {
    let mut patient_sources = Vec::new();
    for record in table.rows() {
        let (Some(id), Some(created_at)) = (record.id(), record.created_at()) else {
            return Err(PatientSourceError::NotPersisted);
        };
        patient_sources.push(RowWire {
            id,
            name: record.name().to_owned(),
            description: record.description().map(str::to_owned),
            created_at,
        });
    }

    let wire = TableWire {
        next_id: table.next_id(),
        patient_sources,
    };
    serde_yaml::to_string(&wire).map_err(PatientSourceError::YamlSerialization)
}
