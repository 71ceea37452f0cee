use super::{PatientSourceStore, Table};
use crate::{Clock, PatientSourceError, PatientSourceRecord, PatientSourceResult, SystemClock};
use std::sync::{Arc, Mutex, MutexGuard};

/// Patient sources table held in process memory.
pub struct InMemoryPatientSourceStore {
    table: Mutex<Table>,
    clock: Arc<dyn Clock>,
}

impl InMemoryPatientSourceStore {
    /// Creates an empty store stamping `created_at` from the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            table: Mutex::new(Table::default()),
            clock,
        }
    }

    fn table(&self) -> PatientSourceResult<MutexGuard<'_, Table>> {
        self.table
            .lock()
            .map_err(|_| PatientSourceError::StoreLockPoisoned)
    }
}

impl Default for InMemoryPatientSourceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PatientSourceStore for InMemoryPatientSourceStore {
    fn insert(&self, record: PatientSourceRecord) -> PatientSourceResult<PatientSourceRecord> {
        self.table()?.insert(record, self.clock.as_ref())
    }

    fn get(&self, id: i64) -> PatientSourceResult<Option<PatientSourceRecord>> {
        Ok(self.table()?.get(id))
    }

    fn list(&self) -> PatientSourceResult<Vec<PatientSourceRecord>> {
        Ok(self.table()?.list())
    }

    fn update(&self, record: &PatientSourceRecord) -> PatientSourceResult<()> {
        self.table()?.update(record)
    }

    fn delete(&self, id: i64) -> PatientSourceResult<bool> {
        Ok(self.table()?.delete(id))
    }
}
