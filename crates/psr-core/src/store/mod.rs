//! Storage adapters for the patient sources table.
//!
//! A [`PatientSourceStore`] plays the part of the relational storage layer: it owns the id
//! sequence, stamps `created_at` on insert and enforces the column constraints declared in
//! [`crate::schema`]. Two adapters are provided:
//!
//! - [`InMemoryPatientSourceStore`] keeps the table in memory
//! - [`FilePatientSourceStore`] keeps the table in a YAML file under the patient data directory
//!
//! Both share the same table semantics:
//! - ids start at 1, increase by one per insert and are never reused, even after a delete
//! - `created_at` is taken from the store's [`Clock`](crate::Clock) and never rewritten
//! - `update` overwrites `name` and `description` only

mod file;
mod memory;

pub use file::FilePatientSourceStore;
pub use memory::InMemoryPatientSourceStore;

use crate::schema::check_patient_source;
use crate::{Clock, PatientSourceError, PatientSourceRecord, PatientSourceResult};
use std::collections::BTreeMap;

/// Persistence operations for patient source records.
pub trait PatientSourceStore: Send + Sync {
    /// Inserts a new record, assigning its id and creation timestamp.
    ///
    /// Returns the persisted record.
    ///
    /// # Errors
    ///
    /// - [`PatientSourceError::AlreadyPersisted`] if the record already has an id
    /// - [`PatientSourceError::ConstraintViolation`] if a column constraint fails
    fn insert(&self, record: PatientSourceRecord) -> PatientSourceResult<PatientSourceRecord>;

    /// Fetches a record by id.
    fn get(&self, id: i64) -> PatientSourceResult<Option<PatientSourceRecord>>;

    /// Lists all records ordered by id.
    fn list(&self) -> PatientSourceResult<Vec<PatientSourceRecord>>;

    /// Overwrites the name and description of a persisted record.
    ///
    /// # Errors
    ///
    /// - [`PatientSourceError::NotPersisted`] if the record has no id
    /// - [`PatientSourceError::NotFound`] if no row has that id
    /// - [`PatientSourceError::ConstraintViolation`] if a column constraint fails
    fn update(&self, record: &PatientSourceRecord) -> PatientSourceResult<()>;

    /// Deletes a record by id. Returns `true` if a row was removed.
    fn delete(&self, id: i64) -> PatientSourceResult<bool>;
}

/// In-memory table state shared by the adapters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Table {
    next_id: i64,
    rows: BTreeMap<i64, PatientSourceRecord>,
}

impl Default for Table {
    fn default() -> Self {
        Self {
            next_id: 1,
            rows: BTreeMap::new(),
        }
    }
}

impl Table {
    /// Rebuilds a table from stored rows, checking the sequence is consistent.
    pub(crate) fn from_rows(
        next_id: i64,
        rows: impl IntoIterator<Item = PatientSourceRecord>,
    ) -> PatientSourceResult<Self> {
        if next_id < 1 {
            return Err(PatientSourceError::TableSchemaMismatch(format!(
                "next_id must be at least 1, got {next_id}"
            )));
        }

        let mut table = Self {
            next_id,
            rows: BTreeMap::new(),
        };
        for row in rows {
            let id = row.id().ok_or(PatientSourceError::NotPersisted)?;
            if id < 1 || id >= next_id {
                return Err(PatientSourceError::TableSchemaMismatch(format!(
                    "row id {id} is outside the allocated range 1..{next_id}"
                )));
            }
            check_patient_source(&row).map_err(|e| {
                PatientSourceError::TableSchemaMismatch(format!("row {id}: {e}"))
            })?;
            if table.rows.insert(id, row).is_some() {
                return Err(PatientSourceError::TableSchemaMismatch(format!(
                    "duplicate row id {id}"
                )));
            }
        }
        Ok(table)
    }

    pub(crate) fn next_id(&self) -> i64 {
        self.next_id
    }

    pub(crate) fn rows(&self) -> impl Iterator<Item = &PatientSourceRecord> {
        self.rows.values()
    }

    pub(crate) fn insert(
        &mut self,
        mut record: PatientSourceRecord,
        clock: &dyn Clock,
    ) -> PatientSourceResult<PatientSourceRecord> {
        if let Some(id) = record.id() {
            return Err(PatientSourceError::AlreadyPersisted(id));
        }
        check_patient_source(&record)?;

        let id = self.next_id;
        let next_id = id.checked_add(1).ok_or_else(|| {
            PatientSourceError::InvalidInput("patient source id sequence exhausted".into())
        })?;

        record.assign_identity(id, clock.now())?;
        self.rows.insert(id, record.clone());
        self.next_id = next_id;

        Ok(record)
    }

    pub(crate) fn get(&self, id: i64) -> Option<PatientSourceRecord> {
        self.rows.get(&id).cloned()
    }

    pub(crate) fn list(&self) -> Vec<PatientSourceRecord> {
        self.rows.values().cloned().collect()
    }

    pub(crate) fn update(&mut self, record: &PatientSourceRecord) -> PatientSourceResult<()> {
        let id = record.id().ok_or(PatientSourceError::NotPersisted)?;
        let stored = self
            .rows
            .get_mut(&id)
            .ok_or(PatientSourceError::NotFound(id))?;
        check_patient_source(record)?;

        stored.set_name(record.name());
        stored.set_description(record.description().map(str::to_owned));
        Ok(())
    }

    pub(crate) fn delete(&mut self, id: i64) -> bool {
        self.rows.remove(&id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FixedClock;
    use chrono::{NaiveDate, NaiveDateTime};

    fn clock() -> FixedClock {
        let at: NaiveDateTime = NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .expect("valid timestamp");
        FixedClock(at)
    }

    #[test]
    fn test_insert_failure_does_not_consume_an_id() {
        let mut table = Table::default();

        table
            .insert(PatientSourceRecord::new("", None), &clock())
            .expect_err("empty name should fail");
        let record = table
            .insert(PatientSourceRecord::new("EHR Import", None), &clock())
            .expect("insert should succeed");

        assert_eq!(record.id(), Some(1));
        assert_eq!(table.next_id(), 2);
    }

    #[test]
    fn test_from_rows_rejects_duplicate_ids() {
        let at = clock().0;
        let rows = vec![
            PatientSourceRecord::from_stored(1, "A".into(), None, at),
            PatientSourceRecord::from_stored(1, "B".into(), None, at),
        ];

        let err = Table::from_rows(3, rows).expect_err("duplicate ids should fail");

        assert!(matches!(err, PatientSourceError::TableSchemaMismatch(_)));
    }

    #[test]
    fn test_from_rows_rejects_id_beyond_sequence() {
        let rows = vec![PatientSourceRecord::from_stored(
            5,
            "A".into(),
            None,
            clock().0,
        )];

        let err = Table::from_rows(5, rows).expect_err("id >= next_id should fail");

        assert!(matches!(err, PatientSourceError::TableSchemaMismatch(_)));
    }

    #[test]
    fn test_from_rows_rejects_rows_breaking_column_constraints() {
        let at = clock().0;

        let empty = vec![PatientSourceRecord::from_stored(1, String::new(), None, at)];
        let err = Table::from_rows(2, empty).expect_err("empty name should fail");
        assert!(matches!(err, PatientSourceError::TableSchemaMismatch(_)));

        let long = vec![PatientSourceRecord::from_stored(1, "n".repeat(150), None, at)];
        let err = Table::from_rows(2, long).expect_err("overlong name should fail");
        assert!(matches!(err, PatientSourceError::TableSchemaMismatch(_)));

        let exact = vec![PatientSourceRecord::from_stored(1, "n".repeat(100), None, at)];
        let table = Table::from_rows(2, exact).expect("100 char name should succeed");
        assert_eq!(table.list().len(), 1);
    }
}
