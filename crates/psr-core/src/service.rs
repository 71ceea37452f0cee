//! Patient source service.
//!
//! Pure data operations over a [`PatientSourceStore`]; no transport concerns.

use crate::{PatientSourceError, PatientSourceRecord, PatientSourceResult, PatientSourceStore};
use std::sync::Arc;

/// Operations on the patient sources reference table.
#[derive(Clone)]
pub struct PatientSourceService {
    store: Arc<dyn PatientSourceStore>,
}

impl PatientSourceService {
    pub fn new(store: Arc<dyn PatientSourceStore>) -> Self {
        Self { store }
    }

    /// Creates and persists a new patient source.
    ///
    /// # Returns
    ///
    /// The persisted record, with `id` and `created_at` assigned by the store.
    ///
    /// # Errors
    ///
    /// Returns `PatientSourceError::ConstraintViolation` if the name is empty or longer than
    /// 100 characters, or a storage error from the underlying store.
    pub fn create(
        &self,
        name: impl Into<String>,
        description: Option<String>,
    ) -> PatientSourceResult<PatientSourceRecord> {
        let record = PatientSourceRecord::new(name, description);
        let record = self.store.insert(record).map_err(|e| {
            tracing::warn!("failed to create patient source: {}", e);
            e
        })?;

        tracing::info!(
            "created patient source {} ({})",
            record.id().unwrap_or_default(),
            record.name()
        );
        Ok(record)
    }

    /// Fetches a patient source.
    ///
    /// # Errors
    ///
    /// Returns `PatientSourceError::NotFound` if no record has that id.
    pub fn get(&self, id: i64) -> PatientSourceResult<PatientSourceRecord> {
        self.store.get(id)?.ok_or(PatientSourceError::NotFound(id))
    }

    pub fn list(&self) -> PatientSourceResult<Vec<PatientSourceRecord>> {
        self.store.list()
    }

    /// Renames a patient source, keeping its description and creation timestamp.
    pub fn rename(
        &self,
        id: i64,
        name: impl Into<String>,
    ) -> PatientSourceResult<PatientSourceRecord> {
        let record = self
            .update_with(id, |record| record.set_name(name))
            .map_err(|e| {
                tracing::warn!("failed to rename patient source {}: {}", id, e);
                e
            })?;

        tracing::info!("renamed patient source {} to {}", id, record.name());
        Ok(record)
    }

    /// Replaces or clears a patient source's description.
    pub fn set_description(
        &self,
        id: i64,
        description: Option<String>,
    ) -> PatientSourceResult<PatientSourceRecord> {
        let record = self
            .update_with(id, |record| record.set_description(description))
            .map_err(|e| {
                tracing::warn!(
                    "failed to update description of patient source {}: {}",
                    id,
                    e
                );
                e
            })?;

        tracing::info!("updated description of patient source {}", id);
        Ok(record)
    }

    /// Deletes a patient source.
    ///
    /// # Errors
    ///
    /// Returns `PatientSourceError::NotFound` if no record has that id.
    pub fn delete(&self, id: i64) -> PatientSourceResult<()> {
        let deleted = self.store.delete(id).and_then(|deleted| {
            if deleted {
                Ok(())
            } else {
                Err(PatientSourceError::NotFound(id))
            }
        });
        deleted.map_err(|e| {
            tracing::warn!("failed to delete patient source {}: {}", id, e);
            e
        })?;

        tracing::info!("deleted patient source {}", id);
        Ok(())
    }

    fn update_with(
        &self,
        id: i64,
        change: impl FnOnce(&mut PatientSourceRecord),
    ) -> PatientSourceResult<PatientSourceRecord> {
        let mut record = self.get(id)?;
        change(&mut record);
        self.store.update(&record)?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FixedClock, InMemoryPatientSourceStore};
    use chrono::NaiveDate;
    use serde_json::json;
    use std::io;
    use std::sync::Mutex;

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0
                .lock()
                .expect("log buffer lock should succeed")
                .extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Runs `f` with a subscriber that records warnings, returning what was logged.
    fn capture_warnings(f: impl FnOnce()) -> String {
        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();

        tracing::subscriber::with_default(subscriber, f);

        let bytes = buffer
            .0
            .lock()
            .expect("log buffer lock should succeed")
            .clone();
        String::from_utf8(bytes).expect("logs should be UTF-8")
    }

    fn test_service() -> PatientSourceService {
        let at = NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .expect("valid timestamp");
        let store = InMemoryPatientSourceStore::with_clock(Arc::new(FixedClock(at)));
        PatientSourceService::new(Arc::new(store))
    }

    #[test]
    fn test_create_then_serialize() {
        let service = test_service();

        let record = service
            .create("EHR Import", Some("Imported from EHR".into()))
            .expect("create should succeed");

        assert_eq!(
            record.to_json().expect("to_json should succeed"),
            json!({
                "id": 1,
                "name": "EHR Import",
                "description": "Imported from EHR",
                "created_at": "2024-01-01T00:00:00"
            })
        );
    }

    #[test]
    fn test_create_rejects_empty_name() {
        let service = test_service();

        let err = service
            .create("", None)
            .expect_err("empty name should fail");

        assert!(matches!(err, PatientSourceError::ConstraintViolation(_)));
    }

    #[test]
    fn test_rename_is_reflected_in_serialized_output() {
        let service = test_service();
        let created = service
            .create("EHR Import", None)
            .expect("create should succeed");

        service.rename(1, "Lab Feed").expect("rename should succeed");

        let json = service
            .get(1)
            .expect("get should succeed")
            .to_json()
            .expect("to_json should succeed");
        assert_eq!(json["name"], "Lab Feed");
        assert_eq!(json["description"], serde_json::Value::Null);
        assert_eq!(json["created_at"], created.to_json().expect("to_json")["created_at"]);
    }

    #[test]
    fn test_rename_to_overlong_name_keeps_old_name() {
        let service = test_service();
        service
            .create("EHR Import", None)
            .expect("create should succeed");

        service
            .rename(1, "z".repeat(101))
            .expect_err("overlong name should fail");

        assert_eq!(service.get(1).expect("get should succeed").name(), "EHR Import");
    }

    #[test]
    fn test_set_description_can_clear() {
        let service = test_service();
        service
            .create("EHR Import", Some("Imported from EHR".into()))
            .expect("create should succeed");

        let record = service
            .set_description(1, None)
            .expect("set_description should succeed");

        assert_eq!(record.description(), None);
        assert_eq!(service.get(1).expect("get should succeed").description(), None);
    }

    #[test]
    fn test_get_and_delete_missing_are_not_found() {
        let service = test_service();

        assert!(matches!(service.get(7), Err(PatientSourceError::NotFound(7))));
        assert!(matches!(service.delete(7), Err(PatientSourceError::NotFound(7))));
    }

    #[test]
    fn test_list_returns_records_in_id_order() {
        let service = test_service();
        for name in ["EHR Import", "Manual Entry", "Lab Feed"] {
            service.create(name, None).expect("create should succeed");
        }
        service.delete(2).expect("delete should succeed");

        let names: Vec<_> = service
            .list()
            .expect("list should succeed")
            .iter()
            .map(|r| r.name().to_owned())
            .collect();

        assert_eq!(names, vec!["EHR Import", "Lab Feed"]);
    }

    #[test]
    fn test_failed_mutations_log_warnings() {
        let service = test_service();
        service
            .create("EHR Import", None)
            .expect("create should succeed");

        let logs = capture_warnings(|| {
            service
                .set_description(7, Some("Imported from EHR".into()))
                .expect_err("missing record should fail");
            service.delete(7).expect_err("missing record should fail");
            service
                .rename(1, "")
                .expect_err("empty name should fail");
        });

        assert!(
            logs.contains("failed to update description of patient source 7"),
            "unexpected logs:\n{logs}"
        );
        assert!(
            logs.contains("failed to delete patient source 7"),
            "unexpected logs:\n{logs}"
        );
        assert!(
            logs.contains("failed to rename patient source 1"),
            "unexpected logs:\n{logs}"
        );
    }
}
