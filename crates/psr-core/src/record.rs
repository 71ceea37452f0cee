//! The patient source entity.
//!
//! A [`PatientSourceRecord`] is the in-memory form of one row in the patient sources
//! reference table. Callers construct it with a name and an optional description; the
//! storage adapter assigns `id` and `created_at` in one explicit step at insert time
//! (see [`PatientSourceRecord::assign_identity`]).
//!
//! The entity does not validate its fields. Column constraints live in
//! [`crate::schema`] and are enforced by the storage adapters.

use crate::constants::CREATED_AT_FORMAT;
use crate::{PatientSourceError, PatientSourceResult};
use chrono::NaiveDateTime;
use serde_json::{Map, Value};

/// One row of the patient sources reference table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatientSourceRecord {
    id: Option<i64>,
    name: String,
    description: Option<String>,
    created_at: Option<NaiveDateTime>,
}

impl PatientSourceRecord {
    /// Creates an unpersisted record. `id` and `created_at` stay unset until a store
    /// inserts it.
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            description,
            created_at: None,
        }
    }

    /// Rebuilds a record that was already persisted.
    pub(crate) fn from_stored(
        id: i64,
        name: String,
        description: Option<String>,
        created_at: NaiveDateTime,
    ) -> Self {
        Self {
            id: Some(id),
            name,
            description,
            created_at: Some(created_at),
        }
    }

    /// Surrogate key, `None` until persisted.
    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    /// Moment of first persistence, `None` until persisted.
    pub fn created_at(&self) -> Option<NaiveDateTime> {
        self.created_at
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some() && self.created_at.is_some()
    }

    /// Assigns the surrogate key and creation timestamp.
    ///
    /// This is the creation step a storage adapter performs on insert. It may run once per
    /// record: identity is never reassigned and `created_at` never changes afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`PatientSourceError::AlreadyPersisted`] if the record already has an id or
    /// a creation timestamp.
    pub fn assign_identity(
        &mut self,
        id: i64,
        created_at: NaiveDateTime,
    ) -> PatientSourceResult<()> {
        if self.id.is_some() || self.created_at.is_some() {
            return Err(PatientSourceError::AlreadyPersisted(self.id.unwrap_or(id)));
        }
        if id <= 0 {
            return Err(PatientSourceError::InvalidInput(format!(
                "patient source id must be positive, got {id}"
            )));
        }

        self.id = Some(id);
        self.created_at = Some(created_at);
        Ok(())
    }

    /// Converts the record into a field-name to value map for transmission.
    ///
    /// Keys are `id`, `name`, `description` and `created_at`. `id` and `description` map
    /// to `null` when unset; the keys are always present. `created_at` is rendered with
    /// [`CREATED_AT_FORMAT`], e.g. `2024-01-01T00:00:00`.
    ///
    /// # Errors
    ///
    /// Returns [`PatientSourceError::NotPersisted`] if `created_at` has not been assigned.
    pub fn to_serializable_map(&self) -> PatientSourceResult<Map<String, Value>> {
        let created_at = self.created_at.ok_or(PatientSourceError::NotPersisted)?;

        let mut map = Map::new();
        map.insert("id".into(), self.id.map_or(Value::Null, Value::from));
        map.insert("name".into(), Value::String(self.name.clone()));
        map.insert(
            "description".into(),
            self.description.clone().map_or(Value::Null, Value::String),
        );
        map.insert(
            "created_at".into(),
            Value::String(format_created_at(&created_at)),
        );
        Ok(map)
    }

    /// Same as [`to_serializable_map`](Self::to_serializable_map), as a JSON value.
    pub fn to_json(&self) -> PatientSourceResult<Value> {
        self.to_serializable_map().map(Value::Object)
    }
}

/// Renders a creation timestamp in its canonical text form.
pub fn format_created_at(created_at: &NaiveDateTime) -> String {
    created_at.format(CREATED_AT_FORMAT).to_string()
}
