//! Column constraints of the patient sources table.
//!
//! | column        | constraint                         |
//! |---------------|------------------------------------|
//! | `id`          | primary key, assigned on insert    |
//! | `name`        | required, at most 100 characters   |
//! | `description` | optional, unbounded                |
//! | `created_at`  | set on insert                      |

use crate::constants::NAME_MAX_CHARS;
use crate::{PatientSourceRecord, PatientSourceResult};
use psr_types::TextColumn;

pub const NAME_COLUMN: TextColumn = TextColumn::required("name").max_chars(NAME_MAX_CHARS);

pub const DESCRIPTION_COLUMN: TextColumn = TextColumn::optional("description");

/// Checks a record against the table's column constraints.
///
/// # Errors
///
/// Returns `PatientSourceError::ConstraintViolation` for the first column that fails.
pub fn check_patient_source(record: &PatientSourceRecord) -> PatientSourceResult<()> {
    NAME_COLUMN.check(Some(record.name()))?;
    DESCRIPTION_COLUMN.check(record.description())?;
    Ok(())
}
