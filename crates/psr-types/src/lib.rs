//! Column constraint primitives for reference-data tables.
//!
//! These types describe the checks a relational schema would apply to a text column
//! (`NOT NULL`, bounded length). Storage adapters run them on insert and update so that
//! entities can stay free of validation logic.

/// Errors raised when a value does not satisfy a column constraint.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConstraintError {
    /// A required column was given no value.
    #[error("column '{column}' cannot be null")]
    NotNull { column: &'static str },

    /// A required column was given an empty string.
    #[error("column '{column}' cannot be empty")]
    Empty { column: &'static str },

    /// The value has more characters than the column allows.
    #[error("column '{column}' exceeds maximum length of {max} characters (got {actual})")]
    TooLong {
        column: &'static str,
        max: usize,
        actual: usize,
    },
}

/// Declaration of a text column and the constraints it enforces.
///
/// Lengths are counted in Unicode scalar values, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextColumn {
    name: &'static str,
    required: bool,
    max_chars: Option<usize>,
}

impl TextColumn {
    /// Declares a `NOT NULL` text column. Empty strings are also rejected.
    pub const fn required(name: &'static str) -> Self {
        Self {
            name,
            required: true,
            max_chars: None,
        }
    }

    /// Declares a nullable text column.
    pub const fn optional(name: &'static str) -> Self {
        Self {
            name,
            required: false,
            max_chars: None,
        }
    }

    /// Bounds the column to at most `max` characters.
    pub const fn max_chars(mut self, max: usize) -> Self {
        self.max_chars = Some(max);
        self
    }

    /// Checks a candidate value against this column's constraints.
    ///
    /// # Errors
    ///
    /// Returns a [`ConstraintError`] describing the first constraint the value breaks.
    pub fn check(&self, value: Option<&str>) -> Result<(), ConstraintError> {
        let Some(value) = value else {
            if self.required {
                return Err(ConstraintError::NotNull { column: self.name });
            }
            return Ok(());
        };

        if self.required && value.is_empty() {
            return Err(ConstraintError::Empty { column: self.name });
        }

        if let Some(max) = self.max_chars {
            let actual = value.chars().count();
            if actual > max {
                return Err(ConstraintError::TooLong {
                    column: self.name,
                    max,
                    actual,
                });
            }
        }

        Ok(())
    }
}
