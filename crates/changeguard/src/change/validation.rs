//! Structured change validation results.

use crate::error::{ChangeError, Result};

/// A single failed field check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    pub field: String,
    pub message: String,
}

/// Outcome of [`Change::validate`](super::Change::validate).
///
/// Failures are data, not errors; the caller decides whether to abort.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    failures: Vec<ValidationFailure>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure.
    pub fn fail(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.failures.push(ValidationFailure {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Require a non-blank value.
    pub fn require(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.fail(field, "is required");
        }
        self
    }

    /// Require that an optional value, when present, is non-blank.
    pub fn require_if_present(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value {
            if value.trim().is_empty() {
                self.fail(field, "cannot be blank when set");
            }
        }
        self
    }

    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failures(&self) -> &[ValidationFailure] {
        &self.failures
    }

    /// Append another result's failures.
    pub fn merge(&mut self, other: ValidationResult) {
        self.failures.extend(other.failures);
    }

    /// Convert the first failure into a `Definition` error.
    pub fn into_result(self, change: &str) -> Result<()> {
        match self.failures.into_iter().next() {
            None => Ok(()),
            Some(failure) => Err(ChangeError::definition(
                change,
                failure.field,
                failure.message,
            )),
        }
    }
}
