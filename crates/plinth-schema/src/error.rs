//! Validation error type.

use thiserror::Error;

/// A field-level schema violation.
///
/// Carries the first field that failed, a human-readable message, and the
/// table the record type writes to once the save path attributes it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("validation failed for \"{field}\": {message}{}", .table.as_deref().map_or_else(String::new, |t| format!(" (table `{t}`)")))]
pub struct ValidationError {
    /// The field that failed validation.
    pub field: String,
    /// Why the field was rejected.
    pub message: String,
    /// The owning table, when known.
    pub table: Option<String>,
}

impl ValidationError {
    /// Creates a validation error for a field.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            table: None,
        }
    }

    /// Attaches the owning table for diagnostics.
    #[must_use]
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_without_table() {
        let err = ValidationError::new("first_name", "is required");
        assert_eq!(
            err.to_string(),
            "validation failed for \"first_name\": is required"
        );
    }

    #[test]
    fn test_display_with_table() {
        let err = ValidationError::new("first_name", "is required").with_table("test_table");
        assert!(err.to_string().contains("(table `test_table`)"));
    }
}
