//! Record instances: one in-memory row.

use plinth_schema::{Attributes, ToValue, Value};

/// One in-memory row with live attribute state.
///
/// A record owns its attribute map exclusively; the save validator only
/// borrows it transiently. `is_new` stays true until the instance has been
/// successfully persisted once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    attributes: Attributes,
    persisted: bool,
}

impl Record {
    /// Creates a fresh, never-persisted record seeded with attributes.
    #[must_use]
    pub const fn new(attributes: Attributes) -> Self {
        Self {
            attributes,
            persisted: false,
        }
    }

    /// Creates a fresh record from field/value pairs.
    pub fn with<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: ToValue,
        I: IntoIterator<Item = (K, V)>,
    {
        Self::new(plinth_schema::attrs(pairs))
    }

    /// Creates a record representing an already-stored row.
    #[must_use]
    pub(crate) const fn stored(attributes: Attributes) -> Self {
        Self {
            attributes,
            persisted: true,
        }
    }

    /// Returns whether this record has never been persisted.
    #[must_use]
    pub const fn is_new(&self) -> bool {
        !self.persisted
    }

    /// Returns the value of a field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.attributes.get(field)
    }

    /// Sets a field.
    pub fn set(&mut self, field: impl Into<String>, value: impl ToValue) {
        self.attributes.insert(field.into(), value.to_value());
    }

    /// Returns the live attribute state.
    #[must_use]
    pub const fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Merges attributes into the live state (used by the save path to
    /// write back committed values and schema defaults).
    pub(crate) fn merge(&mut self, attributes: Attributes) {
        self.attributes.extend(attributes);
    }

    /// Marks the record as persisted.
    pub(crate) fn mark_persisted(&mut self) {
        self.persisted = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_is_new() {
        let record = Record::with([("first_name", "hello")]);
        assert!(record.is_new());
        assert_eq!(
            record.get("first_name"),
            Some(&Value::Text(String::from("hello")))
        );
    }

    #[test]
    fn test_set_and_merge() {
        let mut record = Record::with([("first_name", "hello")]);
        record.set("last_name", "world");
        record.merge(plinth_schema::attrs([("first_name", "goodbye")]));
        assert_eq!(
            record.get("first_name"),
            Some(&Value::Text(String::from("goodbye")))
        );
        assert_eq!(
            record.get("last_name"),
            Some(&Value::Text(String::from("world")))
        );
    }

    #[test]
    fn test_stored_record_is_not_new() {
        let record = Record::stored(plinth_schema::attrs([("id", 1i64)]));
        assert!(!record.is_new());
    }
}
