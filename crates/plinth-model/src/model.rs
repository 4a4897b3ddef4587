//! Record type descriptors.
//!
//! A `ModelDef` describes one relational table: its name, primary-key
//! column, naming policy, timestamp behavior, and (optionally) its
//! validation schema. Definitions are built once by explicit construction
//! and shared immutably; there is no inheritance and no global registry.

use plinth_schema::{fields, Rule, Schema, SchemaSpec};

use crate::error::{ModelError, Result};
use crate::naming::Naming;
use crate::validator::SaveValidator;

/// A fully-configured record type.
///
/// # Example
///
/// ```ignore
/// use plinth_model::ModelDef;
/// use plinth_schema::{fields, Rule};
///
/// let def = ModelDef::builder("test_table")
///     .schema(fields([
///         ("first_name", Rule::text().one_of(["hello", "goodbye", "yo"]).required()),
///         ("last_name", Rule::text().allow_null()),
///     ]))
///     .build()?;
/// ```
#[derive(Debug, Clone)]
pub struct ModelDef {
    table: String,
    id_column: String,
    naming: Naming,
    timestamps: bool,
    schema: Option<Schema>,
}

impl ModelDef {
    /// Starts building a record type for the given table.
    pub fn builder(table: impl Into<String>) -> ModelDefBuilder {
        ModelDefBuilder {
            table: table.into(),
            id_column: String::from("id"),
            naming: Naming::default(),
            timestamps: true,
            schema: None,
        }
    }

    /// Returns the table name.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Returns the primary-key column name.
    #[must_use]
    pub fn id_column(&self) -> &str {
        &self.id_column
    }

    /// Returns the primary-key column name in storage convention.
    #[must_use]
    pub fn external_id_column(&self) -> String {
        match self.naming {
            Naming::Preserve => self.id_column.clone(),
            Naming::CamelCase => crate::naming::underscore(&self.id_column),
        }
    }

    /// Returns the naming policy.
    #[must_use]
    pub const fn naming(&self) -> Naming {
        self.naming
    }

    /// Returns whether saves stamp creation/modification timestamps.
    #[must_use]
    pub const fn timestamps(&self) -> bool {
        self.timestamps
    }

    /// Returns the canonical schema, if one was declared.
    #[must_use]
    pub const fn schema(&self) -> Option<&Schema> {
        self.schema.as_ref()
    }

    /// Returns the creation-timestamp field name under this type's naming.
    #[must_use]
    pub const fn created_at_field(&self) -> &'static str {
        match self.naming {
            Naming::Preserve => "created_at",
            Naming::CamelCase => "createdAt",
        }
    }

    /// Returns the modification-timestamp field name under this type's
    /// naming.
    #[must_use]
    pub const fn updated_at_field(&self) -> &'static str {
        match self.naming {
            Naming::Preserve => "updated_at",
            Naming::CamelCase => "updatedAt",
        }
    }

    /// Returns the before-commit validator for this type.
    ///
    /// `None` when no schema was declared: such types never validate
    /// anything, system fields included.
    #[must_use]
    pub fn validator(&self) -> Option<SaveValidator<'_>> {
        self.schema
            .as_ref()
            .map(|schema| SaveValidator::new(self, schema))
    }
}

/// Builder for `ModelDef`.
#[derive(Debug)]
pub struct ModelDefBuilder {
    table: String,
    id_column: String,
    naming: Naming,
    timestamps: bool,
    schema: Option<SchemaSpec>,
}

impl ModelDefBuilder {
    /// Sets the primary-key column name (default `id`).
    #[must_use]
    pub fn id_column(mut self, column: impl Into<String>) -> Self {
        self.id_column = column.into();
        self
    }

    /// Sets the naming policy (default `Preserve`).
    #[must_use]
    pub const fn naming(mut self, naming: Naming) -> Self {
        self.naming = naming;
        self
    }

    /// Enables or disables timestamp stamping (default enabled).
    #[must_use]
    pub const fn timestamps(mut self, enabled: bool) -> Self {
        self.timestamps = enabled;
        self
    }

    /// Declares the validation schema.
    ///
    /// Accepts either a raw field-rule map or an already-built schema.
    /// Types built without a schema never validate saves.
    #[must_use]
    pub fn schema(mut self, spec: impl Into<SchemaSpec>) -> Self {
        self.schema = Some(spec.into());
        self
    }

    /// Finalizes the definition, normalizing the schema.
    ///
    /// Normalization merges rules for the system-managed fields (primary
    /// key and both timestamps) into the declared schema, each always
    /// optional regardless of what the user declared. The result is built
    /// once and reused for every instance and every save.
    pub fn build(self) -> Result<ModelDef> {
        if self.table.is_empty() {
            return Err(ModelError::Configuration(String::from(
                "table name must not be empty",
            )));
        }
        if self.id_column.is_empty() {
            return Err(ModelError::Configuration(String::from(
                "id column must not be empty",
            )));
        }

        let def = ModelDef {
            table: self.table,
            id_column: self.id_column,
            naming: self.naming,
            timestamps: self.timestamps,
            schema: None,
        };
        let schema = self.schema.map(|spec| {
            spec.into_schema().keys(fields([
                (def.id_column.as_str(), Rule::any()),
                (def.created_at_field(), Rule::timestamp().allow_null()),
                (def.updated_at_field(), Rule::timestamp().allow_null()),
            ]))
        });
        Ok(ModelDef { schema, ..def })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plinth_schema::attrs;

    fn specimen_def() -> ModelDef {
        ModelDef::builder("test_table")
            .schema(fields([
                (
                    "first_name",
                    Rule::text().one_of(["hello", "goodbye", "yo"]).required(),
                ),
                ("last_name", Rule::text().allow_null()),
            ]))
            .build()
            .unwrap()
    }

    #[test]
    fn test_empty_table_is_configuration_error() {
        let err = ModelDef::builder("").build().unwrap_err();
        assert!(matches!(err, ModelError::Configuration(_)));
    }

    #[test]
    fn test_system_fields_merged_as_optional() {
        let def = specimen_def();
        let schema = def.schema().unwrap();
        for field in ["id", "created_at", "updated_at"] {
            let rule = schema.rule(field).unwrap();
            assert!(!rule.required, "{field} must never be required");
        }
    }

    #[test]
    fn test_system_fields_follow_naming() {
        let def = ModelDef::builder("test_table")
            .naming(Naming::CamelCase)
            .schema(fields([("firstName", Rule::text())]))
            .build()
            .unwrap();
        assert!(def.schema().unwrap().rule("createdAt").is_some());
        assert_eq!(def.created_at_field(), "createdAt");
    }

    #[test]
    fn test_user_rules_unmodified_by_normalization() {
        let def = specimen_def();
        let rule = def.schema().unwrap().rule("first_name").unwrap();
        assert!(rule.required);
        assert!(rule.one_of.is_some());
    }

    #[test]
    fn test_normalization_idempotent_in_acceptance() {
        let def = specimen_def();
        let renormalized = ModelDef::builder("test_table")
            .schema(def.schema().unwrap().clone())
            .build()
            .unwrap();

        let ok = attrs([("first_name", "hello")]);
        let bad = attrs([("last_name", "x")]);
        assert_eq!(
            def.schema().unwrap().validate(&ok).is_ok(),
            renormalized.schema().unwrap().validate(&ok).is_ok()
        );
        assert_eq!(
            def.schema().unwrap().validate(&bad).is_err(),
            renormalized.schema().unwrap().validate(&bad).is_err()
        );
    }

    #[test]
    fn test_no_schema_yields_no_validator() {
        let def = ModelDef::builder("test_table").build().unwrap();
        assert!(def.validator().is_none());
        assert!(def.schema().is_none());
    }
}
