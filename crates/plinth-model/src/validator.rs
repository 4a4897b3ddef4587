//! Save-time validation.
//!
//! Every save attempt is classified as an insert or an update, and the
//! classification decides how much of the schema is enforced: inserts
//! validate the record's full attribute state against the canonical
//! schema, while updates validate only the submitted attributes against a
//! transient schema variant with every untouched key forced optional.
//! That lets a caller patch one field of a multi-field record without
//! resupplying every required field, while illegal values are still
//! rejected in both modes.

use std::collections::BTreeSet;

use plinth_schema::{Attributes, Schema, ValidationError};
use tracing::warn;

use crate::engine::{BeforeSave, Row, SaveContext, SaveMethod, SaveOptions};
use crate::model::ModelDef;

/// How one save attempt is classified.
///
/// There is no persisted state machine; the mode is a pure function of
/// (existence, options), re-evaluated on every save call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    /// The record has never been persisted: full-schema validation.
    Inserting,
    /// The record exists, or update/patch semantics were requested:
    /// submitted-keys-only validation.
    Updating,
}

impl SaveMode {
    /// Classifies a save attempt.
    #[must_use]
    pub fn classify(exists: bool, options: &SaveOptions) -> Self {
        if exists || options.method == Some(SaveMethod::Update) || options.patch {
            Self::Updating
        } else {
            Self::Inserting
        }
    }
}

/// The single before-commit hook of a record type with a schema.
///
/// Borrows the type's canonical schema; never retains a reference to any
/// record. Validation is synchronous and CPU-bound.
#[derive(Debug, Clone, Copy)]
pub struct SaveValidator<'a> {
    def: &'a ModelDef,
    schema: &'a Schema,
}

impl<'a> SaveValidator<'a> {
    pub(crate) const fn new(def: &'a ModelDef, schema: &'a Schema) -> Self {
        Self { def, schema }
    }

    /// Validates one save attempt.
    ///
    /// On success returns the validated attributes — possibly
    /// default-populated — that the commit must write and the record's
    /// live state must absorb. On failure returns the first failing field
    /// with the owning table attached; the save must abort.
    pub fn validate_save(
        &self,
        ctx: &SaveContext<'_>,
    ) -> Result<Attributes, ValidationError> {
        let outcome = match SaveMode::classify(ctx.exists, ctx.options) {
            SaveMode::Inserting => self.schema.validate(ctx.attributes),
            SaveMode::Updating => {
                let submitted: BTreeSet<&str> =
                    ctx.submitted.keys().map(String::as_str).collect();
                let untouched: Vec<&str> = self
                    .schema
                    .field_keys()
                    .filter(|key| !submitted.contains(key))
                    .collect();
                if untouched.is_empty() {
                    self.schema.validate(ctx.submitted)
                } else {
                    self.schema.optional_keys(untouched).validate(ctx.submitted)
                }
            }
        };

        outcome.map_err(|err| {
            let err = err.with_table(self.def.table());
            warn!(
                table = self.def.table(),
                field = %err.field,
                "save aborted: {}",
                err.message
            );
            err
        })
    }
}

impl BeforeSave for SaveValidator<'_> {
    fn before_save(&self, ctx: &SaveContext<'_>) -> Result<Row, ValidationError> {
        let validated = self.validate_save(ctx)?;
        Ok(self.def.naming().format(&validated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plinth_schema::{attrs, fields, Rule};

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

    fn ctx<'a>(
        exists: bool,
        attributes: &'a Attributes,
        submitted: &'a Attributes,
        options: &'a SaveOptions,
    ) -> SaveContext<'a> {
        SaveContext {
            exists,
            attributes,
            submitted,
            options,
        }
    }

    #[test]
    fn test_classify() {
        let default = SaveOptions::default();
        assert_eq!(SaveMode::classify(false, &default), SaveMode::Inserting);
        assert_eq!(SaveMode::classify(true, &default), SaveMode::Updating);
        assert_eq!(
            SaveMode::classify(false, &SaveOptions::default().patch(true)),
            SaveMode::Updating
        );
        assert_eq!(
            SaveMode::classify(false, &SaveOptions::default().method(SaveMethod::Update)),
            SaveMode::Updating
        );
        assert_eq!(
            SaveMode::classify(false, &SaveOptions::default().method(SaveMethod::Insert)),
            SaveMode::Inserting
        );
    }

    #[test]
    fn test_insert_validates_full_state() {
        let def = specimen_def();
        let validator = def.validator().unwrap();
        let options = SaveOptions::default();

        let missing = attrs([("last_name", "x")]);
        let err = validator
            .validate_save(&ctx(false, &missing, &missing, &options))
            .unwrap_err();
        assert_eq!(err.field, "first_name");
        assert_eq!(err.table.as_deref(), Some("test_table"));

        let complete = attrs([("first_name", "hello")]);
        let out = validator
            .validate_save(&ctx(false, &complete, &complete, &options))
            .unwrap();
        assert_eq!(out, complete);
    }

    #[test]
    fn test_update_validates_submitted_keys_only() {
        let def = specimen_def();
        let validator = def.validator().unwrap();
        let options = SaveOptions::default();

        // required first_name is omitted, but the save is an update, so
        // only last_name is judged
        let full = attrs([("first_name", "hello"), ("last_name", "world")]);
        let submitted = attrs([("last_name", "world")]);
        let out = validator
            .validate_save(&ctx(true, &full, &submitted, &options))
            .unwrap();
        assert_eq!(out, submitted);
    }

    #[test]
    fn test_update_still_rejects_illegal_values() {
        let def = specimen_def();
        let validator = def.validator().unwrap();
        let options = SaveOptions::default();

        let full = attrs([("first_name", "nope")]);
        let submitted = attrs([("first_name", "nope")]);
        let err = validator
            .validate_save(&ctx(true, &full, &submitted, &options))
            .unwrap_err();
        assert_eq!(err.field, "first_name");
    }

    #[test]
    fn test_existing_record_full_resave_is_partial_validation() {
        // no method/patch option: existence alone classifies as updating,
        // and a submitted set covering every field behaves like full
        // validation because nothing is excluded
        let def = specimen_def();
        let validator = def.validator().unwrap();
        let options = SaveOptions::default();

        let everything = attrs([
            ("first_name", "goodbye"),
            ("last_name", "world"),
        ]);
        let out = validator
            .validate_save(&ctx(true, &everything, &everything, &options))
            .unwrap();
        assert_eq!(out.get("first_name"), everything.get("first_name"));
    }

    #[test]
    fn test_patch_option_alone_selects_update_mode() {
        let def = specimen_def();
        let validator = def.validator().unwrap();
        let options = SaveOptions::default().patch(true);

        let submitted = attrs([("last_name", "world")]);
        assert!(validator
            .validate_save(&ctx(false, &submitted, &submitted, &options))
            .is_ok());
    }

    #[test]
    fn test_system_fields_never_required() {
        let def = specimen_def();
        let validator = def.validator().unwrap();
        let options = SaveOptions::default();

        // insert without id or timestamps passes
        let complete = attrs([("first_name", "hello")]);
        assert!(validator
            .validate_save(&ctx(false, &complete, &complete, &options))
            .is_ok());
    }

    #[test]
    fn test_invalid_type_names_field_and_table() {
        let def = specimen_def();
        let validator = def.validator().unwrap();
        let options = SaveOptions::default();

        let bad = attrs([("first_name", 1i64)]);
        let err = validator
            .validate_save(&ctx(false, &bad, &bad, &options))
            .unwrap_err();
        assert_eq!(err.field, "first_name");
        assert!(err.to_string().contains("first_name"));
        assert!(err.to_string().contains("test_table"));
    }

    #[test]
    fn test_defaults_flow_into_outcome() {
        let def = ModelDef::builder("test_table")
            .schema(fields([
                ("first_name", Rule::text().one_of(["hello", "goodbye"])),
                ("last_name", Rule::text().default("world")),
            ]))
            .build()
            .unwrap();
        let validator = def.validator().unwrap();
        let options = SaveOptions::default();

        let data = attrs([("first_name", "hello")]);
        let out = validator
            .validate_save(&ctx(false, &data, &data, &options))
            .unwrap();
        assert_eq!(out.get("last_name").unwrap().as_text(), Some("world"));
    }
}
