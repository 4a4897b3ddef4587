//! Schemas: named rule sets with key extension and optional-key subsetting.

use std::collections::BTreeMap;

use crate::error::ValidationError;
use crate::rule::Rule;
use crate::value::Attributes;

/// A declarative schema: one rule per field.
///
/// Schemas are value types; `keys` and `optional_keys` derive new schemas
/// rather than mutating, so a built schema can be shared read-only.
///
/// # Example
///
/// ```ignore
/// let schema = Schema::from_fields(BTreeMap::from([
///     (String::from("first_name"), Rule::text().required()),
///     (String::from("last_name"), Rule::text().allow_null()),
/// ]));
/// let validated = schema.validate(&attrs)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: BTreeMap<String, Rule>,
}

impl Schema {
    /// Creates an empty schema that accepts any attribute map.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fields: BTreeMap::new(),
        }
    }

    /// Creates a schema from a field-rule map.
    #[must_use]
    pub const fn from_fields(fields: BTreeMap<String, Rule>) -> Self {
        Self { fields }
    }

    /// Returns whether this schema declares no rules at all.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the declared field keys.
    pub fn field_keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Returns the rule for a field, if declared.
    #[must_use]
    pub fn rule(&self, field: &str) -> Option<&Rule> {
        self.fields.get(field)
    }

    /// Derives a schema with the extension's rules merged in.
    ///
    /// Keys in the extension replace any existing declaration.
    #[must_use]
    pub fn keys(&self, extension: BTreeMap<String, Rule>) -> Self {
        let mut fields = self.fields.clone();
        fields.extend(extension);
        Self { fields }
    }

    /// Derives a schema with exactly the named keys forced optional.
    ///
    /// An empty key list is a no-op, never an error.
    #[must_use]
    pub fn optional_keys<'a, I>(&self, keys: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut fields = self.fields.clone();
        for key in keys {
            if let Some(rule) = fields.get_mut(key) {
                rule.required = false;
            }
        }
        Self { fields }
    }

    /// Validates an attribute map against this schema.
    ///
    /// Unknown keys pass through unchanged. Absent fields with a default
    /// have the default substituted into the output; absent required
    /// fields fail. The outcome is all-or-nothing: either every default
    /// is merged and the validated map is returned, or the first failing
    /// field (in key order) is reported and nothing is applied.
    pub fn validate(&self, attrs: &Attributes) -> Result<Attributes, ValidationError> {
        let mut out = attrs.clone();
        for (name, rule) in &self.fields {
            match attrs.get(name) {
                Some(value) => {
                    rule.check(value)
                        .map_err(|message| ValidationError::new(name, message))?;
                }
                None => {
                    if let Some(default) = &rule.default {
                        out.insert(name.clone(), default.clone());
                    } else if rule.required {
                        return Err(ValidationError::new(name, "is required"));
                    }
                }
            }
        }
        Ok(out)
    }
}

/// A user-supplied schema description.
///
/// Either a raw field-rule map or an already-built schema; normalization
/// always produces a `Schema`.
#[derive(Debug, Clone)]
pub enum SchemaSpec {
    /// A plain field-rule map, not yet built.
    Fields(BTreeMap<String, Rule>),
    /// An already-built schema object.
    Built(Schema),
}

impl SchemaSpec {
    /// Builds the schema this spec describes.
    #[must_use]
    pub fn into_schema(self) -> Schema {
        match self {
            Self::Fields(fields) => Schema::from_fields(fields),
            Self::Built(schema) => schema,
        }
    }
}

impl From<BTreeMap<String, Rule>> for SchemaSpec {
    fn from(fields: BTreeMap<String, Rule>) -> Self {
        Self::Fields(fields)
    }
}

impl From<Schema> for SchemaSpec {
    fn from(schema: Schema) -> Self {
        Self::Built(schema)
    }
}

/// Builds a field-rule map from name/rule pairs.
pub fn fields<K, I>(pairs: I) -> BTreeMap<String, Rule>
where
    K: Into<String>,
    I: IntoIterator<Item = (K, Rule)>,
{
    pairs.into_iter().map(|(k, r)| (k.into(), r)).collect()
}
