//! Per-field validation rules.

use crate::value::{ToValue, Value};

/// The value type a rule accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// Accepts any value, including null.
    Any,
    /// Boolean values.
    Bool,
    /// Integer values.
    Int,
    /// Float values; integers are accepted and widen.
    Float,
    /// Text values.
    Text,
    /// Timestamp values.
    Timestamp,
}

impl Kind {
    /// Returns whether a non-null value matches this kind.
    #[must_use]
    pub const fn accepts(self, value: &Value) -> bool {
        match self {
            Self::Any => true,
            Self::Bool => matches!(value, Value::Bool(_)),
            Self::Int => matches!(value, Value::Int(_)),
            Self::Float => matches!(value, Value::Float(_) | Value::Int(_)),
            Self::Text => matches!(value, Value::Text(_)),
            Self::Timestamp => matches!(value, Value::Timestamp(_)),
        }
    }

    /// Returns the name used in error messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Text => "text",
            Self::Timestamp => "timestamp",
        }
    }
}

/// A validation rule for a single field.
///
/// # Example
///
/// ```ignore
/// let rule = Rule::text().one_of(["hello", "goodbye", "yo"]).required();
/// ```
#[derive(Debug, Clone)]
pub struct Rule {
    /// The value type this rule accepts.
    pub kind: Kind,
    /// Whether the field must be present.
    pub required: bool,
    /// Whether an explicit null value is accepted.
    pub allow_null: bool,
    /// Allowed value set, if restricted.
    pub one_of: Option<Vec<Value>>,
    /// Value substituted when the field is absent.
    pub default: Option<Value>,
}

impl Rule {
    /// Creates a rule for the given kind: optional, non-null, unrestricted.
    #[must_use]
    pub const fn new(kind: Kind) -> Self {
        Self {
            kind,
            required: false,
            allow_null: false,
            one_of: None,
            default: None,
        }
    }

    /// Creates a rule accepting any value.
    #[must_use]
    pub const fn any() -> Self {
        Self::new(Kind::Any)
    }

    /// Creates a boolean rule.
    #[must_use]
    pub const fn boolean() -> Self {
        Self::new(Kind::Bool)
    }

    /// Creates an integer rule.
    #[must_use]
    pub const fn int() -> Self {
        Self::new(Kind::Int)
    }

    /// Creates a float rule.
    #[must_use]
    pub const fn float() -> Self {
        Self::new(Kind::Float)
    }

    /// Creates a text rule.
    #[must_use]
    pub const fn text() -> Self {
        Self::new(Kind::Text)
    }

    /// Creates a timestamp rule.
    #[must_use]
    pub const fn timestamp() -> Self {
        Self::new(Kind::Timestamp)
    }

    /// Marks the field as required.
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Marks the field as optional.
    #[must_use]
    pub const fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Allows an explicit null value.
    #[must_use]
    pub const fn allow_null(mut self) -> Self {
        self.allow_null = true;
        self
    }

    /// Restricts the field to the given value set.
    #[must_use]
    pub fn one_of<V, I>(mut self, values: I) -> Self
    where
        V: ToValue,
        I: IntoIterator<Item = V>,
    {
        self.one_of = Some(values.into_iter().map(ToValue::to_value).collect());
        self
    }

    /// Sets the value substituted when the field is absent.
    #[must_use]
    pub fn default(mut self, value: impl ToValue) -> Self {
        self.default = Some(value.to_value());
        self
    }

    /// Checks a present value against this rule.
    ///
    /// Presence/absence is the schema's concern; this only judges the
    /// value itself.
    pub fn check(&self, value: &Value) -> Result<(), String> {
        if value.is_null() {
            if self.allow_null || self.kind == Kind::Any {
                return Ok(());
            }
            return Err(String::from("null is not allowed"));
        }
        if !self.kind.accepts(value) {
            return Err(format!(
                "expected {}, got {}",
                self.kind.name(),
                value.type_name()
            ));
        }
        if let Some(allowed) = &self.one_of {
            if !allowed.contains(value) {
                let rendered = allowed
                    .iter()
                    .map(render)
                    .collect::<Vec<_>>()
                    .join(", ");
                return Err(format!("value must be one of [{rendered}]"));
            }
        }
        Ok(())
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::Null => String::from("null"),
        Value::Bool(b) => b.to_string(),
        Value::Int(n) => n.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Text(s) => format!("\"{s}\""),
        Value::Timestamp(t) => t.to_rfc3339(),
    }
}
