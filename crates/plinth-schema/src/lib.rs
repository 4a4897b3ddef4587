//! # plinth-schema
//!
//! The schema-validation engine behind plinth record types.
//!
//! This crate provides:
//! - `Value` / `Attributes` for dynamically typed record state
//! - `Rule` for per-field requirements (type, required, null, allowed set,
//!   default)
//! - `Schema` with key extension and optional-key subsetting, the two
//!   derivations the save validator composes
//! - `ValidationError` carrying the failing field and owning table
//!
//! ## Quick Start
//!
//! ```ignore
//! use plinth_schema::{attrs, fields, Rule, Schema};
//!
//! let schema = Schema::from_fields(fields([
//!     ("first_name", Rule::text().one_of(["hello", "goodbye", "yo"]).required()),
//!     ("last_name", Rule::text().allow_null()),
//! ]));
//!
//! // Full validation: required fields must be present.
//! schema.validate(&attrs([("first_name", "hello")]))?;
//!
//! // Partial validation: force the untouched keys optional first.
//! let subset = schema.optional_keys(["first_name"]);
//! subset.validate(&attrs([("last_name", "world")]))?;
//! ```

mod error;
mod rule;
mod schema;
mod value;

pub use error::ValidationError;
pub use rule::{Kind, Rule};
pub use schema::{fields, Schema, SchemaSpec};
pub use value::{attrs, Attributes, ToValue, Value};
