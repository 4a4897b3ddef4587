//! The persistence-engine interface.
//!
//! The model layer owns no storage. Everything below the repository is an
//! `Engine`: fetch/save/destroy primitives over external-keyed rows, with
//! a single before-commit extension point where the save validator is
//! interposed.

use std::collections::BTreeMap;

use plinth_schema::{Attributes, ValidationError, Value};

use crate::error::Result;

/// A storage row: column name to value, in external (storage) convention.
pub type Row = BTreeMap<String, Value>;

/// How a save should write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMethod {
    /// Insert a new row.
    Insert,
    /// Update an existing row.
    Update,
}

/// Options recognized by fetch operations.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Fail with `NotFound` when nothing matches; otherwise absence is a
    /// normal empty result.
    pub require: bool,
    /// Column projection, passed to the engine untouched.
    pub columns: Option<Vec<String>>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            require: true,
            columns: None,
        }
    }
}

impl FetchOptions {
    /// Sets the require flag.
    #[must_use]
    pub const fn require(mut self, value: bool) -> Self {
        self.require = value;
        self
    }

    /// Sets a column projection.
    #[must_use]
    pub fn columns<S, I>(mut self, columns: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = S>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }
}

/// Options recognized by save operations.
#[derive(Debug, Clone)]
pub struct SaveOptions {
    /// Explicit insert/update override; decided from record existence
    /// when absent.
    pub method: Option<SaveMethod>,
    /// Partial-write signal; also feeds the validator's mode selection.
    pub patch: bool,
    /// Fail with `NotFound` when an update matches no row.
    pub require: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            method: None,
            patch: false,
            require: true,
        }
    }
}

impl SaveOptions {
    /// Sets the explicit method override.
    #[must_use]
    pub const fn method(mut self, method: SaveMethod) -> Self {
        self.method = Some(method);
        self
    }

    /// Sets the patch flag.
    #[must_use]
    pub const fn patch(mut self, value: bool) -> Self {
        self.patch = value;
        self
    }

    /// Sets the require flag.
    #[must_use]
    pub const fn require(mut self, value: bool) -> Self {
        self.require = value;
        self
    }
}

/// Options recognized by destroy operations.
#[derive(Debug, Clone)]
pub struct DestroyOptions {
    /// Fail with `NotFound` when the row is already gone.
    pub require: bool,
}

impl Default for DestroyOptions {
    fn default() -> Self {
        Self { require: true }
    }
}

impl DestroyOptions {
    /// Sets the require flag.
    #[must_use]
    pub const fn require(mut self, value: bool) -> Self {
        self.require = value;
        self
    }
}

/// Everything the before-commit hook may inspect for one save attempt.
#[derive(Debug)]
pub struct SaveContext<'a> {
    /// Whether the record has been persisted before.
    pub exists: bool,
    /// The record's full attribute state with the submitted data merged
    /// in, in attribute convention.
    pub attributes: &'a Attributes,
    /// Only the attributes being written by this call.
    pub submitted: &'a Attributes,
    /// The options the caller passed to save.
    pub options: &'a SaveOptions,
}

/// The before-commit extension point.
///
/// Exactly one hook is registered per record type. The engine invokes it
/// immediately before committing and must write exactly the columns it
/// returns; an error aborts the save with nothing written.
pub trait BeforeSave: Send + Sync {
    /// Validates one save attempt and returns the columns to commit.
    fn before_save(&self, ctx: &SaveContext<'_>) -> std::result::Result<Row, ValidationError>;
}

/// A save request handed to the engine.
pub struct SavePlan<'a> {
    /// Column data to write when no hook is registered.
    pub columns: Row,
    /// The primary-key column name.
    pub id_column: &'a str,
    /// Context passed through to the hook.
    pub context: SaveContext<'a>,
    /// The record type's before-commit hook, if any.
    pub hook: Option<&'a dyn BeforeSave>,
}

/// A persistence engine: the external collaborator the model layer
/// forwards to.
///
/// Rows are external-keyed; the repository translates naming conventions
/// at this boundary. Implementations decide insert vs update from the
/// plan's `method` override, falling back to the target id / existence
/// flag.
#[allow(async_fn_in_trait)]
pub trait Engine: Send + Sync {
    /// Fetches the first row matching every column of `query`.
    async fn fetch(&self, table: &str, query: &Row, options: &FetchOptions)
        -> Result<Option<Row>>;

    /// Fetches every row matching `filter`.
    async fn fetch_all(&self, table: &str, filter: &Row, options: &FetchOptions)
        -> Result<Vec<Row>>;

    /// Writes a row, invoking the plan's hook immediately before commit.
    ///
    /// Returns the row as committed (id and all columns included for
    /// inserts; the merged row for updates).
    async fn save(&self, table: &str, id: Option<&Value>, plan: SavePlan<'_>) -> Result<Row>;

    /// Deletes the row with the given id. Returns whether a row was
    /// removed.
    async fn destroy(&self, table: &str, id: &Value, options: &DestroyOptions) -> Result<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_options_default_require() {
        let options = FetchOptions::default();
        assert!(options.require);
        assert!(options.columns.is_none());
    }

    #[test]
    fn test_fetch_options_builder() {
        let options = FetchOptions::default().require(false).columns(["id"]);
        assert!(!options.require);
        assert_eq!(options.columns, Some(vec![String::from("id")]));
    }

    #[test]
    fn test_save_options_defaults() {
        let options = SaveOptions::default();
        assert!(options.method.is_none());
        assert!(!options.patch);
        assert!(options.require);
    }

    #[test]
    fn test_destroy_options_default_require() {
        assert!(DestroyOptions::default().require);
    }
}
