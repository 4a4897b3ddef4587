//! The CRUD/upsert convenience layer.
//!
//! A `Repository` pairs one record type with one engine and forwards to
//! the engine's fetch/save/destroy primitives, merging default options
//! and translating naming conventions at the boundary. It holds no state
//! of its own beyond the shared, immutable definition.

use std::sync::Arc;

use chrono::Utc;
use plinth_schema::{Attributes, ToValue, Value};
use tracing::debug;

use crate::engine::{
    BeforeSave, DestroyOptions, Engine, FetchOptions, SaveContext, SaveMethod, SaveOptions,
    SavePlan,
};
use crate::error::Result;
use crate::model::ModelDef;
use crate::record::Record;
use crate::validator::SaveMode;

/// Options for `Repository::update`.
#[derive(Debug, Clone)]
pub struct UpdateOptions {
    /// Write only the submitted columns (default true).
    pub patch: bool,
    /// Fail with `NotFound` when no row has the id (default true);
    /// otherwise absence resolves to `None`.
    pub require: bool,
}

impl Default for UpdateOptions {
    fn default() -> Self {
        Self {
            patch: true,
            require: true,
        }
    }
}

impl UpdateOptions {
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

/// Options for `Repository::find_or_create`.
#[derive(Debug, Clone)]
pub struct FindOrCreateOptions {
    /// Attributes merged under the data when creating; never applied to a
    /// found record.
    pub defaults: Option<Attributes>,
    /// Column projection for the find path.
    pub columns: Option<Vec<String>>,
    /// Forwarded to the create-path save (default true). The find path
    /// never requires; absence is what triggers the create.
    pub require: bool,
}

impl Default for FindOrCreateOptions {
    fn default() -> Self {
        Self {
            defaults: None,
            columns: None,
            require: true,
        }
    }
}

impl FindOrCreateOptions {
    /// Sets the create-path defaults.
    #[must_use]
    pub fn defaults(mut self, defaults: Attributes) -> Self {
        self.defaults = Some(defaults);
        self
    }

    /// Sets the require flag forwarded to the create-path save.
    #[must_use]
    pub const fn require(mut self, value: bool) -> Self {
        self.require = value;
        self
    }

    /// Sets a column projection for the find path.
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

/// CRUD operations for one record type over one engine.
///
/// # Example
///
/// ```ignore
/// use plinth_model::{ModelDef, Repository};
/// use plinth_schema::{attrs, fields, Rule};
///
/// let def = ModelDef::builder("test_table")
///     .schema(fields([
///         ("first_name", Rule::text().one_of(["hello", "goodbye", "yo"]).required()),
///         ("last_name", Rule::text().allow_null()),
///     ]))
///     .build()?;
/// let repo = Repository::new(engine, def);
///
/// let specimen = repo.create(attrs([("first_name", "hello")]), &Default::default()).await?;
/// ```
pub struct Repository<E: Engine> {
    def: Arc<ModelDef>,
    engine: E,
}

impl<E: Engine> Repository<E> {
    /// Creates a repository for a record type.
    pub fn new(engine: E, def: ModelDef) -> Self {
        Self {
            def: Arc::new(def),
            engine,
        }
    }

    /// Returns the record type definition.
    #[must_use]
    pub fn def(&self) -> &ModelDef {
        &self.def
    }

    /// Returns the underlying engine.
    #[must_use]
    pub const fn engine(&self) -> &E {
        &self.engine
    }

    /// Selects every record matching the filter.
    pub async fn find_all(
        &self,
        filter: &Attributes,
        options: &FetchOptions,
    ) -> Result<Vec<Record>> {
        debug!(table = self.def.table(), "find_all");
        let rows = self
            .engine
            .fetch_all(self.def.table(), &self.def.naming().format(filter), options)
            .await?;
        Ok(rows
            .into_iter()
            .map(|row| Record::stored(self.def.naming().parse(&row)))
            .collect())
    }

    /// Selects one record matching the query.
    ///
    /// With `require` set (the default), absence is a `NotFound` error;
    /// otherwise it resolves to `None`.
    pub async fn find_one(
        &self,
        query: &Attributes,
        options: &FetchOptions,
    ) -> Result<Option<Record>> {
        debug!(table = self.def.table(), "find_one");
        let row = self
            .engine
            .fetch(self.def.table(), &self.def.naming().format(query), options)
            .await?;
        Ok(row.map(|row| Record::stored(self.def.naming().parse(&row))))
    }

    /// Selects one record by its id.
    pub async fn find_by_id(
        &self,
        id: impl ToValue,
        options: &FetchOptions,
    ) -> Result<Option<Record>> {
        let query = plinth_schema::attrs([(self.def.id_column(), id.to_value())]);
        self.find_one(&query, options).await
    }

    /// Inserts a record from data.
    pub async fn create(&self, data: Attributes, options: &SaveOptions) -> Result<Record> {
        debug!(table = self.def.table(), "create");
        let mut record = Record::new(data);
        let submitted = record.attributes().clone();
        self.save_record(&mut record, submitted, options).await?;
        Ok(record)
    }

    /// Updates the record with the given id.
    ///
    /// Fetches first; when nothing matches and `require` is false this
    /// resolves to `None` rather than failing.
    pub async fn update(
        &self,
        data: Attributes,
        id: impl ToValue,
        options: &UpdateOptions,
    ) -> Result<Option<Record>> {
        debug!(table = self.def.table(), "update");
        let fetch = FetchOptions::default().require(options.require);
        let Some(mut record) = self.find_by_id(id, &fetch).await? else {
            return Ok(None);
        };
        let save = SaveOptions::default()
            .patch(options.patch)
            .require(options.require);
        self.save_record(&mut record, data, &save).await?;
        Ok(Some(record))
    }

    /// Destroys the record with the given id.
    pub async fn destroy(&self, id: impl ToValue, options: &DestroyOptions) -> Result<()> {
        debug!(table = self.def.table(), "destroy");
        self.engine
            .destroy(self.def.table(), &id.to_value(), options)
            .await?;
        Ok(())
    }

    /// Selects a record matching the data, inserting it if absent.
    ///
    /// `defaults` are merged under the data on the create path only; a
    /// found record is returned untouched.
    pub async fn find_or_create(
        &self,
        data: Attributes,
        options: &FindOrCreateOptions,
    ) -> Result<Record> {
        let mut fetch = FetchOptions::default().require(false);
        if let Some(columns) = &options.columns {
            fetch = fetch.columns(columns.clone());
        }
        if let Some(found) = self.find_one(&data, &fetch).await? {
            return Ok(found);
        }
        let mut merged = options.defaults.clone().unwrap_or_default();
        merged.extend(data);
        let save = SaveOptions::default().require(options.require);
        self.create(merged, &save).await
    }

    /// Selects a record by `select_data`, patching it with `update_data`
    /// if found, else inserting the merge of both.
    ///
    /// The found path always patches; the create path always inserts, so
    /// application-assigned ids (including 0) survive.
    pub async fn upsert(
        &self,
        select_data: Attributes,
        update_data: Attributes,
        options: &SaveOptions,
    ) -> Result<Record> {
        let fetch = FetchOptions::default().require(false);
        match self.find_one(&select_data, &fetch).await? {
            Some(mut record) => {
                // caller options carry through; only method and patch are
                // fixed by the found path
                let save = options.clone().method(SaveMethod::Update).patch(true);
                self.save_record(&mut record, update_data, &save).await?;
                Ok(record)
            }
            None => {
                let mut merged = select_data;
                merged.extend(update_data);
                let save = options.clone().method(SaveMethod::Insert);
                self.create(merged, &save).await
            }
        }
    }

    /// Saves a record's full attribute state.
    pub async fn save(&self, record: &mut Record, options: &SaveOptions) -> Result<()> {
        let submitted = record.attributes().clone();
        self.save_record(record, submitted, options).await
    }

    /// The shared save path.
    ///
    /// Stamps timestamps, assembles the hook context, forwards to the
    /// engine (which runs the validator immediately before commit), and
    /// merges the committed row — schema defaults included — back into
    /// the record's live state.
    async fn save_record(
        &self,
        record: &mut Record,
        mut submitted: Attributes,
        options: &SaveOptions,
    ) -> Result<()> {
        let exists = !record.is_new();
        if self.def.timestamps() {
            let now = Value::Timestamp(Utc::now());
            if SaveMode::classify(exists, options) == SaveMode::Inserting {
                submitted.insert(String::from(self.def.created_at_field()), now.clone());
            }
            submitted.insert(String::from(self.def.updated_at_field()), now);
        }

        let mut full = record.attributes().clone();
        full.extend(submitted.clone());

        let columns = self.def.naming().format(&submitted);
        let id_column = self.def.external_id_column();
        let validator = self.def.validator();
        let plan = SavePlan {
            columns,
            id_column: &id_column,
            context: SaveContext {
                exists,
                attributes: &full,
                submitted: &submitted,
                options,
            },
            hook: validator.as_ref().map(|v| v as &dyn BeforeSave),
        };

        let id = record.get(self.def.id_column()).cloned();
        let stored = self.engine.save(self.def.table(), id.as_ref(), plan).await?;
        record.merge(self.def.naming().parse(&stored));
        record.mark_persisted();
        Ok(())
    }
}
