//! # plinth-model
//!
//! A schema-validating model base over a pluggable persistence engine.
//!
//! This crate provides:
//! - `ModelDef` — an explicitly-constructed record type descriptor with a
//!   normalized schema (system fields merged as always-optional)
//! - `Record` — one in-memory row with live attribute state
//! - `SaveValidator` — the before-commit hook deciding full vs
//!   submitted-keys-only validation per save attempt
//! - `Naming` — bidirectional snake_case/camelCase key translation
//! - `Engine` — the fetch/save/destroy collaborator interface with its
//!   before-commit extension point
//! - `Repository` — create/update/destroy/find/findOrCreate/upsert
//!   helpers forwarding to the engine
//!
//! ## Quick Start
//!
//! ```ignore
//! use plinth_model::{ModelDef, Repository, UpdateOptions};
//! use plinth_schema::{attrs, fields, Rule};
//!
//! let def = ModelDef::builder("test_table")
//!     .schema(fields([
//!         ("first_name", Rule::text().one_of(["hello", "goodbye", "yo"]).required()),
//!         ("last_name", Rule::text().allow_null()),
//!     ]))
//!     .build()?;
//! let repo = Repository::new(engine, def);
//!
//! // Inserts validate the full attribute set.
//! let specimen = repo.create(attrs([("first_name", "hello")]), &Default::default()).await?;
//!
//! // Updates validate only the submitted fields.
//! let id = specimen.get("id").cloned().unwrap();
//! repo.update(attrs([("first_name", "goodbye")]), id, &UpdateOptions::default()).await?;
//! ```

mod engine;
mod error;
mod model;
pub mod naming;
mod record;
mod repository;
mod validator;

pub use engine::{
    BeforeSave, DestroyOptions, Engine, FetchOptions, Row, SaveContext, SaveMethod, SaveOptions,
    SavePlan,
};
pub use error::{ModelError, Result};
pub use model::{ModelDef, ModelDefBuilder};
pub use naming::Naming;
pub use record::Record;
pub use repository::{FindOrCreateOptions, Repository, UpdateOptions};
pub use validator::{SaveMode, SaveValidator};
