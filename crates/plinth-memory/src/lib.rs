//! # plinth-memory
//!
//! An in-memory `Engine` for plinth record types.
//!
//! Rows live in per-table maps behind an async read/write lock; the write
//! lock is the pre-commit serialization point where the before-commit
//! hook runs. Ids are auto-incrementing integers; application-assigned
//! integer ids (including 0) are honored and advance the counter past
//! themselves.
//!
//! This is a fixture-grade backend for tests and demos, not a query
//! engine: filters are column equality, and there is no ordering,
//! relations, or transactions.

use std::collections::{BTreeMap, HashMap};

use plinth_model::{DestroyOptions, Engine, FetchOptions, ModelError, Result, Row, SavePlan};
use plinth_schema::Value;
use tokio::sync::RwLock;
use tracing::debug;

struct TableData {
    rows: BTreeMap<i64, Row>,
    next_id: i64,
}

impl Default for TableData {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

/// An in-memory persistence engine.
#[derive(Default)]
pub struct MemoryEngine {
    tables: RwLock<HashMap<String, TableData>>,
}

impl MemoryEngine {
    /// Creates an empty engine.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of rows in a table.
    pub async fn row_count(&self, table: &str) -> usize {
        let tables = self.tables.read().await;
        tables.get(table).map_or(0, |data| data.rows.len())
    }
}

/// Returns whether every column of `query` equals the row's value.
fn matches(row: &Row, query: &Row) -> bool {
    query.iter().all(|(column, value)| row.get(column) == Some(value))
}

/// Applies a column projection, when one was requested.
fn project(row: &Row, columns: Option<&Vec<String>>) -> Row {
    columns.map_or_else(
        || row.clone(),
        |keep| {
            row.iter()
                .filter(|(column, _)| keep.contains(column))
                .map(|(column, value)| (column.clone(), value.clone()))
                .collect()
        },
    )
}

/// Extracts the integer key of an id value.
fn id_key(id: &Value) -> Result<i64> {
    id.as_int().ok_or_else(|| {
        ModelError::Storage(format!(
            "memory engine requires integer ids, got {}",
            id.type_name()
        ))
    })
}

impl Engine for MemoryEngine {
    async fn fetch(
        &self,
        table: &str,
        query: &Row,
        options: &FetchOptions,
    ) -> Result<Option<Row>> {
        let tables = self.tables.read().await;
        let found = tables.get(table).and_then(|data| {
            data.rows
                .values()
                .find(|row| matches(row, query))
                .map(|row| project(row, options.columns.as_ref()))
        });
        match found {
            Some(row) => Ok(Some(row)),
            None if options.require => Err(ModelError::NotFound),
            None => Ok(None),
        }
    }

    async fn fetch_all(
        &self,
        table: &str,
        filter: &Row,
        options: &FetchOptions,
    ) -> Result<Vec<Row>> {
        let tables = self.tables.read().await;
        Ok(tables.get(table).map_or_else(Vec::new, |data| {
            data.rows
                .values()
                .filter(|row| matches(row, filter))
                .map(|row| project(row, options.columns.as_ref()))
                .collect()
        }))
    }

    async fn save(&self, table: &str, id: Option<&Value>, plan: SavePlan<'_>) -> Result<Row> {
        use plinth_model::SaveMethod;

        let mut tables = self.tables.write().await;
        let data = tables.entry(String::from(table)).or_default();

        let inserting = match plan.context.options.method {
            Some(SaveMethod::Insert) => true,
            Some(SaveMethod::Update) => false,
            None => !plan.context.exists,
        };

        // the before-commit hook runs under the write lock; its output is
        // committed verbatim, and an error aborts with nothing written
        let columns = match plan.hook {
            Some(hook) => hook.before_save(&plan.context)?,
            None => plan.columns,
        };

        if inserting {
            let mut row = columns;
            let assigned = row.get(plan.id_column).cloned();
            let key = match assigned {
                Some(Value::Null) | None => {
                    let key = data.next_id;
                    row.insert(String::from(plan.id_column), Value::Int(key));
                    key
                }
                Some(value) => id_key(&value)?,
            };
            if data.rows.contains_key(&key) {
                return Err(ModelError::Storage(format!(
                    "duplicate id {key} in table {table}"
                )));
            }
            data.next_id = data.next_id.max(key + 1);
            data.rows.insert(key, row.clone());
            debug!(table, id = key, "insert committed");
            Ok(row)
        } else {
            let target = match id {
                Some(value) => Some(id_key(value)?),
                None => match columns.get(plan.id_column) {
                    Some(value) => Some(id_key(value)?),
                    None => None,
                },
            };
            let row = target.and_then(|key| data.rows.get_mut(&key));
            match row {
                Some(row) => {
                    row.extend(columns);
                    debug!(table, "update committed");
                    Ok(row.clone())
                }
                None if plan.context.options.require => Err(ModelError::NotFound),
                None => Ok(columns),
            }
        }
    }

    async fn destroy(&self, table: &str, id: &Value, options: &DestroyOptions) -> Result<bool> {
        let key = id_key(id)?;
        let mut tables = self.tables.write().await;
        let removed = tables
            .get_mut(table)
            .and_then(|data| data.rows.remove(&key))
            .is_some();
        if removed {
            debug!(table, id = key, "destroy committed");
        } else if options.require {
            return Err(ModelError::NotFound);
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plinth_model::{SaveContext, SaveOptions};
    use plinth_schema::attrs;

    fn insert_plan<'a>(
        columns: &'a Row,
        options: &'a SaveOptions,
    ) -> SavePlan<'a> {
        SavePlan {
            columns: columns.clone(),
            id_column: "id",
            context: SaveContext {
                exists: false,
                attributes: columns,
                submitted: columns,
                options,
            },
            hook: None,
        }
    }

    #[tokio::test]
    async fn test_insert_allocates_ids() {
        let engine = MemoryEngine::new();
        let options = SaveOptions::default();
        let data = attrs([("first_name", "hello")]);

        let first = engine
            .save("t", None, insert_plan(&data, &options))
            .await
            .unwrap();
        let second = engine
            .save("t", None, insert_plan(&data, &options))
            .await
            .unwrap();
        assert_eq!(first.get("id"), Some(&Value::Int(1)));
        assert_eq!(second.get("id"), Some(&Value::Int(2)));
    }

    #[tokio::test]
    async fn test_application_assigned_id_zero() {
        let engine = MemoryEngine::new();
        let options = SaveOptions::default();
        let data = attrs([
            ("id", Value::Int(0)),
            ("first_name", Value::Text(String::from("hello"))),
        ]);

        let row = engine
            .save("t", None, insert_plan(&data, &options))
            .await
            .unwrap();
        assert_eq!(row.get("id"), Some(&Value::Int(0)));

        // the counter moved past the assigned id
        let next = engine
            .save(
                "t",
                None,
                insert_plan(&attrs([("first_name", "yo")]), &options),
            )
            .await
            .unwrap();
        assert_eq!(next.get("id"), Some(&Value::Int(1)));
    }

    #[tokio::test]
    async fn test_fetch_require_semantics() {
        let engine = MemoryEngine::new();
        let missing = attrs([("id", 42i64)]);

        let err = engine
            .fetch("t", &missing, &FetchOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ModelError::NotFound));

        let none = engine
            .fetch("t", &missing, &FetchOptions::default().require(false))
            .await
            .unwrap();
        assert!(none.is_none());
    }

    #[tokio::test]
    async fn test_projection() {
        let engine = MemoryEngine::new();
        let options = SaveOptions::default();
        let data = attrs([("first_name", "hello"), ("last_name", "world")]);
        engine
            .save("t", None, insert_plan(&data, &options))
            .await
            .unwrap();

        let row = engine
            .fetch(
                "t",
                &attrs([("first_name", "hello")]),
                &FetchOptions::default().columns(["id", "last_name"]),
            )
            .await
            .unwrap()
            .unwrap();
        assert!(row.contains_key("id"));
        assert!(row.contains_key("last_name"));
        assert!(!row.contains_key("first_name"));
    }

    #[tokio::test]
    async fn test_destroy_require_semantics() {
        let engine = MemoryEngine::new();
        let err = engine
            .destroy("t", &Value::Int(9), &DestroyOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ModelError::NotFound));

        let removed = engine
            .destroy("t", &Value::Int(9), &DestroyOptions::default().require(false))
            .await
            .unwrap();
        assert!(!removed);
    }
}
