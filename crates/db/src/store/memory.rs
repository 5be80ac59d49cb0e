//! In-process row store with the same query semantics as the HTTP one.
//!
//! Backs the test suites and the `STORE_BACKEND=memory` local mode. Unique
//! keys are declared up front; a colliding write fails with the same
//! `23505` error the hosted store returns, so conflict handling is exercised
//! end to end.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{value_text, Direction, Filter, FilterOp, Query, RowStore, StoreError, UNIQUE_VIOLATION};

type Table = Vec<Map<String, Value>>;

/// Row store held in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Table>>,
    unique_keys: HashMap<String, Vec<Vec<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store with the catalog's unique keys declared: one vote per
    /// (marker, user) and one product per (category, brand).
    pub fn catalog() -> Self {
        Self::new()
            .with_unique("votes", &["marker_id", "user_id"])
            .with_unique("markers", &["category_id", "brand_id"])
    }

    /// Declare a unique key. Rows with a null in any key column never collide.
    #[must_use]
    pub fn with_unique(mut self, table: &str, columns: &[&str]) -> Self {
        self.unique_keys
            .entry(table.to_string())
            .or_default()
            .push(columns.iter().map(ToString::to_string).collect());
        self
    }

    /// Preload rows verbatim (no ids or timestamps are generated).
    ///
    /// Non-object values are skipped.
    #[must_use]
    pub fn with_rows(mut self, table: &str, rows: Vec<Value>) -> Self {
        let target = self.tables.get_mut().entry(table.to_string()).or_default();
        target.extend(rows.into_iter().filter_map(|r| match r {
            Value::Object(map) => Some(map),
            _ => None,
        }));
        self
    }

    /// Load a seed document of the form `{ "table": [row, ...], ... }`.
    pub fn seeded(self, seed: Value) -> Result<Self, StoreError> {
        let Value::Object(tables) = seed else {
            return Err(StoreError::Api {
                status: 400,
                code: None,
                message: "Seed must be a JSON object keyed by table name".to_string(),
            });
        };
        Ok(tables.into_iter().fold(self, |store, (table, rows)| match rows {
            Value::Array(rows) => store.with_rows(&table, rows),
            _ => store,
        }))
    }

    /// Number of rows currently in `table`.
    pub async fn row_count(&self, table: &str) -> usize {
        self.tables.read().await.get(table).map_or(0, Vec::len)
    }

    fn check_unique(
        &self,
        table: &str,
        rows: &Table,
        candidate: &Map<String, Value>,
        skip: Option<usize>,
    ) -> Result<(), StoreError> {
        let Some(keys) = self.unique_keys.get(table) else {
            return Ok(());
        };
        for key in keys {
            let values: Option<Vec<String>> = key
                .iter()
                .map(|col| match candidate.get(col) {
                    None | Some(Value::Null) => None,
                    Some(v) => Some(value_text(v)),
                })
                .collect();
            let Some(values) = values else { continue };

            let clash = rows.iter().enumerate().any(|(i, row)| {
                Some(i) != skip
                    && key
                        .iter()
                        .zip(&values)
                        .all(|(col, want)| row.get(col).is_some_and(|v| !v.is_null() && value_text(v) == *want))
            });
            if clash {
                return Err(StoreError::Api {
                    status: 409,
                    code: Some(UNIQUE_VIOLATION.to_string()),
                    message: format!(
                        "duplicate key value violates unique constraint \"{table}_{}_key\"",
                        key.join("_")
                    ),
                });
            }
        }
        Ok(())
    }
}

fn now_text() -> Value {
    Value::String(chrono::Utc::now().to_rfc3339())
}

fn into_object(table: &str, row: Value) -> Result<Map<String, Value>, StoreError> {
    match row {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Api {
            status: 400,
            code: None,
            message: format!("Expected a JSON object for {table}, got {other}"),
        }),
    }
}

/// Fill in what the hosted store would default.
fn apply_insert_defaults(row: &mut Map<String, Value>) {
    row.entry("id")
        .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
    row.entry("created_at").or_insert_with(now_text);
    row.entry("updated_at").or_insert_with(now_text);
}

/// Order two scalars: numerically when both are numbers, textually otherwise.
fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Null, _) | (_, Value::Null) => None,
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => {
            let (x, y) = (value_text(a), value_text(b));
            match (x.parse::<f64>(), y.parse::<f64>()) {
                (Ok(x), Ok(y)) => x.partial_cmp(&y),
                _ => Some(x.cmp(&y)),
            }
        }
    }
}

fn matches(filter: &Filter, row: &Map<String, Value>) -> bool {
    let cell = row.get(&filter.column).unwrap_or(&Value::Null);
    match filter.op {
        FilterOp::Eq if filter.value.is_null() => cell.is_null(),
        FilterOp::Eq => !cell.is_null() && value_text(cell) == value_text(&filter.value),
        FilterOp::In => match &filter.value {
            Value::Array(items) => {
                !cell.is_null() && items.iter().any(|v| value_text(v) == value_text(cell))
            }
            _ => false,
        },
        FilterOp::Gt => compare_values(cell, &filter.value) == Some(Ordering::Greater),
        FilterOp::Gte => matches!(
            compare_values(cell, &filter.value),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        FilterOp::Lt => compare_values(cell, &filter.value) == Some(Ordering::Less),
        FilterOp::Lte => matches!(
            compare_values(cell, &filter.value),
            Some(Ordering::Less | Ordering::Equal)
        ),
    }
}

fn matches_all(query: &Query, row: &Map<String, Value>) -> bool {
    query.filters().iter().all(|f| matches(f, row))
}

/// Nulls sort last in either direction.
fn compare_rows(order: &[(String, Direction)], a: &Map<String, Value>, b: &Map<String, Value>) -> Ordering {
    for (col, dir) in order {
        let (x, y) = (
            a.get(col).unwrap_or(&Value::Null),
            b.get(col).unwrap_or(&Value::Null),
        );
        let ord = match (x.is_null(), y.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => return Ordering::Greater,
            (false, true) => return Ordering::Less,
            (false, false) => {
                let ord = compare_values(x, y).unwrap_or(Ordering::Equal);
                match dir {
                    Direction::Asc => ord,
                    Direction::Desc => ord.reverse(),
                }
            }
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

fn merge(target: &mut Map<String, Value>, patch: Map<String, Value>) {
    for (k, v) in patch {
        target.insert(k, v);
    }
}

#[async_trait]
impl RowStore for MemoryStore {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, StoreError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<&Map<String, Value>> = tables
            .get(table)
            .map(|t| t.iter().filter(|r| matches_all(query, r)).collect())
            .unwrap_or_default();

        rows.sort_by(|a, b| compare_rows(query.ordering(), a, b));
        let limit = query.row_limit().unwrap_or(usize::MAX);

        Ok(rows
            .into_iter()
            .take(limit)
            .map(|r| Value::Object(r.clone()))
            .collect())
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Value, StoreError> {
        let mut row = into_object(table, row)?;
        apply_insert_defaults(&mut row);

        let mut tables = self.tables.write().await;
        let rows = tables.entry(table.to_string()).or_default();
        self.check_unique(table, rows, &row, None)?;
        rows.push(row.clone());
        Ok(Value::Object(row))
    }

    async fn update(
        &self,
        table: &str,
        query: &Query,
        patch: Value,
    ) -> Result<Vec<Value>, StoreError> {
        let patch = into_object(table, patch)?;
        let mut tables = self.tables.write().await;
        let Some(rows) = tables.get_mut(table) else {
            return Ok(Vec::new());
        };

        let targets: Vec<usize> = rows
            .iter()
            .enumerate()
            .filter(|(_, r)| matches_all(query, r))
            .map(|(i, _)| i)
            .collect();

        let mut updated = Vec::with_capacity(targets.len());
        for i in targets {
            let mut next = rows[i].clone();
            merge(&mut next, patch.clone());
            self.check_unique(table, rows, &next, Some(i))?;
            rows[i] = next.clone();
            updated.push(Value::Object(next));
        }
        Ok(updated)
    }

    async fn upsert(
        &self,
        table: &str,
        row: Value,
        on_conflict: &[&str],
    ) -> Result<Value, StoreError> {
        let row = into_object(table, row)?;
        let mut tables = self.tables.write().await;
        let rows = tables.entry(table.to_string()).or_default();

        let existing = rows.iter().position(|r| {
            on_conflict.iter().all(|col| match (r.get(*col), row.get(*col)) {
                (Some(a), Some(b)) => !a.is_null() && value_text(a) == value_text(b),
                _ => false,
            })
        });

        match existing {
            Some(i) => {
                let mut next = rows[i].clone();
                merge(&mut next, row);
                self.check_unique(table, rows, &next, Some(i))?;
                rows[i] = next.clone();
                Ok(Value::Object(next))
            }
            None => {
                let mut row = row;
                apply_insert_defaults(&mut row);
                self.check_unique(table, rows, &row, None)?;
                rows.push(row.clone());
                Ok(Value::Object(row))
            }
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
