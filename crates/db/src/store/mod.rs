//! The queryable row store every repository talks to.
//!
//! The contract is deliberately small: per-column equality and range
//! filters, ordering, a row limit, insert returning the inserted row,
//! update returning the updated rows, and upsert keyed by one or more
//! columns. Rows travel as JSON objects.

pub mod memory;
pub mod rest;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

/// PostgreSQL SQLSTATE for `unique_violation`.
pub const UNIQUE_VIOLATION: &str = "23505";

/// Errors from the row store layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("Row store request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The store answered with a non-2xx status.
    #[error("{message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Database error code when the store reports one (e.g. `23505`).
        code: Option<String>,
        /// Message text, shown to users verbatim.
        message: String,
    },

    /// A row did not have the expected shape.
    #[error("Unexpected row payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// A write that should return a row returned none.
    #[error("The row store returned no row from {0}")]
    NoRowReturned(String),
}

impl StoreError {
    /// Whether the write collided with a unique key.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Self::Api { status, code, .. } => {
                code.as_deref() == Some(UNIQUE_VIOLATION) || *status == 409
            }
            _ => false,
        }
    }
}

/// Sort direction for [`Query::order`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Comparison applied by a [`Filter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
}

impl FilterOp {
    fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::In => "in",
        }
    }
}

/// One column predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub op: FilterOp,
    /// A scalar, or an array for [`FilterOp::In`].
    pub value: Value,
}

/// Column selection, predicates, ordering and limit for one table read or write.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    columns: Option<String>,
    filters: Vec<Filter>,
    order: Vec<(String, Direction)>,
    limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Comma-separated column list. Defaults to all columns.
    #[must_use]
    pub fn select(mut self, columns: &str) -> Self {
        self.columns = Some(columns.to_string());
        self
    }

    fn filter(mut self, column: &str, op: FilterOp, value: Value) -> Self {
        self.filters.push(Filter {
            column: column.to_string(),
            op,
            value,
        });
        self
    }

    #[must_use]
    pub fn eq(self, column: &str, value: impl Into<Value>) -> Self {
        self.filter(column, FilterOp::Eq, value.into())
    }

    #[must_use]
    pub fn gt(self, column: &str, value: impl Into<Value>) -> Self {
        self.filter(column, FilterOp::Gt, value.into())
    }

    #[must_use]
    pub fn gte(self, column: &str, value: impl Into<Value>) -> Self {
        self.filter(column, FilterOp::Gte, value.into())
    }

    #[must_use]
    pub fn lt(self, column: &str, value: impl Into<Value>) -> Self {
        self.filter(column, FilterOp::Lt, value.into())
    }

    #[must_use]
    pub fn lte(self, column: &str, value: impl Into<Value>) -> Self {
        self.filter(column, FilterOp::Lte, value.into())
    }

    #[must_use]
    pub fn in_list<I, V>(self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.filter(column, FilterOp::In, Value::Array(values))
    }

    #[must_use]
    pub fn order(mut self, column: &str, direction: Direction) -> Self {
        self.order.push((column.to_string(), direction));
        self
    }

    #[must_use]
    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn ordering(&self) -> &[(String, Direction)] {
        &self.order
    }

    pub fn row_limit(&self) -> Option<usize> {
        self.limit
    }

    /// Render as PostgREST query parameters.
    ///
    /// ```
    /// use tba_db::store::{Direction, Query};
    /// let q = Query::new()
    ///     .select("id,title")
    ///     .eq("is_active", true)
    ///     .gte("rating_avg", 7)
    ///     .order("id", Direction::Asc);
    /// assert_eq!(
    ///     q.to_pairs(),
    ///     vec![
    ///         ("select".to_string(), "id,title".to_string()),
    ///         ("is_active".to_string(), "eq.true".to_string()),
    ///         ("rating_avg".to_string(), "gte.7".to_string()),
    ///         ("order".to_string(), "id.asc".to_string()),
    ///     ]
    /// );
    /// ```
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(cols) = &self.columns {
            pairs.push(("select".to_string(), cols.clone()));
        }
        for f in &self.filters {
            let rendered = match (&f.op, &f.value) {
                (FilterOp::In, Value::Array(items)) => {
                    let inner: Vec<String> = items.iter().map(quote_list_item).collect();
                    format!("in.({})", inner.join(","))
                }
                (FilterOp::Eq, Value::Null) => "is.null".to_string(),
                (op, v) => format!("{}.{}", op.as_str(), value_text(v)),
            };
            pairs.push((f.column.clone(), rendered));
        }
        if !self.order.is_empty() {
            let order: Vec<String> = self
                .order
                .iter()
                .map(|(col, dir)| format!("{col}.{}", dir.as_str()))
                .collect();
            pairs.push(("order".to_string(), order.join(",")));
        }
        if let Some(n) = self.limit {
            pairs.push(("limit".to_string(), n.to_string()));
        }
        pairs
    }
}

/// Text form of a scalar as it appears in a filter.
pub(crate) fn value_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// `in.(...)` items need quoting when they contain reserved characters.
fn quote_list_item(v: &Value) -> String {
    let text = value_text(v);
    if text.contains([',', '(', ')', '"', ' ']) {
        format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        text
    }
}

/// A queryable table store.
#[async_trait]
pub trait RowStore: Send + Sync {
    /// Read rows matching `query`.
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, StoreError>;

    /// Insert one row and return it as stored.
    async fn insert(&self, table: &str, row: Value) -> Result<Value, StoreError>;

    /// Patch every row matching the query's filters; return the updated rows.
    async fn update(&self, table: &str, query: &Query, patch: Value)
        -> Result<Vec<Value>, StoreError>;

    /// Insert, or merge into the row that shares the `on_conflict` columns.
    async fn upsert(
        &self,
        table: &str,
        row: Value,
        on_conflict: &[&str],
    ) -> Result<Value, StoreError>;

    /// Cheap reachability probe.
    async fn ping(&self) -> Result<(), StoreError>;

    /// A view of this store that acts on behalf of the holder of
    /// `access_token`, when the backend distinguishes callers.
    fn for_user(&self, _access_token: &str) -> Option<Arc<dyn RowStore>> {
        None
    }
}
