//! Row-store trait definitions.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::query::{FilterOp, ScalarValue, Table};

/// A row as returned by the store.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// A predicate understood by every backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Predicate {
    /// `column <op> value`; `ilike` values carry their own `%` wildcards.
    Compare {
        column: String,
        op: FilterOp,
        value: ScalarValue,
    },
    /// `column IN (values)`; an empty set matches nothing.
    In {
        column: String,
        values: Vec<ScalarValue>,
    },
    /// Matches no row.
    Unsatisfiable,
}

impl Predicate {
    pub fn compare(column: impl Into<String>, op: FilterOp, value: impl Into<ScalarValue>) -> Self {
        Self::Compare {
            column: column.into(),
            op,
            value: value.into(),
        }
    }

    pub fn eq(column: impl Into<String>, value: impl Into<ScalarValue>) -> Self {
        Self::compare(column, FilterOp::Eq, value)
    }

    pub fn is_in(column: impl Into<String>, values: Vec<ScalarValue>) -> Self {
        Self::In {
            column: column.into(),
            values,
        }
    }
}

/// What the store should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    /// Exact row count, no rows.
    Count,
    /// Rows, optionally capped.
    Rows { limit: Option<usize> },
}

/// Sort order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub column: String,
    pub ascending: bool,
}

impl OrderBy {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: true,
        }
    }
}

/// Query against a single table.
#[derive(Debug, Clone, PartialEq)]
pub struct RowQuery {
    pub table: Table,
    pub predicates: Vec<Predicate>,
    pub selection: Selection,
    /// Embed related rows in the result
    pub embed: bool,
    pub order: Option<OrderBy>,
}

impl RowQuery {
    pub fn count(table: Table) -> Self {
        Self {
            table,
            predicates: Vec::new(),
            selection: Selection::Count,
            embed: false,
            order: None,
        }
    }

    pub fn rows(table: Table, limit: Option<usize>) -> Self {
        Self {
            table,
            predicates: Vec::new(),
            selection: Selection::Rows { limit },
            embed: false,
            order: None,
        }
    }

    pub fn with_predicate(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn with_embeds(mut self) -> Self {
        self.embed = true;
        self
    }

    pub fn with_order(mut self, order: OrderBy) -> Self {
        self.order = Some(order);
        self
    }
}

/// Query result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryOutput {
    Count(u64),
    Rows(Vec<Row>),
}

impl QueryOutput {
    pub fn count(&self) -> u64 {
        match self {
            Self::Count(n) => *n,
            Self::Rows(rows) => rows.len() as u64,
        }
    }

    pub fn into_rows(self) -> Vec<Row> {
        match self {
            Self::Count(_) => Vec::new(),
            Self::Rows(rows) => rows,
        }
    }
}

/// Trait for row-store backends.
#[async_trait]
pub trait RowStore: Send + Sync {
    /// Run a filtered query.
    async fn query(&self, query: &RowQuery) -> crate::error::Result<QueryOutput>;

    /// Call a remote procedure for privileged operations.
    async fn rpc(
        &self,
        function: &str,
        args: serde_json::Value,
    ) -> crate::error::Result<serde_json::Value>;

    /// Read a value from the `system_settings` key/value table.
    async fn setting(&self, key: &str) -> crate::error::Result<Option<String>>;
}
