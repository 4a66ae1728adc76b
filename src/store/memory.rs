//! In-memory row-store for tests, demos and offline use.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;

use super::traits::{Predicate, QueryOutput, Row, RowQuery, RowStore, Selection};
use crate::error::{Result, StoreError};
use crate::query::{FilterOp, ScalarValue, Table};

const SETTINGS_TABLE: &str = "system_settings";

/// Row-store backed by in-process tables.
pub struct MemoryRowStore {
    tables: RwLock<HashMap<Table, Vec<Row>>>,
    settings: RwLock<HashMap<String, String>>,
    procedures: RwLock<HashMap<String, Value>>,
    queries: AtomicUsize,
}

impl MemoryRowStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
            settings: RwLock::new(HashMap::new()),
            procedures: RwLock::new(HashMap::new()),
            queries: AtomicUsize::new(0),
        }
    }

    /// Build a store from a JSON object mapping table names to row arrays.
    ///
    /// A `system_settings` array of `{key, value}` rows seeds the settings
    /// table. Unknown table names are rejected.
    pub fn from_json(seed: &Value) -> Result<Self> {
        let object = seed
            .as_object()
            .ok_or_else(|| StoreError::Seed("expected a JSON object of tables".to_string()))?;

        let store = Self::new();
        for (name, rows) in object {
            let rows = rows
                .as_array()
                .ok_or_else(|| StoreError::Seed(format!("table `{}` is not an array", name)))?;

            if name == SETTINGS_TABLE {
                for row in rows {
                    if let (Some(key), Some(value)) = (
                        row.get("key").and_then(Value::as_str),
                        row.get("value").and_then(Value::as_str),
                    ) {
                        store.set_setting(key, value);
                    }
                }
                continue;
            }

            let table = Table::from_str(name)
                .ok_or_else(|| StoreError::Seed(format!("unknown table `{}`", name)))?;
            let rows = rows
                .iter()
                .map(|row| {
                    row.as_object()
                        .cloned()
                        .ok_or_else(|| StoreError::Seed(format!("row in `{}` is not an object", name)))
                })
                .collect::<std::result::Result<Vec<_>, _>>()?;
            store.insert_rows(table, rows);
        }
        Ok(store)
    }

    /// Load seed data from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let seed: Value = serde_json::from_str(&content)?;
        Self::from_json(&seed)
    }

    /// Append rows to a table.
    pub fn insert_rows(&self, table: Table, rows: Vec<Row>) {
        self.tables.write().entry(table).or_default().extend(rows);
    }

    /// Store a `system_settings` value.
    pub fn set_setting(&self, key: impl Into<String>, value: impl Into<String>) {
        self.settings.write().insert(key.into(), value.into());
    }

    /// Register a canned result for a remote procedure.
    pub fn set_procedure(&self, function: impl Into<String>, result: Value) {
        self.procedures.write().insert(function.into(), result);
    }

    /// Number of `query` calls served so far.
    pub fn query_count(&self) -> usize {
        self.queries.load(AtomicOrdering::SeqCst)
    }

    fn lookup(tables: &HashMap<Table, Vec<Row>>, table: Table, id: &Value) -> Option<Row> {
        tables
            .get(&table)?
            .iter()
            .find(|row| row.get("id").is_some_and(|v| json_cmp(v, id) == Some(Ordering::Equal)))
            .cloned()
    }

    /// Attach each embedded relation under the related table's name.
    fn embed(tables: &HashMap<Table, Vec<Row>>, table: Table, mut row: Row) -> Row {
        for embed in table.embeds() {
            let related = row
                .get(embed.foreign_key)
                .and_then(|id| Self::lookup(tables, embed.table, id))
                .map(|related| {
                    let mut projected = Row::new();
                    for column in embed.table.display_columns() {
                        if let Some(value) = related.get(*column) {
                            projected.insert(column.to_string(), value.clone());
                        }
                    }
                    // Nested relations come from the full related row
                    let nested = Self::embed(tables, embed.table, related);
                    for inner in embed.table.embeds() {
                        let key = inner.table.as_str();
                        if let Some(value) = nested.get(key) {
                            projected.insert(key.to_string(), value.clone());
                        }
                    }
                    Value::Object(projected)
                })
                .unwrap_or(Value::Null);
            row.insert(embed.table.as_str().to_string(), related);
        }
        row
    }
}

impl Default for MemoryRowStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RowStore for MemoryRowStore {
    async fn query(&self, query: &RowQuery) -> Result<QueryOutput> {
        self.queries.fetch_add(1, AtomicOrdering::SeqCst);

        let tables = self.tables.read();
        let mut rows: Vec<Row> = tables
            .get(&query.table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| query.predicates.iter().all(|p| matches_predicate(row, p)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        match query.selection {
            Selection::Count => Ok(QueryOutput::Count(rows.len() as u64)),
            Selection::Rows { limit } => {
                if let Some(order) = &query.order {
                    rows.sort_by(|a, b| {
                        let ord = match (a.get(&order.column), b.get(&order.column)) {
                            (Some(x), Some(y)) => json_cmp(x, y).unwrap_or(Ordering::Equal),
                            (Some(_), None) => Ordering::Less,
                            (None, Some(_)) => Ordering::Greater,
                            (None, None) => Ordering::Equal,
                        };
                        if order.ascending {
                            ord
                        } else {
                            ord.reverse()
                        }
                    });
                }
                if let Some(limit) = limit {
                    rows.truncate(limit);
                }
                if query.embed {
                    rows = rows
                        .into_iter()
                        .map(|row| Self::embed(&tables, query.table, row))
                        .collect();
                }
                Ok(QueryOutput::Rows(rows))
            }
        }
    }

    async fn rpc(&self, function: &str, _args: Value) -> Result<Value> {
        self.procedures
            .read()
            .get(function)
            .cloned()
            .ok_or_else(|| StoreError::Rpc(function.to_string(), "function not found".to_string()).into())
    }

    async fn setting(&self, key: &str) -> Result<Option<String>> {
        Ok(self.settings.read().get(key).cloned())
    }
}

// ============================================================================
// Predicate evaluation
// ============================================================================

fn matches_predicate(row: &Row, predicate: &Predicate) -> bool {
    match predicate {
        Predicate::Unsatisfiable => false,
        Predicate::In { column, values } => row.get(column).is_some_and(|field| {
            values
                .iter()
                .any(|v| scalar_cmp(field, v) == Some(Ordering::Equal))
        }),
        Predicate::Compare { column, op, value } => {
            let Some(field) = row.get(column).filter(|v| !v.is_null()) else {
                return false;
            };
            match op {
                FilterOp::Ilike => {
                    let pattern = value.to_string().to_lowercase();
                    field_text(field).is_some_and(|text| like_match(&pattern, &text.to_lowercase()))
                }
                _ => scalar_cmp(field, value).is_some_and(|ord| match op {
                    FilterOp::Eq => ord == Ordering::Equal,
                    FilterOp::Gt => ord == Ordering::Greater,
                    FilterOp::Lt => ord == Ordering::Less,
                    FilterOp::Gte => ord != Ordering::Less,
                    FilterOp::Lte => ord != Ordering::Greater,
                    FilterOp::Ilike => false,
                }),
            }
        }
    }
}

fn field_text(field: &Value) -> Option<String> {
    match field {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Compare a stored field against a filter operand, coercing numeric text.
fn scalar_cmp(field: &Value, value: &ScalarValue) -> Option<Ordering> {
    match (field, value) {
        (Value::Number(n), ScalarValue::Integer(i)) => n.as_f64()?.partial_cmp(&(*i as f64)),
        (Value::Number(n), ScalarValue::Float(x)) => n.as_f64()?.partial_cmp(x),
        (Value::Number(n), ScalarValue::Text(s)) => n.as_f64()?.partial_cmp(&s.trim().parse::<f64>().ok()?),
        (Value::String(s), ScalarValue::Integer(i)) => s.trim().parse::<f64>().ok()?.partial_cmp(&(*i as f64)),
        (Value::String(s), ScalarValue::Float(x)) => s.trim().parse::<f64>().ok()?.partial_cmp(x),
        (Value::String(s), ScalarValue::Text(t)) => Some(s.as_str().cmp(t.as_str())),
        (Value::Bool(b), ScalarValue::Bool(c)) => Some(b.cmp(c)),
        (Value::Bool(b), ScalarValue::Text(t)) => Some(b.cmp(&t.parse::<bool>().ok()?)),
        _ => None,
    }
}

fn json_cmp(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (_, _) => scalar_cmp(a, &ScalarValue::from_json(b)?),
    }
}

/// SQL `LIKE` matching with `%` (any run) and `_` (any single character).
fn like_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    let (mut p, mut t) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        if p < pattern.len() && pattern[p] == '%' {
            backtrack = Some((p, t));
            p += 1;
        } else if p < pattern.len() && (pattern[p] == '_' || pattern[p] == text[t]) {
            p += 1;
            t += 1;
        } else if let Some((bp, bt)) = backtrack {
            p = bp + 1;
            t = bt + 1;
            backtrack = Some((bp, bt + 1));
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|&c| c == '%')
}
