//! Types for the natural language query system.

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Tables
// ============================================================================

/// Tables the assistant is allowed to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Table {
    Voters,
    Booths,
    Wards,
    Candidates,
    Panchayats,
}

/// A to-one relation embedded alongside list results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Embed {
    /// Related table
    pub table: Table,
    /// Column on the parent row that holds the related row's id
    pub foreign_key: &'static str,
}

impl Table {
    pub const ALL: [Table; 5] = [
        Table::Voters,
        Table::Booths,
        Table::Wards,
        Table::Candidates,
        Table::Panchayats,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Voters => "voters",
            Self::Booths => "booths",
            Self::Wards => "wards",
            Self::Candidates => "candidates",
            Self::Panchayats => "panchayats",
        }
    }

    /// Parse a table name.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "voters" => Some(Self::Voters),
            "booths" => Some(Self::Booths),
            "wards" => Some(Self::Wards),
            "candidates" => Some(Self::Candidates),
            "panchayats" => Some(Self::Panchayats),
            _ => None,
        }
    }

    /// Columns that may appear in a filter.
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Self::Voters => &[
                "id",
                "sl_no",
                "id_card_no",
                "name",
                "gender",
                "age",
                "house_name",
                "house_no",
                "guardian_name",
                "booth_id",
                "status",
            ],
            Self::Booths => &["id", "name", "booth_no", "ward_id"],
            Self::Wards => &["id", "name", "ward_no", "panchayat_id"],
            Self::Candidates => &["id", "name", "party", "ward_id"],
            Self::Panchayats => &["id", "name"],
        }
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns().contains(&column)
    }

    /// Columns copied when this table is embedded under another row.
    pub fn display_columns(&self) -> &'static [&'static str] {
        match self {
            Self::Voters => &["name", "sl_no"],
            Self::Booths => &["name", "booth_no"],
            Self::Wards => &["name", "ward_no"],
            Self::Candidates => &["name", "party"],
            Self::Panchayats => &["name"],
        }
    }

    /// Relations embedded with list results, for answer context.
    pub fn embeds(&self) -> &'static [Embed] {
        match self {
            Self::Voters => &[Embed {
                table: Table::Booths,
                foreign_key: "booth_id",
            }],
            Self::Booths | Self::Candidates => &[Embed {
                table: Table::Wards,
                foreign_key: "ward_id",
            }],
            Self::Wards => &[Embed {
                table: Table::Panchayats,
                foreign_key: "panchayat_id",
            }],
            Self::Panchayats => &[],
        }
    }

    /// Select clause in PostgREST syntax, with nested embeds.
    ///
    /// `voters` renders as `*,booths(name,booth_no,wards(name,ward_no,panchayats(name)))`.
    pub fn select_clause(&self) -> String {
        let mut clause = String::from("*");
        for embed in self.embeds() {
            clause.push(',');
            clause.push_str(&embed.table.embed_clause());
        }
        clause
    }

    fn embed_clause(&self) -> String {
        let mut parts: Vec<String> = self
            .display_columns()
            .iter()
            .map(|c| c.to_string())
            .collect();
        for embed in self.embeds() {
            parts.push(embed.table.embed_clause());
        }
        format!("{}({})", self.as_str(), parts.join(","))
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Intent Type
// ============================================================================

/// What the caller wants back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntentType {
    /// Row count
    Count,
    /// Row listing
    List,
    /// Conversational; no data access
    #[default]
    General,
}

impl IntentType {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "count" => Some(Self::Count),
            "list" => Some(Self::List),
            "general" => Some(Self::General),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::List => "list",
            Self::General => "general",
        }
    }
}

impl fmt::Display for IntentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Filters
// ============================================================================

/// Comparison operators accepted from the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOp {
    Eq,
    Gt,
    Lt,
    Gte,
    Lte,
    /// Case-insensitive substring match
    Ilike,
}

impl FilterOp {
    pub const ALL: [FilterOp; 6] = [
        FilterOp::Eq,
        FilterOp::Gt,
        FilterOp::Lt,
        FilterOp::Gte,
        FilterOp::Lte,
        FilterOp::Ilike,
    ];

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "eq" => Some(Self::Eq),
            "gt" => Some(Self::Gt),
            "lt" => Some(Self::Lt),
            "gte" => Some(Self::Gte),
            "lte" => Some(Self::Lte),
            "ilike" => Some(Self::Ilike),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Gt => "gt",
            Self::Lt => "lt",
            Self::Gte => "gte",
            Self::Lte => "lte",
            Self::Ilike => "ilike",
        }
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scalar filter operand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl ScalarValue {
    /// Convert a JSON value, rejecting null, arrays and objects.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Bool(b) => Some(Self::Bool(*b)),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Self::Integer)
                .or_else(|| n.as_f64().map(Self::Float)),
            serde_json::Value::String(s) => Some(Self::Text(s.clone())),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for ScalarValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for ScalarValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<bool> for ScalarValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// A single (column, operator, value) predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub column: String,
    pub operator: FilterOp,
    pub value: ScalarValue,
}

impl Filter {
    pub fn new(column: impl Into<String>, operator: FilterOp, value: impl Into<ScalarValue>) -> Self {
        Self {
            column: column.into(),
            operator,
            value: value.into(),
        }
    }

    pub fn eq(column: impl Into<String>, value: impl Into<ScalarValue>) -> Self {
        Self::new(column, FilterOp::Eq, value)
    }

    pub fn ilike(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(column, FilterOp::Ilike, ScalarValue::Text(value.into()))
    }
}

// ============================================================================
// Query Intent Descriptor
// ============================================================================

/// Structured form of a user question, validated before execution.
///
/// Built either by [`IntentParser`](super::IntentParser) from model output or
/// directly from UI filters; both go through the same scoped executor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryDescriptor {
    #[serde(rename = "type")]
    pub intent: IntentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<Table>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<Filter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl QueryDescriptor {
    /// Conversational descriptor; never touches the row-store.
    pub fn general() -> Self {
        Self::default()
    }

    pub fn count(table: Table) -> Self {
        Self {
            intent: IntentType::Count,
            table: Some(table),
            ..Default::default()
        }
    }

    pub fn list(table: Table) -> Self {
        Self {
            intent: IntentType::List,
            table: Some(table),
            ..Default::default()
        }
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn is_general(&self) -> bool {
        self.intent == IntentType::General
    }

    /// Table to query, if this descriptor needs data at all.
    pub fn data_table(&self) -> Option<Table> {
        match self.intent {
            IntentType::General => None,
            IntentType::Count | IntentType::List => self.table,
        }
    }
}
