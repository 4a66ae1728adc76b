//! Scoped executor.
//!
//! The only path from a [`QueryDescriptor`] (or a UI filter set) to the
//! row-store. Every query passes through [`ScopedExecutor::dispatch`], which
//! adds the caller's row scope before anything is sent.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use crate::acl::{apply_scope, Caller};
use crate::config::AssistantConfig;
use crate::error::Result;
use crate::store::{OrderBy, Predicate, QueryOutput, Row, RowQuery, RowStore};

use super::types::{Filter, FilterOp, IntentType, QueryDescriptor, ScalarValue, Table};

// ============================================================================
// Outcome
// ============================================================================

/// Result of executing a descriptor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExecutionOutcome {
    /// Row count for a count intent.
    Count(u64),
    /// Rows, with related booth/ward/panchayat rows embedded.
    Rows(Vec<Row>),
    /// General intent; the store was not touched.
    Skipped,
}

impl ExecutionOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped)
    }
}

// ============================================================================
// Executor
// ============================================================================

/// Executes descriptors against the row-store under a caller's scope.
pub struct ScopedExecutor {
    store: Arc<dyn RowStore>,
    default_limit: usize,
    max_limit: usize,
}

impl ScopedExecutor {
    pub fn new(store: Arc<dyn RowStore>, config: &AssistantConfig) -> Self {
        Self::with_limits(store, config.default_limit, config.max_limit)
    }

    pub fn with_limits(store: Arc<dyn RowStore>, default_limit: usize, max_limit: usize) -> Self {
        Self {
            store,
            default_limit,
            max_limit: max_limit.max(1),
        }
    }

    /// Execute a validated descriptor.
    ///
    /// General intents return [`ExecutionOutcome::Skipped`] without a store
    /// call. Count intents ignore `limit`; list intents without one get the
    /// default limit and every limit is capped at the maximum.
    pub async fn execute(
        &self,
        caller: &Caller,
        descriptor: &QueryDescriptor,
    ) -> Result<ExecutionOutcome> {
        let Some(table) = descriptor.data_table() else {
            tracing::debug!("General intent, skipping row-store");
            return Ok(ExecutionOutcome::Skipped);
        };

        let predicates = descriptor.filters.iter().map(to_predicate);

        match descriptor.intent {
            IntentType::Count => {
                let mut query = RowQuery::count(table);
                query.predicates.extend(predicates);
                Ok(ExecutionOutcome::Count(self.dispatch(caller, query).await?.count()))
            }
            IntentType::List => {
                let limit = self.effective_limit(descriptor.limit);
                let mut query = RowQuery::rows(table, Some(limit)).with_embeds();
                query.predicates.extend(predicates);
                Ok(ExecutionOutcome::Rows(
                    self.dispatch(caller, query).await?.into_rows(),
                ))
            }
            IntentType::General => Ok(ExecutionOutcome::Skipped),
        }
    }

    /// Total voters visible to the caller.
    pub async fn total_voters(&self, caller: &Caller) -> Result<u64> {
        let output = self.dispatch(caller, RowQuery::count(Table::Voters)).await?;
        Ok(output.count())
    }

    /// Fetch rows for a screen-driven filter set. `limit` of `None` returns
    /// every visible row.
    pub async fn list_rows(
        &self,
        caller: &Caller,
        table: Table,
        filters: &[Filter],
        order: Option<OrderBy>,
        limit: Option<usize>,
    ) -> Result<Vec<Row>> {
        let mut query = RowQuery::rows(table, limit);
        query.predicates.extend(filters.iter().map(to_predicate));
        query.order = order;
        Ok(self.dispatch(caller, query).await?.into_rows())
    }

    fn effective_limit(&self, requested: Option<usize>) -> usize {
        requested
            .filter(|&n| n > 0)
            .unwrap_or(self.default_limit)
            .min(self.max_limit)
    }

    async fn dispatch(&self, caller: &Caller, mut query: RowQuery) -> Result<QueryOutput> {
        apply_scope(caller, query.table, &mut query.predicates);

        let start = Instant::now();
        let output = self.store.query(&query).await;
        tracing::debug!(
            table = %query.table,
            role = %caller.role(),
            predicates = query.predicates.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            ok = output.is_ok(),
            "Row-store query"
        );
        output
    }
}

/// Lower a filter to a store predicate; `ilike` becomes a substring match.
fn to_predicate(filter: &Filter) -> Predicate {
    let value = match filter.operator {
        FilterOp::Ilike => ScalarValue::Text(format!("%{}%", filter.value)),
        _ => filter.value.clone(),
    };
    Predicate::compare(filter.column.clone(), filter.operator, value)
}
