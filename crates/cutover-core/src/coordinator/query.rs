//! Chained execution queries.

use jiff::Timestamp;

use super::Coordinator;
use crate::{
    error::Result,
    models::{Execution, ExecutionFilter},
};

/// A pending query over executions, built with chained calls and run with
/// [`ExecutionQuery::fetch`].
///
/// Results are ordered newest first.
#[derive(Debug, Clone)]
#[must_use = "a query does nothing until fetched"]
pub struct ExecutionQuery<'a> {
    coordinator: &'a Coordinator,
    filter: ExecutionFilter,
}

impl<'a> ExecutionQuery<'a> {
    pub(crate) fn new(coordinator: &'a Coordinator) -> Self {
        Self {
            coordinator,
            filter: ExecutionFilter::default(),
        }
    }

    /// Only executions of the given plan.
    pub fn for_plan(mut self, plan_id: u64) -> Self {
        self.filter.plan_id = Some(plan_id);
        self
    }

    /// Only executions whose name contains `text` (case-insensitive).
    pub fn name_contains(mut self, text: impl Into<String>) -> Self {
        self.filter.name_contains = Some(text.into());
        self
    }

    /// Only executions created at or after `timestamp`.
    pub fn created_after(mut self, timestamp: Timestamp) -> Self {
        self.filter.created_after = Some(timestamp);
        self
    }

    /// Only executions created at or before `timestamp`.
    pub fn created_before(mut self, timestamp: Timestamp) -> Self {
        self.filter.created_before = Some(timestamp);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.filter.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.filter.offset = Some(offset);
        self
    }

    /// The filter this query will run with.
    pub fn filter(&self) -> &ExecutionFilter {
        &self.filter
    }

    /// Runs the query.
    pub async fn fetch(self) -> Result<Vec<Execution>> {
        self.coordinator.list_executions(self.filter).await
    }
}
