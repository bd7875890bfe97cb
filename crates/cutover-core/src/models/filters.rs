//! Filter types for querying executions.

use jiff::Timestamp;

/// Filter and paging options for listing executions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionFilter {
    /// Only executions created from this plan
    pub plan_id: Option<u64>,

    /// Filter by execution name (case-insensitive partial match)
    pub name_contains: Option<String>,

    /// Filter by creation date range
    pub created_after: Option<Timestamp>,
    pub created_before: Option<Timestamp>,

    /// Maximum number of executions to return
    pub limit: Option<u32>,

    /// Number of matching executions to skip
    pub offset: Option<u32>,
}

impl ExecutionFilter {
    /// Filter for every execution of one plan.
    ///
    /// ```rust
    /// use cutover_core::models::ExecutionFilter;
    ///
    /// let filter = ExecutionFilter::for_plan(7);
    /// assert_eq!(filter.plan_id, Some(7));
    /// assert!(filter.limit.is_none());
    /// ```
    pub fn for_plan(plan_id: u64) -> Self {
        Self {
            plan_id: Some(plan_id),
            ..Default::default()
        }
    }
}
