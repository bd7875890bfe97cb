//! Execution, step and message operations for the Coordinator.

use super::{Coordinator, ExecutionQuery};
use crate::{
    error::Result,
    models::{Execution, ExecutionFilter, ExecutionStep, ExecutionStepMessage},
    workflow,
};

impl Coordinator {
    /// Snapshots a plan into a new execution.
    ///
    /// Returns `None` when the plan does not exist.
    pub async fn create_execution_from_plan(&self, plan_id: u64) -> Result<Option<Execution>> {
        self.with_database(move |db| db.create_execution_from_plan(plan_id))
            .await
    }

    /// Retrieves a fully loaded execution by its ID.
    pub async fn get_execution(&self, id: u64) -> Result<Option<Execution>> {
        self.with_database(move |db| db.get_execution(id)).await
    }

    /// Starts a query over executions.
    ///
    /// ```rust,no_run
    /// # use cutover_core::CoordinatorBuilder;
    /// # async {
    /// let coordinator = CoordinatorBuilder::new().build().await?;
    /// let recent = coordinator.executions().for_plan(1).limit(5).fetch().await?;
    /// # Result::<(), cutover_core::CutoverError>::Ok(())
    /// # };
    /// ```
    pub fn executions(&self) -> ExecutionQuery<'_> {
        ExecutionQuery::new(self)
    }

    /// Lists executions matching a filter, newest first.
    pub async fn list_executions(&self, filter: ExecutionFilter) -> Result<Vec<Execution>> {
        self.with_database(move |db| db.list_executions(&filter))
            .await
    }

    /// Deletes an execution with everything it owns. Returns whether one was
    /// deleted.
    pub async fn delete_execution(&self, id: u64) -> Result<bool> {
        self.with_database(move |db| db.delete_execution(id)).await
    }

    /// Retrieves a step with its members, approvals and messages.
    pub async fn get_execution_step(&self, id: u64) -> Result<Option<ExecutionStep>> {
        self.with_database(move |db| db.get_execution_step(id))
            .await
    }

    /// Records progress on a step and returns the reloaded step.
    pub async fn update_execution_step(&self, step: &ExecutionStep) -> Result<ExecutionStep> {
        let step = step.clone();
        self.with_database(move |db| db.update_execution_step(&step))
            .await
    }

    /// Attaches a message to a step.
    pub async fn add_message_to_step(
        &self,
        message: &ExecutionStepMessage,
    ) -> Result<ExecutionStepMessage> {
        let message = message.clone();
        self.with_database(move |db| db.add_message_to_step(&message))
            .await
    }

    /// Whether a loaded step counts as complete.
    pub fn is_step_complete(&self, step: &ExecutionStep) -> bool {
        workflow::is_step_complete(step)
    }

    /// Whether every step ordered before `step` in `execution` is complete.
    pub fn can_start_step(&self, step: &ExecutionStep, execution: &Execution) -> bool {
        workflow::can_start_step(step, execution)
    }
}
