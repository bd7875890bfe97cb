//! Approval operations for the Coordinator.

use super::Coordinator;
use crate::{error::Result, models::ExecutionStepApproval};

impl Coordinator {
    /// Retrieves an approval record by its ID.
    pub async fn get_approval(&self, id: u64) -> Result<Option<ExecutionStepApproval>> {
        self.with_database(move |db| db.get_approval(id)).await
    }

    /// Adds an approval record for a member of the step's execution.
    pub async fn add_approval_to_step(
        &self,
        approval: &ExecutionStepApproval,
    ) -> Result<ExecutionStepApproval> {
        let approval = approval.clone();
        self.with_database(move |db| db.add_approval_to_step(&approval))
            .await
    }

    /// Persists an approval decision.
    pub async fn update_step_approval(
        &self,
        approval: &ExecutionStepApproval,
    ) -> Result<ExecutionStepApproval> {
        let approval = approval.clone();
        self.with_database(move |db| db.update_step_approval(&approval))
            .await
    }
}
