//! Derived step progress.
//!
//! Progress is computed from a step's current state on every read and is
//! never stored alongside the step.

use serde::{Deserialize, Serialize};

use super::{ExecutionStep, StepType};
use crate::workflow;

/// Where an execution step stands, derived from its fields and approvals.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum StepProgress {
    /// Abandoned, counts as complete
    Cancelled,

    /// Finished or unanimously approved
    Complete,

    /// Go/no-go step still collecting approvals
    AwaitingApproval { approved: usize, required: usize },

    /// Not finished yet
    Pending,
}

impl StepProgress {
    /// Derive the progress of a fully loaded step.
    pub fn of(step: &ExecutionStep) -> Self {
        if step.is_cancelled {
            return StepProgress::Cancelled;
        }
        if workflow::is_step_complete(step) {
            return StepProgress::Complete;
        }
        if step.step_type == StepType::GoNoGo {
            return StepProgress::AwaitingApproval {
                approved: step.approved_count(),
                required: step.assigned_members.len(),
            };
        }
        StepProgress::Pending
    }

    /// Get progress with consistent icon formatting for display.
    ///
    /// ```rust
    /// use cutover_core::models::StepProgress;
    ///
    /// assert_eq!(StepProgress::Complete.with_icon(), "✓ Complete");
    /// assert_eq!(StepProgress::Pending.with_icon(), "○ Pending");
    /// assert_eq!(
    ///     StepProgress::AwaitingApproval { approved: 1, required: 3 }.with_icon(),
    ///     "◐ Awaiting approval (1/3)"
    /// );
    /// ```
    pub fn with_icon(&self) -> String {
        match self {
            StepProgress::Cancelled => "✗ Cancelled".to_string(),
            StepProgress::Complete => "✓ Complete".to_string(),
            StepProgress::AwaitingApproval { approved, required } => {
                format!("◐ Awaiting approval ({approved}/{required})")
            }
            StepProgress::Pending => "○ Pending".to_string(),
        }
    }
}
