//! Result wrapper types for displaying operation outcomes.

use std::fmt;

use crate::models::{Execution, ExecutionStep, ExecutionStepApproval, Plan, StepProgress};

/// Wrapper for displaying a freshly created resource.
///
/// ```rust
/// use cutover_core::{display::CreateResult, models::Plan};
///
/// let mut plan = Plan::new("Release");
/// plan.id = 1;
///
/// let output = format!("{}", CreateResult::new(plan));
/// assert!(output.starts_with("Created plan with ID: 1"));
/// ```
pub struct CreateResult<T> {
    pub resource: T,
}

impl<T> CreateResult<T> {
    pub fn new(resource: T) -> Self {
        Self { resource }
    }
}

impl fmt::Display for CreateResult<Plan> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Created plan with ID: {}", self.resource.id)?;
        writeln!(f)?;
        write!(f, "{}", self.resource)
    }
}

impl fmt::Display for CreateResult<Execution> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Created execution with ID: {}", self.resource.id)?;
        writeln!(f)?;
        write!(f, "{}", self.resource)
    }
}

impl fmt::Display for CreateResult<ExecutionStep> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Created step with ID: {}", self.resource.id)?;
        writeln!(f)?;
        write!(f, "{}", self.resource)
    }
}

impl fmt::Display for CreateResult<ExecutionStepApproval> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Created approval with ID: {} for member {} on step {}",
            self.resource.id, self.resource.execution_member_id, self.resource.execution_step_id
        )
    }
}

/// Wrapper for displaying an updated resource.
pub struct UpdateResult<T> {
    pub resource: T,
}

impl<T> UpdateResult<T> {
    pub fn new(resource: T) -> Self {
        Self { resource }
    }
}

impl fmt::Display for UpdateResult<Plan> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Updated plan with ID: {}", self.resource.id)?;
        writeln!(f)?;
        write!(f, "{}", self.resource)
    }
}

impl fmt::Display for UpdateResult<ExecutionStep> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Updated step with ID: {}", self.resource.id)?;
        writeln!(f)?;
        write!(f, "{}", self.resource)
    }
}

impl fmt::Display for UpdateResult<ExecutionStepApproval> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.resource.is_approved {
            "approved"
        } else {
            "pending"
        };
        writeln!(
            f,
            "Approval {} on step {} is now {state}",
            self.resource.id, self.resource.execution_step_id
        )
    }
}

/// Where a step stands and whether it may start.
#[derive(Debug)]
pub struct StepReport {
    pub step: ExecutionStep,
    pub progress: StepProgress,
    pub can_start: bool,
}

impl fmt::Display for StepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "## {} (ID: {})", self.step.name, self.step.id)?;
        writeln!(f)?;
        writeln!(f, "- Status: {}", self.progress)?;
        writeln!(
            f,
            "- Can start: {}",
            if self.can_start { "yes" } else { "no" }
        )
    }
}
