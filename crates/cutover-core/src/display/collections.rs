//! Collection wrapper types for displaying groups of domain objects.

use std::fmt;

use super::datetime::LocalDateTime;
use crate::{
    models::{Execution, ExecutionStep, Plan},
    workflow,
};

/// Newtype wrapper listing plans as one compact section each.
///
/// ```rust
/// use cutover_core::{display::Plans, models::Plan};
///
/// let mut plan = Plan::new("Release");
/// plan.id = 1;
///
/// let output = format!("{}", Plans(vec![plan]));
/// assert!(output.contains("## Release (ID: 1)"));
/// assert_eq!(format!("{}", Plans(vec![])), "No plans found.\n");
/// ```
#[derive(Debug)]
pub struct Plans(pub Vec<Plan>);

impl Plans {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Plan> {
        self.0.iter()
    }
}

impl fmt::Display for Plans {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No plans found.");
        }
        for plan in &self.0 {
            writeln!(f, "## {} (ID: {})", plan.name, plan.id)?;
            writeln!(f)?;
            writeln!(f, "- Steps: {}", plan.steps.len())?;
            writeln!(f, "- Members: {}", plan.members.len())?;
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Newtype wrapper listing executions with their progress.
#[derive(Debug)]
pub struct Executions(pub Vec<Execution>);

impl Executions {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Execution> {
        self.0.iter()
    }
}

impl IntoIterator for Executions {
    type Item = Execution;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for Executions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No executions found.");
        }
        for execution in &self.0 {
            let complete = execution
                .steps
                .iter()
                .filter(|s| workflow::is_step_complete(s))
                .count();
            writeln!(
                f,
                "## {} (ID: {}) ({complete}/{})",
                execution.name,
                execution.id,
                execution.steps.len()
            )?;
            writeln!(f)?;
            writeln!(f, "- Created: {}", LocalDateTime(&execution.created_on))?;
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Newtype wrapper for displaying a list of execution steps.
#[derive(Debug)]
pub struct Steps(pub Vec<ExecutionStep>);

impl Steps {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl IntoIterator for Steps {
    type Item = ExecutionStep;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for Steps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No steps found.");
        }
        for step in &self.0 {
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;

    use super::*;
    use crate::models::StepType;

    #[test]
    fn test_executions_display_progress() {
        let execution = Execution {
            id: 3,
            name: "Execution of Release".to_string(),
            created_on: Timestamp::UNIX_EPOCH,
            plan_id: Some(1),
            members: vec![],
            steps: vec![
                ExecutionStep {
                    id: 1,
                    step_type: StepType::Activity,
                    complete_on: Some(Timestamp::UNIX_EPOCH),
                    ..Default::default()
                },
                ExecutionStep {
                    id: 2,
                    order: 1,
                    step_type: StepType::Activity,
                    ..Default::default()
                },
            ],
        };

        let output = format!("{}", Executions(vec![execution]));
        assert!(output.contains("## Execution of Release (ID: 3) (1/2)"));
    }

    #[test]
    fn test_empty_collections() {
        assert_eq!(format!("{}", Executions(vec![])), "No executions found.\n");
        assert_eq!(format!("{}", Steps(vec![])), "No steps found.\n");
    }
}
