//! Step type enumeration shared by plan and execution steps.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Type-safe enumeration of step semantics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum StepType {
    /// Plain task, complete once a completion time is recorded
    #[default]
    Activity,

    /// Plain task, same completion rule as `Activity`
    Execution,

    /// Approval checkpoint, complete once every assigned member approves
    GoNoGo,

    /// Recovery-only template
    Fallback,
}

impl FromStr for StepType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "activity" => Ok(StepType::Activity),
            "execution" => Ok(StepType::Execution),
            "gonogo" | "go_no_go" | "go-no-go" => Ok(StepType::GoNoGo),
            "fallback" => Ok(StepType::Fallback),
            _ => Err(format!("Invalid step type: {s}")),
        }
    }
}

impl StepType {
    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            StepType::Activity => "activity",
            StepType::Execution => "execution",
            StepType::GoNoGo => "gonogo",
            StepType::Fallback => "fallback",
        }
    }

    /// Whether steps of this type complete through a recorded completion time.
    pub fn is_plain_task(&self) -> bool {
        matches!(self, StepType::Activity | StepType::Execution)
    }

    /// Whether steps of this type carry per-member approval records.
    pub fn requires_approval(&self) -> bool {
        matches!(self, StepType::GoNoGo)
    }
}
