//! Execution instance models: a running copy of a plan.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::StepType;

/// One run of a plan, snapshotted from the plan at creation time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Execution {
    pub id: u64,

    pub name: String,

    /// When the snapshot was taken (UTC)
    pub created_on: Timestamp,

    /// Originating plan; `None` once that plan has been deleted
    pub plan_id: Option<u64>,

    /// Value copies of the plan's members
    #[serde(default)]
    pub members: Vec<ExecutionMember>,

    /// Steps sorted ascending by order, ties in creation sequence
    #[serde(default)]
    pub steps: Vec<ExecutionStep>,
}

impl Execution {
    /// Default name of an execution of the named plan.
    pub fn default_name(plan_name: &str) -> String {
        format!("Execution of {plan_name}")
    }

    /// Finds a step by identity.
    pub fn step(&self, id: u64) -> Option<&ExecutionStep> {
        self.steps.iter().find(|s| s.id == id)
    }

    /// Finds a member by identity.
    pub fn member(&self, id: u64) -> Option<&ExecutionMember> {
        self.members.iter().find(|m| m.id == id)
    }

    /// Highest step order, if any steps exist.
    pub fn max_order(&self) -> Option<i32> {
        self.steps.iter().map(|s| s.order).max()
    }
}

/// A person taking part in an execution.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExecutionMember {
    pub id: u64,
    pub name: String,
    pub email_address: String,
}

/// A step of an execution.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExecutionStep {
    pub id: u64,

    pub execution_id: u64,

    /// Plan step this was copied from; `None` for fallback-created steps
    #[serde(default)]
    pub plan_step_id: Option<u64>,

    pub name: String,

    #[serde(default)]
    pub summary: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<Vec<u8>>,

    pub order: i32,

    pub step_type: StepType,

    #[serde(default)]
    pub assigned_members: Vec<ExecutionMember>,

    #[serde(default)]
    pub started_on: Option<Timestamp>,

    /// Completion time; `None` until the step is finished
    #[serde(default)]
    pub complete_on: Option<Timestamp>,

    #[serde(default)]
    pub is_cancelled: bool,

    /// Step this one substitutes for, set only on fallback-created steps
    #[serde(default)]
    pub fallback_origin_step_id: Option<u64>,

    #[serde(default)]
    pub fallback_reason: String,

    #[serde(default)]
    pub result_summary: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_screenshot: Option<Vec<u8>>,

    #[serde(default)]
    pub what_went_well: String,

    #[serde(default)]
    pub what_could_be_better: String,

    #[serde(default)]
    pub approvals: Vec<ExecutionStepApproval>,

    #[serde(default)]
    pub messages: Vec<ExecutionStepMessage>,
}

impl ExecutionStep {
    /// Whether the step is the approval checkpoint of a fallback request.
    pub fn is_fallback_approval(&self) -> bool {
        self.step_type == StepType::GoNoGo && self.fallback_origin_step_id.is_some()
    }

    /// Approval record of the given member, if any.
    pub fn approval_for(&self, member_id: u64) -> Option<&ExecutionStepApproval> {
        self.approvals
            .iter()
            .find(|a| a.execution_member_id == member_id)
    }

    /// Number of assigned members whose approval has been granted.
    pub fn approved_count(&self) -> usize {
        self.assigned_members
            .iter()
            .filter(|m| self.approval_for(m.id).is_some_and(|a| a.is_approved))
            .count()
    }
}

/// One member's sign-off on a go/no-go step.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExecutionStepApproval {
    pub id: u64,
    pub execution_step_id: u64,
    pub execution_member_id: u64,
    #[serde(default)]
    pub is_approved: bool,
    #[serde(default)]
    pub approval_date: Option<Timestamp>,
    #[serde(default)]
    pub comments: String,
}

impl ExecutionStepApproval {
    /// A pending (unsaved) approval for a step and member.
    pub fn pending(execution_step_id: u64, execution_member_id: u64) -> Self {
        Self {
            execution_step_id,
            execution_member_id,
            ..Default::default()
        }
    }

    /// Grants the approval at the given time.
    pub fn approve(&mut self, at: Timestamp, comments: Option<String>) {
        self.is_approved = true;
        self.approval_date = Some(at);
        if let Some(comments) = comments {
            self.comments = comments;
        }
    }

    /// Withdraws a previously granted approval.
    pub fn revoke(&mut self) {
        self.is_approved = false;
        self.approval_date = None;
    }
}

/// Free-form communication attached to a step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExecutionStepMessage {
    pub id: u64,
    pub execution_step_id: u64,
    pub author_id: u64,
    pub content: String,
    pub created_on: Timestamp,
}

impl ExecutionStepMessage {
    /// A new (unsaved) message authored now.
    pub fn new(execution_step_id: u64, author_id: u64, content: impl Into<String>) -> Self {
        Self {
            id: 0,
            execution_step_id,
            author_id,
            content: content.into(),
            created_on: Timestamp::now(),
        }
    }
}
