//! Plan template models: plans, their steps, members and fallback steps.

use serde::{Deserialize, Serialize};

use super::StepType;
use crate::error::Result;

/// Name given to plans created without one.
pub const DEFAULT_PLAN_NAME: &str = "New Plan";

/// Editable template of steps and the people available to run them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Plan {
    /// Unique identifier for the plan (0 when not yet stored)
    #[serde(default)]
    pub id: u64,

    /// Display name of the plan
    pub name: String,

    /// Steps in declaration order; `order` defines the run sequence
    #[serde(default)]
    pub steps: Vec<PlanStep>,

    /// Pool of members steps may be assigned to
    #[serde(default)]
    pub members: Vec<PlanMember>,
}

impl Plan {
    /// Creates an empty, unsaved plan with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Parses a plan document in the JSON import format.
    ///
    /// Identities may be omitted; missing collections default to empty.
    ///
    /// # Errors
    ///
    /// Returns `CutoverError::Serialization` when the document is malformed.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Finds a step by identity.
    pub fn step(&self, id: u64) -> Option<&PlanStep> {
        self.steps.iter().find(|s| s.id == id)
    }
}

/// A person who can be assigned to plan steps.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlanMember {
    #[serde(default)]
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub email_address: String,
}

impl PlanMember {
    pub fn new(name: impl Into<String>, email_address: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            email_address: email_address.into(),
        }
    }

    /// Whether this member is the person with the given name and email.
    pub fn same_person(&self, name: &str, email_address: &str) -> bool {
        self.name == name && self.email_address == email_address
    }
}

/// A single step of a plan template.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PlanStep {
    #[serde(default)]
    pub id: u64,

    /// Sort key; need not be unique or contiguous
    #[serde(default)]
    pub order: i32,

    pub name: String,

    #[serde(default)]
    pub summary: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<Vec<u8>>,

    #[serde(default)]
    pub step_type: StepType,

    /// References into the plan's member pool
    #[serde(default)]
    pub assigned_members: Vec<PlanMember>,

    /// Recovery steps spliced in if this step is abandoned
    #[serde(default)]
    pub fallback_steps: Vec<FallbackStep>,
}

impl PlanStep {
    pub fn new(order: i32, name: impl Into<String>, step_type: StepType) -> Self {
        Self {
            order,
            name: name.into(),
            step_type,
            ..Default::default()
        }
    }
}

/// Recovery step definition attached to a plan step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FallbackStep {
    #[serde(default)]
    pub id: u64,

    #[serde(default)]
    pub order: i32,

    pub name: String,

    #[serde(default)]
    pub summary: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<Vec<u8>>,

    /// Type given to the step created from this definition
    #[serde(default = "FallbackStep::default_step_type")]
    pub step_type: StepType,

    #[serde(default)]
    pub assigned_members: Vec<PlanMember>,
}

impl FallbackStep {
    pub fn new(order: i32, name: impl Into<String>) -> Self {
        Self {
            id: 0,
            order,
            name: name.into(),
            summary: String::new(),
            screenshot: None,
            step_type: Self::default_step_type(),
            assigned_members: Vec::new(),
        }
    }

    fn default_step_type() -> StepType {
        StepType::Execution
    }
}

impl Default for FallbackStep {
    fn default() -> Self {
        Self::new(0, String::new())
    }
}
