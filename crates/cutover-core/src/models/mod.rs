//! Data models for plans and executions.
//!
//! Two families of types live here:
//!
//! - **Templates** ([`Plan`], [`PlanStep`], [`PlanMember`], [`FallbackStep`])
//!   are edited freely and merged on update.
//! - **Instances** ([`Execution`], [`ExecutionStep`], [`ExecutionMember`],
//!   [`ExecutionStepApproval`], [`ExecutionStepMessage`]) are snapshotted
//!   from a plan once and afterwards changed only by workflow operations.
//!
//! Execution steps hold value copies of the plan step fields they need rather
//! than pointing back at the template, so later plan edits never leak into a
//! running execution.
//!
//! Display implementations for these models are located in
//! [`crate::display::models`].
//!
//! # Examples
//!
//! ```rust
//! use cutover_core::models::{Plan, PlanMember, PlanStep, StepType};
//!
//! let alice = PlanMember::new("Alice", "alice@example.com");
//! let mut verify = PlanStep::new(2, "Verify", StepType::GoNoGo);
//! verify.assigned_members.push(alice.clone());
//!
//! let mut plan = Plan::new("Release");
//! plan.members.push(alice);
//! plan.steps.push(PlanStep::new(1, "Deploy", StepType::Activity));
//! plan.steps.push(verify);
//!
//! assert_eq!(plan.steps.len(), 2);
//! ```

pub mod execution;
pub mod filters;
pub mod plan;
pub mod status;
pub mod step_type;

#[cfg(test)]
mod tests;

pub use execution::{
    Execution, ExecutionMember, ExecutionStep, ExecutionStepApproval, ExecutionStepMessage,
};
pub use filters::ExecutionFilter;
pub use plan::{FallbackStep, Plan, PlanMember, PlanStep, DEFAULT_PLAN_NAME};
pub use status::StepProgress;
pub use step_type::StepType;
