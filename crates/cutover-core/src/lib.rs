//! Core library for cutover: plan execution with go/no-go approvals and
//! fallback substitution.
//!
//! A [`Plan`](models::Plan) is an editable template of ordered steps and the
//! members assigned to them. Starting a run snapshots the plan into an
//! [`Execution`](models::Execution), whose steps are then completed, approved
//! or cancelled. A step that cannot proceed can be replaced by the fallback
//! steps defined on its plan step once everybody involved approves.
//!
//! # Layout
//!
//! - [`models`]: plain data types for templates and running instances
//! - [`workflow`]: pure rules (completion, start gating, snapshot, fallback)
//! - [`db`]: the SQLite store
//! - [`coordinator`]: the async API used by front ends
//! - [`display`]: markdown formatting of models and results
//! - [`params`]: parameter structures for coordinator handlers
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use cutover_core::{
//!     CoordinatorBuilder,
//!     models::{Plan, PlanMember, PlanStep, StepType},
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let coordinator = CoordinatorBuilder::new()
//!     .with_database_path(Some("cutover.db"))
//!     .build()
//!     .await?;
//!
//! let alice = PlanMember::new("Alice", "alice@example.com");
//! let mut verify = PlanStep::new(2, "Verify", StepType::GoNoGo);
//! verify.assigned_members.push(alice.clone());
//!
//! let mut plan = Plan::new("Release");
//! plan.members.push(alice);
//! plan.steps.push(PlanStep::new(1, "Deploy", StepType::Activity));
//! plan.steps.push(verify);
//! let plan = coordinator.create_plan(&plan).await?;
//!
//! if let Some(execution) = coordinator.create_execution_from_plan(plan.id).await? {
//!     for step in &execution.steps {
//!         println!("{}: complete = {}", step.name, coordinator.is_step_complete(step));
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod coordinator;
pub mod db;
pub mod display;
pub mod error;
pub mod models;
pub mod params;
pub mod workflow;

pub use coordinator::{Coordinator, CoordinatorBuilder, ExecutionQuery};
pub use db::Database;
pub use display::{
    CreateResult, Executions, LocalDateTime, OperationStatus, Plans, StepReport, Steps,
    UpdateResult,
};
pub use error::{CutoverError, Result};
pub use models::{
    Execution, ExecutionFilter, ExecutionMember, ExecutionStep, ExecutionStepApproval,
    ExecutionStepMessage, FallbackStep, Plan, PlanMember, PlanStep, StepProgress, StepType,
};
pub use params::{
    AddApproval, CompleteStep, ExecuteFallback, GrantApproval, Id, ListExecutions, PostMessage,
    RequestFallback,
};
