//! Workflow rules for executions.
//!
//! Everything in this module is pure: it reads models and returns decisions
//! or unsaved models, leaving persistence to [`crate::db`]. That keeps the
//! rules testable without a database and lets the store apply each workflow
//! operation inside a single transaction.
//!
//! - [`completion`]: whether a step is complete and whether it may start
//! - [`snapshot`]: copying a plan into a new execution
//! - [`fallback`]: approval checkpoints and recovery step substitution

pub mod completion;
pub mod fallback;
pub mod snapshot;


pub use completion::{can_start_step, is_step_complete};
pub use fallback::{
    build_fallback_approval_step, build_substitute_steps, ensure_not_substituted,
    ensure_ready_to_substitute, fallback_approval_name, steps_to_cancel,
};
pub use snapshot::{pending_approvals, resolve_members, snapshot_plan};
