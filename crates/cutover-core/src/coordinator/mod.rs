//! High-level coordinator API for plans and executions.
//!
//! [`Coordinator`] is the async façade in front of the store and the workflow
//! rules. Each call opens its own [`Database`] from the configured path on a
//! blocking task, so the coordinator itself holds no connection and can be
//! shared freely.
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │    Handlers     │    │   Operations    │    │    Database     │
//! │   (handlers)    │───▶│ (*_ops, query)  │───▶│   (via db/)     │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//!     User Interface      Workflow + Store        Data Persistence
//! ```
//!
//! ## Submodules
//!
//! - [`builder`]: creates [`Coordinator`] instances
//! - [`plan_ops`]: plan templates
//! - [`execution_ops`]: snapshots, steps, messages and completion checks
//! - [`approval_ops`]: approval records
//! - [`fallback_ops`]: fallback requests and substitution
//! - [`query`]: the chained [`ExecutionQuery`]
//! - [`handlers`]: runner-facing operations taking params and returning
//!   display types
//!
//! # Examples
//!
//! ```rust,no_run
//! use cutover_core::{CoordinatorBuilder, models::{Plan, PlanStep, StepType}};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let coordinator = CoordinatorBuilder::new()
//!     .with_database_path(Some("/tmp/cutover.db"))
//!     .build()
//!     .await?;
//!
//! let mut plan = Plan::new("Release");
//! plan.steps.push(PlanStep::new(1, "Deploy", StepType::Activity));
//! let plan = coordinator.create_plan(&plan).await?;
//!
//! let execution = coordinator
//!     .create_execution_from_plan(plan.id)
//!     .await?
//!     .expect("plan exists");
//! println!("{execution}");
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

use tokio::task;

use crate::{
    db::Database,
    error::{CutoverError, Result},
};

pub mod approval_ops;
pub mod builder;
pub mod execution_ops;
pub mod fallback_ops;
pub mod handlers;
pub mod plan_ops;
pub mod query;

#[cfg(test)]
mod tests;

pub use builder::CoordinatorBuilder;
pub use query::ExecutionQuery;

/// Main interface for managing plans and running executions.
#[derive(Debug, Clone)]
pub struct Coordinator {
    pub(crate) db_path: PathBuf,
}

impl Coordinator {
    /// Creates a coordinator over the database at the given path.
    pub(crate) fn new(db_path: PathBuf) -> Self {
        Self { db_path }
    }

    /// Path of the database file.
    pub fn database_path(&self) -> &Path {
        &self.db_path
    }

    /// Runs `operation` against a freshly opened database on a blocking task.
    pub(crate) async fn with_database<T, F>(&self, operation: F) -> Result<T>
    where
        F: FnOnce(&mut Database) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            operation(&mut db)
        })
        .await
        .map_err(|e| CutoverError::task_join(&e))?
    }
}
