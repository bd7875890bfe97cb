//! Parameter structures for coordinator handlers.
//!
//! These are plain structures without framework derives. Interface layers
//! such as the CLI define their own argument types (with clap derives) and
//! convert them into these with `From`/`Into`, so the core stays free of UI
//! dependencies.
//!
//! ```ignore
//! // In the CLI
//! #[derive(Args)]
//! pub struct CompleteStepArgs {
//!     pub id: u64,
//!     #[arg(long)]
//!     pub result: Option<String>,
//! }
//!
//! impl From<CompleteStepArgs> for CompleteStep {
//!     fn from(args: CompleteStepArgs) -> Self {
//!         CompleteStep { id: args.id, result_summary: args.result }
//!     }
//! }
//! ```

use crate::models::ExecutionFilter;

/// Parameters for operations that take a single ID.
#[derive(Debug, Clone, Copy)]
pub struct Id {
    pub id: u64,
}

/// Parameters for finishing a plain step.
#[derive(Debug, Clone)]
pub struct CompleteStep {
    pub id: u64,
    /// Outcome recorded on the step
    pub result_summary: Option<String>,
}

/// Parameters for posting a message on a step.
#[derive(Debug, Clone)]
pub struct PostMessage {
    pub step_id: u64,
    pub author_id: u64,
    pub content: String,
}

/// Parameters for adding an approval record.
#[derive(Debug, Clone, Copy)]
pub struct AddApproval {
    pub step_id: u64,
    pub member_id: u64,
}

/// Parameters for granting an approval.
#[derive(Debug, Clone)]
pub struct GrantApproval {
    pub id: u64,
    pub comment: Option<String>,
}

/// Parameters for listing executions.
#[derive(Debug, Clone, Default)]
pub struct ListExecutions {
    pub plan_id: Option<u64>,
    pub name_contains: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl From<&ListExecutions> for ExecutionFilter {
    fn from(params: &ListExecutions) -> Self {
        ExecutionFilter {
            plan_id: params.plan_id,
            name_contains: params.name_contains.clone(),
            limit: params.limit,
            offset: params.offset,
            ..Default::default()
        }
    }
}

/// Parameters for requesting a fallback on a step.
#[derive(Debug, Clone)]
pub struct RequestFallback {
    pub execution_id: u64,
    pub origin_step_id: u64,
    pub reason: String,
}

/// Parameters for carrying out an approved fallback.
#[derive(Debug, Clone, Copy)]
pub struct ExecuteFallback {
    pub execution_id: u64,
    pub approval_step_id: u64,
}
