//! Subcommand arguments and their handlers.
//!
//! Argument structures carry the clap derives and convert into the core
//! parameter types with `From`, so the core stays free of CLI concerns:
//!
//! ```text
//! User Input → CLI Args (clap) → Core Params → Coordinator → Display → Renderer
//! ```

use std::{
    fmt::Display,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use cutover_core::{
    models::Plan,
    params::{
        AddApproval, CompleteStep, ExecuteFallback, GrantApproval, Id, ListExecutions,
        PostMessage, RequestFallback,
    },
    Coordinator, CreateResult, CutoverError, OperationStatus, UpdateResult,
};
use log::debug;

use crate::renderer::TerminalRenderer;

// ============================================================================
// Plan arguments
// ============================================================================

/// Create an empty plan
#[derive(Args)]
pub struct CreatePlanArgs {
    /// Name of the plan, "New Plan" when omitted
    pub name: Option<String>,
}

/// Create a plan from a JSON file
///
/// The file holds a plan with its members, steps and fallback steps. Any ids
/// in the file are ignored and fresh ones are assigned.
#[derive(Args)]
pub struct ImportPlanArgs {
    #[arg(help = "Path to the JSON file describing the plan")]
    pub file: PathBuf,
}

/// Merge an edited plan from a JSON file
///
/// Entries keeping their id are updated in place, entries with id 0 are
/// added and stored entries missing from the file are removed.
#[derive(Args)]
pub struct UpdatePlanArgs {
    #[arg(help = "Path to the JSON file holding the edited plan, including its id")]
    pub file: PathBuf,
}

/// Show a plan with its steps and fallback steps
#[derive(Args)]
pub struct ShowPlanArgs {
    #[arg(help = "Unique identifier of the plan to show")]
    pub id: u64,
}

impl From<ShowPlanArgs> for Id {
    fn from(val: ShowPlanArgs) -> Self {
        Id { id: val.id }
    }
}

/// Delete a plan; its executions are kept
#[derive(Args)]
pub struct DeletePlanArgs {
    #[arg(help = "Unique identifier of the plan to delete")]
    pub id: u64,
}

impl From<DeletePlanArgs> for Id {
    fn from(val: DeletePlanArgs) -> Self {
        Id { id: val.id }
    }
}

#[derive(Subcommand)]
pub enum PlanCommands {
    /// Create an empty plan
    #[command(alias = "c")]
    Create(CreatePlanArgs),
    /// Create a plan from a JSON file
    #[command(alias = "i")]
    Import(ImportPlanArgs),
    /// Merge an edited plan from a JSON file
    #[command(alias = "u")]
    Update(UpdatePlanArgs),
    /// Show a plan
    #[command(alias = "s")]
    Show(ShowPlanArgs),
    /// List all plans
    #[command(aliases = ["l", "ls"])]
    List,
    /// Delete a plan
    #[command(aliases = ["d", "rm"])]
    Delete(DeletePlanArgs),
}

// ============================================================================
// Execution arguments
// ============================================================================

/// Start an execution by snapshotting a plan
#[derive(Args)]
pub struct StartExecutionArgs {
    #[arg(help = "Unique identifier of the plan to run")]
    pub plan_id: u64,
}

/// Show an execution with its members and steps
#[derive(Args)]
pub struct ShowExecutionArgs {
    #[arg(help = "Unique identifier of the execution to show")]
    pub id: u64,
}

impl From<ShowExecutionArgs> for Id {
    fn from(val: ShowExecutionArgs) -> Self {
        Id { id: val.id }
    }
}

/// List executions, newest first
#[derive(Args)]
pub struct ListExecutionsArgs {
    #[arg(long = "plan", help = "Only executions of this plan")]
    pub plan_id: Option<u64>,
    #[arg(long = "name", help = "Only executions whose name contains this text")]
    pub name_contains: Option<String>,
    #[arg(long, help = "Maximum number of executions to show")]
    pub limit: Option<u32>,
    #[arg(long, help = "Number of executions to skip")]
    pub offset: Option<u32>,
}

impl From<ListExecutionsArgs> for ListExecutions {
    fn from(val: ListExecutionsArgs) -> Self {
        ListExecutions {
            plan_id: val.plan_id,
            name_contains: val.name_contains,
            limit: val.limit,
            offset: val.offset,
        }
    }
}

/// Delete an execution with its steps, approvals and messages
#[derive(Args)]
pub struct DeleteExecutionArgs {
    #[arg(help = "Unique identifier of the execution to delete")]
    pub id: u64,
}

impl From<DeleteExecutionArgs> for Id {
    fn from(val: DeleteExecutionArgs) -> Self {
        Id { id: val.id }
    }
}

#[derive(Subcommand)]
pub enum ExecCommands {
    /// Start an execution of a plan
    #[command(alias = "new")]
    Start(StartExecutionArgs),
    /// Show an execution
    #[command(alias = "s")]
    Show(ShowExecutionArgs),
    /// List executions
    #[command(aliases = ["l", "ls"])]
    List(ListExecutionsArgs),
    /// Delete an execution
    #[command(aliases = ["d", "rm"])]
    Delete(DeleteExecutionArgs),
}

// ============================================================================
// Step arguments
// ============================================================================

/// Select a step by id
#[derive(Args)]
pub struct StepIdArgs {
    #[arg(help = "Unique identifier of the execution step")]
    pub id: u64,
}

impl From<StepIdArgs> for Id {
    fn from(val: StepIdArgs) -> Self {
        Id { id: val.id }
    }
}

/// Complete an activity or execution step
///
/// Go/no-go steps complete once every assigned member approves them.
#[derive(Args)]
pub struct CompleteStepArgs {
    #[arg(help = "Unique identifier of the execution step")]
    pub id: u64,
    #[arg(long, help = "Summary of the outcome")]
    pub result: Option<String>,
}

impl From<CompleteStepArgs> for CompleteStep {
    fn from(val: CompleteStepArgs) -> Self {
        CompleteStep {
            id: val.id,
            result_summary: val.result,
        }
    }
}

/// Post a message on a step
#[derive(Args)]
pub struct PostMessageArgs {
    #[arg(help = "Unique identifier of the execution step")]
    pub step_id: u64,
    #[arg(help = "Execution member posting the message")]
    pub author_id: u64,
    pub content: String,
}

impl From<PostMessageArgs> for PostMessage {
    fn from(val: PostMessageArgs) -> Self {
        PostMessage {
            step_id: val.step_id,
            author_id: val.author_id,
            content: val.content,
        }
    }
}

#[derive(Subcommand)]
pub enum StepCommands {
    /// Show a step with its approvals and messages
    #[command(alias = "s")]
    Show(StepIdArgs),
    /// Start a step once the steps before it are complete
    Start(StepIdArgs),
    /// Complete an activity or execution step
    #[command(alias = "done")]
    Complete(CompleteStepArgs),
    /// Cancel a step
    Cancel(StepIdArgs),
    /// Post a message on a step
    #[command(alias = "m")]
    Message(PostMessageArgs),
    /// Show where a step stands and whether it may start
    Status(StepIdArgs),
}

// ============================================================================
// Approval arguments
// ============================================================================

/// Add a pending approval for a member of the execution
#[derive(Args)]
pub struct AddApprovalArgs {
    #[arg(help = "Unique identifier of the go/no-go step")]
    pub step_id: u64,
    #[arg(help = "Execution member whose approval is required")]
    pub member_id: u64,
}

impl From<AddApprovalArgs> for AddApproval {
    fn from(val: AddApprovalArgs) -> Self {
        AddApproval {
            step_id: val.step_id,
            member_id: val.member_id,
        }
    }
}

/// Grant an approval
#[derive(Args)]
pub struct ApproveArgs {
    #[arg(help = "Unique identifier of the approval")]
    pub id: u64,
    #[arg(long, help = "Comment recorded with the approval")]
    pub comment: Option<String>,
}

impl From<ApproveArgs> for GrantApproval {
    fn from(val: ApproveArgs) -> Self {
        GrantApproval {
            id: val.id,
            comment: val.comment,
        }
    }
}

/// Withdraw a granted approval
#[derive(Args)]
pub struct RevokeArgs {
    #[arg(help = "Unique identifier of the approval")]
    pub id: u64,
}

impl From<RevokeArgs> for Id {
    fn from(val: RevokeArgs) -> Self {
        Id { id: val.id }
    }
}

#[derive(Subcommand)]
pub enum ApprovalCommands {
    /// Add a pending approval
    Add(AddApprovalArgs),
    /// Grant an approval
    #[command(alias = "go")]
    Approve(ApproveArgs),
    /// Withdraw an approval
    Revoke(RevokeArgs),
}

// ============================================================================
// Fallback arguments
// ============================================================================

/// Request a fallback for a step
///
/// Appends a go/no-go step assigned to everybody involved in the step's
/// fallback steps.
#[derive(Args)]
pub struct RequestFallbackArgs {
    pub execution_id: u64,
    #[arg(help = "Step that cannot proceed")]
    pub origin_step_id: u64,
    pub reason: String,
}

impl From<RequestFallbackArgs> for RequestFallback {
    fn from(val: RequestFallbackArgs) -> Self {
        RequestFallback {
            execution_id: val.execution_id,
            origin_step_id: val.origin_step_id,
            reason: val.reason,
        }
    }
}

/// Carry out an approved fallback
///
/// Cancels the steps ordered after the failing step and appends its fallback
/// steps to the execution.
#[derive(Args)]
pub struct ExecuteFallbackArgs {
    pub execution_id: u64,
    #[arg(help = "The approved fallback approval step")]
    pub approval_step_id: u64,
}

impl From<ExecuteFallbackArgs> for ExecuteFallback {
    fn from(val: ExecuteFallbackArgs) -> Self {
        ExecuteFallback {
            execution_id: val.execution_id,
            approval_step_id: val.approval_step_id,
        }
    }
}

#[derive(Subcommand)]
pub enum FallbackCommands {
    /// Request a fallback for a step
    #[command(alias = "r")]
    Request(RequestFallbackArgs),
    /// Carry out an approved fallback
    #[command(alias = "x")]
    Execute(ExecuteFallbackArgs),
}

// ============================================================================
// Handlers
// ============================================================================

/// Runs subcommands against a coordinator and renders their output.
pub struct Cli {
    coordinator: Coordinator,
    renderer: TerminalRenderer,
}

impl Cli {
    pub fn new(coordinator: Coordinator, renderer: TerminalRenderer) -> Self {
        Self {
            coordinator,
            renderer,
        }
    }

    fn show<T: Display>(&self, output: &T) -> Result<()> {
        self.renderer.render(&output.to_string())
    }

    pub async fn handle_plan_command(&self, command: PlanCommands) -> Result<()> {
        match command {
            PlanCommands::Create(args) => {
                let plan = self
                    .coordinator
                    .create_blank_plan(args.name.as_deref())
                    .await
                    .context("Failed to create plan")?;
                self.show(&CreateResult::new(plan))
            }
            PlanCommands::Import(args) => {
                let plan = read_plan_file(&args.file)?;
                let plan = self
                    .coordinator
                    .create_plan(&plan)
                    .await
                    .context("Failed to import plan")?;
                self.show(&CreateResult::new(plan))
            }
            PlanCommands::Update(args) => {
                let plan = read_plan_file(&args.file)?;
                if plan.id == 0 {
                    return Err(CutoverError::invalid_input(
                        "id",
                        "the plan file must carry the id of the plan to update",
                    )
                    .into());
                }
                let plan = self
                    .coordinator
                    .update_plan(&plan)
                    .await
                    .context("Failed to update plan")?;
                self.show(&UpdateResult::new(plan))
            }
            PlanCommands::Show(args) => {
                let Id { id } = args.into();
                let plan = self
                    .coordinator
                    .get_plan(id)
                    .await
                    .context("Failed to get plan")?
                    .ok_or(CutoverError::PlanNotFound { id })?;
                self.show(&plan)
            }
            PlanCommands::List => self.list_plans().await,
            PlanCommands::Delete(args) => {
                let Id { id } = args.into();
                self.coordinator
                    .delete_plan(id)
                    .await
                    .context("Failed to delete plan")?;
                self.show(&OperationStatus::success(format!("Deleted plan {id}")))
            }
        }
    }

    pub async fn list_plans(&self) -> Result<()> {
        let plans = self
            .coordinator
            .list_plans_summary()
            .await
            .context("Failed to list plans")?;
        self.show(&plans)
    }

    pub async fn handle_exec_command(&self, command: ExecCommands) -> Result<()> {
        match command {
            ExecCommands::Start(args) => {
                let plan_id = args.plan_id;
                let execution = self
                    .coordinator
                    .create_execution_from_plan(plan_id)
                    .await
                    .context("Failed to start execution")?
                    .ok_or(CutoverError::PlanNotFound { id: plan_id })?;
                self.show(&CreateResult::new(execution))
            }
            ExecCommands::Show(args) => {
                let Id { id } = args.into();
                let execution = self
                    .coordinator
                    .get_execution(id)
                    .await
                    .context("Failed to get execution")?
                    .ok_or(CutoverError::ExecutionNotFound { id })?;
                self.show(&execution)
            }
            ExecCommands::List(args) => {
                let executions = self
                    .coordinator
                    .list_executions_summary(&args.into())
                    .await
                    .context("Failed to list executions")?;
                self.show(&executions)
            }
            ExecCommands::Delete(args) => {
                let Id { id } = args.into();
                let deleted = self
                    .coordinator
                    .delete_execution(id)
                    .await
                    .context("Failed to delete execution")?;
                let status = if deleted {
                    OperationStatus::success(format!("Deleted execution {id}"))
                } else {
                    OperationStatus::failure(format!("Execution {id} not found"))
                };
                self.show(&status)
            }
        }
    }

    pub async fn handle_step_command(&self, command: StepCommands) -> Result<()> {
        match command {
            StepCommands::Show(args) => {
                let Id { id } = args.into();
                let step = self
                    .coordinator
                    .get_execution_step(id)
                    .await
                    .context("Failed to get step")?
                    .ok_or(CutoverError::StepNotFound { id })?;
                self.show(&step)
            }
            StepCommands::Start(args) => {
                let step = self
                    .coordinator
                    .start_step(&args.into())
                    .await
                    .context("Failed to start step")?;
                self.show(&UpdateResult::new(step))
            }
            StepCommands::Complete(args) => {
                let step = self
                    .coordinator
                    .complete_step(&args.into())
                    .await
                    .context("Failed to complete step")?;
                self.show(&UpdateResult::new(step))
            }
            StepCommands::Cancel(args) => {
                let step = self
                    .coordinator
                    .cancel_step(&args.into())
                    .await
                    .context("Failed to cancel step")?;
                self.show(&UpdateResult::new(step))
            }
            StepCommands::Message(args) => {
                let message = self
                    .coordinator
                    .post_message(&args.into())
                    .await
                    .context("Failed to post message")?;
                self.show(&OperationStatus::success(format!(
                    "Posted message {} on step {}",
                    message.id, message.execution_step_id
                )))
            }
            StepCommands::Status(args) => {
                let report = self
                    .coordinator
                    .step_report(&args.into())
                    .await
                    .context("Failed to read step status")?;
                self.show(&report)
            }
        }
    }

    pub async fn handle_approval_command(&self, command: ApprovalCommands) -> Result<()> {
        match command {
            ApprovalCommands::Add(args) => {
                let approval = self
                    .coordinator
                    .add_approval(&args.into())
                    .await
                    .context("Failed to add approval")?;
                self.show(&CreateResult::new(approval))
            }
            ApprovalCommands::Approve(args) => {
                let approval = self
                    .coordinator
                    .grant_approval(&args.into())
                    .await
                    .context("Failed to grant approval")?;
                self.show(&UpdateResult::new(approval))
            }
            ApprovalCommands::Revoke(args) => {
                let approval = self
                    .coordinator
                    .revoke_approval(&args.into())
                    .await
                    .context("Failed to revoke approval")?;
                self.show(&UpdateResult::new(approval))
            }
        }
    }

    pub async fn handle_fallback_command(&self, command: FallbackCommands) -> Result<()> {
        match command {
            FallbackCommands::Request(args) => {
                let step = self
                    .coordinator
                    .request_fallback(&args.into())
                    .await
                    .context("Failed to request fallback")?;
                self.show(&CreateResult::new(step))
            }
            FallbackCommands::Execute(args) => {
                let steps = self
                    .coordinator
                    .run_fallback(&args.into())
                    .await
                    .context("Failed to execute fallback")?;
                self.show(&steps)
            }
        }
    }
}

fn read_plan_file(path: &Path) -> Result<Plan> {
    debug!("Reading plan from {}", path.display());
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read plan file {}", path.display()))?;
    let plan = Plan::from_json(&json)
        .with_context(|| format!("Failed to parse plan file {}", path.display()))?;
    Ok(plan)
}
