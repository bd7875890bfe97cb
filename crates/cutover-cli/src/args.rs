use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cli::{ApprovalCommands, ExecCommands, FallbackCommands, PlanCommands, StepCommands};

/// Run cutover plans: ordered steps, go/no-go approvals and fallbacks
///
/// Plans are editable templates. Starting an execution snapshots a plan so
/// that its steps can be started, completed, approved or cancelled. A failing
/// step can be replaced by its fallback steps once everybody involved
/// approves.
#[derive(Parser)]
#[command(version, about, name = "cutover")]
pub struct Args {
    /// Path to the SQLite database file. Defaults to
    /// $XDG_DATA_HOME/cutover/cutover.db
    #[arg(long, global = true)]
    pub database_file: Option<PathBuf>,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands for the cutover CLI
#[derive(Subcommand)]
pub enum Commands {
    /// Manage plan templates
    #[command(alias = "p")]
    Plan {
        #[command(subcommand)]
        command: PlanCommands,
    },
    /// Start and inspect executions of plans
    #[command(alias = "e")]
    Exec {
        #[command(subcommand)]
        command: ExecCommands,
    },
    /// Work on the steps of an execution
    #[command(alias = "s")]
    Step {
        #[command(subcommand)]
        command: StepCommands,
    },
    /// Manage go/no-go approvals
    #[command(alias = "a")]
    Approval {
        #[command(subcommand)]
        command: ApprovalCommands,
    },
    /// Request and carry out fallbacks
    #[command(alias = "f")]
    Fallback {
        #[command(subcommand)]
        command: FallbackCommands,
    },
}
