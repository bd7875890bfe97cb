//! Cutover CLI Application
//!
//! Command-line interface for running plans with go/no-go approvals and
//! fallbacks. Without a subcommand it lists the stored plans.

mod args;
mod cli;
mod renderer;

use anyhow::{Context, Result};
use args::{Args, Commands};
use clap::Parser;
use cli::Cli;
use cutover_core::CoordinatorBuilder;
use log::info;
use renderer::TerminalRenderer;
use Commands::*;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let Args {
        database_file,
        no_color,
        command,
    } = Args::parse();

    let coordinator = CoordinatorBuilder::new()
        .with_database_path(database_file)
        .build()
        .await
        .context("Failed to initialize coordinator")?;

    info!("Cutover started with database {}", coordinator.database_path().display());

    let cli = Cli::new(coordinator, TerminalRenderer::new(!no_color));

    match command {
        Some(Plan { command }) => cli.handle_plan_command(command).await,
        Some(Exec { command }) => cli.handle_exec_command(command).await,
        Some(Step { command }) => cli.handle_step_command(command).await,
        Some(Approval { command }) => cli.handle_approval_command(command).await,
        Some(Fallback { command }) => cli.handle_fallback_command(command).await,
        None => cli.list_plans().await,
    }
}
