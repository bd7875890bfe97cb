#![allow(dead_code)]

use cutover_core::{
    models::{FallbackStep, Plan, PlanMember, PlanStep, StepType},
    Coordinator, CoordinatorBuilder,
};
use tempfile::TempDir;

/// Helper function to create a test coordinator over a throwaway database
pub async fn create_test_coordinator() -> (TempDir, Coordinator) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");
    let coordinator = CoordinatorBuilder::new()
        .with_database_path(Some(&db_path))
        .build()
        .await
        .expect("Failed to create coordinator");
    (temp_dir, coordinator)
}

pub fn alice() -> PlanMember {
    PlanMember::new("Alice", "alice@example.com")
}

pub fn bob() -> PlanMember {
    PlanMember::new("Bob", "bob@example.com")
}

pub fn carol() -> PlanMember {
    PlanMember::new("Carol", "carol@example.com")
}

/// The "Release" plan: Deploy (activity, Alice) then Verify (go/no-go,
/// Alice and Bob). Deploy can fall back to a restore run by Bob and Carol.
pub fn release_plan() -> Plan {
    let mut deploy = PlanStep::new(1, "Deploy", StepType::Activity);
    deploy.assigned_members = vec![alice()];

    let mut restore = FallbackStep::new(1, "Restore previous release");
    restore.assigned_members = vec![bob(), carol()];
    let mut announce = FallbackStep::new(2, "Announce rollback");
    announce.assigned_members = vec![alice()];
    deploy.fallback_steps = vec![restore, announce];

    let mut verify = PlanStep::new(2, "Verify", StepType::GoNoGo);
    verify.assigned_members = vec![alice(), bob()];

    let mut plan = Plan::new("Release");
    plan.members = vec![alice(), bob(), carol()];
    plan.steps = vec![deploy, verify];
    plan
}
