//! Tests for the coordinator module.

use tempfile::TempDir;

use super::*;
use crate::{
    models::{Plan, PlanMember, PlanStep, StepType},
    params::{CompleteStep, GrantApproval, Id, RequestFallback},
};

/// Helper function to create a test coordinator
async fn create_test_coordinator() -> (TempDir, Coordinator) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");
    let coordinator = CoordinatorBuilder::new()
        .with_database_path(Some(&db_path))
        .build()
        .await
        .expect("Failed to create coordinator");
    (temp_dir, coordinator)
}

/// A plan with one plain step and one go/no-go step assigned to Dana.
fn two_step_plan() -> Plan {
    let dana = PlanMember::new("Dana", "dana@example.com");
    let mut gate = PlanStep::new(2, "Gate", StepType::GoNoGo);
    gate.assigned_members.push(dana.clone());

    let mut plan = Plan::new("Two steps");
    plan.members.push(dana);
    plan.steps.push(PlanStep::new(1, "Prepare", StepType::Execution));
    plan.steps.push(gate);
    plan
}

#[tokio::test]
async fn test_builder_creates_missing_directories() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("nested").join("dir").join("cutover.db");

    let coordinator = CoordinatorBuilder::new()
        .with_database_path(Some(&db_path))
        .build()
        .await
        .expect("Failed to create coordinator");

    assert!(db_path.exists());
    assert_eq!(coordinator.database_path(), db_path.as_path());
}

#[tokio::test]
async fn test_builder_ignores_none_path() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("kept.db");

    let builder = CoordinatorBuilder::new()
        .with_database_path(Some(&db_path))
        .with_database_path(None::<&str>);
    let coordinator = builder.build().await.expect("Failed to create coordinator");

    assert_eq!(coordinator.database_path(), db_path.as_path());
}

#[tokio::test]
async fn test_start_step_keeps_first_start_time() {
    let (_temp_dir, coordinator) = create_test_coordinator().await;

    let plan = coordinator
        .create_plan(&two_step_plan())
        .await
        .expect("Failed to create plan");
    let execution = coordinator
        .create_execution_from_plan(plan.id)
        .await
        .expect("Failed to create execution")
        .expect("plan exists");
    let prepare = &execution.steps[0];

    let first = coordinator
        .start_step(&Id { id: prepare.id })
        .await
        .expect("Failed to start step");
    let again = coordinator
        .start_step(&Id { id: prepare.id })
        .await
        .expect("Restarting is allowed");

    assert!(first.started_on.is_some());
    assert_eq!(first.started_on, again.started_on);
}

#[tokio::test]
async fn test_gate_opens_after_completion_and_approval() {
    let (_temp_dir, coordinator) = create_test_coordinator().await;

    let plan = coordinator
        .create_plan(&two_step_plan())
        .await
        .expect("Failed to create plan");
    let execution = coordinator
        .create_execution_from_plan(plan.id)
        .await
        .expect("Failed to create execution")
        .expect("plan exists");
    let prepare = &execution.steps[0];
    let gate = &execution.steps[1];

    let report = coordinator
        .step_report(&Id { id: gate.id })
        .await
        .expect("Failed to report step");
    assert!(!report.can_start);

    coordinator
        .complete_step(&CompleteStep {
            id: prepare.id,
            result_summary: None,
        })
        .await
        .expect("Failed to complete step");

    let report = coordinator
        .step_report(&Id { id: gate.id })
        .await
        .expect("Failed to report step");
    assert!(report.can_start);
    assert!(format!("{report}").contains("- Can start: yes"));

    coordinator
        .grant_approval(&GrantApproval {
            id: gate.approvals[0].id,
            comment: Some("go".to_string()),
        })
        .await
        .expect("Failed to grant approval");

    let execution = coordinator
        .get_execution(execution.id)
        .await
        .expect("Failed to get execution")
        .expect("execution exists");
    assert!(execution.steps.iter().all(|s| coordinator.is_step_complete(s)));
}

#[tokio::test]
async fn test_handlers_report_missing_targets() {
    let (_temp_dir, coordinator) = create_test_coordinator().await;

    let err = coordinator
        .start_step(&Id { id: 404 })
        .await
        .expect_err("missing step");
    assert!(matches!(err, CutoverError::StepNotFound { id: 404 }));

    let err = coordinator
        .grant_approval(&GrantApproval {
            id: 404,
            comment: None,
        })
        .await
        .expect_err("missing approval");
    assert!(matches!(err, CutoverError::ApprovalNotFound { id: 404 }));

    let err = coordinator
        .revoke_approval(&Id { id: 404 })
        .await
        .expect_err("missing approval");
    assert!(err.is_not_found());

    let err = coordinator
        .request_fallback(&RequestFallback {
            execution_id: 404,
            origin_step_id: 1,
            reason: String::new(),
        })
        .await
        .expect_err("missing execution");
    assert!(matches!(err, CutoverError::ExecutionNotFound { id: 404 }));

    assert!(!coordinator
        .delete_execution(404)
        .await
        .expect("Deleting a missing execution is not an error"));
}

#[tokio::test]
async fn test_fallback_request_rejects_foreign_step() {
    let (_temp_dir, coordinator) = create_test_coordinator().await;

    let plan = coordinator
        .create_plan(&two_step_plan())
        .await
        .expect("Failed to create plan");
    let first = coordinator
        .create_execution_from_plan(plan.id)
        .await
        .expect("Failed to create execution")
        .expect("plan exists");
    let second = coordinator
        .create_execution_from_plan(plan.id)
        .await
        .expect("Failed to create execution")
        .expect("plan exists");

    let err = coordinator
        .request_fallback(&RequestFallback {
            execution_id: first.id,
            origin_step_id: second.steps[0].id,
            reason: "wrong run".to_string(),
        })
        .await
        .expect_err("step belongs to another execution");
    assert!(matches!(err, CutoverError::StepNotFound { .. }));
}
