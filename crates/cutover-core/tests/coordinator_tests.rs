mod common;

use common::{create_test_coordinator, release_plan};
use cutover_core::{
    models::{ExecutionFilter, StepProgress, StepType},
    params::{
        AddApproval, CompleteStep, ExecuteFallback, GrantApproval, Id, ListExecutions,
        PostMessage, RequestFallback,
    },
    CutoverError,
};

#[tokio::test]
#[allow(clippy::too_many_lines)]
async fn test_release_run_through() {
    let (_temp_dir, coordinator) = create_test_coordinator().await;

    let plan = coordinator
        .create_plan(&release_plan())
        .await
        .expect("Failed to create plan");
    let execution = coordinator
        .create_execution_from_plan(plan.id)
        .await
        .expect("Failed to create execution")
        .expect("plan exists");

    let deploy = execution.steps[0].clone();
    let verify = execution.steps[1].clone();
    assert_eq!(deploy.name, "Deploy");
    assert_eq!(verify.approvals.len(), 2);

    assert!(coordinator.can_start_step(&deploy, &execution));
    assert!(!coordinator.can_start_step(&verify, &execution));
    assert!(!coordinator.is_step_complete(&verify));

    // Verify cannot start before Deploy is done
    let err = coordinator
        .start_step(&Id { id: verify.id })
        .await
        .expect_err("Verify is gated on Deploy");
    assert!(matches!(err, CutoverError::PreconditionFailed { .. }));

    let started = coordinator
        .start_step(&Id { id: deploy.id })
        .await
        .expect("Failed to start Deploy");
    let started_on = started.started_on.expect("start recorded");

    let completed = coordinator
        .complete_step(&CompleteStep {
            id: deploy.id,
            result_summary: Some("Build 42 live".to_string()),
        })
        .await
        .expect("Failed to complete Deploy");
    assert_eq!(completed.started_on, Some(started_on), "start time kept");
    assert!(completed.complete_on.is_some());
    assert_eq!(completed.result_summary, "Build 42 live");
    assert!(coordinator.is_step_complete(&completed));

    let err = coordinator
        .complete_step(&CompleteStep {
            id: deploy.id,
            result_summary: None,
        })
        .await
        .expect_err("already complete");
    assert!(matches!(err, CutoverError::PreconditionFailed { .. }));

    // Go/no-go steps only complete through approvals
    let err = coordinator
        .complete_step(&CompleteStep {
            id: verify.id,
            result_summary: None,
        })
        .await
        .expect_err("go/no-go cannot be completed directly");
    assert!(matches!(err, CutoverError::PreconditionFailed { .. }));

    let report = coordinator
        .step_report(&Id { id: verify.id })
        .await
        .expect("Failed to report step");
    assert!(report.can_start);
    assert_eq!(
        report.progress,
        StepProgress::AwaitingApproval {
            approved: 0,
            required: 2
        }
    );

    let first = coordinator
        .grant_approval(&GrantApproval {
            id: verify.approvals[0].id,
            comment: Some("looks good".to_string()),
        })
        .await
        .expect("Failed to grant approval");
    assert!(first.is_approved);
    assert!(first.approval_date.is_some());

    let half = coordinator
        .get_execution_step(verify.id)
        .await
        .expect("Failed to get step")
        .expect("step exists");
    assert!(!coordinator.is_step_complete(&half));

    coordinator
        .grant_approval(&GrantApproval {
            id: verify.approvals[1].id,
            comment: None,
        })
        .await
        .expect("Failed to grant approval");

    let done = coordinator
        .get_execution_step(verify.id)
        .await
        .expect("Failed to get step")
        .expect("step exists");
    assert!(coordinator.is_step_complete(&done));

    // Revoking reopens the gate
    let revoked = coordinator
        .revoke_approval(&Id {
            id: verify.approvals[1].id,
        })
        .await
        .expect("Failed to revoke approval");
    assert!(!revoked.is_approved);
    assert!(revoked.approval_date.is_none());

    let reopened = coordinator
        .get_execution_step(verify.id)
        .await
        .expect("Failed to get step")
        .expect("step exists");
    assert!(!coordinator.is_step_complete(&reopened));
}

#[tokio::test]
#[allow(clippy::too_many_lines)]
async fn test_fallback_flow() {
    let (_temp_dir, coordinator) = create_test_coordinator().await;

    let plan = coordinator
        .create_plan(&release_plan())
        .await
        .expect("Failed to create plan");
    let execution = coordinator
        .create_execution_from_plan(plan.id)
        .await
        .expect("Failed to create execution")
        .expect("plan exists");
    let deploy = execution.steps[0].clone();
    let verify = execution.steps[1].clone();

    // Verify has no fallback definitions
    let err = coordinator
        .request_fallback(&RequestFallback {
            execution_id: execution.id,
            origin_step_id: verify.id,
            reason: "Checks failing".to_string(),
        })
        .await
        .expect_err("no fallback defined");
    assert!(matches!(err, CutoverError::PreconditionFailed { .. }));

    let approval_step = coordinator
        .request_fallback(&RequestFallback {
            execution_id: execution.id,
            origin_step_id: deploy.id,
            reason: "Deploy failed".to_string(),
        })
        .await
        .expect("Failed to request fallback");

    assert_eq!(approval_step.name, "Fallback Approval for Deploy");
    assert_eq!(approval_step.step_type, StepType::GoNoGo);
    assert_eq!(approval_step.order, 3);
    assert_eq!(approval_step.fallback_origin_step_id, Some(deploy.id));
    assert_eq!(approval_step.fallback_reason, "Deploy failed");
    assert_eq!(approval_step.plan_step_id, None);
    assert_eq!(approval_step.assigned_members.len(), 3);
    assert_eq!(approval_step.approvals.len(), 3);
    assert!(approval_step.approvals.iter().all(|a| !a.is_approved));

    let err = coordinator
        .run_fallback(&ExecuteFallback {
            execution_id: execution.id,
            approval_step_id: approval_step.id,
        })
        .await
        .expect_err("not approved yet");
    assert!(matches!(err, CutoverError::PreconditionFailed { .. }));

    // Only a fallback checkpoint can be executed
    let err = coordinator
        .run_fallback(&ExecuteFallback {
            execution_id: execution.id,
            approval_step_id: verify.id,
        })
        .await
        .expect_err("Verify is no fallback checkpoint");
    assert!(matches!(err, CutoverError::PreconditionFailed { .. }));

    for approval in &approval_step.approvals {
        coordinator
            .grant_approval(&GrantApproval {
                id: approval.id,
                comment: None,
            })
            .await
            .expect("Failed to grant approval");
    }

    let substitutes = coordinator
        .run_fallback(&ExecuteFallback {
            execution_id: execution.id,
            approval_step_id: approval_step.id,
        })
        .await
        .expect("Failed to execute fallback")
        .0;

    assert_eq!(
        substitutes.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
        vec!["Restore previous release", "Announce rollback"]
    );
    assert_eq!(
        substitutes.iter().map(|s| s.order).collect::<Vec<_>>(),
        vec![4, 5]
    );
    for step in &substitutes {
        assert_eq!(step.step_type, StepType::Execution);
        assert_eq!(step.plan_step_id, None);
        assert_eq!(step.fallback_origin_step_id, Some(deploy.id));
        assert!(step.approvals.is_empty());
    }
    assert_eq!(substitutes[0].assigned_members.len(), 2);

    let after = coordinator
        .get_execution(execution.id)
        .await
        .expect("Failed to get execution")
        .expect("execution exists");
    assert_eq!(after.steps.len(), 5);

    let deploy_after = after.step(deploy.id).expect("Deploy kept");
    assert!(!deploy_after.is_cancelled);
    assert!(after.step(verify.id).expect("Verify kept").is_cancelled);
    assert!(!after
        .step(approval_step.id)
        .expect("checkpoint kept")
        .is_cancelled);

    // The recovery steps wait on Deploy, which is still open
    let restore = after.step(substitutes[0].id).expect("substitute stored");
    assert!(!coordinator.can_start_step(restore, &after));
}

#[tokio::test]
async fn test_fallback_runs_once() {
    let (_temp_dir, coordinator) = create_test_coordinator().await;

    let plan = coordinator
        .create_plan(&release_plan())
        .await
        .expect("Failed to create plan");
    let execution = coordinator
        .create_execution_from_plan(plan.id)
        .await
        .expect("Failed to create execution")
        .expect("plan exists");
    let deploy_id = execution.steps[0].id;

    let approval_step = coordinator
        .request_fallback(&RequestFallback {
            execution_id: execution.id,
            origin_step_id: deploy_id,
            reason: "Deploy failed".to_string(),
        })
        .await
        .expect("Failed to request fallback");
    for approval in &approval_step.approvals {
        coordinator
            .grant_approval(&GrantApproval {
                id: approval.id,
                comment: None,
            })
            .await
            .expect("Failed to grant approval");
    }

    let request = ExecuteFallback {
        execution_id: execution.id,
        approval_step_id: approval_step.id,
    };
    let substitutes = coordinator
        .run_fallback(&request)
        .await
        .expect("Failed to execute fallback")
        .0;

    let err = coordinator
        .run_fallback(&request)
        .await
        .expect_err("fallback already carried out");
    assert!(matches!(err, CutoverError::PreconditionFailed { .. }));

    let after = coordinator
        .get_execution(execution.id)
        .await
        .expect("Failed to get execution")
        .expect("execution exists");
    assert_eq!(after.steps.len(), 5);
    for step in &substitutes {
        assert!(!after.step(step.id).expect("substitute stored").is_cancelled);
    }
}

#[tokio::test]
async fn test_cancel_step_is_idempotent_and_blocks_progress() {
    let (_temp_dir, coordinator) = create_test_coordinator().await;

    let plan = coordinator
        .create_plan(&release_plan())
        .await
        .expect("Failed to create plan");
    let execution = coordinator
        .create_execution_from_plan(plan.id)
        .await
        .expect("Failed to create execution")
        .expect("plan exists");
    let deploy = &execution.steps[0];
    let verify = &execution.steps[1];

    let cancelled = coordinator
        .cancel_step(&Id { id: deploy.id })
        .await
        .expect("Failed to cancel step");
    assert!(cancelled.is_cancelled);
    coordinator
        .cancel_step(&Id { id: deploy.id })
        .await
        .expect("Cancelling twice is fine");

    let err = coordinator
        .start_step(&Id { id: deploy.id })
        .await
        .expect_err("cancelled step cannot start");
    assert!(matches!(err, CutoverError::PreconditionFailed { .. }));

    // A cancelled step counts as complete for the gate
    let report = coordinator
        .step_report(&Id { id: verify.id })
        .await
        .expect("Failed to report step");
    assert!(report.can_start);

    let err = coordinator
        .cancel_step(&Id { id: 9999 })
        .await
        .expect_err("unknown step");
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_messages_and_extra_approvals() {
    let (_temp_dir, coordinator) = create_test_coordinator().await;

    let plan = coordinator
        .create_plan(&release_plan())
        .await
        .expect("Failed to create plan");
    let execution = coordinator
        .create_execution_from_plan(plan.id)
        .await
        .expect("Failed to create execution")
        .expect("plan exists");
    let verify = &execution.steps[1];
    let carol = execution
        .members
        .iter()
        .find(|m| m.name == "Carol")
        .expect("Carol copied");

    let message = coordinator
        .post_message(&PostMessage {
            step_id: verify.id,
            author_id: carol.id,
            content: "Dashboards are green".to_string(),
        })
        .await
        .expect("Failed to post message");
    assert_eq!(message.content, "Dashboards are green");

    let approval = coordinator
        .add_approval(&AddApproval {
            step_id: verify.id,
            member_id: carol.id,
        })
        .await
        .expect("Failed to add approval");
    assert!(!approval.is_approved);

    let err = coordinator
        .add_approval(&AddApproval {
            step_id: verify.id,
            member_id: carol.id,
        })
        .await
        .expect_err("duplicate approval");
    assert!(matches!(err, CutoverError::PreconditionFailed { .. }));

    let step = coordinator
        .get_execution_step(verify.id)
        .await
        .expect("Failed to get step")
        .expect("step exists");
    assert_eq!(step.messages.len(), 1);
    assert_eq!(step.approvals.len(), 3);
}

#[tokio::test]
async fn test_execution_queries() {
    let (_temp_dir, coordinator) = create_test_coordinator().await;

    let release = coordinator
        .create_plan(&release_plan())
        .await
        .expect("Failed to create plan");
    let blank = coordinator
        .create_blank_plan(None)
        .await
        .expect("Failed to create plan");

    for _ in 0..3 {
        coordinator
            .create_execution_from_plan(release.id)
            .await
            .expect("Failed to create execution")
            .expect("plan exists");
    }
    let other = coordinator
        .create_execution_from_plan(blank.id)
        .await
        .expect("Failed to create execution")
        .expect("plan exists");
    assert_eq!(other.name, "Execution of New Plan");
    assert!(other.steps.is_empty());

    let query = coordinator.executions().for_plan(release.id).limit(2);
    assert_eq!(
        query.filter(),
        &ExecutionFilter {
            plan_id: Some(release.id),
            limit: Some(2),
            ..Default::default()
        }
    );
    let page = query.fetch().await.expect("Failed to fetch executions");
    assert_eq!(page.len(), 2);
    assert!(page[0].id > page[1].id);
    assert!(page.iter().all(|e| e.plan_id == Some(release.id)));

    let named = coordinator
        .executions()
        .name_contains("new plan")
        .fetch()
        .await
        .expect("Failed to fetch executions");
    assert_eq!(named.len(), 1);
    assert_eq!(named[0].id, other.id);

    let summary = coordinator
        .list_executions_summary(&ListExecutions {
            plan_id: None,
            name_contains: None,
            limit: None,
            offset: Some(1),
        })
        .await
        .expect("Failed to list executions");
    assert_eq!(summary.0.len(), 3);

    let plans = coordinator
        .list_plans_summary()
        .await
        .expect("Failed to list plans");
    assert_eq!(plans.0.len(), 2);

    assert!(coordinator
        .delete_execution(other.id)
        .await
        .expect("Failed to delete execution"));
    coordinator
        .delete_plan(blank.id)
        .await
        .expect("Failed to delete plan");
    assert!(coordinator
        .get_plan(blank.id)
        .await
        .expect("Failed to get plan")
        .is_none());
}

#[tokio::test]
async fn test_plan_merge_through_coordinator() {
    let (_temp_dir, coordinator) = create_test_coordinator().await;

    let plan = coordinator
        .create_plan(&release_plan())
        .await
        .expect("Failed to create plan");

    let mut edited = plan.clone();
    edited.name = "Release 2".to_string();
    edited.steps.retain(|s| s.name == "Deploy");

    let merged = coordinator
        .update_plan(&edited)
        .await
        .expect("Failed to update plan");
    assert_eq!(merged.name, "Release 2");
    assert_eq!(merged.steps.len(), 1);
    assert_eq!(merged.steps[0].id, plan.steps[0].id);
    assert_eq!(merged.steps[0].fallback_steps, plan.steps[0].fallback_steps);

    let execution = coordinator
        .create_execution_from_plan(merged.id)
        .await
        .expect("Failed to create execution")
        .expect("plan exists");
    assert_eq!(execution.name, "Execution of Release 2");
    assert_eq!(execution.steps.len(), 1);
}
