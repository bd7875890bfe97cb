mod model_tests {
    use jiff::Timestamp;

    use crate::models::{
        Execution, ExecutionMember, ExecutionStep, ExecutionStepApproval, FallbackStep, Plan,
        PlanMember, PlanStep, StepProgress, StepType,
    };

    fn member(id: u64, name: &str) -> ExecutionMember {
        ExecutionMember {
            id,
            name: name.to_string(),
            email_address: format!("{}@example.com", name.to_lowercase()),
        }
    }

    #[test]
    fn test_step_type_parsing() {
        assert_eq!("activity".parse::<StepType>(), Ok(StepType::Activity));
        assert_eq!("Execution".parse::<StepType>(), Ok(StepType::Execution));
        assert_eq!("go-no-go".parse::<StepType>(), Ok(StepType::GoNoGo));
        assert_eq!("GoNoGo".parse::<StepType>(), Ok(StepType::GoNoGo));
        assert_eq!("fallback".parse::<StepType>(), Ok(StepType::Fallback));
        assert!("rollback".parse::<StepType>().is_err());

        for step_type in [
            StepType::Activity,
            StepType::Execution,
            StepType::GoNoGo,
            StepType::Fallback,
        ] {
            assert_eq!(step_type.as_str().parse::<StepType>(), Ok(step_type));
        }
    }

    #[test]
    fn test_step_type_classification() {
        assert!(StepType::Activity.is_plain_task());
        assert!(StepType::Execution.is_plain_task());
        assert!(!StepType::GoNoGo.is_plain_task());
        assert!(StepType::GoNoGo.requires_approval());
        assert!(!StepType::Fallback.requires_approval());
    }

    #[test]
    fn test_plan_json_defaults() {
        let json = r#"{
            "name": "Release",
            "members": [{ "name": "Alice", "email_address": "alice@example.com" }],
            "steps": [
                {
                    "order": 1,
                    "name": "Deploy",
                    "fallback_steps": [{ "name": "Roll back" }]
                },
                { "order": 2, "name": "Verify", "step_type": "gonogo",
                  "assigned_members": [{ "name": "Alice", "email_address": "alice@example.com" }] }
            ]
        }"#;

        let plan = Plan::from_json(json).expect("plan parses");
        assert_eq!(plan.id, 0);
        assert_eq!(plan.steps[0].step_type, StepType::Activity);
        assert_eq!(plan.steps[0].fallback_steps[0].step_type, StepType::Execution);
        assert_eq!(plan.steps[1].step_type, StepType::GoNoGo);
        assert!(plan.steps[1].assigned_members[0].same_person("Alice", "alice@example.com"));
    }

    #[test]
    fn test_malformed_plan_json_is_a_serialization_error() {
        let err = Plan::from_json("{ not json").expect_err("malformed document");
        assert!(matches!(err, crate::CutoverError::Serialization { .. }));

        let err = Plan::from_json(r#"{ "members": [] }"#).expect_err("name is required");
        assert!(matches!(err, crate::CutoverError::Serialization { .. }));
    }

    #[test]
    fn test_fallback_step_defaults_to_execution() {
        assert_eq!(FallbackStep::default().step_type, StepType::Execution);
        assert_eq!(FallbackStep::new(3, "Restore").order, 3);
    }

    #[test]
    fn test_plan_lookup() {
        let mut plan = Plan::new("Release");
        let mut step = PlanStep::new(1, "Deploy", StepType::Activity);
        step.id = 11;
        plan.steps.push(step);
        plan.members.push(PlanMember::new("Alice", ""));

        assert_eq!(plan.step(11).map(|s| s.name.as_str()), Some("Deploy"));
        assert!(plan.step(12).is_none());
    }

    #[test]
    fn test_execution_helpers() {
        let alice = member(1, "Alice");
        let execution = Execution {
            id: 1,
            name: Execution::default_name("Release"),
            created_on: Timestamp::UNIX_EPOCH,
            plan_id: Some(1),
            members: vec![alice.clone()],
            steps: vec![
                ExecutionStep {
                    id: 1,
                    order: -2,
                    ..Default::default()
                },
                ExecutionStep {
                    id: 2,
                    order: 5,
                    ..Default::default()
                },
            ],
        };

        assert_eq!(execution.name, "Execution of Release");
        assert_eq!(execution.max_order(), Some(5));
        assert_eq!(execution.member(1), Some(&alice));
        assert_eq!(execution.step(2).map(|s| s.order), Some(5));
    }

    #[test]
    fn test_approval_lifecycle() {
        let mut approval = ExecutionStepApproval::pending(4, 2);
        assert!(!approval.is_approved);
        assert!(approval.approval_date.is_none());

        approval.approve(Timestamp::UNIX_EPOCH, Some("ship it".to_string()));
        assert!(approval.is_approved);
        assert_eq!(approval.approval_date, Some(Timestamp::UNIX_EPOCH));
        assert_eq!(approval.comments, "ship it");

        approval.revoke();
        assert!(!approval.is_approved);
        assert!(approval.approval_date.is_none());
        assert_eq!(approval.comments, "ship it");
    }

    #[test]
    fn test_step_progress_derivation() {
        let alice = member(1, "Alice");
        let bob = member(2, "Bob");
        let mut approved = ExecutionStepApproval::pending(7, alice.id);
        approved.approve(Timestamp::UNIX_EPOCH, None);

        let mut gate = ExecutionStep {
            id: 7,
            step_type: StepType::GoNoGo,
            assigned_members: vec![alice, bob],
            approvals: vec![approved, ExecutionStepApproval::pending(7, 2)],
            ..Default::default()
        };
        assert_eq!(
            StepProgress::of(&gate),
            StepProgress::AwaitingApproval {
                approved: 1,
                required: 2
            }
        );

        gate.is_cancelled = true;
        assert_eq!(StepProgress::of(&gate), StepProgress::Cancelled);

        let mut task = ExecutionStep {
            step_type: StepType::Execution,
            ..Default::default()
        };
        assert_eq!(StepProgress::of(&task), StepProgress::Pending);
        task.complete_on = Some(Timestamp::UNIX_EPOCH);
        assert_eq!(StepProgress::of(&task), StepProgress::Complete);
    }

    #[test]
    fn test_step_progress_serializes_with_state_tag() {
        let json = serde_json::to_string(&StepProgress::AwaitingApproval {
            approved: 0,
            required: 3,
        })
        .expect("serializes");
        assert_eq!(
            json,
            r#"{"state":"awaiting_approval","approved":0,"required":3}"#
        );
    }
}
