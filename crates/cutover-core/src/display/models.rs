//! Display implementations for domain models.
//!
//! Kept apart from the model definitions. Everything renders as markdown for
//! the terminal renderer: a heading per aggregate, a metadata list, and
//! nested sections for steps, approvals and messages.

use std::fmt;

use super::datetime::LocalDateTime;
use crate::{
    models::{
        Execution, ExecutionMember, ExecutionStep, ExecutionStepApproval, ExecutionStepMessage,
        FallbackStep, Plan, PlanMember, PlanStep, StepProgress, StepType,
    },
    workflow,
};

impl fmt::Display for StepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for StepProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.with_icon())
    }
}

impl fmt::Display for PlanMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_person(f, &self.name, &self.email_address)
    }
}

impl fmt::Display for ExecutionMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_person(f, &self.name, &self.email_address)
    }
}

fn fmt_person(f: &mut fmt::Formatter<'_>, name: &str, email_address: &str) -> fmt::Result {
    if email_address.is_empty() {
        write!(f, "{name}")
    } else {
        write!(f, "{name} <{email_address}>")
    }
}

fn names<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names.collect::<Vec<_>>().join(", ")
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}. {}", self.id, self.name)?;
        writeln!(f)?;

        if !self.members.is_empty() {
            writeln!(f, "## Members")?;
            writeln!(f)?;
            for member in &self.members {
                writeln!(f, "- {member} (ID: {})", member.id)?;
            }
            writeln!(f)?;
        }

        if self.steps.is_empty() {
            return writeln!(f, "No steps in this plan.");
        }

        writeln!(f, "## Steps")?;
        writeln!(f)?;

        let mut ordered: Vec<_> = self.steps.iter().collect();
        ordered.sort_by_key(|s| s.order);
        for step in ordered {
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

impl fmt::Display for PlanStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "### {}. {} [{}] (ID: {})",
            self.order, self.name, self.step_type, self.id
        )?;
        writeln!(f)?;

        if !self.summary.is_empty() {
            writeln!(f, "{}", self.summary)?;
            writeln!(f)?;
        }

        if !self.assigned_members.is_empty() {
            writeln!(
                f,
                "- Assigned: {}",
                names(self.assigned_members.iter().map(|m| m.name.as_str()))
            )?;
        }

        if !self.fallback_steps.is_empty() {
            writeln!(f, "- Fallback steps:")?;
            for fallback in &self.fallback_steps {
                writeln!(f, "  - {fallback}")?;
            }
        }

        if !self.assigned_members.is_empty() || !self.fallback_steps.is_empty() {
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for FallbackStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {} [{}]", self.order, self.name, self.step_type)?;
        if !self.assigned_members.is_empty() {
            write!(
                f,
                " ({})",
                names(self.assigned_members.iter().map(|m| m.name.as_str()))
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for Execution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}. {}", self.id, self.name)?;
        writeln!(f)?;

        match self.plan_id {
            Some(plan_id) => writeln!(f, "- Plan: {plan_id}")?,
            None => writeln!(f, "- Plan: (deleted)")?,
        }
        writeln!(f, "- Created: {}", LocalDateTime(&self.created_on))?;

        let complete = self
            .steps
            .iter()
            .filter(|s| workflow::is_step_complete(s))
            .count();
        writeln!(f, "- Progress: {complete}/{}", self.steps.len())?;
        writeln!(f)?;

        if !self.members.is_empty() {
            writeln!(f, "## Members")?;
            writeln!(f)?;
            for member in &self.members {
                writeln!(f, "- {member} (ID: {})", member.id)?;
            }
            writeln!(f)?;
        }

        if self.steps.is_empty() {
            return writeln!(f, "No steps in this execution.");
        }

        writeln!(f, "## Steps")?;
        writeln!(f)?;
        for step in &self.steps {
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

impl fmt::Display for ExecutionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "### {}. {} ({})",
            self.id,
            self.name,
            StepProgress::of(self)
        )?;
        writeln!(f)?;

        writeln!(f, "- Order: {}", self.order)?;
        writeln!(f, "- Type: {}", self.step_type)?;
        if !self.assigned_members.is_empty() {
            writeln!(
                f,
                "- Assigned: {}",
                names(self.assigned_members.iter().map(|m| m.name.as_str()))
            )?;
        }
        if let Some(started_on) = &self.started_on {
            writeln!(f, "- Started: {}", LocalDateTime(started_on))?;
        }
        if let Some(complete_on) = &self.complete_on {
            writeln!(f, "- Completed: {}", LocalDateTime(complete_on))?;
        }
        if let Some(origin) = self.fallback_origin_step_id {
            writeln!(f, "- Fallback for step: {origin}")?;
        }
        if !self.fallback_reason.is_empty() {
            writeln!(f, "- Reason: {}", self.fallback_reason)?;
        }
        writeln!(f)?;

        if !self.summary.is_empty() {
            writeln!(f, "{}", self.summary)?;
            writeln!(f)?;
        }

        if !self.approvals.is_empty() {
            writeln!(f, "#### Approvals")?;
            writeln!(f)?;
            for approval in &self.approvals {
                let member = self
                    .assigned_members
                    .iter()
                    .find(|m| m.id == approval.execution_member_id)
                    .map_or("unassigned member", |m| m.name.as_str());
                writeln!(f, "- {approval} {member}")?;
            }
            writeln!(f)?;
        }

        if !self.result_summary.is_empty() {
            writeln!(f, "#### Result")?;
            writeln!(f)?;
            writeln!(f, "{}", self.result_summary)?;
            writeln!(f)?;
        }

        if !self.what_went_well.is_empty() || !self.what_could_be_better.is_empty() {
            writeln!(f, "#### Review")?;
            writeln!(f)?;
            if !self.what_went_well.is_empty() {
                writeln!(f, "- Went well: {}", self.what_went_well)?;
            }
            if !self.what_could_be_better.is_empty() {
                writeln!(f, "- Could be better: {}", self.what_could_be_better)?;
            }
            writeln!(f)?;
        }

        if !self.messages.is_empty() {
            writeln!(f, "#### Messages")?;
            writeln!(f)?;
            for message in &self.messages {
                writeln!(f, "- {message}")?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

impl fmt::Display for ExecutionStepApproval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = if self.is_approved { "[x]" } else { "[ ]" };
        write!(f, "{mark} #{}", self.id)?;
        if !self.comments.is_empty() {
            write!(f, " \"{}\"", self.comments)?;
        }
        Ok(())
    }
}

impl fmt::Display for ExecutionStepMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "member {} at {}: {}",
            self.author_id,
            LocalDateTime(&self.created_on),
            self.content
        )
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;

    use super::*;

    fn member(id: u64, name: &str) -> ExecutionMember {
        ExecutionMember {
            id,
            name: name.to_string(),
            email_address: format!("{}@example.com", name.to_lowercase()),
        }
    }

    #[test]
    fn test_plan_display_orders_steps() {
        let mut plan = Plan::new("Release");
        plan.id = 7;
        plan.steps.push(PlanStep::new(2, "Verify", StepType::GoNoGo));
        plan.steps.push(PlanStep::new(1, "Deploy", StepType::Activity));

        let output = format!("{plan}");
        assert!(output.starts_with("# 7. Release\n"));
        let deploy = output.find("Deploy").expect("deploy listed");
        let verify = output.find("Verify").expect("verify listed");
        assert!(deploy < verify);
        assert!(output.contains("[gonogo]"));
    }

    #[test]
    fn test_empty_plan_display() {
        let output = format!("{}", Plan::new("Empty"));
        assert!(output.contains("No steps in this plan."));
    }

    #[test]
    fn test_go_no_go_step_shows_approvals() {
        let alice = member(1, "Alice");
        let bob = member(2, "Bob");
        let mut approved = ExecutionStepApproval::pending(10, alice.id);
        approved.id = 1;
        approved.approve(Timestamp::UNIX_EPOCH, Some("looks good".to_string()));
        let mut pending = ExecutionStepApproval::pending(10, bob.id);
        pending.id = 2;

        let step = ExecutionStep {
            id: 10,
            name: "Verify".to_string(),
            order: 2,
            step_type: StepType::GoNoGo,
            assigned_members: vec![alice, bob],
            approvals: vec![approved, pending],
            ..Default::default()
        };

        let output = format!("{step}");
        assert!(output.contains("### 10. Verify (◐ Awaiting approval (1/2))"));
        assert!(output.contains("- [x] #1 \"looks good\" Alice"));
        assert!(output.contains("- [ ] #2 Bob"));
        assert!(output.contains("- Assigned: Alice, Bob"));
    }

    #[test]
    fn test_fallback_step_metadata() {
        let step = ExecutionStep {
            id: 4,
            name: "Fallback Approval for Deploy".to_string(),
            order: 3,
            step_type: StepType::GoNoGo,
            fallback_origin_step_id: Some(1),
            fallback_reason: "timeout".to_string(),
            ..Default::default()
        };

        let output = format!("{step}");
        assert!(output.contains("- Fallback for step: 1"));
        assert!(output.contains("- Reason: timeout"));
    }

    #[test]
    fn test_member_display_without_email() {
        let member = PlanMember::new("Carol", "");
        assert_eq!(format!("{member}"), "Carol");
        let member = PlanMember::new("Carol", "carol@example.com");
        assert_eq!(format!("{member}"), "Carol <carol@example.com>");
    }
}
