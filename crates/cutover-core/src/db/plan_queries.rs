//! Plan template operations and the merge update.

use std::collections::HashSet;

use log::debug;
use rusqlite::{params, Connection, OptionalExtension};

use super::utils::{id_column, step_type_column};
use crate::{
    error::{CutoverError, DatabaseResultExt, Result},
    models::{FallbackStep, Plan, PlanMember, PlanStep, DEFAULT_PLAN_NAME},
};

const INSERT_PLAN_SQL: &str = "INSERT INTO plans (name) VALUES (?1)";
const SELECT_PLAN_SQL: &str = "SELECT id, name FROM plans WHERE id = ?1";
const SELECT_PLAN_IDS_SQL: &str = "SELECT id FROM plans ORDER BY id";
const UPDATE_PLAN_SQL: &str = "UPDATE plans SET name = ?1 WHERE id = ?2";
const DELETE_PLAN_SQL: &str = "DELETE FROM plans WHERE id = ?1";

const INSERT_MEMBER_SQL: &str =
    "INSERT INTO plan_members (plan_id, name, email_address) VALUES (?1, ?2, ?3)";
const UPDATE_MEMBER_SQL: &str =
    "UPDATE plan_members SET name = ?1, email_address = ?2 WHERE id = ?3";
const DELETE_MEMBER_SQL: &str = "DELETE FROM plan_members WHERE id = ?1";
const SELECT_MEMBERS_SQL: &str =
    "SELECT id, name, email_address FROM plan_members WHERE plan_id = ?1 ORDER BY id";

const INSERT_STEP_SQL: &str = "INSERT INTO plan_steps (plan_id, step_order, name, summary, screenshot, step_type) VALUES (?1, ?2, ?3, ?4, ?5, ?6)";
const UPDATE_STEP_SQL: &str = "UPDATE plan_steps SET step_order = ?1, name = ?2, summary = ?3, screenshot = ?4, step_type = ?5 WHERE id = ?6";
const DELETE_STEP_SQL: &str = "DELETE FROM plan_steps WHERE id = ?1";
const SELECT_STEPS_SQL: &str = "SELECT id, step_order, name, summary, screenshot, step_type FROM plan_steps WHERE plan_id = ?1 ORDER BY id";
const LINK_STEP_MEMBER_SQL: &str =
    "INSERT OR IGNORE INTO plan_step_members (plan_step_id, plan_member_id) VALUES (?1, ?2)";
const CLEAR_STEP_MEMBERS_SQL: &str = "DELETE FROM plan_step_members WHERE plan_step_id = ?1";
const SELECT_STEP_MEMBERS_SQL: &str = "SELECT m.id, m.name, m.email_address FROM plan_step_members sm JOIN plan_members m ON m.id = sm.plan_member_id WHERE sm.plan_step_id = ?1 ORDER BY m.id";

const INSERT_FALLBACK_SQL: &str = "INSERT INTO fallback_steps (plan_step_id, step_order, name, summary, screenshot, step_type) VALUES (?1, ?2, ?3, ?4, ?5, ?6)";
const UPDATE_FALLBACK_SQL: &str = "UPDATE fallback_steps SET step_order = ?1, name = ?2, summary = ?3, screenshot = ?4, step_type = ?5 WHERE id = ?6";
const DELETE_FALLBACK_SQL: &str = "DELETE FROM fallback_steps WHERE id = ?1";
const SELECT_FALLBACKS_SQL: &str = "SELECT id, step_order, name, summary, screenshot, step_type FROM fallback_steps WHERE plan_step_id = ?1 ORDER BY id";
const LINK_FALLBACK_MEMBER_SQL: &str =
    "INSERT OR IGNORE INTO fallback_step_members (fallback_step_id, plan_member_id) VALUES (?1, ?2)";
const CLEAR_FALLBACK_MEMBERS_SQL: &str =
    "DELETE FROM fallback_step_members WHERE fallback_step_id = ?1";
const SELECT_FALLBACK_MEMBERS_SQL: &str = "SELECT m.id, m.name, m.email_address FROM fallback_step_members fm JOIN plan_members m ON m.id = fm.plan_member_id WHERE fm.fallback_step_id = ?1 ORDER BY m.id";

/// Persisted members of a plan, keyed by the identity the incoming payload
/// used for them.
///
/// Members inserted during the current write are registered under 0, so
/// they are only reachable by name and email.
#[derive(Default)]
struct MemberPool {
    entries: Vec<(u64, PlanMember)>,
}

impl MemberPool {
    fn add(&mut self, payload_id: u64, member: PlanMember) {
        self.entries.push((payload_id, member));
    }

    /// Persisted id a member reference points at, if any.
    fn resolve(&self, reference: &PlanMember) -> Option<u64> {
        let found = if reference.id != 0 {
            self.entries.iter().find(|(id, _)| *id == reference.id)
        } else {
            self.entries
                .iter()
                .find(|(_, m)| reference.same_person(&m.name, &m.email_address))
        };
        found.map(|(_, member)| member.id)
    }
}

impl super::Database {
    /// Creates a plan together with its members, steps and fallback steps.
    ///
    /// Identities in the payload are ignored; the returned plan carries the
    /// ones assigned by the store. Step member references are resolved against
    /// the payload's members and dropped when they match none of them.
    pub fn create_plan(&mut self, plan: &Plan) -> Result<Plan> {
        ensure_unique_emails(plan.members.iter())?;

        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        tx.execute(INSERT_PLAN_SQL, params![plan.name])
            .db_context("Failed to insert plan")?;
        let plan_id = tx.last_insert_rowid() as u64;

        let mut pool = MemberPool::default();
        for member in &plan.members {
            let id = insert_member(&tx, plan_id, member)?;
            pool.add(
                member.id,
                PlanMember {
                    id,
                    ..member.clone()
                },
            );
        }

        for step in &plan.steps {
            insert_step(&tx, plan_id, step, &pool)?;
        }

        let created = load_plan(&tx, plan_id)?.ok_or(CutoverError::PlanNotFound { id: plan_id })?;

        tx.commit().db_context("Failed to commit transaction")?;

        debug!("Created plan {plan_id} with {} steps", created.steps.len());
        Ok(created)
    }

    /// Creates an empty plan, named "New Plan" when no name is given.
    pub fn create_blank_plan(&mut self, name: Option<&str>) -> Result<Plan> {
        self.create_plan(&Plan::new(name.unwrap_or(DEFAULT_PLAN_NAME)))
    }

    /// Retrieves a plan with its members, steps and fallback steps.
    pub fn get_plan(&self, id: u64) -> Result<Option<Plan>> {
        load_plan(&self.connection, id)
    }

    /// Lists every plan, fully loaded, in creation order.
    pub fn list_plans(&self) -> Result<Vec<Plan>> {
        let mut stmt = self
            .connection
            .prepare(SELECT_PLAN_IDS_SQL)
            .db_context("Failed to prepare query")?;

        let ids = stmt
            .query_map([], |row| id_column(row, 0))
            .db_context("Failed to query plans")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .db_context("Failed to collect plan results")?;

        let mut plans = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(plan) = load_plan(&self.connection, id)? {
                plans.push(plan);
            }
        }
        Ok(plans)
    }

    /// Merges an edited plan into the stored one.
    ///
    /// Members are merged first, then steps, then each step's fallback steps.
    /// Within each collection, stored rows missing from the payload are
    /// removed, entries with id 0 are inserted and entries with a known id are
    /// updated in place; unknown non-zero ids are ignored. Member references
    /// are resolved against the merged member pool.
    pub fn update_plan(&mut self, plan: &Plan) -> Result<Plan> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let existing = load_plan(&tx, plan.id)?.ok_or(CutoverError::PlanNotFound { id: plan.id })?;
        ensure_unique_emails(
            plan.members
                .iter()
                .filter(|m| m.id == 0 || existing.members.iter().any(|e| e.id == m.id)),
        )?;

        tx.execute(UPDATE_PLAN_SQL, params![plan.name, plan.id as i64])
            .db_context("Failed to update plan")?;

        let pool = merge_members(&tx, &existing, plan)?;
        merge_steps(&tx, &existing, plan, &pool)?;

        let updated = load_plan(&tx, plan.id)?.ok_or(CutoverError::PlanNotFound { id: plan.id })?;

        tx.commit().db_context("Failed to commit transaction")?;

        debug!("Merged plan {}", plan.id);
        Ok(updated)
    }

    /// Deletes a plan and its template rows. Executions of the plan survive
    /// with their plan link cleared.
    pub fn delete_plan(&mut self, id: u64) -> Result<()> {
        let deleted = self
            .connection
            .execute(DELETE_PLAN_SQL, params![id as i64])
            .db_context("Failed to delete plan")?;

        if deleted == 0 {
            debug!("Plan {id} not found, nothing to delete");
        }
        Ok(())
    }
}

/// Loads a fully populated plan.
pub(super) fn load_plan(conn: &Connection, id: u64) -> Result<Option<Plan>> {
    let header = conn
        .query_row(SELECT_PLAN_SQL, params![id as i64], |row| {
            Ok((id_column(row, 0)?, row.get::<_, String>(1)?))
        })
        .optional()
        .db_context("Failed to query plan")?;

    let Some((id, name)) = header else {
        return Ok(None);
    };

    let members = query_members(conn, SELECT_MEMBERS_SQL, id)?;

    let mut stmt = conn
        .prepare(SELECT_STEPS_SQL)
        .db_context("Failed to prepare query")?;
    let mut steps = stmt
        .query_map(params![id as i64], |row| {
            Ok(PlanStep {
                id: id_column(row, 0)?,
                order: row.get(1)?,
                name: row.get(2)?,
                summary: row.get(3)?,
                screenshot: row.get(4)?,
                step_type: step_type_column(row, 5)?,
                assigned_members: Vec::new(),
                fallback_steps: Vec::new(),
            })
        })
        .db_context("Failed to query plan steps")?
        .collect::<std::result::Result<Vec<_>, _>>()
        .db_context("Failed to collect plan steps")?;

    for step in &mut steps {
        step.assigned_members = query_members(conn, SELECT_STEP_MEMBERS_SQL, step.id)?;
        step.fallback_steps = load_fallback_steps(conn, step.id)?;
    }

    Ok(Some(Plan {
        id,
        name,
        steps,
        members,
    }))
}

/// Loads the fallback definitions of a plan step in declaration order.
pub(super) fn load_fallback_steps(
    conn: &Connection,
    plan_step_id: u64,
) -> Result<Vec<FallbackStep>> {
    let mut stmt = conn
        .prepare(SELECT_FALLBACKS_SQL)
        .db_context("Failed to prepare query")?;
    let mut fallbacks = stmt
        .query_map(params![plan_step_id as i64], |row| {
            Ok(FallbackStep {
                id: id_column(row, 0)?,
                order: row.get(1)?,
                name: row.get(2)?,
                summary: row.get(3)?,
                screenshot: row.get(4)?,
                step_type: step_type_column(row, 5)?,
                assigned_members: Vec::new(),
            })
        })
        .db_context("Failed to query fallback steps")?
        .collect::<std::result::Result<Vec<_>, _>>()
        .db_context("Failed to collect fallback steps")?;

    for fallback in &mut fallbacks {
        fallback.assigned_members = query_members(conn, SELECT_FALLBACK_MEMBERS_SQL, fallback.id)?;
    }
    Ok(fallbacks)
}

fn query_members(conn: &Connection, sql: &str, owner_id: u64) -> Result<Vec<PlanMember>> {
    let mut stmt = conn.prepare(sql).db_context("Failed to prepare query")?;
    let members = stmt
        .query_map(params![owner_id as i64], |row| {
            Ok(PlanMember {
                id: id_column(row, 0)?,
                name: row.get(1)?,
                email_address: row.get(2)?,
            })
        })
        .db_context("Failed to query plan members")?
        .collect::<std::result::Result<Vec<_>, _>>()
        .db_context("Failed to collect plan members")?;
    Ok(members)
}

fn insert_member(conn: &Connection, plan_id: u64, member: &PlanMember) -> Result<u64> {
    conn.execute(
        INSERT_MEMBER_SQL,
        params![plan_id as i64, member.name, member.email_address],
    )
    .db_context("Failed to insert plan member")?;
    Ok(conn.last_insert_rowid() as u64)
}

fn link_members(
    conn: &Connection,
    sql: &str,
    owner_id: u64,
    assigned: &[PlanMember],
    pool: &MemberPool,
) -> Result<()> {
    for reference in assigned {
        match pool.resolve(reference) {
            Some(member_id) => {
                conn.execute(sql, params![owner_id as i64, member_id as i64])
                    .db_context("Failed to assign member")?;
            }
            None => debug!(
                "Dropping unresolved member reference {} <{}>",
                reference.name, reference.email_address
            ),
        }
    }
    Ok(())
}

fn insert_step(conn: &Connection, plan_id: u64, step: &PlanStep, pool: &MemberPool) -> Result<u64> {
    conn.execute(
        INSERT_STEP_SQL,
        params![
            plan_id as i64,
            step.order,
            step.name,
            step.summary,
            step.screenshot.as_deref(),
            step.step_type.as_str()
        ],
    )
    .db_context("Failed to insert plan step")?;
    let step_id = conn.last_insert_rowid() as u64;

    link_members(conn, LINK_STEP_MEMBER_SQL, step_id, &step.assigned_members, pool)?;
    for fallback in &step.fallback_steps {
        insert_fallback(conn, step_id, fallback, pool)?;
    }
    Ok(step_id)
}

fn insert_fallback(
    conn: &Connection,
    plan_step_id: u64,
    fallback: &FallbackStep,
    pool: &MemberPool,
) -> Result<u64> {
    conn.execute(
        INSERT_FALLBACK_SQL,
        params![
            plan_step_id as i64,
            fallback.order,
            fallback.name,
            fallback.summary,
            fallback.screenshot.as_deref(),
            fallback.step_type.as_str()
        ],
    )
    .db_context("Failed to insert fallback step")?;
    let fallback_id = conn.last_insert_rowid() as u64;

    link_members(
        conn,
        LINK_FALLBACK_MEMBER_SQL,
        fallback_id,
        &fallback.assigned_members,
        pool,
    )?;
    Ok(fallback_id)
}

/// Member email addresses are unique within a plan, ignoring case.
fn ensure_unique_emails<'a>(members: impl Iterator<Item = &'a PlanMember>) -> Result<()> {
    let mut seen = HashSet::new();
    for member in members {
        if !seen.insert(member.email_address.trim().to_lowercase()) {
            return Err(CutoverError::invalid_input(
                "members",
                format!("email address '{}' is used more than once", member.email_address),
            ));
        }
    }
    Ok(())
}

/// Ids present in a payload collection, ignoring new (0) entries.
fn kept_ids(ids: impl Iterator<Item = u64>) -> HashSet<u64> {
    ids.filter(|id| *id != 0).collect()
}

fn merge_members(conn: &Connection, existing: &Plan, incoming: &Plan) -> Result<MemberPool> {
    let kept = kept_ids(incoming.members.iter().map(|m| m.id));
    for member in existing.members.iter().filter(|m| !kept.contains(&m.id)) {
        conn.execute(DELETE_MEMBER_SQL, params![member.id as i64])
            .db_context("Failed to delete plan member")?;
    }

    let mut pool = MemberPool::default();
    for member in &incoming.members {
        if member.id == 0 {
            let id = insert_member(conn, existing.id, member)?;
            pool.add(
                0,
                PlanMember {
                    id,
                    ..member.clone()
                },
            );
        } else if existing.members.iter().any(|m| m.id == member.id) {
            conn.execute(
                UPDATE_MEMBER_SQL,
                params![member.name, member.email_address, member.id as i64],
            )
            .db_context("Failed to update plan member")?;
            pool.add(member.id, member.clone());
        } else {
            debug!("Ignoring unknown plan member id {}", member.id);
        }
    }
    Ok(pool)
}

fn merge_steps(
    conn: &Connection,
    existing: &Plan,
    incoming: &Plan,
    pool: &MemberPool,
) -> Result<()> {
    let kept = kept_ids(incoming.steps.iter().map(|s| s.id));
    for step in existing.steps.iter().filter(|s| !kept.contains(&s.id)) {
        conn.execute(DELETE_STEP_SQL, params![step.id as i64])
            .db_context("Failed to delete plan step")?;
    }

    for step in &incoming.steps {
        if step.id == 0 {
            insert_step(conn, existing.id, step, pool)?;
            continue;
        }
        let Some(stored) = existing.step(step.id) else {
            debug!("Ignoring unknown plan step id {}", step.id);
            continue;
        };

        conn.execute(
            UPDATE_STEP_SQL,
            params![
                step.order,
                step.name,
                step.summary,
                step.screenshot.as_deref(),
                step.step_type.as_str(),
                step.id as i64
            ],
        )
        .db_context("Failed to update plan step")?;

        conn.execute(CLEAR_STEP_MEMBERS_SQL, params![step.id as i64])
            .db_context("Failed to clear step members")?;
        link_members(conn, LINK_STEP_MEMBER_SQL, step.id, &step.assigned_members, pool)?;

        merge_fallbacks(conn, stored, step, pool)?;
    }
    Ok(())
}

fn merge_fallbacks(
    conn: &Connection,
    existing: &PlanStep,
    incoming: &PlanStep,
    pool: &MemberPool,
) -> Result<()> {
    let kept = kept_ids(incoming.fallback_steps.iter().map(|f| f.id));
    for fallback in existing.fallback_steps.iter().filter(|f| !kept.contains(&f.id)) {
        conn.execute(DELETE_FALLBACK_SQL, params![fallback.id as i64])
            .db_context("Failed to delete fallback step")?;
    }

    for fallback in &incoming.fallback_steps {
        if fallback.id == 0 {
            insert_fallback(conn, existing.id, fallback, pool)?;
            continue;
        }
        if !existing.fallback_steps.iter().any(|f| f.id == fallback.id) {
            debug!("Ignoring unknown fallback step id {}", fallback.id);
            continue;
        }

        conn.execute(
            UPDATE_FALLBACK_SQL,
            params![
                fallback.order,
                fallback.name,
                fallback.summary,
                fallback.screenshot.as_deref(),
                fallback.step_type.as_str(),
                fallback.id as i64
            ],
        )
        .db_context("Failed to update fallback step")?;

        conn.execute(CLEAR_FALLBACK_MEMBERS_SQL, params![fallback.id as i64])
            .db_context("Failed to clear fallback step members")?;
        link_members(
            conn,
            LINK_FALLBACK_MEMBER_SQL,
            fallback.id,
            &fallback.assigned_members,
            pool,
        )?;
    }
    Ok(())
}
