//! Plan template operations for the Coordinator.

use super::Coordinator;
use crate::{error::Result, models::Plan};

impl Coordinator {
    /// Creates a plan with its members, steps and fallback steps.
    pub async fn create_plan(&self, plan: &Plan) -> Result<Plan> {
        let plan = plan.clone();
        self.with_database(move |db| db.create_plan(&plan)).await
    }

    /// Creates an empty plan, named "New Plan" when no name is given.
    pub async fn create_blank_plan(&self, name: Option<&str>) -> Result<Plan> {
        let name = name.map(String::from);
        self.with_database(move |db| db.create_blank_plan(name.as_deref()))
            .await
    }

    /// Retrieves a fully loaded plan by its ID.
    pub async fn get_plan(&self, id: u64) -> Result<Option<Plan>> {
        self.with_database(move |db| db.get_plan(id)).await
    }

    /// Lists every plan in creation order.
    pub async fn list_plans(&self) -> Result<Vec<Plan>> {
        self.with_database(|db| db.list_plans()).await
    }

    /// Merges an edited plan into the stored one and returns the result.
    ///
    /// See [`crate::db::Database::update_plan`] for the merge rules.
    pub async fn update_plan(&self, plan: &Plan) -> Result<Plan> {
        let plan = plan.clone();
        self.with_database(move |db| db.update_plan(&plan)).await
    }

    /// Deletes a plan. Deleting a missing plan is not an error.
    pub async fn delete_plan(&self, id: u64) -> Result<()> {
        self.with_database(move |db| db.delete_plan(id)).await
    }
}
