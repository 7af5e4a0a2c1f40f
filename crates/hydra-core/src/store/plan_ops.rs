//! Whole-plan operations for the PlanStore.

use std::path::PathBuf;

use super::PlanStore;
use crate::{
    display::PlanSummaries,
    error::Result,
    models::{Plan, PlanFilter, PlanSummary},
    params::{CreatePlan, ListPlans},
};

impl PlanStore {
    /// Creates a new plan with a generated id and every configured phase
    /// seeded as `pending`.
    ///
    /// # Errors
    ///
    /// Returns `OrchestratorError::InvalidInput` if the query is blank.
    pub async fn create(&self, params: &CreatePlan) -> Result<Plan> {
        let query = params.query.clone();
        let metadata = params.metadata.clone();
        self.write(move |documents, graph| documents.create(&query, metadata, graph))
            .await
    }

    /// Retrieves a live plan by id. A missing plan is `Ok(None)`.
    pub async fn load(&self, id: &str) -> Result<Option<Plan>> {
        let id = id.to_string();
        self.blocking(move |documents, _| documents.load(&id)).await
    }

    /// Overwrites the plan's document and returns it with `updated_at`
    /// stamped.
    pub async fn save(&self, plan: Plan) -> Result<Plan> {
        self.write(move |documents, _| {
            let mut plan = plan;
            documents.save(&mut plan)?;
            Ok(plan)
        })
        .await
    }

    /// Permanently deletes a live plan. Returns `false` if it did not exist.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let id = id.to_string();
        self.write(move |documents, _| documents.delete(&id)).await
    }

    /// Lists live plans newest-first.
    pub async fn list(&self, params: &ListPlans) -> Result<Vec<Plan>> {
        let filter = PlanFilter::from(params);
        self.blocking(move |documents, _| documents.list(&filter)).await
    }

    /// Lists live plans as summaries.
    pub async fn list_summaries(&self, params: &ListPlans) -> Result<PlanSummaries> {
        let plans = self.list(params).await?;
        Ok(PlanSummaries(plans.iter().map(PlanSummary::from).collect()))
    }

    /// Moves a plan into the archive area and returns the archived
    /// document's path.
    pub async fn archive(&self, id: &str) -> Result<PathBuf> {
        let id = id.to_string();
        self.write(move |documents, _| documents.archive(&id)).await
    }

    /// Retrieves an archived plan by id.
    pub async fn load_archived(&self, id: &str) -> Result<Option<Plan>> {
        let id = id.to_string();
        self.blocking(move |documents, _| documents.load_archived(&id))
            .await
    }

    /// Lists archived plans newest-first.
    pub async fn list_archived(&self, limit: Option<usize>) -> Result<Vec<Plan>> {
        self.blocking(move |documents, _| documents.list_archived(limit))
            .await
    }

    /// The newest plan with status `active`, if any.
    pub async fn get_active_plan(&self) -> Result<Option<Plan>> {
        self.blocking(|documents, _| documents.active_plan()).await
    }

    /// Archives every `completed` plan older than `max_age_days` and returns
    /// how many were archived.
    pub async fn cleanup(&self, max_age_days: u32) -> Result<usize> {
        self.write(move |documents, _| documents.cleanup(max_age_days))
            .await
    }
}
