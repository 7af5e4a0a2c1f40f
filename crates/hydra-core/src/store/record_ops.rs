//! Phase, task, status and output updates for the PlanStore.

use serde_json::Value;

use super::PlanStore;
use crate::{
    error::Result,
    models::{NewTask, PhaseRecord, PhaseUpdate, PlanStatus, TaskRecord, TaskUpdate},
};

impl PlanStore {
    /// Merges fields into the named phase record.
    ///
    /// # Errors
    ///
    /// `PlanNotFound` or `PhaseNotFound` if either name is unknown.
    pub async fn update_phase(
        &self,
        id: &str,
        phase: &str,
        update: PhaseUpdate,
    ) -> Result<PhaseRecord> {
        let id = id.to_string();
        let phase = phase.to_string();
        self.write(move |documents, _| documents.update_phase(&id, &phase, update))
            .await
    }

    /// Moves the plan to a new lifecycle status.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for backward transitions or for `archived`, which only
    /// [`PlanStore::archive`] applies.
    pub async fn update_status(&self, id: &str, status: PlanStatus) -> Result<()> {
        let id = id.to_string();
        self.write(move |documents, _| documents.update_status(&id, status))
            .await
    }

    /// Appends a task, assigning `task-N` when no id is given.
    pub async fn add_task(&self, id: &str, task: NewTask) -> Result<TaskRecord> {
        let id = id.to_string();
        self.write(move |documents, _| documents.add_task(&id, task))
            .await
    }

    /// Merges fields into an existing task.
    ///
    /// # Errors
    ///
    /// `TaskNotFound` if the plan has no task with `task_id`.
    pub async fn update_task(
        &self,
        id: &str,
        task_id: &str,
        update: TaskUpdate,
    ) -> Result<TaskRecord> {
        let id = id.to_string();
        let task_id = task_id.to_string();
        self.write(move |documents, _| documents.update_task(&id, &task_id, update))
            .await
    }

    /// Stores a named output on the plan.
    pub async fn add_output(&self, id: &str, key: &str, value: Value) -> Result<()> {
        let id = id.to_string();
        let key = key.to_string();
        self.write(move |documents, _| documents.add_output(&id, &key, value))
            .await
    }
}
