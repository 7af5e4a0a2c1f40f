//! Partial updates to phases, tasks, status and outputs of a plan document.

use jiff::Timestamp;
use serde_json::Value;

use super::PlanDocuments;
use crate::{
    error::{OrchestratorError, Result},
    models::{NewTask, PhaseRecord, PhaseUpdate, PlanStatus, TaskRecord, TaskUpdate},
};

impl PlanDocuments {
    /// Merges `update` into the named phase record.
    pub fn update_phase(&self, id: &str, phase: &str, update: PhaseUpdate) -> Result<PhaseRecord> {
        self.modify(id, |plan| {
            let record = plan
                .phases
                .get_mut(phase)
                .ok_or_else(|| OrchestratorError::PhaseNotFound {
                    plan_id: id.to_string(),
                    phase: phase.to_string(),
                })?;
            update.apply(record);
            Ok(record.clone())
        })
    }

    /// Moves the plan to `status`, enforcing forward-only transitions.
    /// `archived` is reserved for [`PlanDocuments::archive`].
    pub fn update_status(&self, id: &str, status: PlanStatus) -> Result<()> {
        if status == PlanStatus::Archived {
            return Err(OrchestratorError::invalid_input("status")
                .with_reason("archived status is applied by archiving the plan"));
        }
        self.modify(id, |plan| {
            if !plan.status.can_transition_to(status) {
                return Err(OrchestratorError::invalid_input("status").with_reason(format!(
                    "cannot move plan {id} from {} to {}",
                    plan.status.as_str(),
                    status.as_str()
                )));
            }
            plan.status = status;
            Ok(())
        })
    }

    /// Appends a pending task, generating an id when none is given.
    pub fn add_task(&self, id: &str, task: NewTask) -> Result<TaskRecord> {
        self.modify(id, |plan| {
            let task_id = match task.id.as_deref().map(str::trim) {
                Some(explicit) if !explicit.is_empty() => {
                    if plan.task(explicit).is_some() {
                        return Err(OrchestratorError::invalid_input("task.id").with_reason(
                            format!("task '{explicit}' already exists in plan {id}"),
                        ));
                    }
                    explicit.to_string()
                }
                _ => plan.next_task_id(),
            };
            let record = task.into_record(task_id, Timestamp::now());
            plan.tasks.push(record.clone());
            Ok(record)
        })
    }

    /// Merges `update` into an existing task.
    pub fn update_task(&self, id: &str, task_id: &str, update: TaskUpdate) -> Result<TaskRecord> {
        self.modify(id, |plan| {
            let record = plan
                .task_mut(task_id)
                .ok_or_else(|| OrchestratorError::TaskNotFound {
                    plan_id: id.to_string(),
                    task_id: task_id.to_string(),
                })?;
            update.apply(record);
            Ok(record.clone())
        })
    }

    /// Stores a named output, replacing any previous value under `key`.
    pub fn add_output(&self, id: &str, key: &str, value: Value) -> Result<()> {
        self.modify(id, |plan| {
            plan.outputs.insert(key.to_string(), value);
            Ok(())
        })
    }
}
