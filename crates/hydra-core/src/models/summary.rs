//! Plan summary types.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{PhaseStatus, Plan, PlanStatus, TaskStatus};

/// Compact view of a plan with phase and task counts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanSummary {
    pub id: String,
    pub query: String,
    pub status: PlanStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub total_phases: u32,
    pub completed_phases: u32,
    pub total_tasks: u32,
    pub completed_tasks: u32,
    pub failed_tasks: u32,
}

impl From<&Plan> for PlanSummary {
    fn from(plan: &Plan) -> Self {
        let count_phases = |status: PhaseStatus| {
            plan.phases
                .values()
                .filter(|record| record.status == status)
                .count() as u32
        };
        let count_tasks =
            |status: TaskStatus| plan.tasks.iter().filter(|task| task.status == status).count() as u32;

        Self {
            id: plan.id.clone(),
            query: plan.query.clone(),
            status: plan.status,
            created_at: plan.created_at,
            updated_at: plan.updated_at,
            total_phases: plan.phases.len() as u32,
            completed_phases: count_phases(PhaseStatus::Completed),
            total_tasks: plan.tasks.len() as u32,
            completed_tasks: count_tasks(TaskStatus::Completed),
            failed_tasks: count_tasks(TaskStatus::Failed),
        }
    }
}
