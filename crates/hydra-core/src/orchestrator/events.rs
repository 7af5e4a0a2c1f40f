//! Progress notifications broadcast by the orchestrator.

use serde::Serialize;

use crate::models::Role;

/// One orchestration transition. Delivered to every
/// [`super::PlanOrchestrator::subscribe`] receiver; slow receivers may miss
/// events once the broadcast buffer is full.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum OrchestratorEvent {
    PlanStarted { plan_id: String, query: String },
    PlanPaused { plan_id: String },
    PlanResumed { plan_id: String },
    PlanCompleted { plan_id: String },
    PlanFailed { plan_id: String, error: String },
    PlanCancelled { plan_id: Option<String> },
    PhaseStarted { plan_id: String, phase: String, role: Option<Role> },
    PhaseCompleted { plan_id: String, phase: String },
    PhaseFailed { plan_id: String, phase: String, error: String },
    PhaseSkipped { plan_id: String, phase: String },
    TaskStarted { plan_id: String, task_id: String, role: Role },
    TaskCompleted { plan_id: String, task_id: String },
    TaskFailed { plan_id: String, task_id: String, error: String },
    TaskSkipped { plan_id: String, task_id: String },
}
