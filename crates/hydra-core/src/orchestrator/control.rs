//! Pause, resume, cancel and status reporting.

use log::{info, warn};

use super::{OrchestratorEvent, OrchestratorState, PlanOrchestrator, RunState, StatusReport};
use crate::{
    error::{OrchestratorError, Result},
    models::{Plan, PlanStatus},
};

impl PlanOrchestrator {
    /// Requests a pause. The phase in flight runs to completion and the run
    /// stops before the next phase, leaving the plan `active`.
    ///
    /// # Errors
    ///
    /// `InvalidState` unless a plan is executing.
    pub async fn pause(&self) -> Result<()> {
        let mut run = self.run.lock().await;
        if run.state != OrchestratorState::Executing {
            return Err(OrchestratorError::InvalidState {
                state: run.state.to_string(),
                operation: "pause".to_string(),
            });
        }
        run.state = OrchestratorState::Paused;
        info!(
            "Pause requested for plan {}",
            run.plan_id.as_deref().unwrap_or("-")
        );
        Ok(())
    }

    /// Continues a paused run from the first phase that is still `pending`
    /// or `active`.
    ///
    /// # Errors
    ///
    /// `InvalidState` unless the run is paused and the phase loop has
    /// stopped; otherwise the same errors as [`Self::start_plan`].
    pub async fn resume(&self) -> Result<Plan> {
        let (plan_id, token) = {
            let mut run = self.run.lock().await;
            let parked = run.state == OrchestratorState::Paused && !run.driving;
            let plan_id = match (&run.plan_id, parked) {
                (Some(plan_id), true) => plan_id.clone(),
                _ => {
                    let state = if run.driving && run.state == OrchestratorState::Paused {
                        "pausing".to_string()
                    } else {
                        run.state.to_string()
                    };
                    return Err(OrchestratorError::InvalidState {
                        state,
                        operation: "resume".to_string(),
                    });
                }
            };
            run.state = OrchestratorState::Executing;
            (plan_id, run.cancellation.clone())
        };

        info!("Resuming plan {plan_id}");
        self.emit(OrchestratorEvent::PlanResumed {
            plan_id: plan_id.clone(),
        });
        self.drive(&plan_id, token).await
    }

    /// Signals cancellation to the run in flight and marks its plan
    /// `cancelled`. Running executor calls observe the signal; the run then
    /// stops with [`OrchestratorError::Cancelled`].
    ///
    /// # Errors
    ///
    /// `InvalidState` when nothing is planning, executing or paused.
    pub async fn cancel(&self) -> Result<()> {
        let plan_id = {
            let mut run = self.run.lock().await;
            if !run.state.is_busy() {
                return Err(OrchestratorError::InvalidState {
                    state: run.state.to_string(),
                    operation: "cancel".to_string(),
                });
            }
            run.state = OrchestratorState::Cancelled;
            run.cancellation.cancel();
            run.plan_id.clone()
        };

        warn!(
            "Cancelling plan {}",
            plan_id.as_deref().unwrap_or("being created")
        );
        if let Some(plan_id) = &plan_id {
            self.mark_plan(plan_id, PlanStatus::Cancelled).await?;
        }
        self.emit(OrchestratorEvent::PlanCancelled { plan_id });
        Ok(())
    }

    /// Snapshot of the orchestrator state and the current plan. The plan is
    /// read from the archive once the run has archived it.
    pub async fn get_status(&self) -> Result<StatusReport> {
        let (state, plan_id, current_phase) = {
            let run = self.run.lock().await;
            (run.state, run.plan_id.clone(), run.current_phase.clone())
        };

        let plan = match &plan_id {
            Some(plan_id) => self.find_plan(plan_id).await?,
            None => None,
        };
        let phase_outputs = plan.as_ref().map(Plan::phase_outputs).unwrap_or_default();

        Ok(StatusReport {
            state,
            plan_id,
            current_phase,
            phase_outputs,
            plan,
        })
    }

    /// Returns a finished orchestrator to `idle`, forgetting the last plan.
    ///
    /// # Errors
    ///
    /// `InvalidState` while a run is planning, executing or paused.
    pub async fn reset(&self) -> Result<()> {
        let mut run = self.run.lock().await;
        if run.state.is_busy() {
            return Err(OrchestratorError::InvalidState {
                state: run.state.to_string(),
                operation: "reset".to_string(),
            });
        }
        *run = RunState::default();
        Ok(())
    }
}
