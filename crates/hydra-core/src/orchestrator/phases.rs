//! The phase run loop.

use std::time::Duration;

use log::{debug, error, info, warn};
use serde_json::{json, Map, Value};
use tokio_util::sync::CancellationToken;

use super::{
    ExecutionRequest, ExecutionTarget, OrchestratorEvent, OrchestratorState, PlanOrchestrator,
    RunState,
};
use crate::{
    error::{OrchestratorError, Result},
    graph::{PhaseConfig, PhaseKind},
    models::{PhaseUpdate, Plan, PlanStatus},
    params::{CreatePlan, StartPlan},
};

/// How the phase loop stopped without an error.
enum RunOutcome {
    Finished,
    Paused,
}

impl PlanOrchestrator {
    /// Creates a plan for the query and runs it through every phase.
    ///
    /// Returns the final plan document, or the live one if the run was
    /// paused.
    ///
    /// # Errors
    ///
    /// - `InvalidState` unless the orchestrator is idle; nothing is written to
    ///   the store. A finished run must be [`Self::reset`] first
    /// - `InvalidInput` if the query is blank
    /// - the failing phase's error when a required phase fails; the plan is
    ///   then marked `failed`
    /// - `Cancelled` when [`Self::cancel`] was called during the run
    pub async fn start_plan(&self, params: &StartPlan) -> Result<Plan> {
        let token = {
            let mut run = self.run.lock().await;
            if run.state != OrchestratorState::Idle {
                return Err(OrchestratorError::InvalidState {
                    state: run.state.to_string(),
                    operation: "start a plan".to_string(),
                });
            }
            *run = RunState {
                state: OrchestratorState::Planning,
                ..RunState::default()
            };
            run.cancellation.clone()
        };

        let plan = match self.store.create(&CreatePlan::from(params)).await {
            Ok(plan) => plan,
            Err(e) => {
                self.set_state(OrchestratorState::Idle).await;
                return Err(e);
            }
        };
        self.run.lock().await.plan_id = Some(plan.id.clone());

        info!("Started plan {} for query: {}", plan.id, plan.query);
        self.emit(OrchestratorEvent::PlanStarted {
            plan_id: plan.id.clone(),
            query: plan.query.clone(),
        });

        self.drive(&plan.id, token).await
    }

    /// Runs the phase loop and settles the plan and orchestrator state from
    /// its outcome.
    pub(super) async fn drive(&self, plan_id: &str, token: CancellationToken) -> Result<Plan> {
        {
            let mut run = self.run.lock().await;
            run.driving = true;
            if !token.is_cancelled() {
                run.state = OrchestratorState::Executing;
            }
        }

        let outcome = self.run_phases(plan_id, &token).await;

        {
            let mut run = self.run.lock().await;
            run.driving = false;
            run.current_phase = None;
        }

        match outcome {
            _ if token.is_cancelled() => self.finish_cancelled(plan_id).await,
            Ok(RunOutcome::Paused) => {
                info!("Plan {plan_id} paused");
                self.emit(OrchestratorEvent::PlanPaused {
                    plan_id: plan_id.to_string(),
                });
                self.load_any(plan_id).await
            }
            Ok(RunOutcome::Finished) => match self.finish(plan_id).await {
                Ok(plan) => Ok(plan),
                Err(e) => self.finish_failed(plan_id, e).await,
            },
            Err(e) => self.finish_failed(plan_id, e).await,
        }
    }

    async fn run_phases(&self, plan_id: &str, token: &CancellationToken) -> Result<RunOutcome> {
        for phase in self.graph.ordered_phases(true) {
            if token.is_cancelled() {
                return Err(OrchestratorError::Cancelled {
                    target: format!("plan {plan_id}"),
                });
            }
            if self.state().await == OrchestratorState::Paused {
                return Ok(RunOutcome::Paused);
            }

            let Some(plan) = self.store.load(plan_id).await? else {
                debug!("Plan {plan_id} is no longer live, stopping the phase loop");
                break;
            };
            let record = plan
                .phase(&phase.name)
                .ok_or_else(|| OrchestratorError::PhaseNotFound {
                    plan_id: plan_id.to_string(),
                    phase: phase.name.clone(),
                })?;

            if !record.status.is_runnable() {
                debug!("Phase '{}' already {}", phase.name, record.status.as_str());
                continue;
            }

            if !self.graph.can_start(&phase.name, &plan.phase_statuses()) {
                info!(
                    "Skipping phase '{}' of plan {plan_id}: prerequisites not completed",
                    phase.name
                );
                self.store
                    .update_phase(plan_id, &phase.name, PhaseUpdate::skipped())
                    .await?;
                self.emit(OrchestratorEvent::PhaseSkipped {
                    plan_id: plan_id.to_string(),
                    phase: phase.name.clone(),
                });
                continue;
            }

            match self.execute_phase(&plan, phase, token).await {
                Ok(()) => {}
                Err(e) if phase.required || e.is_cancellation() || token.is_cancelled() => {
                    return Err(e)
                }
                Err(e) => warn!("Optional phase '{}' failed, continuing: {e}", phase.name),
            }
        }

        Ok(RunOutcome::Finished)
    }

    /// Runs one phase and records its outcome on the plan.
    async fn execute_phase(
        &self,
        plan: &Plan,
        phase: &PhaseConfig,
        token: &CancellationToken,
    ) -> Result<()> {
        let plan_id = plan.id.as_str();
        self.set_current_phase(Some(&phase.name)).await;
        self.store
            .update_phase(plan_id, &phase.name, PhaseUpdate::started(phase.role.clone()))
            .await?;

        info!("Starting phase '{}' for plan {plan_id}", phase.name);
        self.emit(OrchestratorEvent::PhaseStarted {
            plan_id: plan_id.to_string(),
            phase: phase.name.clone(),
            role: phase.role.clone(),
        });

        let outcome = match phase.kind {
            PhaseKind::Generic => self.run_generic_phase(plan, phase, token).await,
            PhaseKind::TaskFanOut => self.run_task_phase(plan, phase, token).await,
            PhaseKind::Archive => return self.run_archive_phase(plan_id, phase).await,
        };

        match outcome {
            Ok(output) => {
                self.store
                    .update_phase(plan_id, &phase.name, PhaseUpdate::completed(output.clone()))
                    .await?;
                self.store.add_output(plan_id, &phase.name, output).await?;
                info!("Phase '{}' completed for plan {plan_id}", phase.name);
                self.emit(OrchestratorEvent::PhaseCompleted {
                    plan_id: plan_id.to_string(),
                    phase: phase.name.clone(),
                });
                Ok(())
            }
            Err(e) => {
                self.record_phase_failure(plan_id, phase, &e).await?;
                Err(e)
            }
        }
    }

    async fn record_phase_failure(
        &self,
        plan_id: &str,
        phase: &PhaseConfig,
        error: &OrchestratorError,
    ) -> Result<()> {
        warn!("Phase '{}' failed for plan {plan_id}: {error}", phase.name);
        self.store
            .update_phase(plan_id, &phase.name, PhaseUpdate::failed(error.to_string()))
            .await?;
        self.emit(OrchestratorEvent::PhaseFailed {
            plan_id: plan_id.to_string(),
            phase: phase.name.clone(),
            error: error.to_string(),
        });
        Ok(())
    }

    async fn run_generic_phase(
        &self,
        plan: &Plan,
        phase: &PhaseConfig,
        token: &CancellationToken,
    ) -> Result<Value> {
        let role = phase
            .role
            .clone()
            .unwrap_or_else(|| self.graph.default_role().clone());
        let request = ExecutionRequest {
            role,
            target: ExecutionTarget::Phase(phase.name.clone()),
            instructions: phase.render_instructions(&plan.query),
            query: plan.query.clone(),
            context: Value::Object(phase_context(plan, phase)),
            cancellation: token.clone(),
        };
        self.invoke(request, phase.timeout, token).await
    }

    /// Completes the plan and moves it into the archive area. The phase is
    /// recorded before the move since archived plans are read-only.
    async fn run_archive_phase(&self, plan_id: &str, phase: &PhaseConfig) -> Result<()> {
        let output = json!({ "archived": true });
        self.store
            .update_phase(plan_id, &phase.name, PhaseUpdate::completed(output.clone()))
            .await?;
        self.store.add_output(plan_id, &phase.name, output).await?;

        let archived = match self.store.update_status(plan_id, PlanStatus::Completed).await {
            Ok(()) => self.store.archive(plan_id).await,
            Err(e) => Err(e),
        };
        match archived {
            Ok(path) => {
                info!("Archived plan {plan_id} to {}", path.display());
                self.emit(OrchestratorEvent::PhaseCompleted {
                    plan_id: plan_id.to_string(),
                    phase: phase.name.clone(),
                });
                Ok(())
            }
            Err(e) => {
                self.record_phase_failure(plan_id, phase, &e).await?;
                Err(e)
            }
        }
    }

    /// Calls the executor, racing it against the time budget and the run's
    /// cancellation token.
    pub(super) async fn invoke(
        &self,
        request: ExecutionRequest,
        budget: Duration,
        token: &CancellationToken,
    ) -> Result<Value> {
        let target = request.target.to_string();
        tokio::select! {
            biased;
            _ = token.cancelled() => Err(OrchestratorError::Cancelled { target }),
            outcome = tokio::time::timeout(budget, self.executor.execute(request)) => match outcome {
                Ok(Ok(output)) => Ok(output),
                Ok(Err(e)) => Err(OrchestratorError::execution(target, e)),
                Err(_) => Err(OrchestratorError::Timeout { target, budget }),
            },
        }
    }

    async fn finish(&self, plan_id: &str) -> Result<Plan> {
        self.mark_plan(plan_id, PlanStatus::Completed).await?;
        self.set_state(OrchestratorState::Completed).await;
        info!("Plan {plan_id} completed");
        self.emit(OrchestratorEvent::PlanCompleted {
            plan_id: plan_id.to_string(),
        });
        self.load_any(plan_id).await
    }

    async fn finish_failed(&self, plan_id: &str, failure: OrchestratorError) -> Result<Plan> {
        error!("Plan {plan_id} failed: {failure}");
        self.set_state(OrchestratorState::Failed).await;
        if let Err(e) = self.mark_plan(plan_id, PlanStatus::Failed).await {
            warn!("Could not mark plan {plan_id} failed: {e}");
        }
        self.emit(OrchestratorEvent::PlanFailed {
            plan_id: plan_id.to_string(),
            error: failure.to_string(),
        });
        Err(failure)
    }

    async fn finish_cancelled(&self, plan_id: &str) -> Result<Plan> {
        self.set_state(OrchestratorState::Cancelled).await;
        if let Err(e) = self.mark_plan(plan_id, PlanStatus::Cancelled).await {
            warn!("Could not mark plan {plan_id} cancelled: {e}");
        }
        info!("Plan {plan_id} stopped after cancellation");
        Err(OrchestratorError::Cancelled {
            target: format!("plan {plan_id}"),
        })
    }
}

/// Outputs of the completed prerequisite and context phases, plus the query.
pub(super) fn phase_context(plan: &Plan, phase: &PhaseConfig) -> Map<String, Value> {
    let outputs = plan.phase_outputs();
    let mut context = Map::new();
    context.insert("query".to_string(), Value::String(plan.query.clone()));
    for source in phase.prerequisites.iter().chain(&phase.context_from) {
        if let Some(output) = outputs.get(source) {
            context.insert(source.clone(), output.clone());
        }
    }
    context
}
