//! Task fan-out for phases of kind [`PhaseKind::TaskFanOut`].
//!
//! [`PhaseKind::TaskFanOut`]: crate::graph::PhaseKind::TaskFanOut

use std::{sync::Arc, time::Duration};

use futures::future::join_all;
use log::{debug, info, warn};
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use super::{
    phases::phase_context, ExecutionRequest, ExecutionTarget, OrchestratorEvent,
    PlanOrchestrator, TaskBreakdown, TaskFailurePolicy,
};
use crate::{
    error::{OrchestratorError, Result},
    graph::PhaseConfig,
    models::{PhaseUpdate, Plan, Role, TaskRecord, TaskStatus, TaskUpdate},
};

/// The `{completed, failed, skipped}` output of a fan-out phase.
#[derive(Debug, Default, Serialize)]
struct TaskOutcomes {
    completed: Vec<String>,
    failed: Vec<String>,
    skipped: Vec<String>,
}

impl TaskOutcomes {
    fn dependencies_met(&self, task: &TaskRecord) -> bool {
        task.dependencies
            .iter()
            .all(|dependency| self.completed.contains(dependency))
    }

    fn total(&self) -> usize {
        self.completed.len() + self.failed.len() + self.skipped.len()
    }
}

impl PlanOrchestrator {
    /// Runs the breakdown's groups in order, the tasks of each group
    /// concurrently, and returns the aggregate outcome.
    ///
    /// Within a group, tasks are dispatched highest priority first, which
    /// decides who gets a permit when concurrency is bounded.
    ///
    /// A failed task never fails its siblings. Tasks whose dependencies did
    /// not complete, and tasks of groups reached after cancellation, are
    /// skipped and stay `pending` in the store.
    pub(super) async fn run_task_phase(
        &self,
        plan: &Plan,
        phase: &PhaseConfig,
        token: &CancellationToken,
    ) -> Result<Value> {
        let plan_id = plan.id.as_str();
        let breakdown = TaskBreakdown::from_plan(plan, phase)?;
        self.register_tasks(plan, &breakdown).await?;
        info!(
            "Phase '{}' fans out over {} task(s) in {} group(s)",
            phase.name,
            breakdown.tasks.len(),
            breakdown.groups.len()
        );

        let permits = self.task_permits(phase);
        let budget = self.config.task_timeout.unwrap_or(phase.timeout);
        let mut outcomes = TaskOutcomes::default();

        for (index, group) in breakdown.groups.iter().enumerate() {
            let snapshot = self.load_any(plan_id).await?;
            let mut runnable = Vec::with_capacity(group.len());

            for id in group {
                let Some(task) = snapshot.task(id) else {
                    continue;
                };
                if task.status == TaskStatus::Completed {
                    debug!("Task '{id}' already completed");
                    outcomes.completed.push(id.clone());
                    continue;
                }
                if token.is_cancelled() || !outcomes.dependencies_met(task) {
                    debug!("Skipping task '{id}'");
                    outcomes.skipped.push(id.clone());
                    self.emit(OrchestratorEvent::TaskSkipped {
                        plan_id: plan_id.to_string(),
                        task_id: id.clone(),
                    });
                    continue;
                }
                runnable.push(task.clone());
            }
            // Stable, so equal priorities keep breakdown order
            runnable.sort_by(|a, b| b.priority.cmp(&a.priority));

            debug!(
                "Running group {} of phase '{}' with {} task(s)",
                index + 1,
                phase.name,
                runnable.len()
            );
            let results = join_all(runnable.iter().map(|task| {
                self.execute_task(&snapshot, phase, task, budget, token, permits.clone())
            }))
            .await;

            for (task, result) in runnable.iter().zip(results) {
                match result {
                    Ok(_) => outcomes.completed.push(task.id.clone()),
                    Err(_) => outcomes.failed.push(task.id.clone()),
                }
            }
        }

        let aggregate = serde_json::to_value(&outcomes)?;

        let failure = if token.is_cancelled() {
            Some(OrchestratorError::Cancelled {
                target: format!("phase '{}'", phase.name),
            })
        } else if self.config.task_failure_policy == TaskFailurePolicy::FailPhase
            && !outcomes.failed.is_empty()
        {
            Some(OrchestratorError::Execution {
                target: format!("phase '{}'", phase.name),
                message: format!(
                    "{} of {} task(s) failed: {}",
                    outcomes.failed.len(),
                    outcomes.total(),
                    outcomes.failed.join(", ")
                ),
            })
        } else {
            None
        };

        match failure {
            Some(e) => {
                self.store
                    .update_phase(
                        plan_id,
                        &phase.name,
                        PhaseUpdate::failed(e.to_string()).with_output(aggregate.clone()),
                    )
                    .await?;
                self.store.add_output(plan_id, &phase.name, aggregate).await?;
                Err(e)
            }
            None => Ok(aggregate),
        }
    }

    /// Persists breakdown tasks the plan does not have yet.
    async fn register_tasks(&self, plan: &Plan, breakdown: &TaskBreakdown) -> Result<()> {
        for task in &breakdown.tasks {
            let known = task
                .id
                .as_deref()
                .is_some_and(|id| plan.task(id).is_some());
            if !known {
                self.store.add_task(&plan.id, task.clone()).await?;
            }
        }
        Ok(())
    }

    /// Runs one task. Its outcome is recorded on the task record; the
    /// returned error only tells the caller the task failed.
    async fn execute_task(
        &self,
        plan: &Plan,
        phase: &PhaseConfig,
        task: &TaskRecord,
        budget: Duration,
        token: &CancellationToken,
        permits: Option<Arc<Semaphore>>,
    ) -> Result<Value> {
        let _permit = match permits {
            Some(semaphore) => Some(semaphore.acquire_owned().await.map_err(|e| {
                OrchestratorError::Configuration {
                    message: format!("Task semaphore closed: {e}"),
                }
            })?),
            None => None,
        };

        let plan_id = plan.id.as_str();
        let role = self.resolve_task_role(task);
        self.store
            .update_task(plan_id, &task.id, TaskUpdate::in_progress(role.clone()))
            .await?;
        debug!("Task '{}' started as {role}", task.id);
        self.emit(OrchestratorEvent::TaskStarted {
            plan_id: plan_id.to_string(),
            task_id: task.id.clone(),
            role: role.clone(),
        });

        let request = ExecutionRequest {
            role,
            target: ExecutionTarget::Task {
                phase: phase.name.clone(),
                id: task.id.clone(),
            },
            instructions: task_instructions(task),
            query: plan.query.clone(),
            context: task_context(plan, phase, task),
            cancellation: token.clone(),
        };

        match self.invoke(request, budget, token).await {
            Ok(output) => {
                self.store
                    .update_task(plan_id, &task.id, TaskUpdate::completed(output.clone()))
                    .await?;
                self.emit(OrchestratorEvent::TaskCompleted {
                    plan_id: plan_id.to_string(),
                    task_id: task.id.clone(),
                });
                Ok(output)
            }
            Err(e) => {
                warn!("Task '{}' failed: {e}", task.id);
                self.store
                    .update_task(plan_id, &task.id, TaskUpdate::failed(e.to_string()))
                    .await?;
                self.emit(OrchestratorEvent::TaskFailed {
                    plan_id: plan_id.to_string(),
                    task_id: task.id.clone(),
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Explicit role, then the task type table, then the resolver.
    fn resolve_task_role(&self, task: &TaskRecord) -> Role {
        task.role
            .clone()
            .or_else(|| self.graph.lookup_task_type(&task.task_type))
            .unwrap_or_else(|| self.role_resolver.resolve(&task.description))
    }

    fn task_permits(&self, phase: &PhaseConfig) -> Option<Arc<Semaphore>> {
        let limit = if phase.parallel {
            self.config.max_parallel_tasks
        } else {
            Some(1)
        };
        limit.map(|permits| Arc::new(Semaphore::new(permits.max(1))))
    }
}

fn task_instructions(task: &TaskRecord) -> String {
    match &task.verification {
        Some(verification) => format!("{}\n\nVerification: {verification}", task.description),
        None => task.description.clone(),
    }
}

/// Phase context plus the outputs of the task's completed dependencies.
fn task_context(plan: &Plan, phase: &PhaseConfig, task: &TaskRecord) -> Value {
    let mut context = phase_context(plan, phase);
    let dependencies: Map<String, Value> = task
        .dependencies
        .iter()
        .filter_map(|id| plan.task(id))
        .filter_map(|dependency| {
            dependency
                .output
                .as_ref()
                .map(|output| (dependency.id.clone(), output.clone()))
        })
        .collect();
    if !dependencies.is_empty() {
        context.insert("dependencies".to_string(), Value::Object(dependencies));
    }
    Value::Object(context)
}
