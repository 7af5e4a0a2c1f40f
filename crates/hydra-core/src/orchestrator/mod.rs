//! Phase pipeline orchestration.
//!
//! A [`PlanOrchestrator`] drives one plan at a time through the phases of its
//! store's [`PhaseGraph`]. Every transition is persisted through the
//! [`PlanStore`] before the next step begins, so an interrupted run can be
//! inspected or resumed from the plan document alone.
//!
//! ```text
//!  start_plan ──▶ speculate ──▶ plan ──▶ execute ──▶ synthesize ──▶ log ──▶ archive
//!                                          │
//!                          ┌───────────────┼───────────────┐
//!                          ▼               ▼               ▼
//!                       group 1  ──▶    group 2  ──▶    group N
//!                     (concurrent)    (concurrent)    (concurrent)
//! ```
//!
//! ## Submodules
//!
//! - [`builder`]: Assembles an orchestrator from a store and collaborators
//! - [`executor`]: The [`Executor`] seam and the diagnostic [`EchoExecutor`]
//! - [`breakdown`]: Parsing of the task breakdown a planning phase emits
//! - [`events`]: Broadcast progress notifications
//! - `phases`, `tasks`, `control`: run loop, task fan-out, pause/cancel
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use hydra_core::{params::StartPlan, OrchestratorBuilder, PlanStoreBuilder};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = PlanStoreBuilder::new().build().await?;
//! let orchestrator = Arc::new(OrchestratorBuilder::new(store).build());
//!
//! let plan = orchestrator
//!     .start_plan(&StartPlan::new("add dark mode toggle"))
//!     .await?;
//! println!("{}", orchestrator.get_status().await?);
//! # let _ = plan;
//! # Ok(())
//! # }
//! ```

use std::{collections::BTreeMap, fmt, sync::Arc};

use log::debug;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::{broadcast, Mutex};
use tokio_util::sync::CancellationToken;

pub mod breakdown;
pub mod builder;
pub mod config;
mod control;
pub mod events;
pub mod executor;
mod phases;
mod tasks;

pub use breakdown::TaskBreakdown;
pub use builder::OrchestratorBuilder;
pub use config::{OrchestratorConfig, TaskFailurePolicy};
pub use events::OrchestratorEvent;
pub use executor::{EchoExecutor, ExecutionRequest, ExecutionTarget, Executor};

use crate::{
    error::{OrchestratorError, Result},
    graph::{PhaseGraph, RoleResolver},
    models::{Plan, PlanStatus},
    store::PlanStore,
};

/// Lifecycle of the orchestrator itself, independent of any plan status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrchestratorState {
    #[default]
    Idle,
    Planning,
    Executing,
    Paused,
    Completed,
    Failed,
    Cancelled,
}

impl OrchestratorState {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrchestratorState::Idle => "idle",
            OrchestratorState::Planning => "planning",
            OrchestratorState::Executing => "executing",
            OrchestratorState::Paused => "paused",
            OrchestratorState::Completed => "completed",
            OrchestratorState::Failed => "failed",
            OrchestratorState::Cancelled => "cancelled",
        }
    }

    /// A plan is in flight, or paused and waiting for `resume`.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            OrchestratorState::Planning | OrchestratorState::Executing | OrchestratorState::Paused
        )
    }
}

impl fmt::Display for OrchestratorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot returned by [`PlanOrchestrator::get_status`].
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub state: OrchestratorState,
    pub plan_id: Option<String>,
    pub current_phase: Option<String>,
    /// Outputs of the plan's completed phases
    pub phase_outputs: BTreeMap<String, Value>,
    /// The plan document, live or archived
    pub plan: Option<Plan>,
}

#[derive(Debug)]
struct RunState {
    state: OrchestratorState,
    plan_id: Option<String>,
    current_phase: Option<String>,
    cancellation: CancellationToken,
    /// The phase loop is running. A pause only parks once this drops.
    driving: bool,
}

impl Default for RunState {
    fn default() -> Self {
        Self {
            state: OrchestratorState::Idle,
            plan_id: None,
            current_phase: None,
            cancellation: CancellationToken::new(),
            driving: false,
        }
    }
}

/// Drives plans through the phase graph using an [`Executor`].
///
/// Methods take `&self`; wrap the orchestrator in an `Arc` to call
/// [`Self::cancel`] or [`Self::pause`] while a run is in progress.
pub struct PlanOrchestrator {
    store: PlanStore,
    graph: Arc<PhaseGraph>,
    executor: Arc<dyn Executor>,
    role_resolver: Arc<dyn RoleResolver>,
    config: OrchestratorConfig,
    run: Mutex<RunState>,
    events: broadcast::Sender<OrchestratorEvent>,
}

impl fmt::Debug for PlanOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlanOrchestrator")
            .field("store", &self.store)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl PlanOrchestrator {
    pub(crate) fn new(
        store: PlanStore,
        executor: Arc<dyn Executor>,
        role_resolver: Arc<dyn RoleResolver>,
        config: OrchestratorConfig,
    ) -> Self {
        let graph = Arc::clone(store.graph());
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            store,
            graph,
            executor,
            role_resolver,
            config,
            run: Mutex::new(RunState::default()),
            events,
        }
    }

    pub fn store(&self) -> &PlanStore {
        &self.store
    }

    pub fn graph(&self) -> &PhaseGraph {
        &self.graph
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Receives every event emitted after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<OrchestratorEvent> {
        self.events.subscribe()
    }

    /// Current orchestrator state.
    pub async fn state(&self) -> OrchestratorState {
        self.run.lock().await.state
    }

    fn emit(&self, event: OrchestratorEvent) {
        // No subscribers is not an error.
        let _ = self.events.send(event);
    }

    async fn set_state(&self, state: OrchestratorState) {
        self.run.lock().await.state = state;
    }

    async fn set_current_phase(&self, phase: Option<&str>) {
        self.run.lock().await.current_phase = phase.map(str::to_string);
    }

    /// The plan from the live area, or from the archive once archived.
    async fn find_plan(&self, plan_id: &str) -> Result<Option<Plan>> {
        match self.store.load(plan_id).await? {
            Some(plan) => Ok(Some(plan)),
            None => self.store.load_archived(plan_id).await,
        }
    }

    async fn load_any(&self, plan_id: &str) -> Result<Plan> {
        self.find_plan(plan_id)
            .await?
            .ok_or_else(|| OrchestratorError::PlanNotFound {
                id: plan_id.to_string(),
            })
    }

    /// Moves a live plan to `status` unless it already left `active`.
    async fn mark_plan(&self, plan_id: &str, status: PlanStatus) -> Result<()> {
        match self.store.load(plan_id).await? {
            Some(plan) if plan.status.can_transition_to(status) => {
                self.store.update_status(plan_id, status).await
            }
            Some(plan) => {
                debug!(
                    "Plan {plan_id} stays {} instead of {}",
                    plan.status.as_str(),
                    status.as_str()
                );
                Ok(())
            }
            None => Ok(()),
        }
    }
}
