#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use hydra_core::{
    ExecutionRequest, Executor, OrchestratorBuilder, OrchestratorConfig, OrchestratorEvent,
    PhaseGraph, PlanOrchestrator, PlanStore, PlanStoreBuilder, Role,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::sync::broadcast;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Helper function to create a store over a temporary directory
pub async fn create_test_store() -> (TempDir, PlanStore) {
    create_test_store_with_graph(PhaseGraph::default()).await
}

pub async fn create_test_store_with_graph(graph: PhaseGraph) -> (TempDir, PlanStore) {
    init_logging();
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let store = PlanStoreBuilder::new()
        .with_plans_dir(Some(temp_dir.path().join("plans")))
        .with_phase_graph(graph)
        .build()
        .await
        .expect("Failed to create store");
    (temp_dir, store)
}

/// Helper function to create an orchestrator driven by a scripted executor
pub async fn create_test_orchestrator(
    graph: PhaseGraph,
    executor: Arc<ScriptedExecutor>,
    config: OrchestratorConfig,
) -> (TempDir, Arc<PlanOrchestrator>) {
    let (temp_dir, store) = create_test_store_with_graph(graph).await;
    let orchestrator = OrchestratorBuilder::new(store)
        .with_executor(executor)
        .with_config(config)
        .build();
    (temp_dir, Arc::new(orchestrator))
}

/// What the scripted executor does for one phase name or task id.
#[derive(Debug, Clone)]
pub enum Script {
    Output(Value),
    Fail(String),
    /// Sleep, then return the value
    Delay(Duration, Value),
    /// Never return on its own
    Hang,
}

/// Executor whose behavior is scripted per phase name or task id. Targets
/// without a script succeed with `{"done": <name>}`.
#[derive(Default)]
pub struct ScriptedExecutor {
    scripts: Mutex<HashMap<String, Script>>,
    calls: Mutex<Vec<(String, Role)>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(self, target: &str, script: Script) -> Self {
        self.scripts
            .lock()
            .expect("scripts lock")
            .insert(target.to_string(), script);
        self
    }

    /// Target names in call order, with the role each call ran as.
    pub fn calls(&self) -> Vec<(String, Role)> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn called(&self, target: &str) -> bool {
        self.calls().iter().any(|(name, _)| name == target)
    }

    pub fn role_of(&self, target: &str) -> Option<Role> {
        self.calls()
            .into_iter()
            .find(|(name, _)| name == target)
            .map(|(_, role)| role)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Executor for ScriptedExecutor {
    async fn execute(&self, request: ExecutionRequest) -> anyhow::Result<Value> {
        let name = request.target.name().to_string();
        self.calls
            .lock()
            .expect("calls lock")
            .push((name.clone(), request.role.clone()));
        let script = self
            .scripts
            .lock()
            .expect("scripts lock")
            .get(&name)
            .cloned();

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let outcome = match script {
            None => Ok(json!({ "done": name })),
            Some(Script::Output(value)) => Ok(value),
            Some(Script::Fail(message)) => Err(anyhow::anyhow!(message)),
            Some(Script::Delay(delay, value)) => {
                tokio::time::sleep(delay).await;
                Ok(value)
            }
            Some(Script::Hang) => {
                request.cancellation.cancelled().await;
                Err(anyhow::anyhow!("stopped after cancellation"))
            }
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        outcome
    }
}

/// A plan-phase output with two independent tasks in one parallel group.
pub fn two_task_breakdown() -> Value {
    json!({
        "tasks": [
            {"id": "task-1", "description": "Add theme context provider", "type": "implementation"},
            {"id": "task-2", "description": "Write toggle tests", "type": "testing"}
        ],
        "parallelGroups": [["task-1", "task-2"]]
    })
}

/// Waits until the orchestrator reports the named phase as started.
pub async fn wait_for_phase_start(
    events: &mut broadcast::Receiver<OrchestratorEvent>,
    phase_name: &str,
) {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match events.recv().await {
                Ok(OrchestratorEvent::PhaseStarted { phase, .. }) if phase == phase_name => {
                    return;
                }
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => panic!("event channel closed"),
            }
        }
    })
    .await
    .expect("phase never started");
}

/// Drains every event received so far.
pub fn drain_events(events: &mut broadcast::Receiver<OrchestratorEvent>) -> Vec<OrchestratorEvent> {
    let mut drained = Vec::new();
    while let Ok(event) = events.try_recv() {
        drained.push(event);
    }
    drained
}
