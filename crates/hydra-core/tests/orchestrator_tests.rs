mod common;

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use common::{
    create_test_orchestrator, create_test_store_with_graph, drain_events, two_task_breakdown,
    wait_for_phase_start, Script, ScriptedExecutor,
};
use hydra_core::{
    graph::{PhaseConfig, PhaseGraph, PhaseKind, RoleResolver},
    models::{PhaseStatus, PlanStatus, TaskStatus},
    params::{ListPlans, StartPlan},
    ExecutionRequest, Executor, OrchestratorBuilder, OrchestratorConfig, OrchestratorError,
    OrchestratorEvent, OrchestratorState, PlanStore, Role, TaskFailurePolicy,
};
use serde_json::{json, Value};

/// plan → execute, without the archive step so the plan stays live.
fn plan_and_execute() -> PhaseGraph {
    PhaseGraph::new(vec![
        PhaseConfig::new("plan").with_role("planner"),
        PhaseConfig::new("execute")
            .parallel()
            .after(&["plan"])
            .with_kind(PhaseKind::TaskFanOut),
        PhaseConfig::new("synthesize")
            .with_role("synthesizer")
            .after(&["execute"]),
    ])
    .expect("valid graph")
}

#[tokio::test]
async fn test_dark_mode_partial_task_failure_completes_plan() {
    let executor = Arc::new(
        ScriptedExecutor::new()
            .on("plan", Script::Output(two_task_breakdown()))
            .on("task-2", Script::Fail("snapshot mismatch".to_string())),
    );
    let (_temp_dir, orchestrator) = create_test_orchestrator(
        PhaseGraph::default(),
        executor.clone(),
        OrchestratorConfig::default(),
    )
    .await;
    let mut events = orchestrator.subscribe();

    let plan = orchestrator
        .start_plan(&StartPlan::new("add dark mode toggle"))
        .await
        .expect("plan should complete despite a failed task");

    // The archive phase ran last, so the returned document is the archived copy
    assert_eq!(plan.status, PlanStatus::Archived);
    assert!(plan.archived_at.is_some());
    assert!(orchestrator
        .store()
        .load(&plan.id)
        .await
        .expect("load")
        .is_none());

    let execute = plan.phase("execute").expect("execute phase");
    assert_eq!(execute.status, PhaseStatus::Completed);
    assert_eq!(
        execute.output,
        Some(json!({"completed": ["task-1"], "failed": ["task-2"], "skipped": []}))
    );
    assert_eq!(plan.outputs["execute"], execute.output.clone().unwrap_or_default());

    let task_1 = plan.task("task-1").expect("task-1");
    let task_2 = plan.task("task-2").expect("task-2");
    assert_eq!(task_1.status, TaskStatus::Completed);
    assert_eq!(task_2.status, TaskStatus::Failed);
    assert!(task_2
        .error
        .as_deref()
        .is_some_and(|error| error.contains("snapshot mismatch")));

    assert_eq!(executor.role_of("task-1"), Some(Role::new("coder")));
    assert_eq!(executor.role_of("task-2"), Some(Role::new("tester")));

    let events = drain_events(&mut events);
    assert!(matches!(
        events.first(),
        Some(OrchestratorEvent::PlanStarted { .. })
    ));
    assert!(events
        .iter()
        .any(|event| matches!(event, OrchestratorEvent::PlanCompleted { .. })));

    assert_eq!(orchestrator.state().await, OrchestratorState::Completed);
    let status = orchestrator.get_status().await.expect("status");
    assert_eq!(status.plan_id.as_deref(), Some(plan.id.as_str()));
    assert!(status.phase_outputs.contains_key("synthesize"));
    assert!(status.to_string().contains("# Orchestrator: completed"));
}

#[tokio::test]
async fn test_required_phase_failure_stops_the_run() {
    let graph = PhaseGraph::new(vec![
        PhaseConfig::new("a").with_role("researcher"),
        PhaseConfig::new("b").with_role("planner").after(&["a"]),
    ])
    .expect("valid graph");
    let executor = Arc::new(ScriptedExecutor::new().on("a", Script::Fail("boom".to_string())));
    let (_temp_dir, orchestrator) =
        create_test_orchestrator(graph, executor.clone(), OrchestratorConfig::default()).await;

    let err = orchestrator
        .start_plan(&StartPlan::new("two phases"))
        .await
        .unwrap_err();
    assert!(matches!(err, OrchestratorError::Execution { .. }));
    assert!(err.to_string().contains("boom"));

    let plans = orchestrator
        .store()
        .list(&ListPlans::default())
        .await
        .expect("list");
    assert_eq!(plans.len(), 1);
    let plan = &plans[0];
    assert_eq!(plan.status, PlanStatus::Failed);
    assert_eq!(plan.phase("a").map(|p| p.status), Some(PhaseStatus::Failed));
    assert_eq!(plan.phase("b").map(|p| p.status), Some(PhaseStatus::Pending));
    assert!(!executor.called("b"));
    assert_eq!(orchestrator.state().await, OrchestratorState::Failed);
}

#[tokio::test]
async fn test_optional_phase_failure_continues() {
    let executor = Arc::new(
        ScriptedExecutor::new().on("speculate", Script::Fail("no network".to_string())),
    );
    let (_temp_dir, orchestrator) = create_test_orchestrator(
        PhaseGraph::default(),
        executor.clone(),
        OrchestratorConfig::default(),
    )
    .await;

    let plan = orchestrator
        .start_plan(&StartPlan::new("optional failure"))
        .await
        .expect("optional failures do not abort the run");

    assert_eq!(plan.status, PlanStatus::Archived);
    assert_eq!(
        plan.phase("speculate").map(|p| p.status),
        Some(PhaseStatus::Failed)
    );
    assert_eq!(
        plan.phase("plan").map(|p| p.status),
        Some(PhaseStatus::Completed)
    );
    // The plan phase only reads speculate's output when it is available
    assert!(executor.called("plan"));
}

#[tokio::test]
async fn test_phase_with_failed_prerequisite_is_skipped() {
    let graph = PhaseGraph::new(vec![
        PhaseConfig::new("research").with_role("researcher").optional(),
        PhaseConfig::new("report")
            .with_role("documenter")
            .optional()
            .after(&["research"]),
        PhaseConfig::new("final").with_role("synthesizer"),
    ])
    .expect("valid graph");
    let executor = Arc::new(
        ScriptedExecutor::new().on("research", Script::Fail("offline".to_string())),
    );
    let (_temp_dir, orchestrator) =
        create_test_orchestrator(graph, executor.clone(), OrchestratorConfig::default()).await;
    let mut events = orchestrator.subscribe();

    let plan = orchestrator
        .start_plan(&StartPlan::new("skip dependents"))
        .await
        .expect("run completes");

    assert_eq!(plan.status, PlanStatus::Completed);
    assert_eq!(
        plan.phase("report").map(|p| p.status),
        Some(PhaseStatus::Skipped)
    );
    assert!(!executor.called("report"));
    assert!(executor.called("final"));
    assert!(drain_events(&mut events).iter().any(|event| matches!(
        event,
        OrchestratorEvent::PhaseSkipped { phase, .. } if phase == "report"
    )));
}

#[tokio::test]
async fn test_sibling_failure_and_dependency_skips() {
    let executor = Arc::new(
        ScriptedExecutor::new()
            .on(
                "plan",
                Script::Output(json!({
                    "tasks": [
                        {"id": "a", "description": "Create schema", "type": "database"},
                        {"id": "b", "description": "Seed data", "type": "database",
                         "dependencies": ["a"]},
                        {"id": "c", "description": "Update docs", "type": "documentation"}
                    ]
                })),
            )
            .on("a", Script::Fail("migration error".to_string())),
    );
    let (_temp_dir, orchestrator) = create_test_orchestrator(
        plan_and_execute(),
        executor.clone(),
        OrchestratorConfig::default(),
    )
    .await;

    let plan = orchestrator
        .start_plan(&StartPlan::new("add a table"))
        .await
        .expect("tolerated task failures complete the run");

    assert_eq!(plan.status, PlanStatus::Completed);
    assert_eq!(
        plan.outputs["execute"],
        json!({"completed": ["c"], "failed": ["a"], "skipped": ["b"]})
    );
    assert_eq!(plan.task("b").map(|t| t.status), Some(TaskStatus::Pending));
    assert_eq!(plan.task("c").map(|t| t.status), Some(TaskStatus::Completed));
    assert!(!executor.called("b"));
    assert_eq!(executor.role_of("c"), Some(Role::new("documenter")));
}

#[tokio::test]
async fn test_fail_phase_policy_fails_the_plan() {
    let executor = Arc::new(
        ScriptedExecutor::new()
            .on("plan", Script::Output(two_task_breakdown()))
            .on("task-2", Script::Fail("flaky".to_string())),
    );
    let config = OrchestratorConfig {
        task_failure_policy: TaskFailurePolicy::FailPhase,
        ..OrchestratorConfig::default()
    };
    let (_temp_dir, orchestrator) =
        create_test_orchestrator(plan_and_execute(), executor.clone(), config).await;

    let err = orchestrator
        .start_plan(&StartPlan::new("strict run"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("1 of 2 task(s) failed"));

    let plan = orchestrator
        .store()
        .list(&ListPlans::default())
        .await
        .expect("list")
        .remove(0);
    assert_eq!(plan.status, PlanStatus::Failed);
    let execute = plan.phase("execute").expect("execute phase");
    assert_eq!(execute.status, PhaseStatus::Failed);
    assert_eq!(
        execute.output,
        Some(json!({"completed": ["task-1"], "failed": ["task-2"], "skipped": []}))
    );
    assert_eq!(
        plan.phase("synthesize").map(|p| p.status),
        Some(PhaseStatus::Pending)
    );
}

#[tokio::test]
async fn test_phase_timeout_fails_required_phase() {
    let graph = PhaseGraph::new(vec![PhaseConfig::new("slow")
        .with_role("researcher")
        .with_timeout(Duration::from_millis(50))])
    .expect("valid graph");
    let executor = Arc::new(ScriptedExecutor::new().on("slow", Script::Hang));
    let (_temp_dir, orchestrator) =
        create_test_orchestrator(graph, executor, OrchestratorConfig::default()).await;

    let err = orchestrator
        .start_plan(&StartPlan::new("never finishes"))
        .await
        .unwrap_err();
    assert!(matches!(err, OrchestratorError::Timeout { .. }));

    let plan = orchestrator
        .store()
        .list(&ListPlans::default())
        .await
        .expect("list")
        .remove(0);
    assert_eq!(plan.status, PlanStatus::Failed);
    let slow = plan.phase("slow").expect("slow phase");
    assert_eq!(slow.status, PhaseStatus::Failed);
    assert!(slow
        .error
        .as_deref()
        .is_some_and(|error| error.contains("timed out")));
}

#[tokio::test]
async fn test_task_timeout_is_a_task_failure() {
    let executor = Arc::new(
        ScriptedExecutor::new()
            .on("plan", Script::Output(two_task_breakdown()))
            .on("task-1", Script::Delay(Duration::from_secs(10), json!("late"))),
    );
    let config = OrchestratorConfig {
        task_timeout: Some(Duration::from_millis(50)),
        ..OrchestratorConfig::default()
    };
    let (_temp_dir, orchestrator) =
        create_test_orchestrator(plan_and_execute(), executor, config).await;

    let plan = orchestrator
        .start_plan(&StartPlan::new("one slow task"))
        .await
        .expect("run completes");

    assert_eq!(
        plan.outputs["execute"],
        json!({"completed": ["task-2"], "failed": ["task-1"], "skipped": []})
    );
    assert!(plan
        .task("task-1")
        .and_then(|task| task.error.as_deref())
        .is_some_and(|error| error.contains("timed out")));
}

#[tokio::test]
async fn test_start_while_busy_is_rejected_and_cancel_stops_the_run() {
    let executor = Arc::new(ScriptedExecutor::new().on("plan", Script::Hang));
    let (_temp_dir, orchestrator) = create_test_orchestrator(
        PhaseGraph::default(),
        executor,
        OrchestratorConfig::default(),
    )
    .await;
    let mut events = orchestrator.subscribe();

    let running = {
        let orchestrator = Arc::clone(&orchestrator);
        tokio::spawn(async move {
            orchestrator
                .start_plan(&StartPlan::new("long running"))
                .await
        })
    };
    wait_for_phase_start(&mut events, "plan").await;

    let err = orchestrator
        .start_plan(&StartPlan::new("second"))
        .await
        .unwrap_err();
    assert!(matches!(err, OrchestratorError::InvalidState { .. }));
    assert_eq!(
        orchestrator
            .store()
            .list(&ListPlans::default())
            .await
            .expect("list")
            .len(),
        1,
        "a rejected start writes nothing"
    );
    assert!(orchestrator.reset().await.is_err());

    orchestrator.cancel().await.expect("cancel");
    let result = running.await.expect("join");
    assert!(matches!(result, Err(OrchestratorError::Cancelled { .. })));

    assert_eq!(orchestrator.state().await, OrchestratorState::Cancelled);
    let plan = orchestrator
        .store()
        .list(&ListPlans::default())
        .await
        .expect("list")
        .remove(0);
    assert_eq!(plan.status, PlanStatus::Cancelled);
    assert_eq!(plan.phase("plan").map(|p| p.status), Some(PhaseStatus::Failed));
    assert_eq!(
        plan.phase("execute").map(|p| p.status),
        Some(PhaseStatus::Pending)
    );

    orchestrator.reset().await.expect("reset after cancel");
    assert_eq!(orchestrator.state().await, OrchestratorState::Idle);
}

#[tokio::test]
async fn test_pause_and_resume() {
    let executor = Arc::new(ScriptedExecutor::new().on(
        "plan",
        Script::Delay(Duration::from_millis(200), two_task_breakdown()),
    ));
    let (_temp_dir, orchestrator) = create_test_orchestrator(
        plan_and_execute(),
        executor.clone(),
        OrchestratorConfig::default(),
    )
    .await;
    let mut events = orchestrator.subscribe();

    let running = {
        let orchestrator = Arc::clone(&orchestrator);
        tokio::spawn(async move { orchestrator.start_plan(&StartPlan::new("pausable")).await })
    };
    wait_for_phase_start(&mut events, "plan").await;
    orchestrator.pause().await.expect("pause");

    let paused = running.await.expect("join").expect("paused run returns the plan");
    assert_eq!(paused.status, PlanStatus::Active);
    assert_eq!(
        paused.phase("plan").map(|p| p.status),
        Some(PhaseStatus::Completed)
    );
    assert_eq!(
        paused.phase("execute").map(|p| p.status),
        Some(PhaseStatus::Pending)
    );
    assert_eq!(orchestrator.state().await, OrchestratorState::Paused);

    let err = orchestrator
        .start_plan(&StartPlan::new("while paused"))
        .await
        .unwrap_err();
    assert!(matches!(err, OrchestratorError::InvalidState { .. }));

    let resumed = orchestrator.resume().await.expect("resume");
    assert_eq!(resumed.id, paused.id);
    assert_eq!(resumed.status, PlanStatus::Completed);
    assert_eq!(
        resumed.phase("synthesize").map(|p| p.status),
        Some(PhaseStatus::Completed)
    );
    let plan_calls = executor
        .calls()
        .iter()
        .filter(|(name, _)| name == "plan")
        .count();
    assert_eq!(plan_calls, 1, "completed phases are not re-run");
}

#[tokio::test]
async fn test_controls_rejected_when_idle() {
    let (_temp_dir, orchestrator) = create_test_orchestrator(
        PhaseGraph::default(),
        Arc::new(ScriptedExecutor::new()),
        OrchestratorConfig::default(),
    )
    .await;

    assert!(matches!(
        orchestrator.cancel().await,
        Err(OrchestratorError::InvalidState { .. })
    ));
    assert!(matches!(
        orchestrator.pause().await,
        Err(OrchestratorError::InvalidState { .. })
    ));
    assert!(matches!(
        orchestrator.resume().await,
        Err(OrchestratorError::InvalidState { .. })
    ));

    let status = orchestrator.get_status().await.expect("status");
    assert_eq!(status.state, OrchestratorState::Idle);
    assert!(status.plan.is_none());
}

#[tokio::test]
async fn test_blank_query_leaves_orchestrator_idle() {
    let (_temp_dir, orchestrator) = create_test_orchestrator(
        PhaseGraph::default(),
        Arc::new(ScriptedExecutor::new()),
        OrchestratorConfig::default(),
    )
    .await;

    let err = orchestrator
        .start_plan(&StartPlan::new(""))
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(orchestrator.state().await, OrchestratorState::Idle);
}

#[tokio::test]
async fn test_parallel_tasks_run_concurrently_within_bound() {
    let breakdown = json!({
        "tasks": [
            {"id": "t1", "description": "one"},
            {"id": "t2", "description": "two"},
            {"id": "t3", "description": "three"},
            {"id": "t4", "description": "four"}
        ]
    });
    let slow = |executor: ScriptedExecutor| {
        ["t1", "t2", "t3", "t4"].iter().fold(executor, |executor, id| {
            executor.on(id, Script::Delay(Duration::from_millis(100), json!(id)))
        })
    };

    let unbounded = Arc::new(slow(
        ScriptedExecutor::new().on("plan", Script::Output(breakdown.clone())),
    ));
    let (_dir_a, orchestrator) = create_test_orchestrator(
        plan_and_execute(),
        unbounded.clone(),
        OrchestratorConfig::default(),
    )
    .await;
    orchestrator
        .start_plan(&StartPlan::new("unbounded"))
        .await
        .expect("run completes");
    assert_eq!(unbounded.max_in_flight(), 4);

    let bounded = Arc::new(slow(
        ScriptedExecutor::new().on("plan", Script::Output(breakdown)),
    ));
    let config = OrchestratorConfig {
        max_parallel_tasks: Some(2),
        ..OrchestratorConfig::default()
    };
    let (_dir_b, orchestrator) =
        create_test_orchestrator(plan_and_execute(), bounded.clone(), config).await;
    orchestrator
        .start_plan(&StartPlan::new("bounded"))
        .await
        .expect("run completes");
    assert_eq!(bounded.max_in_flight(), 2);
}

#[tokio::test]
async fn test_invalid_breakdown_fails_execute() {
    let executor = Arc::new(ScriptedExecutor::new().on(
        "plan",
        Script::Output(json!({
            "tasks": [
                {"id": "x", "description": "one", "dependencies": ["y"]},
                {"id": "y", "description": "two", "dependencies": ["x"]}
            ]
        })),
    ));
    let (_temp_dir, orchestrator) = create_test_orchestrator(
        plan_and_execute(),
        executor,
        OrchestratorConfig::default(),
    )
    .await;

    let err = orchestrator
        .start_plan(&StartPlan::new("cyclic"))
        .await
        .unwrap_err();
    assert!(matches!(err, OrchestratorError::InvalidInput { .. }));
    assert_eq!(orchestrator.state().await, OrchestratorState::Failed);
}

struct FixedResolver;

impl RoleResolver for FixedResolver {
    fn resolve(&self, _description: &str) -> Role {
        Role::new("generalist")
    }
}

#[tokio::test]
async fn test_task_role_resolution_order() {
    let executor = Arc::new(ScriptedExecutor::new().on(
        "plan",
        Script::Output(json!({
            "tasks": [
                {"id": "explicit", "description": "anything", "role": "security"},
                {"id": "typed", "description": "anything", "type": "Deployment"},
                {"id": "inferred", "description": "Fix crash on startup"}
            ]
        })),
    ));
    let (_temp_dir, orchestrator) = create_test_orchestrator(
        plan_and_execute(),
        executor.clone(),
        OrchestratorConfig::default(),
    )
    .await;
    orchestrator
        .start_plan(&StartPlan::new("roles"))
        .await
        .expect("run completes");

    assert_eq!(executor.role_of("explicit"), Some(Role::new("security")));
    assert_eq!(executor.role_of("typed"), Some(Role::new("devops")));
    assert_eq!(executor.role_of("inferred"), Some(Role::new("debugger")));

    let store = orchestrator.store().clone();
    let custom = Arc::new(ScriptedExecutor::new().on(
        "plan",
        Script::Output(json!({"tasks": [{"id": "t", "description": "Fix crash"}]})),
    ));
    let orchestrator = OrchestratorBuilder::new(store)
        .with_executor(custom.clone())
        .with_role_resolver(Arc::new(FixedResolver))
        .build();
    orchestrator
        .start_plan(&StartPlan::new("custom resolver"))
        .await
        .expect("run completes");
    assert_eq!(custom.role_of("t"), Some(Role::new("generalist")));
}

#[tokio::test]
async fn test_finished_run_requires_reset() {
    let executor =
        Arc::new(ScriptedExecutor::new().on("plan", Script::Output(two_task_breakdown())));
    let (_temp_dir, orchestrator) = create_test_orchestrator(
        plan_and_execute(),
        executor,
        OrchestratorConfig::default(),
    )
    .await;

    orchestrator
        .start_plan(&StartPlan::new("first"))
        .await
        .expect("first run completes");
    assert_eq!(orchestrator.state().await, OrchestratorState::Completed);

    let err = orchestrator
        .start_plan(&StartPlan::new("second"))
        .await
        .unwrap_err();
    assert!(matches!(err, OrchestratorError::InvalidState { .. }));
    assert_eq!(
        orchestrator
            .store()
            .list(&ListPlans::default())
            .await
            .expect("list")
            .len(),
        1,
        "a rejected start writes nothing"
    );

    orchestrator.reset().await.expect("reset");
    let second = orchestrator
        .start_plan(&StartPlan::new("second"))
        .await
        .expect("second run completes after reset");
    assert_eq!(second.status, PlanStatus::Completed);
}

#[tokio::test]
async fn test_higher_priority_tasks_dispatch_first() {
    let executor = Arc::new(ScriptedExecutor::new().on(
        "plan",
        Script::Output(json!({
            "tasks": [
                {"id": "low", "description": "Tidy comments", "priority": "low"},
                {"id": "normal", "description": "Rename module"},
                {"id": "crit", "description": "Patch auth bypass", "priority": "critical"}
            ],
            "parallelGroups": [["low", "normal", "crit"]]
        })),
    ));
    let config = OrchestratorConfig {
        max_parallel_tasks: Some(1),
        ..OrchestratorConfig::default()
    };
    let (_temp_dir, orchestrator) =
        create_test_orchestrator(plan_and_execute(), executor.clone(), config).await;

    orchestrator
        .start_plan(&StartPlan::new("priorities"))
        .await
        .expect("run completes");

    let order: Vec<String> = executor
        .calls()
        .into_iter()
        .map(|(name, _)| name)
        .filter(|name| ["low", "normal", "crit"].contains(&name.as_str()))
        .collect();
    assert_eq!(order, vec!["crit", "normal", "low"]);
}

#[tokio::test]
async fn test_explicit_groups_wait_for_dependencies() {
    let executor = Arc::new(ScriptedExecutor::new().on(
        "plan",
        Script::Output(json!({
            "tasks": [
                {"id": "a", "description": "Create schema"},
                {"id": "b", "description": "Seed data", "dependencies": ["a"]},
                {"id": "c", "description": "Update docs"}
            ],
            "parallelGroups": [["a", "b", "c"]]
        })),
    ));
    let (_temp_dir, orchestrator) = create_test_orchestrator(
        plan_and_execute(),
        executor,
        OrchestratorConfig::default(),
    )
    .await;

    let plan = orchestrator
        .start_plan(&StartPlan::new("grouped"))
        .await
        .expect("run completes");
    assert_eq!(
        plan.outputs["execute"],
        json!({"completed": ["a", "c", "b"], "failed": [], "skipped": []})
    );
}

#[tokio::test]
async fn test_explicit_groups_reject_unknown_dependency() {
    let executor = Arc::new(ScriptedExecutor::new().on(
        "plan",
        Script::Output(json!({
            "tasks": [
                {"id": "a", "description": "Create schema"},
                {"id": "c", "description": "Update docs", "dependencies": ["zzz"]}
            ],
            "parallelGroups": [["a", "c"]]
        })),
    ));
    let (_temp_dir, orchestrator) = create_test_orchestrator(
        plan_and_execute(),
        executor.clone(),
        OrchestratorConfig::default(),
    )
    .await;

    let err = orchestrator
        .start_plan(&StartPlan::new("unknown dependency"))
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert!(!executor.called("a"));

    let plan = orchestrator
        .store()
        .list(&ListPlans::default())
        .await
        .expect("list")
        .remove(0);
    assert_eq!(plan.status, PlanStatus::Failed);
    assert_eq!(plan.phase("execute").map(|p| p.status), Some(PhaseStatus::Failed));
}

/// Marks the live plan failed from inside the plan phase, as an outside
/// writer would.
struct FailingPlanExecutor {
    store: PlanStore,
}

#[async_trait]
impl Executor for FailingPlanExecutor {
    async fn execute(&self, _request: ExecutionRequest) -> anyhow::Result<Value> {
        if let Some(plan) = self.store.get_active_plan().await? {
            self.store.update_status(&plan.id, PlanStatus::Failed).await?;
        }
        Ok(json!({"summary": "planned"}))
    }
}

#[tokio::test]
async fn test_archive_status_conflict_fails_archive_phase() {
    let graph = PhaseGraph::new(vec![
        PhaseConfig::new("plan").with_role("planner"),
        PhaseConfig::new("archive")
            .after(&["plan"])
            .with_kind(PhaseKind::Archive),
    ])
    .expect("valid graph");
    let (_temp_dir, store) = create_test_store_with_graph(graph).await;
    let orchestrator = OrchestratorBuilder::new(store.clone())
        .with_executor(Arc::new(FailingPlanExecutor {
            store: store.clone(),
        }))
        .build();

    let err = orchestrator
        .start_plan(&StartPlan::new("conflicting writer"))
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(orchestrator.state().await, OrchestratorState::Failed);

    let plan = store
        .list(&ListPlans::default())
        .await
        .expect("list")
        .remove(0);
    assert_eq!(plan.status, PlanStatus::Failed);
    assert_eq!(plan.phase("archive").map(|p| p.status), Some(PhaseStatus::Failed));
    assert!(store
        .list_archived(None)
        .await
        .expect("list archived")
        .is_empty());
}
