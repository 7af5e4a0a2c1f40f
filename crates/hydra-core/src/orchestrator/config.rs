//! Orchestrator tuning knobs.

use std::time::Duration;

/// What a failed task means for the phase that ran it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskFailurePolicy {
    /// The fan-out phase completes with the `{completed, failed, skipped}`
    /// aggregate as its output, whatever the task outcomes were.
    #[default]
    Tolerate,
    /// Any failed task fails the fan-out phase. The aggregate is still stored
    /// as the phase output.
    FailPhase,
}

/// Runtime configuration for a [`super::PlanOrchestrator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    pub task_failure_policy: TaskFailurePolicy,
    /// Budget for each task; the fan-out phase's timeout when `None`
    pub task_timeout: Option<Duration>,
    /// Upper bound on concurrently running tasks within one group
    pub max_parallel_tasks: Option<usize>,
    /// Buffer size of the event broadcast channel
    pub event_capacity: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            task_failure_policy: TaskFailurePolicy::Tolerate,
            task_timeout: None,
            max_parallel_tasks: None,
            event_capacity: 256,
        }
    }
}
