//! Status enumerations for plans, phases and tasks.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle status of a plan document.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum PlanStatus {
    /// Plan is being driven through the pipeline
    #[default]
    Active,

    /// Every phase finished without aborting the run
    Completed,

    /// A required phase or the orchestrator itself failed
    Failed,

    /// The run was cancelled by the caller
    Cancelled,

    /// Plan was moved into the archive area
    Archived,
}

impl FromStr for PlanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(PlanStatus::Active),
            "completed" => Ok(PlanStatus::Completed),
            "failed" => Ok(PlanStatus::Failed),
            "cancelled" | "canceled" => Ok(PlanStatus::Cancelled),
            "archived" => Ok(PlanStatus::Archived),
            _ => Err(format!("Invalid plan status: {s}")),
        }
    }
}

impl PlanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanStatus::Active => "active",
            PlanStatus::Completed => "completed",
            PlanStatus::Failed => "failed",
            PlanStatus::Cancelled => "cancelled",
            PlanStatus::Archived => "archived",
        }
    }

    /// Whether the plan may move from `self` to `next`.
    ///
    /// Status only moves forward: `active` ends in `completed`, `failed` or
    /// `cancelled`, and `archived` is reachable only from `completed`.
    /// Re-applying the current status is always allowed.
    pub fn can_transition_to(self, next: PlanStatus) -> bool {
        if self == next {
            return true;
        }
        matches!(
            (self, next),
            (
                PlanStatus::Active,
                PlanStatus::Completed | PlanStatus::Failed | PlanStatus::Cancelled
            ) | (PlanStatus::Completed, PlanStatus::Archived)
        )
    }
}

/// Execution status of one phase within a plan.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum PhaseStatus {
    /// Not started yet
    #[default]
    Pending,

    /// Currently executing
    Active,

    /// Finished successfully
    Completed,

    /// Finished with an error
    Failed,

    /// Bypassed because its prerequisites were not met
    Skipped,
}

impl FromStr for PhaseStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(PhaseStatus::Pending),
            "active" => Ok(PhaseStatus::Active),
            "completed" => Ok(PhaseStatus::Completed),
            "failed" => Ok(PhaseStatus::Failed),
            "skipped" => Ok(PhaseStatus::Skipped),
            _ => Err(format!("Invalid phase status: {s}")),
        }
    }
}

impl PhaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseStatus::Pending => "pending",
            PhaseStatus::Active => "active",
            PhaseStatus::Completed => "completed",
            PhaseStatus::Failed => "failed",
            PhaseStatus::Skipped => "skipped",
        }
    }

    /// Whether the phase still has to run. `Active` counts as runnable
    /// because a phase left active was interrupted mid-flight.
    pub fn is_runnable(&self) -> bool {
        matches!(self, PhaseStatus::Pending | PhaseStatus::Active)
    }

    /// Status with an icon prefix for display.
    pub fn with_icon(&self) -> &'static str {
        match self {
            PhaseStatus::Pending => "○ Pending",
            PhaseStatus::Active => "➤ Active",
            PhaseStatus::Completed => "✓ Completed",
            PhaseStatus::Failed => "✗ Failed",
            PhaseStatus::Skipped => "↷ Skipped",
        }
    }
}

/// Execution status of one task discovered during planning.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Waiting to run
    #[default]
    Pending,

    /// Handed to the executor
    InProgress,

    /// Executor returned a result
    Completed,

    /// Executor failed, timed out or observed cancellation
    Failed,
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "in_progress" | "inprogress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            "failed" => Ok(TaskStatus::Failed),
            _ => Err(format!("Invalid task status: {s}")),
        }
    }
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        }
    }

    /// Status with an icon prefix for display.
    ///
    /// ```rust
    /// use hydra_core::models::TaskStatus;
    ///
    /// assert_eq!(TaskStatus::Completed.with_icon(), "✓ Completed");
    /// assert_eq!(TaskStatus::InProgress.with_icon(), "➤ In Progress");
    /// ```
    pub fn with_icon(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "○ Pending",
            TaskStatus::InProgress => "➤ In Progress",
            TaskStatus::Completed => "✓ Completed",
            TaskStatus::Failed => "✗ Failed",
        }
    }
}

/// Relative urgency of a task.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    #[serde(alias = "medium")]
    Normal,
    High,
    Critical,
}

impl FromStr for TaskPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(TaskPriority::Low),
            "normal" | "medium" => Ok(TaskPriority::Normal),
            "high" => Ok(TaskPriority::High),
            "critical" => Ok(TaskPriority::Critical),
            _ => Err(format!("Invalid task priority: {s}")),
        }
    }
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Normal => "normal",
            TaskPriority::High => "high",
            TaskPriority::Critical => "critical",
        }
    }
}
