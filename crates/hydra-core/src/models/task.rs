//! Task model definition.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Role, TaskPriority, TaskStatus};

/// A unit of work discovered during the plan phase.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskRecord {
    /// Identifier, unique within the owning plan
    pub id: String,

    /// What the task should accomplish
    pub description: String,

    /// Free-form category used for role lookup
    #[serde(rename = "type", default)]
    pub task_type: String,

    /// Executor role, resolved at execution time when absent
    #[serde(default)]
    pub role: Option<Role>,

    #[serde(default)]
    pub priority: TaskPriority,

    #[serde(default)]
    pub status: TaskStatus,

    /// How to check that the task succeeded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification: Option<String>,

    /// IDs of tasks that must complete before this one
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,

    pub created_at: Timestamp,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<Timestamp>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Parameters for appending a task to a plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewTask {
    /// Explicit identifier; one is generated when absent
    #[serde(default)]
    pub id: Option<String>,

    pub description: String,

    #[serde(rename = "type", default)]
    pub task_type: String,

    #[serde(default)]
    pub role: Option<Role>,

    #[serde(default)]
    pub priority: TaskPriority,

    #[serde(default)]
    pub verification: Option<String>,

    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl NewTask {
    /// Shorthand for a task with only a description.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Default::default()
        }
    }

    /// Sets the explicit task identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the task category.
    pub fn with_type(mut self, task_type: impl Into<String>) -> Self {
        self.task_type = task_type.into();
        self
    }

    /// Turn the parameters into a pending record under the given id.
    pub(crate) fn into_record(self, id: String, created_at: Timestamp) -> TaskRecord {
        TaskRecord {
            id,
            description: self.description,
            task_type: self.task_type,
            role: self.role,
            priority: self.priority,
            status: TaskStatus::Pending,
            verification: self.verification,
            dependencies: self.dependencies,
            created_at,
            started_at: None,
            completed_at: None,
            output: None,
            error: None,
        }
    }
}
