//! Partial update requests for phase and task records.

use jiff::Timestamp;
use serde_json::Value;

use super::{PhaseRecord, PhaseStatus, Role, TaskRecord, TaskStatus};

/// Fields to merge into a [`PhaseRecord`]. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhaseUpdate {
    pub status: Option<PhaseStatus>,
    pub role: Option<Role>,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub output: Option<Value>,
    pub error: Option<String>,
}

impl PhaseUpdate {
    /// Mark the phase active, stamping the start time.
    pub fn started(role: Option<Role>) -> Self {
        Self {
            status: Some(PhaseStatus::Active),
            role,
            started_at: Some(Timestamp::now()),
            ..Default::default()
        }
    }

    /// Mark the phase completed with its output.
    pub fn completed(output: Value) -> Self {
        Self {
            status: Some(PhaseStatus::Completed),
            completed_at: Some(Timestamp::now()),
            output: Some(output),
            ..Default::default()
        }
    }

    /// Mark the phase failed with an error message.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: Some(PhaseStatus::Failed),
            completed_at: Some(Timestamp::now()),
            error: Some(error.into()),
            ..Default::default()
        }
    }

    /// Mark the phase skipped.
    pub fn skipped() -> Self {
        Self {
            status: Some(PhaseStatus::Skipped),
            completed_at: Some(Timestamp::now()),
            ..Default::default()
        }
    }

    /// Attach an output to an update, e.g. the task aggregate of a failed
    /// execute phase.
    pub fn with_output(mut self, output: Value) -> Self {
        self.output = Some(output);
        self
    }

    pub(crate) fn apply(self, record: &mut PhaseRecord) {
        if let Some(status) = self.status {
            record.status = status;
        }
        if let Some(role) = self.role {
            record.role = Some(role);
        }
        if let Some(started_at) = self.started_at {
            record.started_at = Some(started_at);
        }
        if let Some(completed_at) = self.completed_at {
            record.completed_at = Some(completed_at);
        }
        if let Some(output) = self.output {
            record.output = Some(output);
        }
        if let Some(error) = self.error {
            record.error = Some(error);
        }
    }
}

/// Fields to merge into a [`TaskRecord`]. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskUpdate {
    pub status: Option<TaskStatus>,
    pub role: Option<Role>,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub output: Option<Value>,
    pub error: Option<String>,
}

impl TaskUpdate {
    /// Mark the task in progress under the resolved role.
    pub fn in_progress(role: Role) -> Self {
        Self {
            status: Some(TaskStatus::InProgress),
            role: Some(role),
            started_at: Some(Timestamp::now()),
            ..Default::default()
        }
    }

    pub fn completed(output: Value) -> Self {
        Self {
            status: Some(TaskStatus::Completed),
            completed_at: Some(Timestamp::now()),
            output: Some(output),
            ..Default::default()
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: Some(TaskStatus::Failed),
            completed_at: Some(Timestamp::now()),
            error: Some(error.into()),
            ..Default::default()
        }
    }

    pub(crate) fn apply(self, record: &mut TaskRecord) {
        if let Some(status) = self.status {
            record.status = status;
        }
        if let Some(role) = self.role {
            record.role = Some(role);
        }
        if let Some(started_at) = self.started_at {
            record.started_at = Some(started_at);
        }
        if let Some(completed_at) = self.completed_at {
            record.completed_at = Some(completed_at);
        }
        if let Some(output) = self.output {
            record.output = Some(output);
        }
        if let Some(error) = self.error {
            record.error = Some(error);
        }
    }
}
