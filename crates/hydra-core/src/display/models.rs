//! Display implementations for domain models.
//!
//! Output is markdown, matching what a terminal renderer or a chat surface
//! expects.

use std::fmt;

use serde_json::Value;

use super::datetime::{Elapsed, LocalDateTime};
use crate::models::{
    PhaseRecord, PhaseStatus, Plan, PlanStatus, PlanSummary, TaskPriority, TaskRecord, TaskStatus,
};

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for PhaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Compact one-line rendering of an output value.
pub(crate) fn preview(value: &Value, max: usize) -> String {
    let text = match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    };
    let line = text.lines().next().unwrap_or_default();
    if line.chars().count() > max || text.lines().nth(1).is_some() {
        let cut: String = line.chars().take(max).collect();
        format!("{cut}…")
    } else {
        line.to_string()
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}", self.query)?;
        writeln!(f)?;

        writeln!(f, "- ID: {}", self.id)?;
        writeln!(f, "- Status: {}", self.status)?;
        writeln!(f, "- Created: {}", LocalDateTime(&self.created_at))?;
        writeln!(f, "- Updated: {}", LocalDateTime(&self.updated_at))?;
        if let Some(archived_at) = &self.archived_at {
            writeln!(f, "- Archived: {}", LocalDateTime(archived_at))?;
        }

        writeln!(f, "\n## Phases")?;
        writeln!(f)?;
        for (name, record) in &self.phases {
            writeln!(f, "- {}", PhaseLine(name, record))?;
        }

        if !self.tasks.is_empty() {
            writeln!(f, "\n## Tasks")?;
            writeln!(f)?;
            for task in &self.tasks {
                write!(f, "{task}")?;
            }
        }

        Ok(())
    }
}

/// A phase record with its name, for plan listings.
pub struct PhaseLine<'a>(pub &'a str, pub &'a PhaseRecord);

impl fmt::Display for PhaseLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let PhaseLine(name, record) = self;
        write!(f, "**{name}** ({})", record.status.with_icon())?;
        if let Some(role) = &record.role {
            write!(f, " as {role}")?;
        }
        if let Some(duration) = record.duration() {
            write!(f, " in {}", Elapsed(duration))?;
        }
        if let Some(error) = &record.error {
            write!(f, ": {error}")?;
        }
        Ok(())
    }
}

impl fmt::Display for TaskRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "### {}. {} ({})",
            self.id,
            self.description,
            self.status.with_icon()
        )?;
        writeln!(f)?;

        if !self.task_type.is_empty() {
            writeln!(f, "- Type: {}", self.task_type)?;
        }
        if let Some(role) = &self.role {
            writeln!(f, "- Role: {role}")?;
        }
        writeln!(f, "- Priority: {}", self.priority)?;
        if !self.dependencies.is_empty() {
            writeln!(f, "- Depends on: {}", self.dependencies.join(", "))?;
        }
        if let Some(verification) = &self.verification {
            writeln!(f, "- Verification: {verification}")?;
        }

        match (&self.status, &self.output, &self.error) {
            (TaskStatus::Completed, Some(output), _) => {
                writeln!(f, "- Output: {}", preview(output, 120))?;
            }
            (TaskStatus::Failed, _, Some(error)) => writeln!(f, "- Error: {error}")?,
            _ => {}
        }
        writeln!(f)
    }
}

impl fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "## {} (ID: {}) ({}/{} phases)",
            self.query, self.id, self.completed_phases, self.total_phases
        )?;
        writeln!(f)?;

        writeln!(f, "- **Status**: {}", self.status)?;
        if self.total_tasks > 0 {
            write!(
                f,
                "- **Tasks**: {}/{} completed",
                self.completed_tasks, self.total_tasks
            )?;
            if self.failed_tasks > 0 {
                write!(f, ", {} failed", self.failed_tasks)?;
            }
            writeln!(f)?;
        }
        writeln!(f, "- **Created**: {}", LocalDateTime(&self.created_at))?;
        writeln!(f)?;

        Ok(())
    }
}
