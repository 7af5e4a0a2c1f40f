//! Plan document definition.

use std::collections::BTreeMap;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{PhaseRecord, PhaseStatus, PlanStatus, TaskRecord};

/// Schema version written into every new plan document.
pub const PLAN_DOCUMENT_VERSION: u32 = 1;

/// One orchestration run: phase records, tasks, outputs and lifecycle status.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Plan {
    /// Unique identifier, also the document file stem
    pub id: String,

    /// Document schema version
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub status: PlanStatus,

    /// The request that started the run
    pub query: String,

    pub created_at: Timestamp,

    pub updated_at: Timestamp,

    /// Execution state per phase name
    #[serde(default)]
    pub phases: BTreeMap<String, PhaseRecord>,

    /// Tasks in the order they were discovered
    #[serde(default)]
    pub tasks: Vec<TaskRecord>,

    /// Named results, one per finished phase plus any caller additions
    #[serde(default)]
    pub outputs: BTreeMap<String, Value>,

    /// Free-form caller data
    #[serde(default)]
    pub metadata: Map<String, Value>,

    /// Set when the plan is moved into the archive area
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<Timestamp>,
}

fn default_version() -> u32 {
    PLAN_DOCUMENT_VERSION
}

impl Plan {
    /// Snapshot of every phase's status keyed by phase name.
    pub fn phase_statuses(&self) -> BTreeMap<String, PhaseStatus> {
        self.phases
            .iter()
            .map(|(name, record)| (name.clone(), record.status))
            .collect()
    }

    pub fn phase(&self, name: &str) -> Option<&PhaseRecord> {
        self.phases.get(name)
    }

    pub fn task(&self, id: &str) -> Option<&TaskRecord> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub(crate) fn task_mut(&mut self, id: &str) -> Option<&mut TaskRecord> {
        self.tasks.iter_mut().find(|task| task.id == id)
    }

    /// Outputs of every completed phase, keyed by phase name.
    pub fn phase_outputs(&self) -> BTreeMap<String, Value> {
        self.phases
            .iter()
            .filter(|(_, record)| record.status == PhaseStatus::Completed)
            .filter_map(|(name, record)| {
                record
                    .output
                    .as_ref()
                    .map(|output| (name.clone(), output.clone()))
            })
            .collect()
    }

    /// Generate the next free `task-N` identifier.
    pub(crate) fn next_task_id(&self) -> String {
        let mut n = self.tasks.len() + 1;
        loop {
            let candidate = format!("task-{n}");
            if self.task(&candidate).is_none() {
                return candidate;
            }
            n += 1;
        }
    }
}
