//! Per-phase execution record stored inside a plan.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{PhaseStatus, Role};

/// Execution state of one pipeline phase within a plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PhaseRecord {
    /// Current status of the phase
    #[serde(default)]
    pub status: PhaseStatus,

    /// Executor role assigned to the phase (none for system phases)
    #[serde(default)]
    pub role: Option<Role>,

    /// When the phase was marked active
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<Timestamp>,

    /// When the phase reached a final status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,

    /// Structured result produced by the phase
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,

    /// Error message recorded on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PhaseRecord {
    /// A fresh record in `pending` status.
    pub fn pending(role: Option<Role>) -> Self {
        Self {
            role,
            ..Default::default()
        }
    }

    /// Wall-clock duration between start and completion, if both are known.
    pub fn duration(&self) -> Option<jiff::SignedDuration> {
        match (self.started_at, self.completed_at) {
            (Some(start), Some(end)) => Some(end.duration_since(start)),
            _ => None,
        }
    }
}
