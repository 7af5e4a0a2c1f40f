//! Display for orchestrator status snapshots.

use std::fmt;

use super::models::{preview, PhaseLine};
use crate::orchestrator::StatusReport;

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# Orchestrator: {}", self.state)?;
        writeln!(f)?;

        let Some(plan) = &self.plan else {
            return match &self.plan_id {
                Some(id) => writeln!(f, "Plan {id} is no longer stored."),
                None => writeln!(f, "No plan has been started."),
            };
        };

        writeln!(f, "- Plan: {} ({})", plan.id, plan.status)?;
        writeln!(f, "- Query: {}", plan.query)?;
        if let Some(phase) = &self.current_phase {
            writeln!(f, "- Current phase: {phase}")?;
        }

        writeln!(f, "\n## Phases")?;
        writeln!(f)?;
        for (name, record) in &plan.phases {
            writeln!(f, "- {}", PhaseLine(name, record))?;
        }

        if !self.phase_outputs.is_empty() {
            writeln!(f, "\n## Outputs")?;
            writeln!(f)?;
            for (name, output) in &self.phase_outputs {
                writeln!(f, "- **{name}**: {}", preview(output, 80))?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use crate::orchestrator::{OrchestratorState, StatusReport};

    #[test]
    fn test_idle_status_display() {
        let report = StatusReport {
            state: OrchestratorState::Idle,
            plan_id: None,
            current_phase: None,
            phase_outputs: BTreeMap::new(),
            plan: None,
        };
        let output = report.to_string();
        assert!(output.contains("# Orchestrator: idle"));
        assert!(output.contains("No plan has been started."));
    }
}
