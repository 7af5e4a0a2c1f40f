//! Static description of the phase pipeline.
//!
//! [`PhaseGraph`] holds the ordered [`PhaseConfig`]s, answers whether a phase
//! may start given the current phase statuses, and maps task types to
//! executor roles. It is pure and never touches storage.
//!
//! ```rust
//! use std::collections::BTreeMap;
//!
//! use hydra_core::graph::{PhaseGraph, EXECUTE, PLAN};
//! use hydra_core::models::PhaseStatus;
//!
//! let graph = PhaseGraph::default();
//! let mut statuses: BTreeMap<String, PhaseStatus> = graph
//!     .phase_names()
//!     .map(|name| (name.to_string(), PhaseStatus::Pending))
//!     .collect();
//!
//! assert!(graph.can_start(PLAN, &statuses));
//! assert!(!graph.can_start(EXECUTE, &statuses));
//!
//! statuses.insert(PLAN.to_string(), PhaseStatus::Completed);
//! assert!(graph.can_start(EXECUTE, &statuses));
//! ```

use std::collections::{BTreeMap, HashSet};

use log::debug;

pub mod config;
pub mod roles;


pub use config::{
    default_phases, PhaseConfig, PhaseKind, ARCHIVE, EXECUTE, LOG, PLAN, SPECULATE, SYNTHESIZE,
};
pub use roles::{default_task_roles, KeywordRoleResolver, RoleResolver, DEFAULT_ROLE};

use crate::{
    error::{OrchestratorError, Result},
    models::{PhaseStatus, Role},
};

/// Ordered pipeline phases plus the task type → role table.
#[derive(Debug, Clone)]
pub struct PhaseGraph {
    phases: Vec<PhaseConfig>,
    task_roles: Vec<(String, Role)>,
    default_role: Role,
}

impl PhaseGraph {
    /// Builds a graph from phases listed in pipeline order.
    ///
    /// # Errors
    ///
    /// Returns `OrchestratorError::InvalidInput` if the list is empty, names
    /// repeat, a prerequisite or context source does not name an earlier
    /// phase, or an archive phase is not last.
    pub fn new(phases: Vec<PhaseConfig>) -> Result<Self> {
        Self::validate(&phases)?;
        Ok(Self {
            phases,
            task_roles: default_task_roles(),
            default_role: Role::new(DEFAULT_ROLE),
        })
    }

    /// Replaces the task type → role table and its fallback role.
    pub fn with_task_roles(mut self, table: Vec<(String, Role)>, default_role: Role) -> Self {
        self.task_roles = table;
        self.default_role = default_role;
        self
    }

    fn validate(phases: &[PhaseConfig]) -> Result<()> {
        if phases.is_empty() {
            return Err(OrchestratorError::invalid_input("phases")
                .with_reason("a phase graph needs at least one phase"));
        }

        let mut seen: HashSet<&str> = HashSet::new();
        for (index, phase) in phases.iter().enumerate() {
            if phase.name.trim().is_empty() {
                return Err(OrchestratorError::invalid_input("phases")
                    .with_reason(format!("phase #{index} has an empty name")));
            }
            for source in phase.prerequisites.iter().chain(&phase.context_from) {
                if !seen.contains(source.as_str()) {
                    return Err(OrchestratorError::invalid_input("phases").with_reason(format!(
                        "phase '{}' depends on '{source}', which is not an earlier phase",
                        phase.name
                    )));
                }
            }
            if phase.kind == PhaseKind::Archive && index + 1 != phases.len() {
                return Err(OrchestratorError::invalid_input("phases").with_reason(format!(
                    "archive phase '{}' must be the last phase",
                    phase.name
                )));
            }
            if !seen.insert(phase.name.as_str()) {
                return Err(OrchestratorError::invalid_input("phases")
                    .with_reason(format!("duplicate phase name '{}'", phase.name)));
            }
        }
        Ok(())
    }

    /// All phases in pipeline order.
    pub fn phases(&self) -> &[PhaseConfig] {
        &self.phases
    }

    pub fn phase(&self, name: &str) -> Option<&PhaseConfig> {
        self.phases.iter().find(|phase| phase.name == name)
    }

    pub fn phase_names(&self) -> impl Iterator<Item = &str> {
        self.phases.iter().map(|phase| phase.name.as_str())
    }

    /// Phases in pipeline order, optionally restricted to required ones.
    pub fn ordered_phases(&self, include_optional: bool) -> Vec<&PhaseConfig> {
        self.phases
            .iter()
            .filter(|phase| include_optional || phase.required)
            .collect()
    }

    /// Whether every prerequisite of `phase` is `completed` in `statuses`.
    /// Unknown phase names never start.
    pub fn can_start(&self, phase: &str, statuses: &BTreeMap<String, PhaseStatus>) -> bool {
        let Some(config) = self.phase(phase) else {
            debug!("can_start: unknown phase '{phase}'");
            return false;
        };
        config
            .prerequisites
            .iter()
            .all(|prerequisite| statuses.get(prerequisite) == Some(&PhaseStatus::Completed))
    }

    /// Exact, case-insensitive lookup of a task type, falling back to the
    /// default role.
    pub fn role_for_task_type(&self, task_type: &str) -> Role {
        self.lookup_task_type(task_type)
            .unwrap_or_else(|| self.default_role.clone())
    }

    /// Like [`Self::role_for_task_type`] but without the fallback.
    pub(crate) fn lookup_task_type(&self, task_type: &str) -> Option<Role> {
        let wanted = task_type.trim().to_lowercase();
        self.task_roles
            .iter()
            .find(|(known, _)| *known == wanted)
            .map(|(_, role)| role.clone())
    }

    /// Keyword heuristic over the type table and fallback rules.
    pub fn infer_role_from_text(&self, description: &str) -> Role {
        self.keyword_resolver().resolve(description)
    }

    /// The default role inference strategy for this graph's table.
    pub fn keyword_resolver(&self) -> KeywordRoleResolver {
        KeywordRoleResolver::new(self.task_roles.clone(), self.default_role.clone())
    }

    pub fn default_role(&self) -> &Role {
        &self.default_role
    }
}

impl Default for PhaseGraph {
    fn default() -> Self {
        Self {
            phases: default_phases(),
            task_roles: default_task_roles(),
            default_role: Role::new(DEFAULT_ROLE),
        }
    }
}
