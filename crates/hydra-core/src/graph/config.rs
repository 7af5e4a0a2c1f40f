//! Static phase configuration and the default six-phase pipeline.

use std::time::Duration;

use crate::models::Role;

pub const SPECULATE: &str = "speculate";
pub const PLAN: &str = "plan";
pub const EXECUTE: &str = "execute";
pub const SYNTHESIZE: &str = "synthesize";
pub const LOG: &str = "log";
pub const ARCHIVE: &str = "archive";

/// How the orchestrator runs a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhaseKind {
    /// One executor call with the assembled context
    #[default]
    Generic,
    /// Fans out over the tasks produced by a prerequisite phase
    TaskFanOut,
    /// Moves the plan into the archive area
    Archive,
}

/// Static description of one pipeline phase.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseConfig {
    pub name: String,
    pub description: String,
    /// Executor role; `None` for dynamic or system phases
    pub role: Option<Role>,
    /// Budget for the executor call (per task for fan-out phases)
    pub timeout: Duration,
    /// A required phase's failure aborts the run
    pub required: bool,
    /// Whether work inside the phase may run concurrently
    pub parallel: bool,
    /// Phases that must be `completed` before this one may start
    pub prerequisites: Vec<String>,
    /// Phases whose outputs are passed as context when available, without
    /// gating start
    pub context_from: Vec<String>,
    /// Instruction template; `{query}` is replaced by the plan query
    pub instructions: Option<String>,
    pub kind: PhaseKind,
}

impl PhaseConfig {
    /// A required generic phase with no prerequisites and a two minute budget.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            role: None,
            timeout: Duration::from_secs(120),
            required: true,
            parallel: false,
            prerequisites: Vec::new(),
            context_from: Vec::new(),
            instructions: None,
            kind: PhaseKind::Generic,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_role(mut self, role: impl Into<Role>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Marks the phase optional: its failure is recorded and swallowed.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn parallel(mut self) -> Self {
        self.parallel = true;
        self
    }

    pub fn after(mut self, prerequisites: &[&str]) -> Self {
        self.prerequisites = prerequisites.iter().map(|p| (*p).to_string()).collect();
        self
    }

    pub fn with_context_from(mut self, phases: &[&str]) -> Self {
        self.context_from = phases.iter().map(|p| (*p).to_string()).collect();
        self
    }

    pub fn with_instructions(mut self, template: impl Into<String>) -> Self {
        self.instructions = Some(template.into());
        self
    }

    pub fn with_kind(mut self, kind: PhaseKind) -> Self {
        self.kind = kind;
        self
    }

    /// Render the instruction template for a query.
    pub fn render_instructions(&self, query: &str) -> String {
        match &self.instructions {
            Some(template) => template.replace("{query}", query),
            None => format!("Run the {} phase for: {query}", self.name),
        }
    }
}

/// The speculate → plan → execute → synthesize → log → archive pipeline.
pub fn default_phases() -> Vec<PhaseConfig> {
    vec![
        PhaseConfig::new(SPECULATE)
            .with_description("Research the request and gather background")
            .with_role("researcher")
            .with_timeout(Duration::from_secs(60))
            .optional()
            .with_instructions(
                "Research the context needed to address: {query}. \
                 Summarize relevant facts, risks and open questions.",
            ),
        PhaseConfig::new(PLAN)
            .with_description("Break the request into tasks and parallel groups")
            .with_role("planner")
            .with_timeout(Duration::from_secs(120))
            .with_context_from(&[SPECULATE])
            .with_instructions(
                "Create an execution plan for: {query}. Respond with JSON containing \
                 `tasks` (id, description, type, role, priority, verification, \
                 dependencies) and `parallelGroups` (arrays of task ids).",
            ),
        PhaseConfig::new(EXECUTE)
            .with_description("Run every planned task through its executor")
            .with_timeout(Duration::from_secs(600))
            .parallel()
            .after(&[PLAN])
            .with_kind(PhaseKind::TaskFanOut),
        PhaseConfig::new(SYNTHESIZE)
            .with_description("Merge task results into a final answer")
            .with_role("synthesizer")
            .with_timeout(Duration::from_secs(120))
            .after(&[EXECUTE])
            .with_context_from(&[SPECULATE, PLAN])
            .with_instructions(
                "Synthesize the task results into a coherent answer for: {query}. \
                 Call out failed or skipped tasks.",
            ),
        PhaseConfig::new(LOG)
            .with_description("Write a session report")
            .with_role("documenter")
            .with_timeout(Duration::from_secs(60))
            .optional()
            .after(&[SYNTHESIZE])
            .with_context_from(&[PLAN, EXECUTE])
            .with_instructions("Write a concise session log for: {query}."),
        PhaseConfig::new(ARCHIVE)
            .with_description("Move the finished plan into the archive")
            .with_timeout(Duration::from_secs(30))
            .optional()
            .after(&[SYNTHESIZE])
            .with_kind(PhaseKind::Archive),
    ]
}
