//! Task type to executor role mapping and role inference.

use crate::models::Role;

/// Role used when neither the type table nor any keyword matches.
pub const DEFAULT_ROLE: &str = "coder";

/// Task type → role table. Also used as the keyword list for inference, so
/// more specific entries come first.
const TASK_ROLES: &[(&str, &str)] = &[
    ("research", "researcher"),
    ("analysis", "researcher"),
    ("planning", "planner"),
    ("architecture", "architect"),
    ("design", "architect"),
    ("security", "security"),
    ("audit", "security"),
    ("testing", "tester"),
    ("test", "tester"),
    ("documentation", "documenter"),
    ("docs", "documenter"),
    ("deployment", "devops"),
    ("deploy", "devops"),
    ("infrastructure", "devops"),
    ("database", "data"),
    ("migration", "data"),
    ("review", "reviewer"),
    ("debug", "debugger"),
    ("refactor", "coder"),
    ("implementation", "coder"),
    ("feature", "coder"),
    ("code", "coder"),
];

/// Keyword rules consulted after the type table.
const FALLBACK_RULES: &[(&[&str], &str)] = &[
    (&["fix", "bug", "error", "crash"], "debugger"),
    (&["explain", "why", "investigate", "understand"], "researcher"),
    (&["readme", "document"], "documenter"),
];

/// Strategy for picking an executor role from a task description.
///
/// The orchestrator consults it only for tasks that carry neither an
/// explicit role nor a known type.
pub trait RoleResolver: Send + Sync {
    fn resolve(&self, description: &str) -> Role;
}

/// Case-insensitive keyword-substring matcher.
#[derive(Debug, Clone)]
pub struct KeywordRoleResolver {
    table: Vec<(String, Role)>,
    fallbacks: Vec<(Vec<String>, Role)>,
    default_role: Role,
}

impl KeywordRoleResolver {
    /// Resolver over a custom keyword table with the built-in fallback rules.
    pub fn new(table: Vec<(String, Role)>, default_role: Role) -> Self {
        let fallbacks = FALLBACK_RULES
            .iter()
            .map(|(words, role)| {
                (
                    words.iter().map(|w| (*w).to_string()).collect(),
                    Role::new(*role),
                )
            })
            .collect();
        Self {
            table,
            fallbacks,
            default_role,
        }
    }
}

impl Default for KeywordRoleResolver {
    fn default() -> Self {
        Self::new(default_task_roles(), Role::new(DEFAULT_ROLE))
    }
}

impl RoleResolver for KeywordRoleResolver {
    fn resolve(&self, description: &str) -> Role {
        let text = description.to_lowercase();

        if let Some((_, role)) = self
            .table
            .iter()
            .find(|(keyword, _)| text.contains(keyword.as_str()))
        {
            return role.clone();
        }

        self.fallbacks
            .iter()
            .find(|(words, _)| words.iter().any(|w| text.contains(w.as_str())))
            .map_or_else(|| self.default_role.clone(), |(_, role)| role.clone())
    }
}

/// Owned copy of the built-in task type table.
pub fn default_task_roles() -> Vec<(String, Role)> {
    TASK_ROLES
        .iter()
        .map(|(task_type, role)| ((*task_type).to_string(), Role::new(*role)))
        .collect()
}
