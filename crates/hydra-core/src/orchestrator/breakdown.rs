//! Task breakdown parsing for fan-out phases.
//!
//! The planning phase is expected to emit JSON shaped like
//!
//! ```json
//! {
//!   "tasks": [
//!     {"id": "task-1", "description": "Add theme context", "type": "implementation"},
//!     {"id": "task-2", "description": "Write toggle tests", "type": "testing",
//!      "dependencies": ["task-1"]}
//!   ],
//!   "parallelGroups": [["task-1"], ["task-2"]]
//! }
//! ```
//!
//! Either key spelling (`parallelGroups` or `parallel_groups`) is accepted, and
//! the document may arrive as a JSON string. Without explicit groups the tasks
//! are layered by their dependencies.

use std::collections::{BTreeMap, HashMap, HashSet};

use log::{debug, warn};
use serde::Deserialize;
use serde_json::Value;

use crate::{
    error::{OrchestratorError, Result},
    graph::PhaseConfig,
    models::{NewTask, Plan, PhaseStatus, Role, TaskPriority},
};

#[derive(Debug, Deserialize)]
struct RawBreakdown {
    #[serde(default)]
    tasks: Vec<RawTask>,
    #[serde(default, alias = "parallelGroups")]
    parallel_groups: Option<Vec<Vec<String>>>,
}

#[derive(Debug, Deserialize)]
struct RawTask {
    #[serde(default)]
    id: Option<String>,
    #[serde(default, alias = "task", alias = "title")]
    description: String,
    #[serde(default, rename = "type")]
    task_type: String,
    #[serde(default, alias = "agent")]
    role: Option<Role>,
    #[serde(default)]
    priority: Option<Value>,
    #[serde(default)]
    verification: Option<String>,
    #[serde(default, alias = "dependsOn", alias = "depends_on")]
    dependencies: Vec<String>,
}

/// Tasks with assigned ids, and the groups they run in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskBreakdown {
    pub tasks: Vec<NewTask>,
    /// Groups run in order; tasks inside a group run concurrently
    pub groups: Vec<Vec<String>>,
}

impl TaskBreakdown {
    /// Finds the breakdown among the outputs `phase` reads from, preferring
    /// prerequisites over context sources. A missing breakdown is an empty one.
    pub fn from_plan(plan: &Plan, phase: &PhaseConfig) -> Result<Self> {
        for source in phase.prerequisites.iter().chain(&phase.context_from) {
            let Some(record) = plan.phase(source) else {
                continue;
            };
            if record.status != PhaseStatus::Completed {
                continue;
            }
            let Some(output) = record.output.as_ref() else {
                continue;
            };
            if let Some(document) = breakdown_document(output) {
                debug!("Using task breakdown from phase '{source}'");
                return Self::parse(&document);
            }
        }
        debug!("No task breakdown found for phase '{}'", phase.name);
        Ok(Self::default())
    }

    /// Parses a breakdown document, assigning `task-N` ids to tasks without
    /// one and computing groups when none are given. A task listed in the
    /// same group as one of its dependencies, or earlier, is moved to the
    /// first group after it.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for malformed documents, duplicate task ids, unknown
    /// dependencies or dependency cycles.
    pub fn parse(document: &Value) -> Result<Self> {
        let raw: RawBreakdown = serde_json::from_value(document.clone()).map_err(|e| {
            OrchestratorError::invalid_input("tasks")
                .with_reason(format!("malformed task breakdown: {e}"))
        })?;

        let tasks = assign_ids(raw.tasks)?;
        let layers = layer_by_dependencies(&tasks)?;
        let groups = match raw.parallel_groups {
            Some(groups) if !groups.is_empty() => {
                defer_dependents(&tasks, normalize_groups(&tasks, groups), &layers)
            }
            _ => layers,
        };

        Ok(Self { tasks, groups })
    }

    pub fn task(&self, id: &str) -> Option<&NewTask> {
        self.tasks
            .iter()
            .find(|task| task.id.as_deref() == Some(id))
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// The breakdown object inside a phase output, if it has one.
fn breakdown_document(output: &Value) -> Option<Value> {
    match output {
        Value::Object(map) if map.contains_key("tasks") => Some(output.clone()),
        Value::String(text) => serde_json::from_str::<Value>(text)
            .ok()
            .filter(|value| value.get("tasks").is_some()),
        _ => None,
    }
}

fn assign_ids(raw: Vec<RawTask>) -> Result<Vec<NewTask>> {
    let mut tasks = Vec::with_capacity(raw.len());
    let mut seen = HashSet::new();

    for (index, task) in raw.into_iter().enumerate() {
        let id = match task.id.filter(|id| !id.trim().is_empty()) {
            Some(id) => id,
            None => format!("task-{}", index + 1),
        };
        if !seen.insert(id.clone()) {
            return Err(OrchestratorError::invalid_input("tasks")
                .with_reason(format!("duplicate task id '{id}'")));
        }
        if task.description.trim().is_empty() {
            return Err(OrchestratorError::invalid_input("tasks")
                .with_reason(format!("task '{id}' has no description")));
        }

        tasks.push(NewTask {
            id: Some(id),
            description: task.description,
            task_type: task.task_type,
            role: task.role,
            priority: task.priority.as_ref().map(parse_priority).unwrap_or_default(),
            verification: task.verification,
            dependencies: task.dependencies,
        });
    }

    Ok(tasks)
}

/// Accepts priority names or the 1 (critical) to 4 (low) numeric scale.
fn parse_priority(value: &Value) -> TaskPriority {
    match value {
        Value::String(name) => name.parse().unwrap_or_default(),
        Value::Number(number) => match number.as_u64() {
            Some(1) => TaskPriority::Critical,
            Some(2) => TaskPriority::High,
            Some(4) => TaskPriority::Low,
            _ => TaskPriority::Normal,
        },
        _ => TaskPriority::Normal,
    }
}

fn task_ids(tasks: &[NewTask]) -> Vec<&str> {
    tasks.iter().filter_map(|task| task.id.as_deref()).collect()
}

/// Keeps the first mention of each known task and appends a final group of
/// the tasks no group mentions.
fn normalize_groups(tasks: &[NewTask], groups: Vec<Vec<String>>) -> Vec<Vec<String>> {
    let known: HashSet<&str> = task_ids(tasks).into_iter().collect();
    let mut placed: HashSet<String> = HashSet::new();
    let mut normalized = Vec::with_capacity(groups.len() + 1);

    for group in groups {
        let mut kept = Vec::with_capacity(group.len());
        for id in group {
            if !known.contains(id.as_str()) {
                warn!("Ignoring unknown task '{id}' in parallel groups");
                continue;
            }
            if placed.insert(id.clone()) {
                kept.push(id);
            }
        }
        if !kept.is_empty() {
            normalized.push(kept);
        }
    }

    let leftover: Vec<String> = task_ids(tasks)
        .into_iter()
        .filter(|id| !placed.contains(*id))
        .map(str::to_string)
        .collect();
    if !leftover.is_empty() {
        debug!("{} task(s) not in any group run last", leftover.len());
        normalized.push(leftover);
    }

    normalized
}

/// Pushes every task into a later group than all of its dependencies.
/// `layers` is a topological order, so one pass settles every task.
fn defer_dependents(
    tasks: &[NewTask],
    groups: Vec<Vec<String>>,
    layers: &[Vec<String>],
) -> Vec<Vec<String>> {
    let mut level: HashMap<String, usize> = HashMap::new();
    let mut order = Vec::new();
    for (index, group) in groups.into_iter().enumerate() {
        for id in group {
            level.insert(id.clone(), index);
            order.push(id);
        }
    }

    for id in layers.iter().flatten() {
        let Some(task) = tasks.iter().find(|task| task.id.as_deref() == Some(id.as_str())) else {
            continue;
        };
        let earliest = task
            .dependencies
            .iter()
            .filter_map(|dependency| level.get(dependency))
            .map(|dependency_level| dependency_level + 1)
            .max()
            .unwrap_or_default();
        if let Some(current) = level.get_mut(id) {
            if *current < earliest {
                debug!("Moving task '{id}' to group {} after its dependencies", earliest + 1);
                *current = earliest;
            }
        }
    }

    let mut deferred: BTreeMap<usize, Vec<String>> = BTreeMap::new();
    for id in order {
        let index = level.get(&id).copied().unwrap_or_default();
        deferred.entry(index).or_default().push(id);
    }
    deferred.into_values().collect()
}

/// Kahn layering: each group holds the tasks whose dependencies all sit in
/// earlier groups. Order inside a group follows the breakdown.
fn layer_by_dependencies(tasks: &[NewTask]) -> Result<Vec<Vec<String>>> {
    let known: HashSet<&str> = task_ids(tasks).into_iter().collect();
    let mut remaining: BTreeMap<usize, HashSet<&str>> = BTreeMap::new();

    for (index, task) in tasks.iter().enumerate() {
        let id = task.id.as_deref().unwrap_or_default();
        let mut pending = HashSet::new();
        for dependency in &task.dependencies {
            if !known.contains(dependency.as_str()) {
                return Err(OrchestratorError::invalid_input("tasks").with_reason(format!(
                    "task '{id}' depends on unknown task '{dependency}'"
                )));
            }
            if dependency == id {
                return Err(OrchestratorError::invalid_input("tasks")
                    .with_reason(format!("task '{id}' depends on itself")));
            }
            pending.insert(dependency.as_str());
        }
        remaining.insert(index, pending);
    }

    let mut groups = Vec::new();
    while !remaining.is_empty() {
        let ready: Vec<usize> = remaining
            .iter()
            .filter(|(_, pending)| pending.is_empty())
            .map(|(index, _)| *index)
            .collect();

        if ready.is_empty() {
            let stuck: Vec<&str> = remaining
                .keys()
                .filter_map(|index| tasks[*index].id.as_deref())
                .collect();
            return Err(OrchestratorError::invalid_input("tasks").with_reason(format!(
                "dependency cycle among tasks: {}",
                stuck.join(", ")
            )));
        }

        let group: Vec<String> = ready
            .iter()
            .filter_map(|index| tasks[*index].id.clone())
            .collect();
        for index in &ready {
            remaining.remove(index);
        }
        for pending in remaining.values_mut() {
            for id in &group {
                pending.remove(id.as_str());
            }
        }
        groups.push(group);
    }

    Ok(groups)
}
