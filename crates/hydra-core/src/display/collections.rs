//! Collection wrapper types for displaying groups of domain objects.

use std::{fmt, ops::Index};

use crate::models::{PlanSummary, TaskRecord};

/// Newtype wrapper for displaying collections of plan summaries.
///
/// # Examples
///
/// ```rust
/// use hydra_core::{
///     display::PlanSummaries,
///     models::{PlanStatus, PlanSummary},
/// };
/// use jiff::Timestamp;
///
/// let summary = PlanSummary {
///     id: "plan-1".to_string(),
///     query: "add dark mode toggle".to_string(),
///     status: PlanStatus::Active,
///     created_at: Timestamp::now(),
///     updated_at: Timestamp::now(),
///     total_phases: 6,
///     completed_phases: 2,
///     total_tasks: 2,
///     completed_tasks: 1,
///     failed_tasks: 1,
/// };
///
/// let output = PlanSummaries(vec![summary]).to_string();
/// assert!(output.contains("add dark mode toggle"));
/// assert!(output.contains("1 failed"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PlanSummaries(pub Vec<PlanSummary>);

impl PlanSummaries {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, index: usize) -> Option<&PlanSummary> {
        self.0.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PlanSummary> {
        self.0.iter()
    }
}

impl Index<usize> for PlanSummaries {
    type Output = PlanSummary;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl IntoIterator for PlanSummaries {
    type Item = PlanSummary;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a PlanSummaries {
    type Item = &'a PlanSummary;
    type IntoIter = std::slice::Iter<'a, PlanSummary>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for PlanSummaries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No plans found.");
        }
        for plan in &self.0 {
            write!(f, "{plan}")?;
        }
        Ok(())
    }
}

/// Borrowed list of tasks, e.g. the tasks of one plan.
pub struct Tasks<'a>(pub &'a [TaskRecord]);

impl fmt::Display for Tasks<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No tasks.");
        }
        for task in self.0 {
            write!(f, "{task}")?;
        }
        Ok(())
    }
}
