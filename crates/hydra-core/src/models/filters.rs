//! Filter types for querying plans.

use super::PlanStatus;

/// Filter options for listing plans.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanFilter {
    /// Only plans with this status; all statuses when `None`
    pub status: Option<PlanStatus>,

    /// Maximum number of plans returned after sorting newest-first
    pub limit: Option<usize>,
}

impl PlanFilter {
    /// Filter for plans in one status.
    ///
    /// ```rust
    /// use hydra_core::models::{PlanFilter, PlanStatus};
    ///
    /// let filter = PlanFilter::with_status(PlanStatus::Completed);
    /// assert_eq!(filter.status, Some(PlanStatus::Completed));
    /// assert_eq!(filter.limit, None);
    /// ```
    pub fn with_status(status: PlanStatus) -> Self {
        Self {
            status: Some(status),
            limit: None,
        }
    }

    pub(crate) fn matches(&self, status: PlanStatus) -> bool {
        self.status.map_or(true, |wanted| wanted == status)
    }
}

impl From<&crate::params::ListPlans> for PlanFilter {
    fn from(params: &crate::params::ListPlans) -> Self {
        Self {
            status: params.status,
            limit: params.limit,
        }
    }
}
