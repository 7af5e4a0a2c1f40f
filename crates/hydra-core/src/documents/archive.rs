//! Archive area and housekeeping queries.

use std::{fs, path::PathBuf};

use jiff::{SignedDuration, Timestamp};
use log::{debug, info};

use super::{plan_docs::sort_newest_first, utils, PlanDocuments};
use crate::{
    error::{FsResultExt, OrchestratorError, Result},
    models::{Plan, PlanFilter, PlanStatus},
};

impl PlanDocuments {
    /// Moves a plan into the archive area, stamping `archived_at`.
    ///
    /// The archived copy is written before the live document is removed.
    /// Active plans cannot be archived.
    pub fn archive(&self, id: &str) -> Result<PathBuf> {
        let mut plan = self.load_existing(id)?;
        if plan.status == PlanStatus::Active {
            return Err(OrchestratorError::invalid_input("status")
                .with_reason(format!("plan {id} is still active and cannot be archived")));
        }

        let now = Timestamp::now();
        plan.status = PlanStatus::Archived;
        plan.archived_at = Some(now);
        plan.updated_at = now;

        let target = self.archived_path(id)?;
        utils::write_document(&target, &plan)?;

        let live = self.live_path(id)?;
        fs::remove_file(&live).fs_context(&live)?;
        info!("archived plan {id} to {}", target.display());
        Ok(target)
    }

    /// Loads a plan from the archive area.
    pub fn load_archived(&self, id: &str) -> Result<Option<Plan>> {
        utils::read_document(&self.archived_path(id)?)
    }

    /// Archived plans, newest-first.
    pub fn list_archived(&self, limit: Option<usize>) -> Result<Vec<Plan>> {
        let mut plans = utils::read_all_documents(&self.archive_root)?;
        sort_newest_first(&mut plans);
        if let Some(limit) = limit {
            plans.truncate(limit);
        }
        Ok(plans)
    }

    /// The newest live plan still `active`.
    pub fn active_plan(&self) -> Result<Option<Plan>> {
        let filter = PlanFilter {
            status: Some(PlanStatus::Active),
            limit: Some(1),
        };
        Ok(self.list(&filter)?.into_iter().next())
    }

    /// Archives every `completed` plan created more than `max_age_days` ago.
    /// Returns how many plans were archived.
    pub fn cleanup(&self, max_age_days: u32) -> Result<usize> {
        let max_age = SignedDuration::from_hours(i64::from(max_age_days) * 24);
        let now = Timestamp::now();

        let mut archived = 0;
        for plan in self.list(&PlanFilter::with_status(PlanStatus::Completed))? {
            if now.duration_since(plan.created_at) > max_age {
                self.archive(&plan.id)?;
                archived += 1;
            }
        }
        debug!("cleanup archived {archived} plan(s) older than {max_age_days} day(s)");
        Ok(archived)
    }
}
