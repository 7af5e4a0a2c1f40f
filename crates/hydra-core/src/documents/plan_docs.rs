//! Whole-document plan operations.

use std::fs;

use jiff::Timestamp;
use log::debug;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::{utils, PlanDocuments};
use crate::{
    error::{FsResultExt, OrchestratorError, Result},
    graph::PhaseGraph,
    models::{PhaseRecord, Plan, PlanFilter, PlanStatus, PLAN_DOCUMENT_VERSION},
};

impl PlanDocuments {
    /// Creates a new active plan with every phase of `graph` seeded as
    /// `pending`.
    pub fn create(
        &self,
        query: &str,
        metadata: Map<String, Value>,
        graph: &PhaseGraph,
    ) -> Result<Plan> {
        if query.trim().is_empty() {
            return Err(OrchestratorError::invalid_input("query")
                .with_reason("Query cannot be empty"));
        }

        let now = Timestamp::now();
        let phases = graph
            .phases()
            .iter()
            .map(|phase| (phase.name.clone(), PhaseRecord::pending(phase.role.clone())))
            .collect();

        let plan = Plan {
            id: format!("plan-{}", Uuid::new_v4().simple()),
            version: PLAN_DOCUMENT_VERSION,
            status: PlanStatus::Active,
            query: query.to_string(),
            created_at: now,
            updated_at: now,
            phases,
            tasks: Vec::new(),
            outputs: Default::default(),
            metadata,
            archived_at: None,
        };

        utils::write_document(&self.live_path(&plan.id)?, &plan)?;
        debug!("created plan {}", plan.id);
        Ok(plan)
    }

    /// Loads a live plan; `Ok(None)` when no such document exists.
    pub fn load(&self, id: &str) -> Result<Option<Plan>> {
        utils::read_document(&self.live_path(id)?)
    }

    /// Loads a live plan or fails with `PlanNotFound`.
    pub(crate) fn load_existing(&self, id: &str) -> Result<Plan> {
        self.load(id)?
            .ok_or_else(|| OrchestratorError::PlanNotFound { id: id.to_string() })
    }

    /// Overwrites the plan's document, stamping `updated_at`.
    pub fn save(&self, plan: &mut Plan) -> Result<()> {
        plan.updated_at = Timestamp::now();
        utils::write_document(&self.live_path(&plan.id)?, plan)
    }

    /// Removes a live document. Returns whether anything was deleted.
    pub fn delete(&self, id: &str) -> Result<bool> {
        let path = self.live_path(id)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!("deleted plan {id}");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e).fs_context(&path),
        }
    }

    /// Lists live plans newest-first, applying the status filter and limit.
    /// Documents that fail to parse are skipped.
    pub fn list(&self, filter: &PlanFilter) -> Result<Vec<Plan>> {
        let mut plans: Vec<Plan> = utils::read_all_documents(&self.root)?
            .into_iter()
            .filter(|plan| filter.matches(plan.status))
            .collect();
        sort_newest_first(&mut plans);
        if let Some(limit) = filter.limit {
            plans.truncate(limit);
        }
        Ok(plans)
    }

    /// Read-modify-write of one live document.
    pub(crate) fn modify<T, F>(&self, id: &str, apply: F) -> Result<T>
    where
        F: FnOnce(&mut Plan) -> Result<T>,
    {
        let mut plan = self.load_existing(id)?;
        let result = apply(&mut plan)?;
        self.save(&mut plan)?;
        Ok(result)
    }
}

pub(crate) fn sort_newest_first(plans: &mut [Plan]) {
    plans.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}
