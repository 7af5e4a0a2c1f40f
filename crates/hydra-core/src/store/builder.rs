//! Builder for creating and configuring PlanStore instances.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use tokio::task;

use super::PlanStore;
use crate::{
    documents::{utils, PlanDocuments},
    error::{OrchestratorError, Result},
    graph::PhaseGraph,
};

/// Builder for creating and configuring PlanStore instances.
#[derive(Debug, Clone, Default)]
pub struct PlanStoreBuilder {
    plans_dir: Option<PathBuf>,
    graph: Option<PhaseGraph>,
}

impl PlanStoreBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a custom plans directory.
    ///
    /// If not specified, uses `<cwd>/.hydra/plans`. Relative paths are
    /// resolved against the current working directory.
    pub fn with_plans_dir<P: AsRef<Path>>(mut self, path: Option<P>) -> Self {
        if let Some(path) = path {
            self.plans_dir = Some(path.as_ref().to_path_buf());
        }
        self
    }

    /// Sets the phase graph used to seed new plans. Defaults to the
    /// six-phase pipeline.
    pub fn with_phase_graph(mut self, graph: PhaseGraph) -> Self {
        self.graph = Some(graph);
        self
    }

    /// Builds the configured store, creating the directory tree.
    ///
    /// # Errors
    ///
    /// Returns `OrchestratorError::InvalidInput` if the working directory
    /// cannot be resolved, or `OrchestratorError::FileSystem` if the
    /// directories cannot be created.
    pub async fn build(self) -> Result<PlanStore> {
        let root = match self.plans_dir {
            Some(path) => utils::ensure_absolute(&path)?,
            None => utils::default_plans_dir()?,
        };

        let documents = task::spawn_blocking(move || PlanDocuments::new(root))
            .await
            .map_err(|e| OrchestratorError::Configuration {
                message: format!("Task join error: {e}"),
            })??;

        Ok(PlanStore::new(
            Arc::new(documents),
            Arc::new(self.graph.unwrap_or_default()),
        ))
    }
}
