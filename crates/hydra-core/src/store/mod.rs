//! Async plan store.
//!
//! [`PlanStore`] is the single writer of plan state. Each call runs the
//! matching [`PlanDocuments`] operation on the blocking thread pool, so a
//! store can be shared freely between async tasks. Mutations through clones
//! of one store are serialized, which keeps the read-modify-write cycle of
//! concurrently running tasks from losing updates. Two stores over the same
//! directory are not coordinated.
//!
//! ```text
//! ┌──────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │ PlanOrchestrator │───▶│    PlanStore    │───▶│  PlanDocuments  │
//! │                  │    │ (async, cloned) │    │  (sync, files)  │
//! └──────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use hydra_core::{params::CreatePlan, PlanStoreBuilder};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = PlanStoreBuilder::new()
//!     .with_plans_dir(Some("/tmp/hydra-plans"))
//!     .build()
//!     .await?;
//!
//! let plan = store.create(&CreatePlan::new("add dark mode toggle")).await?;
//! assert!(store.load(&plan.id).await?.is_some());
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use tokio::{sync::Mutex, task};

pub mod builder;
pub mod plan_ops;
pub mod record_ops;

pub use builder::PlanStoreBuilder;

use crate::{
    documents::PlanDocuments,
    error::{OrchestratorError, Result},
    graph::PhaseGraph,
};

/// Durable, file-backed store of plan documents.
#[derive(Debug, Clone)]
pub struct PlanStore {
    documents: Arc<PlanDocuments>,
    graph: Arc<PhaseGraph>,
    write_lock: Arc<Mutex<()>>,
}

impl PlanStore {
    pub(crate) fn new(documents: Arc<PlanDocuments>, graph: Arc<PhaseGraph>) -> Self {
        Self {
            documents,
            graph,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// The phase graph new plans are seeded from.
    pub fn graph(&self) -> &Arc<PhaseGraph> {
        &self.graph
    }

    /// Directory holding live plan documents.
    pub fn plans_dir(&self) -> &std::path::Path {
        self.documents.root()
    }

    /// Runs a mutating document operation on the blocking pool while holding
    /// the store's write lock.
    async fn write<T, F>(&self, operation: F) -> Result<T>
    where
        F: FnOnce(&PlanDocuments, &PhaseGraph) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let _guard = self.write_lock.lock().await;
        self.blocking(operation).await
    }

    /// Runs a document operation on the blocking pool.
    async fn blocking<T, F>(&self, operation: F) -> Result<T>
    where
        F: FnOnce(&PlanDocuments, &PhaseGraph) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let documents = Arc::clone(&self.documents);
        let graph = Arc::clone(&self.graph);
        task::spawn_blocking(move || operation(&documents, &graph))
            .await
            .map_err(|e| OrchestratorError::Configuration {
                message: format!("Task join error: {e}"),
            })?
    }
}
