//! Builder for creating and configuring PlanOrchestrator instances.

use std::sync::Arc;

use super::{EchoExecutor, Executor, OrchestratorConfig, PlanOrchestrator};
use crate::{graph::RoleResolver, store::PlanStore};

/// Builder for creating and configuring PlanOrchestrator instances.
pub struct OrchestratorBuilder {
    store: PlanStore,
    executor: Option<Arc<dyn Executor>>,
    role_resolver: Option<Arc<dyn RoleResolver>>,
    config: OrchestratorConfig,
}

impl OrchestratorBuilder {
    /// Starts a builder over an opened store. The store's phase graph is the
    /// pipeline the orchestrator runs.
    pub fn new(store: PlanStore) -> Self {
        Self {
            store,
            executor: None,
            role_resolver: None,
            config: OrchestratorConfig::default(),
        }
    }

    /// Sets the executor that performs phase and task work.
    ///
    /// If not specified, [`EchoExecutor`] is used.
    pub fn with_executor(mut self, executor: Arc<dyn Executor>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Sets how task descriptions map to roles when neither the task nor its
    /// type names one.
    ///
    /// If not specified, the graph's keyword table is used.
    pub fn with_role_resolver(mut self, resolver: Arc<dyn RoleResolver>) -> Self {
        self.role_resolver = Some(resolver);
        self
    }

    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> PlanOrchestrator {
        let executor = self
            .executor
            .unwrap_or_else(|| Arc::new(EchoExecutor));
        let role_resolver = self
            .role_resolver
            .unwrap_or_else(|| Arc::new(self.store.graph().keyword_resolver()));
        PlanOrchestrator::new(self.store, executor, role_resolver, self.config)
    }
}
