//! Core library for the Hydra phase-pipeline orchestrator.
//!
//! A query is turned into a durable [`Plan`] and carried through an ordered
//! pipeline of phases: speculate, plan, execute, synthesize, log and archive
//! by default. The execute phase fans out over the tasks the planning phase
//! produced, running each parallel group concurrently. The actual work of
//! every phase and task is delegated to a pluggable [`Executor`].
//!
//! # Layers
//!
//! - [`graph`]: The static phase pipeline and task role lookup
//! - [`documents`]: Synchronous JSON document persistence
//! - [`store`]: The async [`PlanStore`], the single writer of plan state
//! - [`orchestrator`]: The [`PlanOrchestrator`] state machine and executor seam
//! - [`display`]: Markdown formatting for plans, summaries and status
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use hydra_core::{params::StartPlan, EchoExecutor, OrchestratorBuilder, PlanStoreBuilder};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = PlanStoreBuilder::new()
//!     .with_plans_dir(Some("/tmp/hydra-plans"))
//!     .build()
//!     .await?;
//!
//! let orchestrator = OrchestratorBuilder::new(store.clone())
//!     .with_executor(Arc::new(EchoExecutor))
//!     .build();
//!
//! let plan = orchestrator
//!     .start_plan(&StartPlan::new("add dark mode toggle"))
//!     .await?;
//! println!("{plan}");
//!
//! // Archived plans are listed separately from live ones
//! for archived in store.list_archived(Some(10)).await? {
//!     println!("{} ({})", archived.query, archived.status);
//! }
//! # Ok(())
//! # }
//! ```

pub mod display;
pub mod documents;
pub mod error;
pub mod graph;
pub mod models;
pub mod orchestrator;
pub mod params;
pub mod store;

// Re-export commonly used types
pub use display::{LocalDateTime, PlanSummaries, Tasks};
pub use error::{OrchestratorError, Result};
pub use graph::{KeywordRoleResolver, PhaseConfig, PhaseGraph, PhaseKind, RoleResolver};
pub use models::{
    NewTask, PhaseRecord, PhaseStatus, PhaseUpdate, Plan, PlanFilter, PlanStatus, PlanSummary,
    Role, TaskPriority, TaskRecord, TaskStatus, TaskUpdate,
};
pub use orchestrator::{
    EchoExecutor, ExecutionRequest, ExecutionTarget, Executor, OrchestratorBuilder,
    OrchestratorConfig, OrchestratorEvent, OrchestratorState, PlanOrchestrator, StatusReport,
    TaskFailurePolicy,
};
pub use params::{CreatePlan, ListPlans, StartPlan};
pub use store::{PlanStore, PlanStoreBuilder};
