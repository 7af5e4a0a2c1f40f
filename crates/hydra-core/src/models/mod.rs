//! Data models for plans, phases and tasks.
//!
//! A [`Plan`] is the durable record of one orchestration run. It owns one
//! [`PhaseRecord`] per configured pipeline phase and an append-only list of
//! [`TaskRecord`]s discovered while planning. Display implementations live
//! in [`crate::display`].
//!
//! Plans are only ever mutated through [`crate::store::PlanStore`]; the
//! partial update types in [`requests`] describe what a single write may
//! change.
//!
//! # Examples
//!
//! ```rust
//! use hydra_core::models::{PhaseRecord, PhaseStatus, PhaseUpdate, Role};
//!
//! let mut record = PhaseRecord::pending(Some(Role::new("planner")));
//! assert_eq!(record.status, PhaseStatus::Pending);
//!
//! let update = PhaseUpdate::completed(serde_json::json!({ "tasks": [] }));
//! assert_eq!(update.status, Some(PhaseStatus::Completed));
//! ```

pub mod filters;
pub mod phase;
pub mod plan;
pub mod requests;
pub mod role;
pub mod status;
pub mod summary;
pub mod task;


pub use filters::PlanFilter;
pub use phase::PhaseRecord;
pub use plan::{Plan, PLAN_DOCUMENT_VERSION};
pub use requests::{PhaseUpdate, TaskUpdate};
pub use role::Role;
pub use status::{PhaseStatus, PlanStatus, TaskPriority, TaskStatus};
pub use summary::PlanSummary;
pub use task::{NewTask, TaskRecord};
