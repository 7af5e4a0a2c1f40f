//! Markdown display for plans, tasks and orchestrator status.
//!
//! Domain models implement [`std::fmt::Display`] directly; collections and
//! derived views go through small wrapper types.
//!
//! ## Module Organization
//!
//! - [`collections`]: Collection wrappers (PlanSummaries, Tasks)
//! - [`datetime`]: Timestamp and duration formatting
//! - [`models`]: Display implementations for domain models
//! - `status`: Display for [`crate::orchestrator::StatusReport`]

pub mod collections;
pub mod datetime;
pub mod models;
mod status;

pub use collections::{PlanSummaries, Tasks};
pub use datetime::{Elapsed, LocalDateTime};
pub use models::PhaseLine;
