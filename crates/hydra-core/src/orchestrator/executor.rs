//! The executor seam between the orchestrator and agent implementations.

use std::fmt;

use async_trait::async_trait;
use log::info;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use crate::models::Role;

/// What an executor call is working on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionTarget {
    /// A whole pipeline phase
    Phase(String),
    /// One task inside a fan-out phase
    Task { phase: String, id: String },
}

impl ExecutionTarget {
    /// Phase name, or the id of the task.
    pub fn name(&self) -> &str {
        match self {
            ExecutionTarget::Phase(name) => name,
            ExecutionTarget::Task { id, .. } => id,
        }
    }
}

impl fmt::Display for ExecutionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionTarget::Phase(name) => write!(f, "phase '{name}'"),
            ExecutionTarget::Task { id, .. } => write!(f, "task '{id}'"),
        }
    }
}

/// Everything an executor receives for one phase or task.
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    pub role: Role,
    pub target: ExecutionTarget,
    pub instructions: String,
    /// The plan's original query
    pub query: String,
    /// Outputs of earlier phases or dependency tasks, keyed by name
    pub context: Value,
    /// Shared signal for the whole run. Long-running executors should stop
    /// when it fires; the orchestrator cannot stop them otherwise.
    pub cancellation: CancellationToken,
}

/// Performs the actual work for a phase or task.
///
/// Implementations return any serializable JSON value. Errors are recorded
/// against the phase or task and never retried by the orchestrator.
#[async_trait]
pub trait Executor: Send + Sync {
    async fn execute(&self, request: ExecutionRequest) -> anyhow::Result<Value>;
}

/// Diagnostic executor that logs each request and echoes it back.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoExecutor;

#[async_trait]
impl Executor for EchoExecutor {
    async fn execute(&self, request: ExecutionRequest) -> anyhow::Result<Value> {
        info!(
            "echo executor: {} as {} ({} chars of instructions)",
            request.target,
            request.role,
            request.instructions.len()
        );
        Ok(json!({
            "role": request.role,
            "target": request.target.name(),
            "instructions": request.instructions,
            "query": request.query,
            "context": request.context,
        }))
    }
}
