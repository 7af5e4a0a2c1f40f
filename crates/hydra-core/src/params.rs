//! Parameter structures for store and orchestrator operations.
//!
//! These structures carry no interface-specific derives beyond serde, so an
//! enclosing layer (a CLI, an RPC surface) can wrap them without pulling its
//! framework into the core. With the `schema` feature enabled they also
//! derive `schemars::JsonSchema`.

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::PlanStatus;

/// Parameters for creating a plan document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct CreatePlan {
    /// The request the plan will carry through the pipeline
    pub query: String,
    /// Free-form caller data stored with the plan
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl CreatePlan {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            metadata: Map::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// Parameters for listing plans.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ListPlans {
    /// Only return plans in this status
    #[serde(default)]
    pub status: Option<PlanStatus>,
    /// Maximum number of plans to return, newest first
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Parameters for starting an orchestration run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct StartPlan {
    /// The high-level request to decompose and execute
    pub query: String,
    /// Free-form caller data stored with the plan
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl StartPlan {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            metadata: Map::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

impl From<&StartPlan> for CreatePlan {
    fn from(params: &StartPlan) -> Self {
        Self {
            query: params.query.clone(),
            metadata: params.metadata.clone(),
        }
    }
}
