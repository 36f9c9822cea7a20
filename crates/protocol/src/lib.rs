//! # Sourcing Protocol
//!
//! Record types exchanged between the sourcing pipeline stages and whatever
//! renders their output.
//!
//! ```text
//! Requisition[] ──> Cluster[] ──> Recommendation[] ──> SourcingEvent[]
//! ```

use anyhow::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

mod config;
mod records;

pub use config::{
    AggregationConfig, DEFAULT_CONSOLIDATION_WINDOW_DAYS, DEFAULT_MOQ,
    MAX_CONSOLIDATION_WINDOW_DAYS, MAX_MOQ, MIN_CONSOLIDATION_WINDOW_DAYS,
};
pub use records::{
    AppliedParameters, Cluster, Decision, EvaluationCriterion, EventType, NormalizedRequisition,
    Recommendation, RequiredDates, Requisition, SourcingEvent,
};

/// Everything a presentation layer needs from one pipeline run.
///
/// A non-empty `errors` list means the run failed and the other lists should
/// not be shown as results.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct PipelineOutput {
    pub clusters: Vec<Cluster>,
    pub recommendations: Vec<Recommendation>,
    pub sourcing_events: Vec<SourcingEvent>,
    pub errors: Vec<String>,

    /// Normalized input rows, only attached on request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<NormalizedRequisition>>,
}

impl PipelineOutput {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

pub fn output_schema() -> Result<serde_json::Value> {
    serde_json::to_value(schemars::schema_for!(PipelineOutput)).map_err(Into::into)
}

pub fn serialize_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    if pretty {
        serde_json::to_string_pretty(value).map_err(Into::into)
    } else {
        serde_json::to_string(value).map_err(Into::into)
    }
}
