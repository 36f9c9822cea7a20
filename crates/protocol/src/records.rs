use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

/// A single purchase requisition as it arrives from intake.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct Requisition {
    /// UNSPSC category code; numeric codes lose their leading zeros upstream
    #[serde(deserialize_with = "unspsc_from_any")]
    pub unspsc: String,

    /// Free-text item description
    pub description: String,

    /// Requested quantity (non-negative)
    pub quantity: f64,

    /// Price per unit (non-negative)
    pub unit_price: f64,

    /// Required delivery date as supplied by intake
    pub required_date: String,

    /// Delivery site
    pub delivery_location: String,
}

impl Requisition {
    #[must_use]
    pub fn new(
        unspsc: impl Into<String>,
        description: impl Into<String>,
        quantity: f64,
        unit_price: f64,
        required_date: impl Into<String>,
        delivery_location: impl Into<String>,
    ) -> Self {
        Self {
            unspsc: unspsc.into(),
            description: description.into(),
            quantity,
            unit_price,
            required_date: required_date.into(),
            delivery_location: delivery_location.into(),
        }
    }

    /// Line value before any aggregation
    #[must_use]
    pub fn total_value(&self) -> f64 {
        self.unit_price * self.quantity
    }
}

fn unspsc_from_any<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawCode {
        Text(String),
        Unsigned(u64),
        Signed(i64),
        Float(f64),
    }

    Ok(match RawCode::deserialize(deserializer)? {
        RawCode::Text(text) => text,
        RawCode::Unsigned(n) => n.to_string(),
        RawCode::Signed(n) => n.to_string(),
        // Keep the float token ("4321150.0") so the code check rejects it.
        RawCode::Float(n) => format!("{n:?}"),
    })
}

/// Requisition after normalization and cluster assignment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct NormalizedRequisition {
    pub unspsc: String,
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
    /// ISO `YYYY-MM-DD`
    pub required_date: String,
    pub delivery_location: String,
    pub unspsc_family: String,
    pub total_value: f64,
    pub base_cluster: usize,
    pub nlp_cluster: String,
    pub final_cluster: String,
}

/// Aggregate over requisitions sharing a category family and description neighbourhood.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct Cluster {
    pub cluster_id: String,
    pub unspsc_family: String,
    pub total_value: f64,
    /// Sum of member quantities
    pub units: f64,
    /// Distinct delivery locations in first-seen order
    pub locations: Vec<String>,
    /// ISO `YYYY-MM-DD`
    pub earliest_delivery: String,
    /// ISO `YYYY-MM-DD`
    pub latest_delivery: String,
    pub item_count: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Consolidate,
    ProcessIndividually,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct Recommendation {
    pub cluster_id: String,

    #[serde(rename = "recommendation")]
    pub decision: Decision,

    pub rationale: String,

    /// Present only for `consolidate`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub potential_savings: Option<f64>,

    /// Present only for `consolidate`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_quantity: Option<f64>,
}

impl Recommendation {
    #[must_use]
    pub fn is_consolidate(&self) -> bool {
        self.decision == Decision::Consolidate
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub enum EventType {
    #[serde(rename = "RFQ")]
    RequestForQuote,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationCriterion {
    Price,
    Quality,
    DeliveryTime,
}

impl EvaluationCriterion {
    pub const STANDARD: [EvaluationCriterion; 3] = [
        EvaluationCriterion::Price,
        EvaluationCriterion::Quality,
        EvaluationCriterion::DeliveryTime,
    ];
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct RequiredDates {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct AppliedParameters {
    /// Carries the cluster's total value, not the configured threshold
    pub moq: f64,
    pub delivery_window: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct SourcingEvent {
    pub event_type: EventType,
    pub cluster_id: String,
    pub unspsc_family: String,
    pub total_value: f64,
    pub required_dates: RequiredDates,
    pub geographic_scope: Vec<String>,
    pub total_quantity: i64,
    pub evaluation_criteria: Vec<EvaluationCriterion>,
    pub applied_parameters: AppliedParameters,
}
