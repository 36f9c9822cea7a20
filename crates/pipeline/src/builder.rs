use crate::dates::{format_date, parse_date};
use crate::error::EventError;
use chrono::{Days, NaiveDate};
use sourcing_protocol::{
    AggregationConfig, AppliedParameters, Cluster, EvaluationCriterion, EventType, Recommendation,
    RequiredDates, SourcingEvent,
};
use std::collections::HashSet;

#[derive(Debug, Clone, Default)]
pub struct EventOutcome {
    pub sourcing_events: Vec<SourcingEvent>,
    pub errors: Vec<String>,
}

/// Turns clusters recommended for consolidation into RFQ descriptions
#[derive(Debug, Clone, Copy, Default)]
pub struct SourcingEventBuilder;

impl SourcingEventBuilder {
    pub fn build(
        &self,
        clusters: &[Cluster],
        recommendations: &[Recommendation],
        config: &AggregationConfig,
        mut errors: Vec<String>,
    ) -> EventOutcome {
        match self.try_build(clusters, recommendations, config) {
            Ok(sourcing_events) => {
                log::info!("Created {} sourcing events", sourcing_events.len());
                EventOutcome {
                    sourcing_events,
                    errors,
                }
            }
            Err(err) => {
                log::error!("Sourcing event failed: {err}");
                errors.push(format!("Sourcing error: {err}"));
                EventOutcome {
                    sourcing_events: Vec::new(),
                    errors,
                }
            }
        }
    }

    pub fn try_build(
        &self,
        clusters: &[Cluster],
        recommendations: &[Recommendation],
        config: &AggregationConfig,
    ) -> Result<Vec<SourcingEvent>, EventError> {
        let consolidated: HashSet<&str> = recommendations
            .iter()
            .filter(|rec| rec.is_consolidate())
            .map(|rec| rec.cluster_id.as_str())
            .collect();

        clusters
            .iter()
            .filter(|cluster| consolidated.contains(cluster.cluster_id.as_str()))
            .map(|cluster| self.create_event(cluster, config.consolidation_window_days))
            .collect()
    }

    /// The configured window length doubles as the buffer after the latest delivery.
    pub fn create_event(&self, cluster: &Cluster, buffer_days: u32) -> Result<SourcingEvent, EventError> {
        let start = cluster_date(cluster, &cluster.earliest_delivery)?;
        let latest = cluster_date(cluster, &cluster.latest_delivery)?;
        let end = latest
            .checked_add_days(Days::new(u64::from(buffer_days)))
            .ok_or_else(|| EventError::DateOverflow {
                cluster_id: cluster.cluster_id.clone(),
            })?;

        // Fractional units are truncated.
        let units = cluster.units.trunc();
        if !units.is_finite() || units.abs() >= i64::MAX as f64 {
            return Err(EventError::InvalidQuantity {
                cluster_id: cluster.cluster_id.clone(),
                units: cluster.units,
            });
        }

        Ok(SourcingEvent {
            event_type: EventType::RequestForQuote,
            cluster_id: cluster.cluster_id.clone(),
            unspsc_family: cluster.unspsc_family.clone(),
            total_value: cluster.total_value,
            required_dates: RequiredDates {
                start: format_date(start),
                end: format_date(end),
            },
            geographic_scope: cluster.locations.clone(),
            total_quantity: units as i64,
            evaluation_criteria: EvaluationCriterion::STANDARD.to_vec(),
            applied_parameters: AppliedParameters {
                moq: cluster.total_value,
                delivery_window: buffer_days,
            },
        })
    }
}

fn cluster_date(cluster: &Cluster, value: &str) -> Result<NaiveDate, EventError> {
    parse_date(value).ok_or_else(|| EventError::InvalidDate {
        cluster_id: cluster.cluster_id.clone(),
        value: value.to_string(),
    })
}
