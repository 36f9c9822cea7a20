use crate::dates::parse_date;
use crate::error::AdviceError;
use chrono::NaiveDate;
use sourcing_protocol::{AggregationConfig, Cluster, Decision, Recommendation};

/// Share of cluster value assumed recoverable through consolidation
pub const SYNERGY_SAVINGS_RATE: f64 = 0.15;

#[derive(Debug, Clone, Default)]
pub struct AdviceOutcome {
    pub recommendations: Vec<Recommendation>,
    pub errors: Vec<String>,
}

/// Decides per cluster whether a consolidated purchase is worthwhile
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsolidationAdvisor;

impl ConsolidationAdvisor {
    pub fn recommend(
        &self,
        clusters: &[Cluster],
        config: &AggregationConfig,
        mut errors: Vec<String>,
    ) -> AdviceOutcome {
        match self.try_recommend(clusters, config) {
            Ok(recommendations) => {
                let consolidate = recommendations.iter().filter(|r| r.is_consolidate()).count();
                log::info!(
                    "Recommended consolidation for {consolidate} of {} clusters",
                    recommendations.len()
                );
                AdviceOutcome {
                    recommendations,
                    errors,
                }
            }
            Err(err) => {
                log::error!("Recommendation failed: {err}");
                errors.push(format!("Recommendation error: {err}"));
                AdviceOutcome {
                    recommendations: Vec::new(),
                    errors,
                }
            }
        }
    }

    /// One recommendation per cluster, in cluster order; the first failure aborts the batch
    pub fn try_recommend(
        &self,
        clusters: &[Cluster],
        config: &AggregationConfig,
    ) -> Result<Vec<Recommendation>, AdviceError> {
        clusters
            .iter()
            .map(|cluster| self.evaluate(cluster, config))
            .collect()
    }

    pub fn evaluate(
        &self,
        cluster: &Cluster,
        config: &AggregationConfig,
    ) -> Result<Recommendation, AdviceError> {
        let earliest = cluster_date(cluster, &cluster.earliest_delivery)?;
        let latest = cluster_date(cluster, &cluster.latest_delivery)?;
        let window_days = (latest - earliest).num_days();

        let moq = config.moq;
        let max_window = config.consolidation_window_days;
        let meets_moq = cluster.total_value >= moq as f64;
        let meets_window = window_days <= i64::from(max_window);

        if meets_moq && meets_window {
            return Ok(Recommendation {
                cluster_id: cluster.cluster_id.clone(),
                decision: Decision::Consolidate,
                rationale: format!(
                    "Meets MOQ (${moq}) and delivery window ({window_days}d <= {max_window}d)"
                ),
                potential_savings: Some(cluster.total_value * SYNERGY_SAVINGS_RATE),
                total_quantity: Some(cluster.units),
            });
        }

        let mut rationale_parts = Vec::with_capacity(2);
        if !meets_moq {
            rationale_parts.push(format!("Value ${} < MOQ ${moq}", cluster.total_value));
        }
        if !meets_window {
            rationale_parts.push(format!("Window {window_days}d > {max_window}d"));
        }

        Ok(Recommendation {
            cluster_id: cluster.cluster_id.clone(),
            decision: Decision::ProcessIndividually,
            rationale: rationale_parts.join(". "),
            potential_savings: None,
            total_quantity: None,
        })
    }
}

fn cluster_date(cluster: &Cluster, value: &str) -> Result<NaiveDate, AdviceError> {
    parse_date(value).ok_or_else(|| AdviceError::InvalidDate {
        cluster_id: cluster.cluster_id.clone(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cluster(id: &str, total_value: f64, earliest: &str, latest: &str) -> Cluster {
        Cluster {
            cluster_id: id.to_string(),
            unspsc_family: "43211500".to_string(),
            total_value,
            units: 12.0,
            locations: vec!["Austin".to_string()],
            earliest_delivery: earliest.to_string(),
            latest_delivery: latest.to_string(),
            item_count: 2,
        }
    }

    #[test]
    fn consolidates_when_both_thresholds_hold() {
        let rec = ConsolidationAdvisor
            .evaluate(
                &cluster("0_0", 30_000.0, "2024-03-01", "2024-03-11"),
                &AggregationConfig::default(),
            )
            .unwrap();

        assert_eq!(rec.decision, Decision::Consolidate);
        assert_eq!(rec.potential_savings, Some(4500.0));
        assert_eq!(rec.total_quantity, Some(12.0));
        assert_eq!(
            rec.rationale,
            "Meets MOQ ($25000) and delivery window (10d <= 14d)"
        );
    }

    #[test]
    fn lists_every_failed_condition() {
        let rec = ConsolidationAdvisor
            .evaluate(
                &cluster("0_1", 10_000.0, "2024-03-01", "2024-03-21"),
                &AggregationConfig::default(),
            )
            .unwrap();

        assert_eq!(rec.decision, Decision::ProcessIndividually);
        assert_eq!(rec.rationale, "Value $10000 < MOQ $25000. Window 20d > 14d");
        assert_eq!(rec.potential_savings, None);
        assert_eq!(rec.total_quantity, None);
    }

    #[test]
    fn boundaries_are_inclusive() {
        let rec = ConsolidationAdvisor
            .evaluate(
                &cluster("0_0", 25_000.0, "2024-03-01", "2024-03-15"),
                &AggregationConfig::default(),
            )
            .unwrap();
        assert!(rec.is_consolidate());

        let rec = ConsolidationAdvisor
            .evaluate(
                &cluster("0_0", 24_999.5, "2024-03-01", "2024-03-15"),
                &AggregationConfig::default(),
            )
            .unwrap();
        assert_eq!(rec.rationale, "Value $24999.5 < MOQ $25000");
    }

    #[test]
    fn bad_cluster_aborts_the_whole_batch() {
        let clusters = vec![
            cluster("0_0", 30_000.0, "2024-03-01", "2024-03-02"),
            cluster("1_0", 30_000.0, "2024-03-01", "someday"),
        ];

        let outcome = ConsolidationAdvisor.recommend(&clusters, &AggregationConfig::default(), vec![]);
        assert!(outcome.recommendations.is_empty());
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].starts_with("Recommendation error: Cluster 1_0"));
    }

    #[test]
    fn preserves_cluster_order() {
        let clusters = vec![
            cluster("2_0", 1.0, "2024-03-01", "2024-03-02"),
            cluster("0_n3", 90_000.0, "2024-03-01", "2024-03-02"),
        ];

        let outcome = ConsolidationAdvisor.recommend(&clusters, &AggregationConfig::default(), vec![]);
        let ids: Vec<&str> = outcome
            .recommendations
            .iter()
            .map(|r| r.cluster_id.as_str())
            .collect();
        assert_eq!(ids, vec!["2_0", "0_n3"]);
        assert!(outcome.errors.is_empty());
    }
}
