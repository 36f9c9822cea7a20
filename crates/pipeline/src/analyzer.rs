use crate::dates::{format_date, parse_date};
use crate::error::AnalysisError;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use sourcing_protocol::{Cluster, NormalizedRequisition, Requisition};
use sourcing_text_cluster::{ClusterLabel, TextClusterer};
use std::collections::{BTreeSet, HashMap};

pub const UNSPSC_DIGITS: usize = 8;

static UNSPSC_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{8}$").expect("UNSPSC pattern is valid"));

/// Result of the analysis stage, merged into the pipeline state
#[derive(Debug, Clone, Default)]
pub struct AnalysisOutcome {
    pub clusters: Vec<Cluster>,
    pub normalized: Vec<NormalizedRequisition>,
    pub errors: Vec<String>,
}

/// Successful analysis before it is folded into an outcome
#[derive(Debug, Clone)]
pub struct Analysis {
    pub clusters: Vec<Cluster>,
    pub normalized: Vec<NormalizedRequisition>,
}

/// Validates requisitions and groups them into clusters.
///
/// Two requisitions share a cluster iff they have the same UNSPSC family and
/// their descriptions fall in the same TF-IDF/DBSCAN neighbourhood. Rows the
/// density pass labels as noise stay on their own.
#[derive(Debug, Clone, Default)]
pub struct RequisitionAnalyzer {
    clusterer: TextClusterer,
}

struct Row<'a> {
    source: &'a Requisition,
    unspsc: String,
    required_date: NaiveDate,
    total_value: f64,
}

impl RequisitionAnalyzer {
    pub fn new(clusterer: TextClusterer) -> Self {
        Self { clusterer }
    }

    /// Stage entry point: never fails, records the failure in `errors` instead
    pub fn analyze(&self, requisitions: &[Requisition], mut errors: Vec<String>) -> AnalysisOutcome {
        match self.try_analyze(requisitions) {
            Ok(analysis) => {
                log::info!(
                    "Analyzed {} requisitions into {} clusters",
                    analysis.normalized.len(),
                    analysis.clusters.len()
                );
                AnalysisOutcome {
                    clusters: analysis.clusters,
                    normalized: analysis.normalized,
                    errors,
                }
            }
            Err(err) => {
                log::error!("Analysis failed: {err}");
                errors.push(format!("Analysis error: {err}"));
                AnalysisOutcome {
                    errors,
                    ..Default::default()
                }
            }
        }
    }

    pub fn try_analyze(&self, requisitions: &[Requisition]) -> Result<Analysis, AnalysisError> {
        if requisitions.is_empty() {
            return Err(AnalysisError::NoRequisitions);
        }

        let rows = normalize(requisitions)?;

        let families: BTreeSet<&str> = rows.iter().map(|row| row.unspsc.as_str()).collect();
        let base_of: HashMap<&str, usize> = families
            .into_iter()
            .enumerate()
            .map(|(idx, family)| (family, idx))
            .collect();

        let descriptions: Vec<&str> = rows
            .iter()
            .map(|row| row.source.description.as_str())
            .collect();
        let labels = self.clusterer.cluster(&descriptions)?;

        let normalized: Vec<NormalizedRequisition> = rows
            .iter()
            .zip(labels)
            .enumerate()
            .map(|(idx, (row, label))| {
                let base_cluster = base_of[row.unspsc.as_str()];
                let nlp_cluster = match label {
                    ClusterLabel::Cluster(id) => id.to_string(),
                    ClusterLabel::Noise => format!("n{idx}"),
                };
                NormalizedRequisition {
                    unspsc: row.unspsc.clone(),
                    description: row.source.description.clone(),
                    quantity: row.source.quantity,
                    unit_price: row.source.unit_price,
                    required_date: format_date(row.required_date),
                    delivery_location: row.source.delivery_location.clone(),
                    unspsc_family: unspsc_family(&row.unspsc).to_string(),
                    total_value: row.total_value,
                    final_cluster: format!("{base_cluster}_{nlp_cluster}"),
                    base_cluster,
                    nlp_cluster,
                }
            })
            .collect();

        let clusters = aggregate(&rows, &normalized);
        Ok(Analysis {
            clusters,
            normalized,
        })
    }
}

/// Left-pad with zeros to eight characters and require eight digits.
pub fn validate_unspsc(code: &str) -> Result<String, AnalysisError> {
    let width = code.chars().count();
    let padded = if width < UNSPSC_DIGITS {
        format!("{}{code}", "0".repeat(UNSPSC_DIGITS - width))
    } else {
        code.to_string()
    };

    if UNSPSC_PATTERN.is_match(&padded) {
        Ok(padded)
    } else {
        Err(AnalysisError::InvalidUnspsc(padded))
    }
}

fn unspsc_family(code: &str) -> &str {
    code.char_indices()
        .nth(UNSPSC_DIGITS)
        .map_or(code, |(idx, _)| &code[..idx])
}

fn normalize(requisitions: &[Requisition]) -> Result<Vec<Row<'_>>, AnalysisError> {
    // Dates are checked across the whole batch before codes.
    let dates = requisitions
        .iter()
        .enumerate()
        .map(|(row, req)| {
            parse_date(&req.required_date).ok_or_else(|| AnalysisError::InvalidDate {
                row,
                value: req.required_date.clone(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let codes = requisitions
        .iter()
        .map(|req| validate_unspsc(&req.unspsc))
        .collect::<Result<Vec<_>, _>>()?;

    requisitions
        .iter()
        .zip(dates)
        .zip(codes)
        .enumerate()
        .map(|(idx, ((source, required_date), unspsc))| {
            for (field, value) in [("quantity", source.quantity), ("unit_price", source.unit_price)] {
                if !value.is_finite() {
                    return Err(AnalysisError::NonFiniteNumber {
                        row: idx,
                        field,
                        value,
                    });
                }
            }
            Ok(Row {
                source,
                unspsc,
                required_date,
                total_value: source.total_value(),
            })
        })
        .collect()
}

struct ClusterAccumulator {
    cluster: Cluster,
    family_counts: Vec<(String, usize)>,
    earliest: NaiveDate,
    latest: NaiveDate,
}

impl ClusterAccumulator {
    fn new(cluster_id: &str, row: &Row<'_>) -> Self {
        Self {
            cluster: Cluster {
                cluster_id: cluster_id.to_string(),
                unspsc_family: String::new(),
                total_value: 0.0,
                units: 0.0,
                locations: Vec::new(),
                earliest_delivery: String::new(),
                latest_delivery: String::new(),
                item_count: 0,
            },
            family_counts: Vec::new(),
            earliest: row.required_date,
            latest: row.required_date,
        }
    }

    fn add(&mut self, row: &Row<'_>, family: &str) {
        self.cluster.total_value += row.total_value;
        self.cluster.units += row.source.quantity;
        self.cluster.item_count += 1;

        let location = &row.source.delivery_location;
        if !self.cluster.locations.contains(location) {
            self.cluster.locations.push(location.clone());
        }

        self.earliest = self.earliest.min(row.required_date);
        self.latest = self.latest.max(row.required_date);

        match self.family_counts.iter_mut().find(|(f, _)| f == family) {
            Some((_, count)) => *count += 1,
            None => self.family_counts.push((family.to_string(), 1)),
        }
    }

    fn finish(mut self) -> Cluster {
        // max_by_key keeps the last maximum, so scan in reverse for first-seen ties
        self.cluster.unspsc_family = self
            .family_counts
            .iter()
            .rev()
            .max_by_key(|(_, count)| *count)
            .map(|(family, _)| family.clone())
            .unwrap_or_default();
        self.cluster.earliest_delivery = format_date(self.earliest);
        self.cluster.latest_delivery = format_date(self.latest);
        self.cluster
    }
}

fn aggregate(rows: &[Row<'_>], normalized: &[NormalizedRequisition]) -> Vec<Cluster> {
    let mut order: Vec<ClusterAccumulator> = Vec::new();
    let mut index_of: HashMap<&str, usize> = HashMap::new();

    for (row, assigned) in rows.iter().zip(normalized) {
        let slot = *index_of
            .entry(assigned.final_cluster.as_str())
            .or_insert_with(|| {
                order.push(ClusterAccumulator::new(&assigned.final_cluster, row));
                order.len() - 1
            });
        order[slot].add(row, &assigned.unspsc_family);
    }

    order.into_iter().map(ClusterAccumulator::finish).collect()
}
