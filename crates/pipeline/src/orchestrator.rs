use crate::advisor::{AdviceOutcome, ConsolidationAdvisor};
use crate::analyzer::{AnalysisOutcome, RequisitionAnalyzer};
use crate::builder::{EventOutcome, SourcingEventBuilder};
use sourcing_protocol::{
    AggregationConfig, Cluster, NormalizedRequisition, PipelineOutput, Recommendation,
    Requisition, SourcingEvent,
};
use std::time::Instant;

/// Everything accumulated over one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineState {
    pub requisitions: Vec<Requisition>,
    pub config: AggregationConfig,
    pub clusters: Vec<Cluster>,
    pub normalized: Vec<NormalizedRequisition>,
    pub recommendations: Vec<Recommendation>,
    pub sourcing_events: Vec<SourcingEvent>,
    pub errors: Vec<String>,
}

impl PipelineState {
    pub fn new(requisitions: Vec<Requisition>, config: AggregationConfig) -> Self {
        Self {
            requisitions,
            config,
            clusters: Vec::new(),
            normalized: Vec::new(),
            recommendations: Vec::new(),
            sourcing_events: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn merge_analysis(&mut self, outcome: AnalysisOutcome) {
        self.clusters = outcome.clusters;
        self.normalized = outcome.normalized;
        self.errors = outcome.errors;
    }

    fn merge_advice(&mut self, outcome: AdviceOutcome) {
        self.recommendations = outcome.recommendations;
        self.errors = outcome.errors;
    }

    fn merge_events(&mut self, outcome: EventOutcome) {
        self.sourcing_events = outcome.sourcing_events;
        self.errors = outcome.errors;
    }

    /// Output view for a presentation layer
    #[must_use]
    pub fn into_output(self, include_rows: bool) -> PipelineOutput {
        PipelineOutput {
            clusters: self.clusters,
            recommendations: self.recommendations,
            sourcing_events: self.sourcing_events,
            errors: self.errors,
            rows: include_rows.then_some(self.normalized),
        }
    }
}

/// Runs analyze → recommend → build-events over one batch
#[derive(Debug, Clone, Default)]
pub struct Orchestrator {
    analyzer: RequisitionAnalyzer,
    advisor: ConsolidationAdvisor,
    builder: SourcingEventBuilder,
}

impl Orchestrator {
    pub fn new(analyzer: RequisitionAnalyzer) -> Self {
        Self {
            analyzer,
            ..Default::default()
        }
    }

    pub fn run(&self, requisitions: Vec<Requisition>, config: AggregationConfig) -> PipelineState {
        let started = Instant::now();
        let mut state = PipelineState::new(requisitions, config);

        let errors = std::mem::take(&mut state.errors);
        let analysis = self.analyzer.analyze(&state.requisitions, errors);
        state.merge_analysis(analysis);

        let errors = std::mem::take(&mut state.errors);
        let advice = self.advisor.recommend(&state.clusters, &state.config, errors);
        state.merge_advice(advice);

        // Skipped only when there is nothing to look at; the builder filters decisions itself.
        if state.recommendations.is_empty() {
            log::info!("No recommendations produced; skipping sourcing events");
        } else {
            let errors = std::mem::take(&mut state.errors);
            let events = self.builder.build(
                &state.clusters,
                &state.recommendations,
                &state.config,
                errors,
            );
            state.merge_events(events);
        }

        log::debug!(
            "Pipeline finished in {} ms with {} errors",
            started.elapsed().as_millis(),
            state.errors.len()
        );
        state
    }
}
