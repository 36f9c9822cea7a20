//! # Sourcing Pipeline
//!
//! Turns a batch of purchase requisitions into consolidation advice and
//! request-for-quote descriptions.
//!
//! ## Pipeline
//!
//! ```text
//! Requisition[]
//!     │
//!     ├──> RequisitionAnalyzer
//!     │      ├─> UNSPSC validation, date parsing
//!     │      ├─> family grouping + description clustering
//!     │      └─> Cluster[]
//!     │
//!     ├──> ConsolidationAdvisor (MOQ + delivery window)
//!     │      └─> Recommendation[]
//!     │
//!     └──> SourcingEventBuilder (skipped when there are no recommendations)
//!            └─> SourcingEvent[]
//! ```
//!
//! Stages never fail the run: a failing stage yields empty output and appends
//! one message to the cumulative error log.
//!
//! ## Example
//!
//! ```rust
//! use sourcing_pipeline::Orchestrator;
//! use sourcing_protocol::{AggregationConfig, Requisition};
//!
//! let batch = vec![
//!     Requisition::new("43211500", "laptop 15-inch", 10.0, 2000.0, "2024-03-01", "Austin"),
//!     Requisition::new("43211500", "laptop 15in", 5.0, 2000.0, "2024-03-10", "Denver"),
//! ];
//!
//! let output = Orchestrator::default()
//!     .run(batch, AggregationConfig::default())
//!     .into_output(false);
//!
//! assert!(output.errors.is_empty());
//! assert_eq!(output.sourcing_events.len(), 1);
//! assert_eq!(output.sourcing_events[0].required_dates.end, "2024-03-24");
//! ```

mod advisor;
mod analyzer;
mod builder;
pub mod config;
mod dates;
mod error;
pub mod intake;
mod orchestrator;

pub use advisor::{AdviceOutcome, ConsolidationAdvisor, SYNERGY_SAVINGS_RATE};
pub use analyzer::{validate_unspsc, Analysis, AnalysisOutcome, RequisitionAnalyzer, UNSPSC_DIGITS};
pub use builder::{EventOutcome, SourcingEventBuilder};
pub use dates::{format_date, parse_date};
pub use error::{AdviceError, AnalysisError, ConfigError, EventError, IntakeError};
pub use orchestrator::{Orchestrator, PipelineState};
