use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MOQ: u64 = 25_000;
pub const DEFAULT_CONSOLIDATION_WINDOW_DAYS: u32 = 14;

pub const MAX_MOQ: u64 = 1_000_000;
pub const MIN_CONSOLIDATION_WINDOW_DAYS: u32 = 1;
pub const MAX_CONSOLIDATION_WINDOW_DAYS: u32 = 60;

/// Thresholds applied to every cluster in one pipeline run
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(default)]
pub struct AggregationConfig {
    /// Minimum total cluster value (currency) worth consolidating
    pub moq: u64,

    /// Maximum spread between earliest and latest delivery, in days.
    /// Sourcing events reuse it as the post-delivery buffer.
    pub consolidation_window_days: u32,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            moq: DEFAULT_MOQ,
            consolidation_window_days: DEFAULT_CONSOLIDATION_WINDOW_DAYS,
        }
    }
}

impl AggregationConfig {
    #[must_use]
    pub const fn new(moq: u64, consolidation_window_days: u32) -> Self {
        Self {
            moq,
            consolidation_window_days,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.moq > MAX_MOQ {
            return Err(format!("moq ({}) cannot exceed {MAX_MOQ}", self.moq));
        }

        if !(MIN_CONSOLIDATION_WINDOW_DAYS..=MAX_CONSOLIDATION_WINDOW_DAYS)
            .contains(&self.consolidation_window_days)
        {
            return Err(format!(
                "consolidation_window_days ({}) must be between {MIN_CONSOLIDATION_WINDOW_DAYS} and {MAX_CONSOLIDATION_WINDOW_DAYS}",
                self.consolidation_window_days
            ));
        }

        Ok(())
    }
}
