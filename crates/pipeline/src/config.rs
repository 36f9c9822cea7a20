use crate::error::ConfigError;
use sourcing_protocol::AggregationConfig;
use std::path::Path;

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Parse TOML; absent keys keep their defaults.
pub fn parse_config(raw: &str) -> Result<AggregationConfig> {
    let config: AggregationConfig = toml::from_str(raw)?;
    config.validate().map_err(ConfigError::Invalid)?;
    Ok(config)
}

pub fn load_config(path: impl AsRef<Path>) -> Result<AggregationConfig> {
    let path = path.as_ref();
    log::debug!("Loading aggregation config from {}", path.display());
    let raw = std::fs::read_to_string(path)?;
    parse_config(&raw)
}

/// Defaults, then the optional file, then explicit overrides.
pub fn resolve_config(
    path: Option<&Path>,
    moq: Option<u64>,
    consolidation_window_days: Option<u32>,
) -> Result<AggregationConfig> {
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => AggregationConfig::default(),
    };
    if let Some(moq) = moq {
        config.moq = moq;
    }
    if let Some(days) = consolidation_window_days {
        config.consolidation_window_days = days;
    }
    config.validate().map_err(ConfigError::Invalid)?;
    Ok(config)
}
