use sourcing_text_cluster::TextClusterError;
use thiserror::Error;

/// Failures that abort the analysis stage for the whole batch
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("No requisitions provided")]
    NoRequisitions,

    #[error("Invalid UNSPSC format: {0}")]
    InvalidUnspsc(String),

    #[error("Unparseable required_date '{value}' in row {row}")]
    InvalidDate { row: usize, value: String },

    #[error("Non-finite {field} ({value}) in row {row}")]
    NonFiniteNumber {
        row: usize,
        field: &'static str,
        value: f64,
    },

    #[error(transparent)]
    TextCluster(#[from] TextClusterError),
}

#[derive(Error, Debug)]
pub enum AdviceError {
    #[error("Cluster {cluster_id} has an unparseable delivery date '{value}'")]
    InvalidDate { cluster_id: String, value: String },
}

#[derive(Error, Debug)]
pub enum EventError {
    #[error("Cluster {cluster_id} has an unparseable delivery date '{value}'")]
    InvalidDate { cluster_id: String, value: String },

    #[error("Cluster {cluster_id}: delivery window end is out of range")]
    DateOverflow { cluster_id: String },

    #[error("Cluster {cluster_id}: cannot convert quantity {units} to an integer")]
    InvalidQuantity { cluster_id: String, units: f64 },
}

/// Upstream validation of a raw requisition batch
#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("Requisition data must be a JSON array of records")]
    NotAnArray,

    #[error("Row {0} is not a JSON object")]
    RowNotAnObject(usize),

    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Row {row} is malformed: {source}")]
    MalformedRow {
        row: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("CSV row {row} is malformed: {source}")]
    MalformedCsvRow {
        row: usize,
        #[source]
        source: csv::Error,
    },

    #[error("Quantity values cannot be negative")]
    NegativeQuantity,

    #[error("Unit price values cannot be negative")]
    NegativeUnitPrice,

    #[error("File processing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("File processing error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
