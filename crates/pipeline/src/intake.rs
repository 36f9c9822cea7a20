//! Validation that runs before the pipeline sees a batch: required columns
//! must be present and amounts must not be negative.
//!
//! Batches arrive either as a JSON array of records or as a CSV file with a
//! header row. Both go through the same column and amount checks.

use crate::error::IntakeError;
use serde_json::Value;
use sourcing_protocol::Requisition;
use std::collections::BTreeSet;
use std::path::Path;

pub type Result<T> = std::result::Result<T, IntakeError>;

pub const REQUIRED_COLUMNS: [&str; 6] = [
    "unspsc",
    "description",
    "quantity",
    "unit_price",
    "required_date",
    "delivery_location",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputFormat {
    #[default]
    Json,
    Csv,
}

impl InputFormat {
    /// `.csv` files are read as CSV, everything else as JSON.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => InputFormat::Csv,
            _ => InputFormat::Json,
        }
    }
}

pub fn parse_requisitions_as(raw: &str, format: InputFormat) -> Result<Vec<Requisition>> {
    match format {
        InputFormat::Json => parse_requisitions(raw),
        InputFormat::Csv => parse_requisitions_csv(raw),
    }
}

/// Parse a JSON array of requisition records.
pub fn parse_requisitions(raw: &str) -> Result<Vec<Requisition>> {
    let value: Value = serde_json::from_str(raw)?;
    requisitions_from_value(value)
}

/// Parse CSV text whose header row names the requisition columns.
pub fn parse_requisitions_csv(raw: &str) -> Result<Vec<Requisition>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(raw.as_bytes());

    let headers = reader.headers()?.clone();
    check_columns(&headers.iter().collect())?;

    let requisitions = reader
        .deserialize::<Requisition>()
        .enumerate()
        .map(|(row, record)| record.map_err(|source| IntakeError::MalformedCsvRow { row, source }))
        .collect::<Result<Vec<_>>>()?;
    check_amounts(&requisitions)?;

    log::debug!("Intake accepted {} requisitions from CSV", requisitions.len());
    Ok(requisitions)
}

pub fn requisitions_from_value(value: Value) -> Result<Vec<Requisition>> {
    let Value::Array(rows) = value else {
        return Err(IntakeError::NotAnArray);
    };
    // An empty batch is the pipeline's call to reject.
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let mut columns: BTreeSet<&str> = BTreeSet::new();
    for (idx, row) in rows.iter().enumerate() {
        let object = row.as_object().ok_or(IntakeError::RowNotAnObject(idx))?;
        columns.extend(object.keys().map(String::as_str));
    }
    check_columns(&columns)?;

    let requisitions = rows
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            serde_json::from_value::<Requisition>(value)
                .map_err(|source| IntakeError::MalformedRow { row, source })
        })
        .collect::<Result<Vec<_>>>()?;
    check_amounts(&requisitions)?;

    log::debug!("Intake accepted {} requisitions", requisitions.len());
    Ok(requisitions)
}

fn check_columns(columns: &BTreeSet<&str>) -> Result<()> {
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|column| !columns.contains(*column))
        .map(|column| column.to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(IntakeError::MissingColumns(missing))
    }
}

fn check_amounts(requisitions: &[Requisition]) -> Result<()> {
    if requisitions.iter().any(|req| req.quantity < 0.0) {
        return Err(IntakeError::NegativeQuantity);
    }
    if requisitions.iter().any(|req| req.unit_price < 0.0) {
        return Err(IntakeError::NegativeUnitPrice);
    }
    Ok(())
}
