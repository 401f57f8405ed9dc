use thiserror::Error;

use crate::models::{MeasurementKind, Sex};

#[derive(Error, Debug)]
pub enum GrowthError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("No reference table for {kind} ({sex}); tried {candidates:?}")]
    ResourceNotFound {
        kind: MeasurementKind,
        sex: Sex,
        candidates: Vec<String>,
    },

    #[error("Malformed reference table '{resource}': {reason}")]
    MalformedCsv { resource: String, reason: String },

    #[error("No LMS parameters for {kind} ({sex}) at x = {x}")]
    NoLmsForAge {
        kind: MeasurementKind,
        sex: Sex,
        x: f64,
    },

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type GrowthResult<T> = Result<T, GrowthError>;
