use thiserror::Error;

#[derive(Error, Debug)]
pub enum KpiError {
    #[error("Schema error in row {row}: required field '{field}' is missing")]
    Schema { row: usize, field: &'static str },

    #[error("Invalid value in row {row}: field '{field}' is not a finite number ({value})")]
    NonFiniteValue {
        row: usize,
        field: &'static str,
        value: f64,
    },

    #[error("No transaction records provided")]
    EmptyInput,

    #[error("Derivation error for period {period}: {details}")]
    Derivation { period: String, details: String },

    #[error("Undefined {metric} growth for period {period}: previous period value is zero")]
    DivisionEdgeCase { period: String, metric: &'static str },

    #[error("Invalid noise factor {0}: must be between 0.0 and 1.0")]
    InvalidNoiseFactor(f64),

    #[error("Invalid probability {0}: must be between 0.0 and 1.0")]
    InvalidProbability(f64),

    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    #[error("Date calculation error: {0}")]
    DateError(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, KpiError>;
