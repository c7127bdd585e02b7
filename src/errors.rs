use thiserror::Error;

/// Errors that abort a load. No partial table is ever returned alongside one
/// of these; the caller surfaces the message and waits for a new upload.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("CSV error while reading export: {source}")]
    Csv {
        #[from]
        source: csv::Error,
    },
    #[error("No header row containing 'Date' and 'Time' columns found in the first {scanned} rows")]
    HeaderNotFound { scanned: usize },
    #[error("Required column '{column}' is missing from the header")]
    MissingColumn { column: String },
    #[error("Timestamp parsing error at data row {row} for value '{value}': {source}")]
    Timestamp {
        row: usize,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Validation errors for user-adjustable settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Setting '{field}' must be a positive number (got {value})")]
    NonPositive { field: &'static str, value: f64 },
}

/// Failures local to one analysis section. These are surfaced as warnings;
/// they never abort the sections that did not need the missing data.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Could not identify a baseline thermostat channel among {candidates:?}")]
    BaselineNotFound { candidates: Vec<String> },
    #[error("Only {found} room temperature channel(s) found; at least two are needed for balancing")]
    InsufficientSensors { found: usize },
}
