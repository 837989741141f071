use thiserror::Error;

/// Errors raised while parsing one raw experiment file.
///
/// A parse error aborts that file only; previously parsed experiments are
/// unaffected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("malformed record: {0}")]
    Malformed(String),
    #[error("channel header line missing (file has fewer than 7 lines)")]
    MissingHeader,
    #[error("channel header line holds no channel names")]
    EmptyHeader,
    #[error("row {row}: expected {expected} columns for {channels} channels, got {got}")]
    ColumnMismatch {
        row: usize,
        expected: usize,
        got: usize,
        channels: usize,
    },
    #[error("row {row}, column {column}: cannot parse {token:?} as a number")]
    BadNumber {
        row: usize,
        column: usize,
        token: String,
    },
}

/// Invalid analysis parameters, rejected before any computation starts.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("smoothing window must be >= 1, got {0}")]
    InvalidSmoothingWindow(usize),
    #[error("slope tolerance must be finite and >= 0, got {0}")]
    InvalidTolerance(f64),
    #[error("integration window start {start} exceeds end {end}")]
    InvalidWindowBounds { start: f64, end: f64 },
}

/// Calibration fit failures. Reported to the caller, never silently
/// replaced with a fallback guess.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FitError {
    #[error("fit requires at least {needed} points, got {got}")]
    TooFewPoints { needed: usize, got: usize },
    #[error("degenerate input: {0}")]
    DegenerateInput(&'static str),
    #[error("piecewise fit did not converge")]
    DidNotConverge,
}
