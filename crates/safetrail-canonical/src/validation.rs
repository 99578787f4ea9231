use thiserror::Error;

/// Validation errors for canonical primitives and event shapes.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// When a value does not match the required pattern.
    #[error("{field} ('{value}') is not allowed")]
    PatternMismatch {
        /// Field name that failed validation.
        field: &'static str,
        /// Offending value.
        value: String,
    },
    /// When a required string field is empty.
    #[error("{field} must not be empty")]
    EmptyField {
        /// Field name that was empty.
        field: &'static str,
    },
    /// When a numeric value exceeds its bounds.
    #[error("{field} ({value}) is out of range [{min}, {max}]")]
    OutOfRange {
        /// Field name that is out of range.
        field: &'static str,
        /// Offending value.
        value: f64,
        /// Lower bound (inclusive).
        min: f64,
        /// Upper bound (inclusive).
        max: f64,
    },
    /// When a batch carries too few or too many items.
    #[error("batch size {len} is outside the allowed range [{min}, {max}]")]
    BatchSize {
        /// Actual batch length.
        len: usize,
        /// Minimum allowed length.
        min: usize,
        /// Maximum allowed length.
        max: usize,
    },
    /// When paired sequences (fingerprints, incident ids) differ in length.
    #[error("{left} has {left_len} items but {right} has {right_len}")]
    LengthMismatch {
        /// Name of the first sequence.
        left: &'static str,
        /// Length of the first sequence.
        left_len: usize,
        /// Name of the second sequence.
        right: &'static str,
        /// Length of the second sequence.
        right_len: usize,
    },
    /// When a date-range filter has its bounds reversed.
    #[error("start date must not be later than end date")]
    InvertedDateRange,
}
