use thiserror::Error;

/// Rejected report parameters. Raised before any contest data is touched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("invalid {field} '{value}', expected YYYY-MM-DD")]
    InvalidDate { field: &'static str, value: String },

    #[error("a window of {days} days reaches past the supported calendar")]
    WindowTooLong { days: i64 },

    #[error("start date {start} is after end date {end}")]
    InvertedDateWindow { start: String, end: String },

    #[error("enter a valid roll number range: {from} is after {to}")]
    InvertedRollRange { from: String, to: String },
}
