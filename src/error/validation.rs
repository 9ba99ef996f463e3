use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid request-id '{value}'. Expected 'type=value'.")]
    InvalidRequestIdFormat { value: String },
    #[error("Invalid request-id path value '{value}'. Expected 'head' or 'tail'.")]
    InvalidRequestIdPath { value: String },
    #[error("Request-id {kind} key cannot be empty.")]
    RequestIdKeyEmpty { kind: &'static str },
    #[error("Invalid request-id type '{value}'. Expected 'path', 'query', or 'header'.")]
    InvalidRequestIdType { value: String },
    #[error("Invalid variable '{value}'. Expected 'key=value'.")]
    InvalidVarFormat { value: String },
    #[error("Variable name cannot be empty in '{value}'.")]
    VarKeyEmpty { value: String },
    #[error("Duration must not be empty.")]
    DurationEmpty,
    #[error("Invalid duration '{value}'.")]
    InvalidDurationFormat { value: String },
    #[error("Invalid duration '{value}': {source}")]
    InvalidDurationNumber {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Duration overflow.")]
    DurationOverflow,
    #[error("Invalid duration unit '{unit}'.")]
    InvalidDurationUnit { unit: String },
    #[error("Duration must be > 0.")]
    DurationZero,
    #[cfg(test)]
    #[error("Test expectation failed: {message}")]
    TestExpectation { message: &'static str },
    #[cfg(test)]
    #[error("Test expectation failed: {message}: {value}")]
    TestExpectationValue {
        message: &'static str,
        value: String,
    },
}
