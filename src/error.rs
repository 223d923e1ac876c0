use thiserror::Error;

/// Error type for the roi-cruncher crate
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Error while parsing an arithmetic expression
    #[error("ParseError: {0}")]
    ParseError(String),
    /// Nothing left to evaluate once the formula was normalized
    #[error("ParseError: empty expression")]
    EmptyExpression,
    /// A character outside of `0-9 . + - * / ( )` reached the evaluator
    #[error("ForbiddenCharacter: '{0}' is not allowed in arithmetic")]
    ForbiddenCharacter(char),
    /// A default or edited value is not a number
    #[error("InvalidNumber: '{0}' is not a number")]
    InvalidNumber(String),
    /// An edit targeted a name that no formula group declares
    #[error("NameError: name '{0}' is not defined")]
    UnknownVariable(String),
    /// The inbound payload could not be decoded
    #[error("PayloadError: {0}")]
    Payload(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Payload(err.to_string())
    }
}
