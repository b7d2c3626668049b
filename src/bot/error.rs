use thiserror::Error;

use crate::utils::expression::ExpressionError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed message payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Channel error: {0}")]
    Channel(String),

    #[error("Mute duration must be greater than zero and within range")]
    InvalidDuration,

    #[error("{0}")]
    MissingTarget(String),

    #[error("This command can only be used in groups.")]
    NotAGroup,

    #[error("{0}")]
    PermissionDenied(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("Error in calculation: {0}")]
    Expression(#[from] ExpressionError),
}

impl Error {
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        Error::InvalidArgument(msg.into())
    }
}
