use thiserror::Error;

/// Common errors across the camera model core
#[derive(Error, Debug)]
pub enum RcmError {
    #[error("Parameter error: {0}")]
    Params(#[from] ParamsError),

    #[error("Unknown camera model: {0}")]
    UnknownModel(String),

    #[error("Unknown refractive camera model: {0}")]
    UnknownRefracModel(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParamsError {
    #[error("Invalid parameter value: {0:?}")]
    InvalidValue(String),

    #[error("Expected {expected} parameters, got {actual}")]
    CountMismatch { expected: usize, actual: usize },

    #[error("No camera model bound")]
    NoModel,
}

pub type Result<T> = std::result::Result<T, RcmError>;
