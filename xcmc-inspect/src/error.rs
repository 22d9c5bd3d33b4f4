//! Inspection errors

use thiserror::Error;
use xcmc_spec::{ValidationError, XcmError};

#[derive(Debug, Error)]
pub enum InspectError {
    #[error("Decode error: {0}")]
    Decode(#[from] XcmError),

    #[error("Invalid program: {0}")]
    Invalid(#[from] ValidationError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, InspectError>;
