//! # Error Types for the XCM program model

use crate::config::ConfigError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum XcmError {
    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    // Location errors
    #[error("Malformed address: {junction} expects {expected} bytes, found {found}")]
    MalformedAddress {
        junction: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Malformed address: invalid hex payload {0:?}")]
    InvalidHex(String),

    #[error("Malformed location: {0}")]
    MalformedLocation(String),

    #[error("Location is unreachable from the given base: {0}")]
    Unreachable(String),

    // Registry errors
    #[error("Asset name already defined in this context: {0}")]
    DuplicateAssetName(String),

    #[error("Unknown asset: {0}")]
    UnknownAsset(String),

    // Wire format errors
    #[error("Wire format error: {0}")]
    Wire(String),
}

impl XcmError {
    /// Check if this error stems from an ill-formed address or location
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            XcmError::MalformedAddress { .. }
                | XcmError::InvalidHex(_)
                | XcmError::MalformedLocation(_)
        )
    }
}

impl From<serde_json::Error> for XcmError {
    fn from(err: serde_json::Error) -> Self {
        XcmError::Wire(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, XcmError>;
