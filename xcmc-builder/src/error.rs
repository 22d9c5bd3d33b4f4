//! Builder errors

use thiserror::Error;
use xcmc_spec::{Location, ValidationError, XcmError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuilderError {
    #[error(transparent)]
    Spec(#[from] XcmError),

    #[error("Amount of {0} must be greater than zero")]
    NonPositiveAmount(String),

    #[error("Fee asset {0} is not in the Holding Register")]
    FeeAssetNotHeld(String),

    #[error("Asset {0} is selected but not in the Holding Register")]
    AssetNotHeld(String),

    #[error("No destination set since the last transfer; call set_next_hop first")]
    MissingNextHop,

    #[error("No open hop to close")]
    NoOpenHop,

    #[error("Beneficiary {beneficiary} uses {found}-byte account, destination expects {expected} bytes")]
    InvalidBeneficiaryFormat {
        beneficiary: Location,
        expected: usize,
        found: usize,
    },

    #[error("Nesting depth would exceed maximum {0}")]
    NestingTooDeep(u8),

    #[error("Instruction limit {0} reached")]
    TooManyInstructions(usize),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
}

impl BuilderError {
    /// Whether the error came from a per-call check rather than `finalize`
    pub fn is_local(&self) -> bool {
        !matches!(self, BuilderError::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, BuilderError>;
