//! # Configuration
//!
//! Limits shared by the builder and the validator, and the table deciding
//! which consensus systems use 20-byte accounts.

use crate::location::{Junction, Location, NetworkId, ACCOUNT_ID20_LEN, ACCOUNT_ID32_LEN};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Hard ceiling on nesting, matching the executor's decode depth limit
pub const MAX_XCM_DEPTH: u8 = 8;

/// Hard ceiling on instructions per message, nested ones included
pub const MAX_INSTRUCTIONS: usize = 100;

/// Parachains running an EVM account model by default (Moonbeam, Moonriver)
pub const DEFAULT_EVM_PARACHAINS: [u32; 2] = [2004, 2023];

/// Builder and validator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum nesting of transfer programs (1-8)
    pub max_depth: u8,
    /// Maximum instructions across the whole program tree (1-100)
    pub max_instructions: usize,
    /// Parachain ids whose accounts are 20 bytes wide
    pub evm_parachains: Vec<u32>,
    /// Global consensus systems whose accounts are 20 bytes wide
    pub evm_networks: Vec<NetworkId>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_depth: MAX_XCM_DEPTH,
            max_instructions: MAX_INSTRUCTIONS,
            evm_parachains: DEFAULT_EVM_PARACHAINS.to_vec(),
            evm_networks: vec![NetworkId::Ethereum],
        }
    }
}

impl Config {
    /// Create a configuration with validation
    pub fn new(max_depth: u8, max_instructions: usize) -> Result<Self, ConfigError> {
        let config = Self {
            max_depth,
            max_instructions,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Builder-style: add an EVM parachain
    pub fn with_evm_parachain(mut self, para_id: u32) -> Self {
        if !self.evm_parachains.contains(&para_id) {
            self.evm_parachains.push(para_id);
        }
        self
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth < 1 || self.max_depth > MAX_XCM_DEPTH {
            return Err(ConfigError::InvalidMaxDepth(self.max_depth));
        }
        if self.max_instructions < 1 || self.max_instructions > MAX_INSTRUCTIONS {
            return Err(ConfigError::InvalidMaxInstructions(self.max_instructions));
        }
        Ok(())
    }

    /// Account format of the consensus system `location` lives in
    ///
    /// `location` should be expressed from the universal root. The innermost
    /// `Parachain` or `GlobalConsensus` junction before the account leaf
    /// decides the format; anything unrecognised uses 32-byte accounts.
    pub fn account_format(&self, location: &Location) -> AccountFormat {
        let interior = location.interior();
        let path = match interior.last() {
            Some(leaf) if leaf.is_account() => &interior[..interior.len() - 1],
            _ => interior,
        };

        let system = path.iter().rev().find_map(|junction| match junction {
            Junction::Parachain(id) => Some(self.evm_parachains.contains(id)),
            Junction::GlobalConsensus(network) => Some(self.evm_networks.contains(network)),
            _ => None,
        });

        match system {
            Some(true) => AccountFormat::Id20,
            _ => AccountFormat::Id32,
        }
    }
}

/// Account id layout of a consensus system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountFormat {
    /// 20-byte EVM-style accounts
    Id20,
    /// 32-byte Substrate-style accounts
    Id32,
}

impl AccountFormat {
    #[inline]
    pub const fn width(&self) -> usize {
        match self {
            AccountFormat::Id20 => ACCOUNT_ID20_LEN,
            AccountFormat::Id32 => ACCOUNT_ID32_LEN,
        }
    }
}

impl fmt::Display for AccountFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-byte accounts", self.width())
    }
}

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Nesting depth must be between 1 and 8
    InvalidMaxDepth(u8),
    /// Instruction budget must be between 1 and 100
    InvalidMaxInstructions(usize),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidMaxDepth(depth) => {
                write!(f, "max_depth must be between 1 and {} (got {})", MAX_XCM_DEPTH, depth)
            }
            ConfigError::InvalidMaxInstructions(count) => write!(
                f,
                "max_instructions must be between 1 and {} (got {})",
                MAX_INSTRUCTIONS, count
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
