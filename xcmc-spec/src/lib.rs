//! # XCM Program Model
//!
//! Typed model of cross-consensus messages as they travel on the wire, plus
//! the validator that checks a compiled program before it is submitted.
//!
//! ## Key Features
//! - Locations with relative addressing and re-anchoring between contexts
//! - Context-scoped asset registries
//! - Instruction set with the executor's JSON wire tags
//! - Static ordering and referential validation of nested programs
//! - Canonical binary fingerprint of a program

pub mod asset;
pub mod config;
pub mod encoding;
pub mod error;
pub mod instruction;
pub mod location;
pub mod program;
pub mod registry;
pub mod validation;

pub use asset::{Asset, AssetFilter, AssetId, Fungibility, TransferType, WildAsset};
pub use config::{AccountFormat, Config, ConfigError, MAX_INSTRUCTIONS, MAX_XCM_DEPTH};
pub use error::{Result, XcmError};
pub use instruction::Instruction;
pub use location::{relative_to, Junction, Location, NetworkId};
pub use program::Program;
pub use registry::AssetRegistry;
pub use validation::{validate, ScopeState, ValidationError, Validator, Violation};
