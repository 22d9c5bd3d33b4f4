//! XCM Program Builder
//!
//! Compile a fluent chain of high-level calls into a nested, validated XCM
//! program.
//!
//! ## Example
//!
//! ```rust
//! use xcmc_builder::XcmBuilder;
//! use xcmc_spec::{AssetFilter, Junction, Location, TransferType};
//!
//! let moonbeam = Location::with_junction(0, Junction::Parachain(2004)).unwrap();
//! let asset_hub = Location::with_junction(1, Junction::Parachain(2000)).unwrap();
//! let alice = Location::from(Junction::account_id32(None, &[1u8; 32]).unwrap());
//!
//! let program = XcmBuilder::using_context(moonbeam)
//!     .define_asset("GLMR", Location::here()).unwrap()
//!     .withdraw_asset("GLMR", 1_000).unwrap()
//!     .pay_fees_with("GLMR").unwrap()
//!     .set_next_hop(asset_hub).unwrap()
//!     .initiate_transfer(TransferType::Teleport, AssetFilter::all(), false).unwrap()
//!     .deposit_all(alice).unwrap()
//!     .finalize()
//!     .unwrap();
//!
//! assert_eq!(program.len_recursive(), 4);
//! ```

pub mod builder;
pub mod error;
mod scope;

pub use builder::XcmBuilder;
pub use error::{BuilderError, Result};
