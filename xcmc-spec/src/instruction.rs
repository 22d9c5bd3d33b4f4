//! XCM Instruction Set
//!
//! The closed set of operations a program may contain. Each variant carries
//! the exact wire tag and field names the consuming executor expects:
//!
//! ```text
//! withdrawAsset           {id, fun: {fungible}}
//! payFees                 {asset}
//! initiateAssetsTransfer  {dest, transfer_type, remote_fee, assets, preserve_origin, xcm}
//! exchangeAsset           {give, want, maximal}
//! depositAsset            {assets, beneficiary}
//! setNextHop              {dest}
//! transact                {call}
//! ```

use crate::asset::{Asset, AssetFilter, AssetId, TransferType};
use crate::encoding::hex_vec;
use crate::location::Location;
use crate::program::Program;
use serde::{Deserialize, Serialize};

/// XCM Instruction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Instruction {
    /// Pull an asset out of the origin's account into the Holding Register
    WithdrawAsset(Asset),

    /// Pay execution fees from the given held asset
    PayFees { asset: AssetId },

    /// Move held assets to `dest` and continue execution there with `xcm`
    #[serde(rename = "initiateAssetsTransfer")]
    InitiateTransfer {
        dest: Location,
        transfer_type: TransferType,
        #[serde(default)]
        remote_fee: Option<Asset>,
        assets: AssetFilter,
        preserve_origin: bool,
        xcm: Program,
    },

    /// Swap `give` for `want`; `maximal` asks for as much `want` as possible
    ExchangeAsset {
        give: AssetId,
        want: AssetId,
        maximal: bool,
    },

    /// Credit held assets to `beneficiary`
    DepositAsset {
        assets: AssetFilter,
        beneficiary: Location,
    },

    /// Announce the destination of the next transfer
    SetNextHop { dest: Location },

    /// Dispatch an opaque, chain-encoded call
    Transact {
        #[serde(with = "hex_vec")]
        call: Vec<u8>,
    },
}

impl Instruction {
    /// Wire tag of this instruction
    pub fn name(&self) -> &'static str {
        match self {
            Instruction::WithdrawAsset(_) => "withdrawAsset",
            Instruction::PayFees { .. } => "payFees",
            Instruction::InitiateTransfer { .. } => "initiateAssetsTransfer",
            Instruction::ExchangeAsset { .. } => "exchangeAsset",
            Instruction::DepositAsset { .. } => "depositAsset",
            Instruction::SetNextHop { .. } => "setNextHop",
            Instruction::Transact { .. } => "transact",
        }
    }

    /// Asset ids this instruction names in its own scope
    ///
    /// Ids inside a nested program belong to the nested scope and are not
    /// included.
    pub fn referenced_assets(&self) -> Vec<&AssetId> {
        match self {
            Instruction::WithdrawAsset(asset) => vec![&asset.id],
            Instruction::PayFees { asset } => vec![asset],
            Instruction::InitiateTransfer {
                remote_fee, assets, ..
            } => remote_fee
                .iter()
                .map(|fee| &fee.id)
                .chain(assets.ids())
                .collect(),
            Instruction::ExchangeAsset { give, want, .. } => vec![give, want],
            Instruction::DepositAsset { assets, .. } => assets.ids().collect(),
            Instruction::SetNextHop { .. } | Instruction::Transact { .. } => Vec::new(),
        }
    }

    /// The remote program carried by a transfer
    pub fn nested(&self) -> Option<&Program> {
        match self {
            Instruction::InitiateTransfer { xcm, .. } => Some(xcm),
            _ => None,
        }
    }

    /// Whether execution continues under a different origin after this instruction
    pub fn changes_origin(&self) -> bool {
        matches!(self, Instruction::InitiateTransfer { .. })
    }
}
