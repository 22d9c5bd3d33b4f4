//! One-line text form of instructions
//!
//! Asset ids are shown by their registry name when the scope defines one.

use xcmc_spec::encoding::to_hex;
use xcmc_spec::{Asset, AssetFilter, AssetId, AssetRegistry, Instruction, WildAsset};

/// Format an instruction using the names in `registry`
pub fn format(inst: &Instruction, registry: &AssetRegistry) -> String {
    match inst {
        Instruction::WithdrawAsset(asset) => {
            format!("withdrawAsset {}", format_asset(asset, registry))
        }
        Instruction::PayFees { asset } => format!("payFees {}", format_id(asset, registry)),
        Instruction::InitiateTransfer {
            dest,
            transfer_type,
            remote_fee,
            assets,
            preserve_origin,
            xcm,
        } => {
            let mut text = format!(
                "initiateAssetsTransfer {} {} -> {}",
                transfer_type,
                format_filter(assets, registry),
                dest
            );
            if let Some(fee) = remote_fee {
                text.push_str(&format!(" fee {}", format_asset(fee, registry)));
            }
            let origin = if *preserve_origin { "preserved" } else { "reset" };
            text.push_str(&format!(" (origin {}, {} nested)", origin, xcm.len()));
            text
        }
        Instruction::ExchangeAsset {
            give,
            want,
            maximal,
        } => {
            let mode = if *maximal { "maximal" } else { "minimal" };
            format!(
                "exchangeAsset {} -> {} ({})",
                format_id(give, registry),
                format_id(want, registry),
                mode
            )
        }
        Instruction::DepositAsset {
            assets,
            beneficiary,
        } => format!(
            "depositAsset {} -> {}",
            format_filter(assets, registry),
            beneficiary
        ),
        Instruction::SetNextHop { dest } => format!("setNextHop {}", dest),
        Instruction::Transact { call } => format!("transact {}", to_hex(call)),
    }
}

pub fn format_id(id: &AssetId, registry: &AssetRegistry) -> String {
    registry
        .name_of(id)
        .map(str::to_string)
        .unwrap_or_else(|| id.to_string())
}

fn format_asset(asset: &Asset, registry: &AssetRegistry) -> String {
    format!("{} {}", asset.amount(), format_id(&asset.id, registry))
}

fn format_filter(filter: &AssetFilter, registry: &AssetRegistry) -> String {
    match filter {
        AssetFilter::Wild(WildAsset::All) => "All".to_string(),
        AssetFilter::Definite(assets) => {
            let parts: Vec<String> = assets.iter().map(|a| format_asset(a, registry)).collect();
            format!("[{}]", parts.join(", "))
        }
    }
}
