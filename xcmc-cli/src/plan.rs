//! Build plans
//!
//! A plan is a JSON file naming the starting context, the assets known there
//! and the builder calls to replay:
//!
//! ```json
//! {
//!   "context": {"parents": 0, "interior": {"X1": [{"Parachain": 2004}]}},
//!   "assets": {"GLMR": {"parents": 0, "interior": "Here"}},
//!   "steps": [
//!     {"withdraw": {"asset": "GLMR", "amount": "10"}},
//!     {"payFees": {"asset": "GLMR"}}
//!   ]
//! }
//! ```

use serde::Deserialize;
use std::collections::BTreeMap;
use xcmc_builder::{Result, XcmBuilder};
use xcmc_spec::encoding::{hex_vec, number_or_string};
use xcmc_spec::{AssetFilter, Config, Location, Program, TransferType, WildAsset};

#[derive(Debug, Deserialize)]
pub struct Plan {
    pub context: Location,
    #[serde(default)]
    pub config: Config,
    /// Assets defined in the outermost scope
    #[serde(default)]
    pub assets: BTreeMap<String, Location>,
    pub steps: Vec<Step>,
}

/// An asset picked by name for an explicit selector
#[derive(Debug, Deserialize)]
pub struct Selected {
    pub asset: String,
    #[serde(deserialize_with = "number_or_string")]
    pub amount: u128,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Selection {
    Wild(WildAsset),
    Definite(Vec<Selected>),
}

/// One builder call
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Step {
    DefineAsset {
        name: String,
        location: Location,
    },
    Withdraw {
        asset: String,
        #[serde(deserialize_with = "number_or_string")]
        amount: u128,
    },
    PayFees {
        asset: String,
    },
    SetNextHop {
        dest: Location,
    },
    RemoteFee {
        asset: String,
        #[serde(deserialize_with = "number_or_string")]
        amount: u128,
    },
    InitiateTransfer {
        transfer_type: TransferType,
        assets: Selection,
        #[serde(default)]
        preserve_origin: bool,
    },
    Exchange {
        give: String,
        want: String,
        #[serde(default)]
        maximal: bool,
    },
    DepositAll {
        beneficiary: Location,
    },
    Deposit {
        assets: Selection,
        beneficiary: Location,
    },
    Transact {
        #[serde(with = "hex_vec")]
        call: Vec<u8>,
    },
    EndHop,
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Step::DefineAsset { .. } => "defineAsset",
            Step::Withdraw { .. } => "withdraw",
            Step::PayFees { .. } => "payFees",
            Step::SetNextHop { .. } => "setNextHop",
            Step::RemoteFee { .. } => "remoteFee",
            Step::InitiateTransfer { .. } => "initiateTransfer",
            Step::Exchange { .. } => "exchange",
            Step::DepositAll { .. } => "depositAll",
            Step::Deposit { .. } => "deposit",
            Step::Transact { .. } => "transact",
            Step::EndHop => "endHop",
        }
    }

    /// Apply this step to `builder`
    pub fn apply(&self, builder: &XcmBuilder) -> Result<XcmBuilder> {
        match self {
            Step::DefineAsset { name, location } => builder.define_asset(name, location.clone()),
            Step::Withdraw { asset, amount } => builder.withdraw_asset(asset, *amount),
            Step::PayFees { asset } => builder.pay_fees_with(asset),
            Step::SetNextHop { dest } => builder.set_next_hop(dest.clone()),
            Step::RemoteFee { asset, amount } => builder.remote_fee(asset, *amount),
            Step::InitiateTransfer {
                transfer_type,
                assets,
                preserve_origin,
            } => {
                let filter = select(builder, assets)?;
                builder.initiate_transfer(*transfer_type, filter, *preserve_origin)
            }
            Step::Exchange {
                give,
                want,
                maximal,
            } => builder.exchange_asset(give, want, *maximal),
            Step::DepositAll { beneficiary } => builder.deposit_all(beneficiary.clone()),
            Step::Deposit {
                assets,
                beneficiary,
            } => {
                let filter = select(builder, assets)?;
                builder.deposit_asset(filter, beneficiary.clone())
            }
            Step::Transact { call } => builder.transact(call.clone()),
            Step::EndHop => builder.end_hop(),
        }
    }
}

fn select(builder: &XcmBuilder, selection: &Selection) -> Result<AssetFilter> {
    match selection {
        Selection::Wild(wild) => Ok(AssetFilter::Wild(*wild)),
        Selection::Definite(items) => {
            let pairs: Vec<(&str, u128)> = items
                .iter()
                .map(|item| (item.asset.as_str(), item.amount))
                .collect();
            builder.select(&pairs)
        }
    }
}

/// Failure while replaying a plan, with the step it happened at
#[derive(Debug)]
pub struct StepError {
    pub step: usize,
    pub name: &'static str,
    pub source: xcmc_builder::BuilderError,
}

impl std::fmt::Display for StepError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "step {} ({}): {}", self.step, self.name, self.source)
    }
}

impl std::error::Error for StepError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

impl Plan {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Replay the plan and finalize the program
    pub fn build(&self) -> std::result::Result<Program, StepError> {
        let at_setup = |source| StepError {
            step: 0,
            name: "setup",
            source,
        };

        let mut builder =
            XcmBuilder::using_context_with_config(self.context.clone(), self.config.clone())
                .map_err(at_setup)?;
        for (name, location) in &self.assets {
            builder = builder.define_asset(name, location.clone()).map_err(at_setup)?;
        }

        for (index, step) in self.steps.iter().enumerate() {
            tracing::debug!(
                step = index + 1,
                name = step.name(),
                depth = builder.depth(),
                "applying step"
            );
            builder = step.apply(&builder).map_err(|source| StepError {
                step: index + 1,
                name: step.name(),
                source,
            })?;
        }

        builder.finalize().map_err(|source| StepError {
            step: self.steps.len() + 1,
            name: "finalize",
            source,
        })
    }
}
