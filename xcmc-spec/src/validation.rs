//! Program validation
//!
//! Checks a compiled program for ordering and referential well-formedness
//! before it is handed to an executor. Nothing is executed; the validator
//! only tracks which asset ids each scope has pulled into its Holding
//! Register.
//!
//! Checks, per scope:
//! 1. withdrawals feeding a fee payment come before it, and a transfer never
//!    starts from an empty holding
//! 2. fees are paid before execution moves to a new origin
//! 3. fee assets are held at the point they are used
//! 4. every referenced asset id is defined in the scope's registry
//! 5. deposit beneficiaries match their consensus system's account width
//!
//! The outer program is checked completely before any nested program; nested
//! programs follow in emission order.

use crate::asset::{Asset, AssetFilter, AssetId};
use crate::config::Config;
use crate::instruction::Instruction;
use crate::location::Location;
use crate::program::Program;
use std::collections::BTreeSet;
use thiserror::Error;

/// A single broken invariant
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Violation {
    #[error("Ordering violation: {0}")]
    OrderingViolation(String),

    #[error("Fee asset {0} is not in the Holding Register")]
    FeeAssetNotHeld(AssetId),

    #[error("Asset {0} is not defined in this scope")]
    UnresolvedReference(AssetId),

    #[error("Beneficiary {beneficiary} uses {found}-byte account, destination expects {expected} bytes")]
    InvalidBeneficiaryFormat {
        beneficiary: Location,
        expected: usize,
        found: usize,
    },

    #[error("Destination {0} cannot be resolved from the current context")]
    InvalidDestination(Location),

    #[error("Nesting depth {depth} exceeds maximum {max}")]
    NestingTooDeep { depth: usize, max: u8 },

    #[error("Program has {count} instructions, maximum is {max}")]
    TooManyInstructions { count: usize, max: usize },
}

/// A violation together with where it was found
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{violation} (depth {depth}, instruction {index})")]
pub struct ValidationError {
    /// Nesting depth of the failing scope (0 = outermost program)
    pub depth: usize,
    /// Indices of the enclosing transfer instructions, outermost first
    pub path: Vec<usize>,
    /// Index of the failing instruction within its scope
    pub index: usize,
    pub violation: Violation,
}

/// Holding-register bookkeeping for one scope
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeState {
    /// Asset ids this scope has withdrawn, received or exchanged into
    pub holding: BTreeSet<AssetId>,
    /// A fee payment has been made (or was made on this scope's behalf)
    pub fees_paid: bool,
    /// The scope already runs under an origin other than the sender's
    pub origin_changed: bool,
}

impl ScopeState {
    /// State of the outermost scope
    pub fn root() -> Self {
        Self::default()
    }

    pub fn holds(&self, id: &AssetId) -> bool {
        self.holding.contains(id)
    }

    pub fn withdraw(&mut self, id: &AssetId) {
        self.holding.insert(id.clone());
    }

    /// Remove `give`, add `want`; amounts are not tracked
    pub fn exchange(&mut self, give: &AssetId, want: &AssetId) {
        self.holding.remove(give);
        self.holding.insert(want.clone());
    }

    /// Drop whatever `filter` selects from holding
    pub fn deposit(&mut self, filter: &AssetFilter) {
        match filter {
            AssetFilter::Wild(_) => self.holding.clear(),
            AssetFilter::Definite(assets) => {
                for asset in assets {
                    self.holding.remove(&asset.id);
                }
            }
        }
    }

    /// Move the selected assets out of this scope and build the state the
    /// destination scope starts with
    ///
    /// Moved ids are re-anchored from `context` to `destination`; ids with
    /// no representation at the destination are dropped.
    pub fn transfer(
        &mut self,
        context: &Location,
        destination: &Location,
        filter: &AssetFilter,
        remote_fee: Option<&Asset>,
        preserve_origin: bool,
    ) -> ScopeState {
        let mut moved: BTreeSet<AssetId> = match filter {
            AssetFilter::Wild(_) => std::mem::take(&mut self.holding),
            AssetFilter::Definite(assets) => assets
                .iter()
                .filter_map(|asset| self.holding.take(&asset.id))
                .collect(),
        };
        if let Some(fee) = remote_fee {
            self.holding.remove(&fee.id);
            moved.insert(fee.id.clone());
        }

        let holding = moved
            .iter()
            .filter_map(|id| match id.reanchored(context, destination) {
                Ok(seen) => Some(seen),
                Err(err) => {
                    tracing::trace!(asset = %id, error = %err, "asset not representable at destination");
                    None
                }
            })
            .collect();

        ScopeState {
            holding,
            fees_paid: remote_fee.is_some(),
            origin_changed: !preserve_origin,
        }
    }
}

/// Check a deposit beneficiary against its target system's account width
///
/// Beneficiaries that do not end in an account junction always pass. An
/// account beneficiary that cannot be placed under `context` is reported as
/// an invalid destination.
pub fn check_beneficiary(
    config: &Config,
    context: &Location,
    beneficiary: &Location,
) -> Result<(), Violation> {
    let Some(found) = beneficiary.account_width() else {
        return Ok(());
    };
    let absolute = context
        .joined(beneficiary)
        .map_err(|_| Violation::InvalidDestination(beneficiary.clone()))?;
    let expected = config.account_format(&absolute).width();
    if expected != found {
        return Err(Violation::InvalidBeneficiaryFormat {
            beneficiary: beneficiary.clone(),
            expected,
            found,
        });
    }
    Ok(())
}

/// Program validator
#[derive(Debug, Clone)]
pub struct Validator {
    config: Config,
    check_references: bool,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Validator {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            check_references: true,
        }
    }

    /// Skip check 4, for programs decoded from the wire without registries
    pub fn without_reference_checks(mut self) -> Self {
        self.check_references = false;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Validate a whole program tree, returning the first violation
    pub fn validate(&self, program: &Program) -> Result<(), ValidationError> {
        let count = program.len_recursive();
        if count > self.config.max_instructions {
            return Err(ValidationError {
                depth: 0,
                path: Vec::new(),
                index: 0,
                violation: Violation::TooManyInstructions {
                    count,
                    max: self.config.max_instructions,
                },
            });
        }

        self.validate_scope(program, program.context(), ScopeState::root(), &[])
    }

    fn validate_scope(
        &self,
        program: &Program,
        context: &Location,
        mut state: ScopeState,
        path: &[usize],
    ) -> Result<(), ValidationError> {
        let depth = path.len();
        let fail = |index: usize, violation: Violation| {
            tracing::debug!(depth, index, %violation, "validation failed");
            ValidationError {
                depth,
                path: path.to_vec(),
                index,
                violation,
            }
        };

        let mut nested = Vec::new();

        for (index, inst) in program.iter().enumerate() {
            if self.check_references {
                if let Some(id) = inst
                    .referenced_assets()
                    .into_iter()
                    .find(|id| !program.registry().defines(id))
                {
                    return Err(fail(index, Violation::UnresolvedReference(id.clone())));
                }
            }

            match inst {
                Instruction::WithdrawAsset(asset) => state.withdraw(&asset.id),

                Instruction::PayFees { asset } => {
                    if !state.holds(asset) {
                        let withdrawn_later = program.instructions()[index + 1..].iter().any(
                            |later| matches!(later, Instruction::WithdrawAsset(a) if &a.id == asset),
                        );
                        let violation = if withdrawn_later {
                            Violation::OrderingViolation(format!(
                                "withdrawAsset of {} appears after the payFees using it",
                                asset
                            ))
                        } else {
                            Violation::FeeAssetNotHeld(asset.clone())
                        };
                        return Err(fail(index, violation));
                    }
                    state.fees_paid = true;
                }

                Instruction::InitiateTransfer {
                    dest,
                    remote_fee,
                    assets,
                    preserve_origin,
                    xcm,
                    ..
                } => {
                    if !state.fees_paid && !state.origin_changed {
                        return Err(fail(
                            index,
                            Violation::OrderingViolation(
                                "payFees must precede initiateAssetsTransfer".to_string(),
                            ),
                        ));
                    }
                    if state.holding.is_empty() {
                        return Err(fail(
                            index,
                            Violation::OrderingViolation(
                                "initiateAssetsTransfer with nothing withdrawn into holding"
                                    .to_string(),
                            ),
                        ));
                    }
                    if let Some(fee) = remote_fee {
                        if !state.holds(&fee.id) {
                            return Err(fail(index, Violation::FeeAssetNotHeld(fee.id.clone())));
                        }
                    }
                    if let Some(id) = assets.ids().find(|id| !state.holds(id)) {
                        return Err(fail(
                            index,
                            Violation::OrderingViolation(format!(
                                "{} is transferred before it is held",
                                id
                            )),
                        ));
                    }
                    if depth + 1 > self.config.max_depth as usize {
                        return Err(fail(
                            index,
                            Violation::NestingTooDeep {
                                depth: depth + 1,
                                max: self.config.max_depth,
                            },
                        ));
                    }

                    let destination = context
                        .joined(dest)
                        .map_err(|_| fail(index, Violation::InvalidDestination(dest.clone())))?;
                    let entry = state.transfer(
                        context,
                        &destination,
                        assets,
                        remote_fee.as_ref(),
                        *preserve_origin,
                    );
                    nested.push((index, xcm, destination, entry));
                }

                Instruction::ExchangeAsset { give, want, .. } => state.exchange(give, want),

                Instruction::DepositAsset {
                    assets,
                    beneficiary,
                } => {
                    check_beneficiary(&self.config, context, beneficiary)
                        .map_err(|violation| fail(index, violation))?;
                    if let Some(id) = assets.ids().find(|id| !state.holds(id)) {
                        return Err(fail(
                            index,
                            Violation::OrderingViolation(format!(
                                "{} is deposited before it is held",
                                id
                            )),
                        ));
                    }
                    state.deposit(assets);
                }

                Instruction::SetNextHop { .. } | Instruction::Transact { .. } => {}
            }
        }

        for (index, xcm, destination, entry) in nested {
            let mut child_path = path.to_vec();
            child_path.push(index);
            self.validate_scope(xcm, &destination, entry, &child_path)?;
        }

        Ok(())
    }
}

/// Validate with the default configuration
pub fn validate(program: &Program) -> Result<(), ValidationError> {
    Validator::default().validate(program)
}
