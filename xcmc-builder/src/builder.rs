//! Fluent program compiler
//!
//! Every operation borrows the builder and returns a new one, so a failed
//! call leaves the caller's handle exactly as it was:
//!
//! ```rust
//! use xcmc_builder::XcmBuilder;
//! use xcmc_spec::{Junction, Location};
//!
//! let moonbeam = Location::with_junction(0, Junction::Parachain(2004)).unwrap();
//! let program = XcmBuilder::using_context(moonbeam)
//!     .define_asset("GLMR", Location::here()).unwrap()
//!     .withdraw_asset("GLMR", 10).unwrap()
//!     .pay_fees_with("GLMR").unwrap()
//!     .finalize()
//!     .unwrap();
//! assert_eq!(program.len(), 2);
//! ```
//!
//! Calls issued after `initiate_transfer` are recorded into the hop's nested
//! program until the hop is closed by `deposit_all`, `end_hop` or `finalize`.

use crate::error::{BuilderError, Result};
use crate::scope::{PendingHop, Scope, TransferHeader};
use xcmc_spec::validation::check_beneficiary;
use xcmc_spec::{
    Asset, AssetFilter, AssetId, Config, Instruction, Location, Program, TransferType, Validator,
    Violation, XcmError,
};

/// Builder state: a stack of open scopes, outermost first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XcmBuilder {
    config: Config,
    scopes: Vec<Scope>,
    emitted: usize,
}

impl XcmBuilder {
    /// Open a builder whose outermost program runs in `context`
    pub fn using_context(context: Location) -> Self {
        Self {
            config: Config::default(),
            scopes: vec![Scope::root(context)],
            emitted: 0,
        }
    }

    /// Open a builder with custom limits and account format table
    pub fn using_context_with_config(context: Location, config: Config) -> Result<Self> {
        config.validate().map_err(XcmError::from)?;
        Ok(Self {
            config,
            ..Self::using_context(context)
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of open hops (0 while recording the outermost program)
    pub fn depth(&self) -> usize {
        self.scopes.len() - 1
    }

    /// Context of the active scope
    pub fn context(&self) -> &Location {
        &self.active().context
    }

    /// Instructions emitted so far across all scopes
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    /// Whether a destination is waiting for the next transfer
    pub fn has_pending_hop(&self) -> bool {
        self.active().pending_hop.is_some()
    }

    /// Resolve `name` in the active scope's registry
    pub fn resolve(&self, name: &str) -> Result<AssetId> {
        Ok(self.active().registry.resolve(name)?)
    }

    /// Whether the asset registered as `name` is in the active scope's holding
    pub fn holds(&self, name: &str) -> bool {
        self.resolve(name)
            .map(|id| self.active().state.holds(&id))
            .unwrap_or(false)
    }

    /// Register `name` in the active scope's vocabulary
    pub fn define_asset(&self, name: &str, location: Location) -> Result<Self> {
        let mut next = self.clone();
        let id = next.active_mut().registry.define(name, location)?;
        tracing::trace!(name, asset = %id, depth = next.depth(), "defined asset");
        Ok(next)
    }

    pub fn withdraw_asset(&self, name: &str, amount: u128) -> Result<Self> {
        let asset = self.fungible(name, amount)?;
        let mut next = self.clone();
        next.active_mut().state.withdraw(&asset.id);
        next.emit(Instruction::WithdrawAsset(asset))?;
        Ok(next)
    }

    /// Pay execution fees from an asset already in holding
    pub fn pay_fees_with(&self, name: &str) -> Result<Self> {
        let id = self.resolve(name)?;
        if !self.active().state.holds(&id) {
            return Err(BuilderError::FeeAssetNotHeld(name.to_string()));
        }
        let mut next = self.clone();
        next.active_mut().state.fees_paid = true;
        next.emit(Instruction::PayFees { asset: id })?;
        Ok(next)
    }

    /// Record the destination of the next transfer; emits nothing
    ///
    /// A second call before the transfer replaces the destination and drops
    /// any remote fee attached to it.
    pub fn set_next_hop(&self, dest: Location) -> Result<Self> {
        dest.validate()?;
        let mut next = self.clone();
        next.active_mut().pending_hop = Some(PendingHop {
            dest,
            remote_fee: None,
        });
        Ok(next)
    }

    /// Attach a fee for the destination to the pending hop
    ///
    /// The nested scope starts with fees paid and the fee asset in holding.
    pub fn remote_fee(&self, name: &str, amount: u128) -> Result<Self> {
        if !self.has_pending_hop() {
            return Err(BuilderError::MissingNextHop);
        }
        let asset = self.fungible(name, amount)?;
        if !self.active().state.holds(&asset.id) {
            return Err(BuilderError::FeeAssetNotHeld(name.to_string()));
        }
        let mut next = self.clone();
        if let Some(hop) = next.active_mut().pending_hop.as_mut() {
            hop.remote_fee = Some(asset);
        }
        Ok(next)
    }

    /// Build an explicit selector from `(name, amount)` pairs in holding
    pub fn select(&self, assets: &[(&str, u128)]) -> Result<AssetFilter> {
        assets
            .iter()
            .map(|&(name, amount)| {
                let asset = self.fungible(name, amount)?;
                if !self.active().state.holds(&asset.id) {
                    return Err(BuilderError::AssetNotHeld(name.to_string()));
                }
                Ok(asset)
            })
            .collect::<Result<Vec<_>>>()
            .map(AssetFilter::Definite)
    }

    /// Move `assets` to the pending hop and open its nested scope
    pub fn initiate_transfer(
        &self,
        transfer_type: TransferType,
        assets: AssetFilter,
        preserve_origin: bool,
    ) -> Result<Self> {
        let hop = self
            .active()
            .pending_hop
            .clone()
            .ok_or(BuilderError::MissingNextHop)?;
        self.check_held(&assets)?;
        if self.depth() + 1 > self.config.max_depth as usize {
            return Err(BuilderError::NestingTooDeep(self.config.max_depth));
        }
        self.check_budget()?;

        let mut next = self.clone();
        let scope = next.active_mut();
        scope.pending_hop = None;
        let destination = scope.context.joined(&hop.dest)?;
        let entry = scope.state.transfer(
            &scope.context,
            &destination,
            &assets,
            hop.remote_fee.as_ref(),
            preserve_origin,
        );

        tracing::debug!(
            dest = %destination,
            %transfer_type,
            preserve_origin,
            depth = self.depth() + 1,
            "opening hop"
        );

        let header = TransferHeader {
            dest: hop.dest,
            transfer_type,
            remote_fee: hop.remote_fee,
            assets,
            preserve_origin,
        };
        next.emitted += 1;
        next.scopes.push(Scope::nested(destination, entry, header));
        Ok(next)
    }

    pub fn exchange_asset(&self, give: &str, want: &str, maximal: bool) -> Result<Self> {
        let give = self.resolve(give)?;
        let want = self.resolve(want)?;
        let mut next = self.clone();
        next.active_mut().state.exchange(&give, &want);
        next.emit(Instruction::ExchangeAsset {
            give,
            want,
            maximal,
        })?;
        Ok(next)
    }

    /// Deposit everything held to `beneficiary`, then close the active hop
    pub fn deposit_all(&self, beneficiary: Location) -> Result<Self> {
        let next = self.deposit_asset(AssetFilter::all(), beneficiary)?;
        if next.depth() == 0 {
            return Ok(next);
        }
        next.end_hop()
    }

    /// Deposit the selected assets to `beneficiary`, keeping the scope open
    pub fn deposit_asset(&self, assets: AssetFilter, beneficiary: Location) -> Result<Self> {
        beneficiary.validate()?;
        match check_beneficiary(&self.config, self.context(), &beneficiary) {
            Ok(()) => {}
            Err(Violation::InvalidBeneficiaryFormat {
                beneficiary,
                expected,
                found,
            }) => {
                return Err(BuilderError::InvalidBeneficiaryFormat {
                    beneficiary,
                    expected,
                    found,
                });
            }
            Err(other) => return Err(XcmError::MalformedLocation(other.to_string()).into()),
        }
        self.check_held(&assets)?;

        let mut next = self.clone();
        next.active_mut().state.deposit(&assets);
        next.emit(Instruction::DepositAsset {
            assets,
            beneficiary,
        })?;
        Ok(next)
    }

    /// Dispatch an opaque call in the active scope
    pub fn transact(&self, call: impl Into<Vec<u8>>) -> Result<Self> {
        let mut next = self.clone();
        next.emit(Instruction::Transact { call: call.into() })?;
        Ok(next)
    }

    /// Close the active hop and continue in its parent scope
    pub fn end_hop(&self) -> Result<Self> {
        let mut next = self.clone();
        next.close_scope()?;
        Ok(next)
    }

    /// Close every open hop, validate, and return the outermost program
    pub fn finalize(mut self) -> Result<Program> {
        while self.depth() > 0 {
            self.close_scope()?;
        }
        let root = self.scopes.pop().ok_or(BuilderError::NoOpenHop)?;
        if root.pending_hop.is_some() {
            tracing::warn!("finalizing with an unused set_next_hop destination");
        }
        let (program, _) = root.into_parts();

        Validator::new(self.config).validate(&program)?;
        tracing::debug!(
            instructions = program.len_recursive(),
            depth = program.depth(),
            "program finalized"
        );
        Ok(program)
    }

    fn active(&self) -> &Scope {
        // The root scope is only removed by `finalize`, which consumes self.
        &self.scopes[self.scopes.len() - 1]
    }

    fn active_mut(&mut self) -> &mut Scope {
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }

    /// Resolve `name` into an asset with a positive amount
    fn fungible(&self, name: &str, amount: u128) -> Result<Asset> {
        let id = self.resolve(name)?;
        if amount == 0 {
            return Err(BuilderError::NonPositiveAmount(name.to_string()));
        }
        Ok(Asset::new(id, amount))
    }

    /// Every asset a definite filter names must be in holding
    fn check_held(&self, assets: &AssetFilter) -> Result<()> {
        let scope = self.active();
        match assets.ids().find(|id| !scope.state.holds(id)) {
            Some(id) => {
                let name = scope
                    .registry
                    .name_of(id)
                    .map_or_else(|| id.to_string(), str::to_string);
                Err(BuilderError::AssetNotHeld(name))
            }
            None => Ok(()),
        }
    }

    fn check_budget(&self) -> Result<()> {
        if self.emitted >= self.config.max_instructions {
            return Err(BuilderError::TooManyInstructions(self.config.max_instructions));
        }
        Ok(())
    }

    fn emit(&mut self, inst: Instruction) -> Result<()> {
        self.check_budget()?;
        tracing::trace!(instruction = inst.name(), depth = self.depth(), "emit");
        self.active_mut().instructions.push(inst);
        self.emitted += 1;
        Ok(())
    }

    fn close_scope(&mut self) -> Result<()> {
        if self.depth() == 0 {
            return Err(BuilderError::NoOpenHop);
        }
        let scope = self.scopes.pop().ok_or(BuilderError::NoOpenHop)?;
        let unused_hop = scope.pending_hop.is_some();
        let (program, header) = scope.into_parts();
        let header = header.ok_or(BuilderError::NoOpenHop)?;
        if unused_hop {
            tracing::warn!(
                depth = self.depth() + 1,
                "closing hop with an unused set_next_hop destination"
            );
        }
        tracing::debug!(
            instructions = program.len(),
            depth = self.depth() + 1,
            "closing hop"
        );
        self.active_mut()
            .instructions
            .push(header.into_instruction(program));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xcmc_spec::{Junction, NetworkId};

    fn moonbeam() -> Location {
        Location::with_junction(0, Junction::Parachain(2004)).unwrap()
    }

    fn asset_hub() -> Location {
        Location::with_junction(1, Junction::Parachain(2000)).unwrap()
    }

    fn glmr_builder() -> XcmBuilder {
        XcmBuilder::using_context(moonbeam())
            .define_asset("GLMR", Location::here())
            .unwrap()
    }

    #[test]
    fn test_withdraw_and_pay_fees() {
        let program = glmr_builder()
            .withdraw_asset("GLMR", 10)
            .unwrap()
            .pay_fees_with("GLMR")
            .unwrap()
            .finalize()
            .unwrap();
        assert_eq!(program.len(), 2);
        assert_eq!(program.context(), &moonbeam());
    }

    #[test]
    fn test_pay_fees_before_withdraw_fails_at_call() {
        let builder = glmr_builder();
        assert_eq!(
            builder.pay_fees_with("GLMR").unwrap_err(),
            BuilderError::FeeAssetNotHeld("GLMR".to_string())
        );
    }

    #[test]
    fn test_failed_call_leaves_builder_untouched() {
        let builder = glmr_builder().withdraw_asset("GLMR", 10).unwrap();
        let before = builder.clone();
        assert!(builder.withdraw_asset("GLMR", 0).is_err());
        assert!(builder.withdraw_asset("DOT", 1).is_err());
        assert!(builder.define_asset("GLMR", Location::parent()).is_err());
        assert_eq!(builder, before);
        assert_eq!(builder.emitted(), 1);
    }

    #[test]
    fn test_non_positive_amount() {
        assert_eq!(
            glmr_builder().withdraw_asset("GLMR", 0).unwrap_err(),
            BuilderError::NonPositiveAmount("GLMR".to_string())
        );
    }

    #[test]
    fn test_unknown_asset() {
        let err = glmr_builder().withdraw_asset("DOT", 1).unwrap_err();
        assert_eq!(err, BuilderError::Spec(XcmError::UnknownAsset("DOT".to_string())));
    }

    #[test]
    fn test_missing_next_hop() {
        let builder = glmr_builder()
            .withdraw_asset("GLMR", 10)
            .unwrap()
            .pay_fees_with("GLMR")
            .unwrap();
        assert_eq!(
            builder
                .initiate_transfer(TransferType::Teleport, AssetFilter::all(), false)
                .unwrap_err(),
            BuilderError::MissingNextHop
        );
        assert_eq!(builder.remote_fee("GLMR", 1).unwrap_err(), BuilderError::MissingNextHop);
    }

    #[test]
    fn test_hop_is_consumed_by_transfer() {
        let builder = glmr_builder()
            .withdraw_asset("GLMR", 10)
            .unwrap()
            .pay_fees_with("GLMR")
            .unwrap()
            .set_next_hop(asset_hub())
            .unwrap();
        assert!(builder.has_pending_hop());

        let nested = builder
            .initiate_transfer(TransferType::Teleport, AssetFilter::all(), false)
            .unwrap();
        assert_eq!(nested.depth(), 1);
        assert!(!nested.has_pending_hop());
        assert_eq!(
            nested.context(),
            &Location::with_junction(0, Junction::Parachain(2000)).unwrap()
        );

        let closed = nested.end_hop().unwrap();
        assert!(closed
            .initiate_transfer(TransferType::Teleport, AssetFilter::all(), false)
            .is_err());
    }

    #[test]
    fn test_nested_scope_has_fresh_registry() {
        let nested = glmr_builder()
            .withdraw_asset("GLMR", 10)
            .unwrap()
            .pay_fees_with("GLMR")
            .unwrap()
            .set_next_hop(asset_hub())
            .unwrap()
            .initiate_transfer(TransferType::Teleport, AssetFilter::all(), false)
            .unwrap();
        assert!(matches!(
            nested.resolve("GLMR"),
            Err(BuilderError::Spec(XcmError::UnknownAsset(_)))
        ));

        // Re-defined in Asset Hub's vocabulary, the transferred GLMR is held.
        let redefined = nested
            .define_asset(
                "GLMR",
                Location::with_junction(1, Junction::Parachain(2004)).unwrap(),
            )
            .unwrap();
        assert!(redefined.holds("GLMR"));
    }

    #[test]
    fn test_deposit_all_closes_hop() {
        let alice = Location::from(Junction::account_id32(None, &[7u8; 32]).unwrap());
        let program = glmr_builder()
            .withdraw_asset("GLMR", 10)
            .unwrap()
            .pay_fees_with("GLMR")
            .unwrap()
            .set_next_hop(asset_hub())
            .unwrap()
            .initiate_transfer(TransferType::Teleport, AssetFilter::all(), false)
            .unwrap()
            .deposit_all(alice)
            .unwrap();
        assert_eq!(program.depth(), 0);

        let program = program.finalize().unwrap();
        assert_eq!(program.len(), 3);
        assert_eq!(program.len_recursive(), 4);
        let nested = program[2].nested().unwrap();
        assert_eq!(nested.len(), 1);
        assert_eq!(nested[0].name(), "depositAsset");
    }

    #[test]
    fn test_deposit_rejects_wrong_account_width() {
        let ethereum = Location::with_junction(0, Junction::GlobalConsensus(NetworkId::Ethereum)).unwrap();
        let bob32 = Location::from(Junction::account_id32(Some(NetworkId::Ethereum), &[2u8; 32]).unwrap());
        let err = XcmBuilder::using_context(ethereum)
            .deposit_all(bob32)
            .unwrap_err();
        assert!(matches!(
            err,
            BuilderError::InvalidBeneficiaryFormat { expected: 20, found: 32, .. }
        ));
    }

    #[test]
    fn test_select_requires_holding() {
        let builder = glmr_builder()
            .define_asset("DOT", Location::parent())
            .unwrap()
            .withdraw_asset("GLMR", 10)
            .unwrap();
        let filter = builder.select(&[("GLMR", 5)]).unwrap();
        assert!(!filter.is_wild());
        assert_eq!(
            builder.select(&[("GLMR", 5), ("DOT", 1)]).unwrap_err(),
            BuilderError::AssetNotHeld("DOT".to_string())
        );
    }

    #[test]
    fn test_remote_fee_marks_nested_fees_paid() {
        let nested = glmr_builder()
            .withdraw_asset("GLMR", 10)
            .unwrap()
            .pay_fees_with("GLMR")
            .unwrap()
            .set_next_hop(asset_hub())
            .unwrap()
            .remote_fee("GLMR", 2)
            .unwrap()
            .initiate_transfer(TransferType::ReserveTransfer, AssetFilter::all(), true)
            .unwrap();
        assert!(nested.active().state.fees_paid);
        assert!(!nested.active().state.origin_changed);
    }

    #[test]
    fn test_end_hop_at_root() {
        assert_eq!(glmr_builder().end_hop().unwrap_err(), BuilderError::NoOpenHop);
    }

    #[test]
    fn test_depth_limit() {
        let config = Config::new(1, 100).unwrap();
        let builder = XcmBuilder::using_context_with_config(moonbeam(), config)
            .unwrap()
            .define_asset("GLMR", Location::here())
            .unwrap()
            .withdraw_asset("GLMR", 10)
            .unwrap()
            .pay_fees_with("GLMR")
            .unwrap()
            .set_next_hop(asset_hub())
            .unwrap()
            .initiate_transfer(TransferType::Teleport, AssetFilter::all(), false)
            .unwrap()
            .set_next_hop(asset_hub())
            .unwrap();
        assert_eq!(
            builder
                .initiate_transfer(TransferType::Teleport, AssetFilter::all(), false)
                .unwrap_err(),
            BuilderError::NestingTooDeep(1)
        );
    }

    #[test]
    fn test_instruction_budget() {
        let config = Config::new(8, 2).unwrap();
        let builder = XcmBuilder::using_context_with_config(moonbeam(), config)
            .unwrap()
            .transact(vec![0u8])
            .unwrap()
            .transact(vec![1u8])
            .unwrap();
        assert_eq!(
            builder.transact(vec![2u8]).unwrap_err(),
            BuilderError::TooManyInstructions(2)
        );
    }

    #[test]
    fn test_invalid_config() {
        let config = Config {
            max_depth: 0,
            ..Config::default()
        };
        assert!(XcmBuilder::using_context_with_config(moonbeam(), config).is_err());
    }

    #[test]
    fn test_transfer_without_fees_fails_at_finalize() {
        let err = glmr_builder()
            .withdraw_asset("GLMR", 10)
            .unwrap()
            .set_next_hop(asset_hub())
            .unwrap()
            .initiate_transfer(TransferType::Teleport, AssetFilter::all(), false)
            .unwrap()
            .finalize()
            .unwrap_err();
        match err {
            BuilderError::Validation(e) => {
                assert_eq!(e.depth, 0);
                assert_eq!(e.index, 1);
                assert!(matches!(e.violation, Violation::OrderingViolation(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_unused_nested_hop_is_logged() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_max_level(tracing::Level::WARN)
            .finish();

        let closed = tracing::subscriber::with_default(subscriber, || {
            glmr_builder()
                .withdraw_asset("GLMR", 10)
                .unwrap()
                .pay_fees_with("GLMR")
                .unwrap()
                .set_next_hop(asset_hub())
                .unwrap()
                .initiate_transfer(TransferType::Teleport, AssetFilter::all(), false)
                .unwrap()
                .set_next_hop(Location::with_junction(1, Junction::Parachain(2004)).unwrap())
                .unwrap()
                .end_hop()
                .unwrap()
        });
        assert_eq!(closed.depth(), 0);
        assert!(!closed.has_pending_hop());

        let text = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(text.contains("closing hop with an unused set_next_hop destination"));
    }
}
