//! Scope stack entries
//!
//! Each open hop is one scope: its context, its own registry and the
//! instructions recorded since the hop was opened. Closing a scope folds it
//! into the `initiateAssetsTransfer` that opened it.

use xcmc_spec::{
    Asset, AssetFilter, AssetRegistry, Instruction, Location, Program, ScopeState, TransferType,
};

/// Destination recorded by `set_next_hop`, consumed by the next transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PendingHop {
    pub dest: Location,
    pub remote_fee: Option<Asset>,
}

/// Transfer fields waiting for the nested program
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TransferHeader {
    pub dest: Location,
    pub transfer_type: TransferType,
    pub remote_fee: Option<Asset>,
    pub assets: AssetFilter,
    pub preserve_origin: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Scope {
    pub context: Location,
    pub registry: AssetRegistry,
    pub instructions: Vec<Instruction>,
    pub state: ScopeState,
    pub pending_hop: Option<PendingHop>,
    /// Set for nested scopes only
    pub header: Option<TransferHeader>,
}

impl Scope {
    pub fn root(context: Location) -> Self {
        Self {
            context,
            registry: AssetRegistry::new(),
            instructions: Vec::new(),
            state: ScopeState::root(),
            pending_hop: None,
            header: None,
        }
    }

    pub fn nested(context: Location, state: ScopeState, header: TransferHeader) -> Self {
        Self {
            context,
            registry: AssetRegistry::new(),
            instructions: Vec::new(),
            state,
            pending_hop: None,
            header: Some(header),
        }
    }

    /// Split into the scope's program and, for nested scopes, the header
    /// of the transfer that carries it
    pub fn into_parts(self) -> (Program, Option<TransferHeader>) {
        let program = Program::new(self.context, self.registry, self.instructions);
        (program, self.header)
    }
}

impl TransferHeader {
    pub fn into_instruction(self, xcm: Program) -> Instruction {
        Instruction::InitiateTransfer {
            dest: self.dest,
            transfer_type: self.transfer_type,
            remote_fee: self.remote_fee,
            assets: self.assets,
            preserve_origin: self.preserve_origin,
            xcm,
        }
    }
}
