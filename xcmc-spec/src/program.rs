//! # Program Structure
//!
//! A program is an ordered instruction sequence plus the scope it was
//! compiled in: the context location and the registry snapshot of that
//! scope. Only the instructions go on the wire:
//!
//! ```text
//! [
//!   {"withdrawAsset": {...}},
//!   {"payFees": {...}},
//!   {"initiateAssetsTransfer": {..., "xcm": [ ...nested program... ]}}
//! ]
//! ```

use crate::encoding;
use crate::error::Result;
use crate::instruction::Instruction;
use crate::location::Location;
use crate::registry::AssetRegistry;
use serde::de::Deserializer;
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;

/// Complete program structure
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Program {
    context: Location,
    registry: AssetRegistry,
    instructions: Vec<Instruction>,
}

impl Program {
    /// Create a program compiled in `context` with the given registry snapshot
    pub fn new(context: Location, registry: AssetRegistry, instructions: Vec<Instruction>) -> Self {
        Self {
            context,
            registry,
            instructions,
        }
    }

    /// A program with no scope metadata, as decoded from the wire
    pub fn from_instructions(instructions: Vec<Instruction>) -> Self {
        Self {
            instructions,
            ..Self::default()
        }
    }

    pub fn context(&self) -> &Location {
        &self.context
    }

    pub fn registry(&self) -> &AssetRegistry {
        &self.registry
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Instruction> {
        self.instructions.iter()
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Instruction count including every nested program
    pub fn len_recursive(&self) -> usize {
        self.instructions
            .iter()
            .map(|inst| 1 + inst.nested().map_or(0, Program::len_recursive))
            .sum()
    }

    /// Nesting depth: 0 for a program without transfers
    pub fn depth(&self) -> usize {
        self.instructions
            .iter()
            .filter_map(Instruction::nested)
            .map(|nested| 1 + nested.depth())
            .max()
            .unwrap_or(0)
    }

    /// Replace the scope metadata, keeping the instructions
    pub fn with_scope(self, context: Location, registry: AssetRegistry) -> Self {
        Self {
            context,
            registry,
            ..self
        }
    }

    pub fn into_instructions(self) -> Vec<Instruction> {
        self.instructions
    }

    /// Serialize to the wire JSON format
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serialize to indented wire JSON
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode wire JSON; the result carries no scope metadata
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// SHA-256 over the canonical binary encoding of the instructions
    pub fn fingerprint(&self) -> Result<[u8; 32]> {
        encoding::fingerprint(self)
    }
}

impl Index<usize> for Program {
    type Output = Instruction;

    fn index(&self, index: usize) -> &Instruction {
        &self.instructions[index]
    }
}

impl<'a> IntoIterator for &'a Program {
    type Item = &'a Instruction;
    type IntoIter = std::slice::Iter<'a, Instruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.instructions.iter()
    }
}

impl Serialize for Program {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.instructions.len()))?;
        for inst in &self.instructions {
            seq.serialize_element(inst)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for Program {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Vec::<Instruction>::deserialize(deserializer).map(Program::from_instructions)
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "XCM Program")?;
        writeln!(f, "  Context:       {}", self.context)?;
        writeln!(f, "  Assets:        {}", self.registry.len())?;
        writeln!(f, "  Instructions:  {}", self.len())?;
        writeln!(f, "  Total:         {}", self.len_recursive())?;
        writeln!(f, "  Depth:         {}", self.depth())?;
        Ok(())
    }
}
