//! Wire JSON decoding

use crate::error::Result;
use std::io::Read;
use xcmc_spec::{AssetRegistry, Location, Program};

/// Decode a wire JSON program
///
/// The result carries no registry; its context is `Here`.
pub fn decode(text: &str) -> Result<Program> {
    let program = Program::from_json(text)?;
    tracing::debug!(
        instructions = program.len_recursive(),
        depth = program.depth(),
        "decoded program"
    );
    Ok(program)
}

/// Decode a wire JSON program that runs in `context`
pub fn decode_in(context: Location, text: &str) -> Result<Program> {
    Ok(decode(text)?.with_scope(context, AssetRegistry::new()))
}

/// Decode a wire JSON program from a reader
pub fn decode_reader<R: Read>(mut reader: R) -> Result<Program> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    decode(&text)
}
