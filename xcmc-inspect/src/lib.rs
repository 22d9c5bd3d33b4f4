//! # XCM Program Inspection
//!
//! Decode wire JSON programs and render them as readable text.
//!
//! ## Example
//!
//! ```rust
//! use xcmc_inspect::{decode, render};
//!
//! let text = r#"[{"transact": {"call": "0x0a00"}}]"#;
//! let program = decode(text).unwrap();
//! let listing = render(&program).unwrap();
//! assert!(listing.contains("transact 0x0a00"));
//! ```

pub mod decoder;
pub mod error;
pub mod formatter;
pub mod render;

pub use decoder::{decode, decode_in, decode_reader};
pub use error::{InspectError, Result};
pub use formatter::format;
pub use render::{render, render_body};

use xcmc_spec::{Program, Validator};

/// Decode a program and check it with `validator`
///
/// Decoded programs carry no registry, so reference checks are skipped.
pub fn decode_and_validate(text: &str, validator: &Validator) -> Result<Program> {
    let program = decode(text)?;
    validator
        .clone()
        .without_reference_checks()
        .validate(&program)?;
    Ok(program)
}
