//! Wire encoding helpers
//!
//! Byte payloads travel as `0x`-prefixed hex strings. Numeric fields accept
//! either JSON numbers or decimal strings, since hand-written programs often
//! quote ids (`"Parachain": "2004"`).

use crate::error::{Result, XcmError};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt::Display;
use std::str::FromStr;

/// Render bytes as a `0x`-prefixed lowercase hex string
pub fn to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Parse a hex string, with or without the `0x` prefix
pub fn from_hex(text: &str) -> Result<Vec<u8>> {
    let digits = text.strip_prefix("0x").unwrap_or(text);
    hex::decode(digits).map_err(|_| XcmError::InvalidHex(text.to_string()))
}

/// Copy a slice into a fixed-width account id, checking its arity
pub fn fixed_bytes<const N: usize>(junction: &'static str, bytes: &[u8]) -> Result<[u8; N]> {
    <[u8; N]>::try_from(bytes).map_err(|_| XcmError::MalformedAddress {
        junction,
        expected: N,
        found: bytes.len(),
    })
}

/// Parse a fixed-width account id from hex
pub fn fixed_hex<const N: usize>(junction: &'static str, text: &str) -> Result<[u8; N]> {
    let bytes = from_hex(text)?;
    fixed_bytes(junction, &bytes)
}

/// SHA-256 over the canonical bincode encoding of a value
pub fn fingerprint<T: Serialize>(value: &T) -> Result<[u8; 32]> {
    let encoded = bincode::serialize(value).map_err(|e| XcmError::Wire(e.to_string()))?;
    Ok(Sha256::digest(&encoded).into())
}

/// Serialize an amount as a JSON number, or as a decimal string when it
/// does not fit in a `u64`
pub fn amount_number_or_string<S: Serializer>(
    amount: &u128,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match u64::try_from(*amount) {
        Ok(small) => serializer.serialize_u64(small),
        Err(_) => serializer.collect_str(amount),
    }
}

/// Deserialize a number given either as a JSON number or a decimal string
pub fn number_or_string<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: Display,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr<T> {
        Number(T),
        Text(String),
    }

    match Repr::<T>::deserialize(deserializer)? {
        Repr::Number(value) => Ok(value),
        Repr::Text(text) => text.trim().parse().map_err(de::Error::custom),
    }
}

/// `#[serde(with)]` adapter for fixed-width byte arrays
pub mod hex_array {
    use super::*;

    pub fn serialize<S: Serializer, const N: usize>(
        bytes: &[u8; N],
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&to_hex(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>, const N: usize>(
        deserializer: D,
    ) -> std::result::Result<[u8; N], D::Error> {
        let text = String::deserialize(deserializer)?;
        let junction = if N == 20 { "AccountId20" } else { "AccountId32" };
        fixed_hex::<N>(junction, &text).map_err(de::Error::custom)
    }
}

/// `#[serde(with)]` adapter for variable-length byte payloads
pub mod hex_vec {
    use super::*;

    pub fn serialize<S: Serializer>(
        bytes: &[u8],
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&to_hex(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        from_hex(&text).map_err(de::Error::custom)
    }
}
