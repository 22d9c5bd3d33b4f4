//! Hierarchical consensus locations
//!
//! A [`Location`] is a path through the consensus topology: `parents` steps
//! up towards a shared ancestor, then `interior` junctions back down.
//!
//! ## Wire format
//! ```text
//! {"parents": 1, "interior": {"X1": [{"Parachain": 2000}]}}
//! {"parents": 0, "interior": "Here"}
//! ```

use crate::encoding::{fixed_bytes, fixed_hex, hex_array, number_or_string, to_hex};
use crate::error::{Result, XcmError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of interior junctions (`X1` through `X8`)
pub const MAX_JUNCTIONS: usize = 8;

/// Width of an EVM-style account id
pub const ACCOUNT_ID20_LEN: usize = 20;

/// Width of a Substrate-style account id
pub const ACCOUNT_ID32_LEN: usize = 32;

/// Global consensus systems
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NetworkId {
    Polkadot,
    Kusama,
    Westend,
    Rococo,
    Paseo,
    Ethereum,
    BitcoinCore,
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A single step in a location's interior path
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Junction {
    /// A whole consensus system (relay chain ecosystem or bridged ledger)
    GlobalConsensus(NetworkId),

    /// A parachain under the current relay chain
    Parachain(#[serde(deserialize_with = "number_or_string")] u32),

    /// A pallet of the current chain's runtime
    PalletInstance(#[serde(deserialize_with = "number_or_string")] u8),

    /// A 20-byte (EVM-style) account or contract
    AccountId20(#[serde(with = "hex_array")] [u8; ACCOUNT_ID20_LEN]),

    /// A 32-byte account, optionally qualified by its network
    AccountId32 {
        #[serde(default)]
        network: Option<NetworkId>,
        #[serde(with = "hex_array")]
        id: [u8; ACCOUNT_ID32_LEN],
    },
}

impl Junction {
    /// Build an `AccountId20` junction, checking the payload is exactly 20 bytes
    pub fn account_id20(bytes: &[u8]) -> Result<Self> {
        Ok(Junction::AccountId20(fixed_bytes("AccountId20", bytes)?))
    }

    /// Build an `AccountId32` junction, checking the payload is exactly 32 bytes
    pub fn account_id32(network: Option<NetworkId>, bytes: &[u8]) -> Result<Self> {
        Ok(Junction::AccountId32 {
            network,
            id: fixed_bytes("AccountId32", bytes)?,
        })
    }

    /// Parse an `AccountId20` junction from hex
    pub fn account_id20_hex(text: &str) -> Result<Self> {
        Ok(Junction::AccountId20(fixed_hex("AccountId20", text)?))
    }

    /// Parse an `AccountId32` junction from hex
    pub fn account_id32_hex(network: Option<NetworkId>, text: &str) -> Result<Self> {
        Ok(Junction::AccountId32 {
            network,
            id: fixed_hex("AccountId32", text)?,
        })
    }

    /// Account width in bytes, if this junction names an account
    pub fn account_width(&self) -> Option<usize> {
        match self {
            Junction::AccountId20(_) => Some(ACCOUNT_ID20_LEN),
            Junction::AccountId32 { .. } => Some(ACCOUNT_ID32_LEN),
            Junction::GlobalConsensus(_) | Junction::Parachain(_) | Junction::PalletInstance(_) => None,
        }
    }

    pub fn is_account(&self) -> bool {
        self.account_width().is_some()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Junction::GlobalConsensus(_) => "GlobalConsensus",
            Junction::Parachain(_) => "Parachain",
            Junction::PalletInstance(_) => "PalletInstance",
            Junction::AccountId20(_) => "AccountId20",
            Junction::AccountId32 { .. } => "AccountId32",
        }
    }
}

impl fmt::Display for Junction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Junction::GlobalConsensus(network) => write!(f, "GlobalConsensus({})", network),
            Junction::Parachain(id) => write!(f, "Parachain({})", id),
            Junction::PalletInstance(id) => write!(f, "PalletInstance({})", id),
            Junction::AccountId20(key) => write!(f, "AccountId20({})", to_hex(key)),
            Junction::AccountId32 { network: Some(network), id } => {
                write!(f, "AccountId32({}, {})", network, to_hex(id))
            }
            Junction::AccountId32 { network: None, id } => write!(f, "AccountId32({})", to_hex(id)),
        }
    }
}

/// A relative path through the consensus topology
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "LocationRepr")]
pub struct Location {
    parents: u8,
    #[serde(with = "junctions")]
    interior: Vec<Junction>,
}

impl Location {
    /// The current context
    pub fn here() -> Self {
        Self::default()
    }

    /// The immediate parent context
    pub fn parent() -> Self {
        Self {
            parents: 1,
            interior: Vec::new(),
        }
    }

    /// Create a location, validating its interior
    pub fn new(parents: u8, interior: Vec<Junction>) -> Result<Self> {
        let location = Self { parents, interior };
        location.validate()?;
        Ok(location)
    }

    /// Shorthand for a location with a single interior junction
    pub fn with_junction(parents: u8, junction: Junction) -> Result<Self> {
        Self::new(parents, vec![junction])
    }

    pub fn parents(&self) -> u8 {
        self.parents
    }

    pub fn interior(&self) -> &[Junction] {
        &self.interior
    }

    pub fn is_here(&self) -> bool {
        self.parents == 0 && self.interior.is_empty()
    }

    /// The final interior junction, if any
    pub fn last(&self) -> Option<&Junction> {
        self.interior.last()
    }

    /// Check the structural rules every location must satisfy
    ///
    /// - at most [`MAX_JUNCTIONS`] interior junctions
    /// - `GlobalConsensus` only as the first interior junction
    /// - account junctions only as the last interior junction
    pub fn validate(&self) -> Result<()> {
        if self.interior.len() > MAX_JUNCTIONS {
            return Err(XcmError::MalformedLocation(format!(
                "{} interior junctions exceed the maximum of {}",
                self.interior.len(),
                MAX_JUNCTIONS
            )));
        }

        let last = self.interior.len().saturating_sub(1);
        for (i, junction) in self.interior.iter().enumerate() {
            if matches!(junction, Junction::GlobalConsensus(_)) && i != 0 {
                return Err(XcmError::MalformedLocation(format!(
                    "{} may only appear as the first junction (found at {})",
                    junction, i
                )));
            }
            if junction.is_account() && i != last {
                return Err(XcmError::MalformedLocation(format!(
                    "account junction {} must be the last junction",
                    junction
                )));
            }
        }

        Ok(())
    }

    /// Append a junction to the interior
    pub fn pushed_with(&self, junction: Junction) -> Result<Self> {
        let mut interior = self.interior.clone();
        interior.push(junction);
        Self::new(self.parents, interior)
    }

    /// Resolve `relative`, expressed from this location's viewpoint, into a
    /// location expressed from the same reference point as `self`
    ///
    /// Parents of `relative` cancel trailing interior junctions of `self`;
    /// any surplus climbs above `self`'s own reference point.
    pub fn joined(&self, relative: &Location) -> Result<Self> {
        let climb = (relative.parents as usize).min(self.interior.len());
        let surplus = relative.parents as usize - climb;

        let mut interior = self.interior[..self.interior.len() - climb].to_vec();
        interior.extend(relative.interior.iter().cloned());

        let parents = (self.parents as usize + surplus)
            .try_into()
            .map_err(|_| XcmError::MalformedLocation("parent count overflows u8".to_string()))?;
        Self::new(parents, interior)
    }

    /// Compute this location as seen from `base`
    ///
    /// Both locations must be expressed from a common reference point. The
    /// shared interior prefix cancels; every remaining junction of `base`
    /// becomes one parent hop; the rest of `self` is appended.
    pub fn relative_to(&self, base: &Location) -> Result<Self> {
        if base.parents > self.parents {
            return Err(XcmError::Unreachable(format!(
                "{} climbs above {}",
                base, self
            )));
        }

        let (parents, interior) = if base.parents == self.parents {
            let common = self
                .interior
                .iter()
                .zip(base.interior.iter())
                .take_while(|(a, b)| a == b)
                .count();
            (
                base.interior.len() - common,
                self.interior[common..].to_vec(),
            )
        } else {
            let extra = (self.parents - base.parents) as usize;
            (base.interior.len() + extra, self.interior.clone())
        };

        let parents = parents
            .try_into()
            .map_err(|_| XcmError::MalformedLocation("parent count overflows u8".to_string()))?;
        Self::new(parents, interior)
    }

    /// Width of the account this location ends in, if it ends in one
    pub fn account_width(&self) -> Option<usize> {
        self.last().and_then(Junction::account_width)
    }
}

/// Free-function form of [`Location::relative_to`]
pub fn relative_to(base: &Location, target: &Location) -> Result<Location> {
    target.relative_to(base)
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_here() {
            return write!(f, "Here");
        }
        let mut parts: Vec<String> = (0..self.parents).map(|_| "..".to_string()).collect();
        parts.extend(self.interior.iter().map(|j| j.to_string()));
        write!(f, "{}", parts.join("/"))
    }
}

impl From<Junction> for Location {
    fn from(junction: Junction) -> Self {
        // A single junction at zero parents never violates placement rules.
        Self {
            parents: 0,
            interior: vec![junction],
        }
    }
}

#[derive(Deserialize)]
struct LocationRepr {
    #[serde(default, deserialize_with = "number_or_string")]
    parents: u8,
    #[serde(default, with = "junctions")]
    interior: Vec<Junction>,
}

impl TryFrom<LocationRepr> for Location {
    type Error = XcmError;

    fn try_from(repr: LocationRepr) -> Result<Self> {
        Location::new(repr.parents, repr.interior)
    }
}

/// Interior junctions on the wire: `"Here"` or `{"X<n>": [...]}`
mod junctions {
    use super::{Junction, MAX_JUNCTIONS};
    use serde::de::{self, MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S: Serializer>(
        interior: &[Junction],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        if interior.is_empty() {
            return serializer.serialize_str("Here");
        }
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&format!("X{}", interior.len()), interior)?;
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<Junction>, D::Error> {
        deserializer.deserialize_any(JunctionsVisitor)
    }

    struct JunctionsVisitor;

    impl<'de> Visitor<'de> for JunctionsVisitor {
        type Value = Vec<Junction>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "\"Here\" or a map with a single X1..X8 key")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            match value {
                "Here" => Ok(Vec::new()),
                other => Err(E::unknown_variant(other, &["Here"])),
            }
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let key: String = map
                .next_key()?
                .ok_or_else(|| de::Error::custom("empty interior map"))?;

            let junctions = if key == "Here" {
                map.next_value::<de::IgnoredAny>()?;
                Vec::new()
            } else {
                let arity: usize = key
                    .strip_prefix('X')
                    .and_then(|n| n.parse().ok())
                    .filter(|n| (1..=MAX_JUNCTIONS).contains(n))
                    .ok_or_else(|| de::Error::custom(format!("invalid interior key {:?}", key)))?;
                let junctions: Vec<Junction> = map.next_value()?;
                if junctions.len() != arity {
                    return Err(de::Error::custom(format!(
                        "{} carries {} junctions",
                        key,
                        junctions.len()
                    )));
                }
                junctions
            };

            if map.next_key::<de::IgnoredAny>()?.is_some() {
                return Err(de::Error::custom("interior map must have exactly one key"));
            }
            Ok(junctions)
        }
    }
}
