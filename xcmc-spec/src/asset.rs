//! Asset identities, amounts and register-set selectors

use crate::encoding::{amount_number_or_string, number_or_string};
use crate::error::Result;
use crate::location::Location;
use serde::de::{self, Deserializer};
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Location of a fungible asset, relative to the context it is used in
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(pub Location);

impl AssetId {
    pub fn location(&self) -> &Location {
        &self.0
    }

    /// Re-express this id, valid in `from`, as seen from `to`
    ///
    /// Both contexts must share a reference point.
    pub fn reanchored(&self, from: &Location, to: &Location) -> Result<AssetId> {
        let absolute = from.joined(&self.0)?;
        Ok(AssetId(absolute.relative_to(to)?))
    }
}

impl From<Location> for AssetId {
    fn from(location: Location) -> Self {
        AssetId(location)
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Amount of an asset
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Fungibility {
    #[serde(rename = "fungible")]
    Fungible(
        #[serde(
            serialize_with = "amount_number_or_string",
            deserialize_with = "number_or_string"
        )]
        u128,
    ),
}

impl Fungibility {
    pub fn amount(&self) -> u128 {
        match self {
            Fungibility::Fungible(amount) => *amount,
        }
    }
}

/// A concrete quantity of one asset
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Asset {
    pub id: AssetId,
    pub fun: Fungibility,
}

impl Asset {
    pub fn new(id: AssetId, amount: u128) -> Self {
        Self {
            id,
            fun: Fungibility::Fungible(amount),
        }
    }

    pub fn amount(&self) -> u128 {
        self.fun.amount()
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x {}", self.amount(), self.id)
    }
}

/// Wildcard selection over the Holding Register
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WildAsset {
    /// Everything currently held
    All,
}

/// Register-set selector: explicit assets or a wildcard
///
/// Serialized as a list: `[{"wild": "All"}]` or `[{"id": .., "fun": ..}, ..]`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum AssetFilter {
    Definite(Vec<Asset>),
    Wild(WildAsset),
}

impl AssetFilter {
    pub fn all() -> Self {
        AssetFilter::Wild(WildAsset::All)
    }

    pub fn is_wild(&self) -> bool {
        matches!(self, AssetFilter::Wild(_))
    }

    /// Ids named explicitly by this filter (none for a wildcard)
    pub fn ids(&self) -> impl Iterator<Item = &AssetId> {
        let assets: &[Asset] = match self {
            AssetFilter::Definite(assets) => assets,
            AssetFilter::Wild(_) => &[],
        };
        assets.iter().map(|asset| &asset.id)
    }
}

impl From<Vec<Asset>> for AssetFilter {
    fn from(assets: Vec<Asset>) -> Self {
        AssetFilter::Definite(assets)
    }
}

impl From<WildAsset> for AssetFilter {
    fn from(wild: WildAsset) -> Self {
        AssetFilter::Wild(wild)
    }
}

impl fmt::Display for AssetFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetFilter::Wild(WildAsset::All) => write!(f, "All"),
            AssetFilter::Definite(assets) => {
                let parts: Vec<String> = assets.iter().map(|a| a.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum FilterItem {
    Wild {
        #[serde(alias = "Wild")]
        wild: WildAsset,
    },
    Asset(Asset),
}

impl Serialize for AssetFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            AssetFilter::Wild(wild) => {
                let mut seq = serializer.serialize_seq(Some(1))?;
                seq.serialize_element(&FilterItem::Wild { wild: *wild })?;
                seq.end()
            }
            AssetFilter::Definite(assets) => {
                let mut seq = serializer.serialize_seq(Some(assets.len()))?;
                for asset in assets {
                    seq.serialize_element(asset)?;
                }
                seq.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for AssetFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let items = Vec::<FilterItem>::deserialize(deserializer)?;
        let count = items.len();
        let mut assets = Vec::with_capacity(count);
        for item in items {
            match item {
                FilterItem::Wild { wild } if count == 1 => return Ok(AssetFilter::Wild(wild)),
                FilterItem::Wild { .. } => {
                    return Err(de::Error::custom("a wildcard cannot be mixed with definite assets"))
                }
                FilterItem::Asset(asset) => assets.push(asset),
            }
        }
        Ok(AssetFilter::Definite(assets))
    }
}

/// How assets move across a hop
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferType {
    /// Burn here, mint there; both sides trust each other
    Teleport,
    /// Escrow on the reserve, derivative minted or burned on the other side
    #[serde(rename = "reserve")]
    ReserveTransfer,
}

impl fmt::Display for TransferType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferType::Teleport => write!(f, "teleport"),
            TransferType::ReserveTransfer => write!(f, "reserve"),
        }
    }
}
