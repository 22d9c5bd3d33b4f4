//! Context-scoped asset registry
//!
//! Maps symbolic names to asset ids expressed in one context's vocabulary.
//! Every nested scope starts from an empty registry, so a name defined in a
//! parent scope never leaks into a child.

use crate::asset::AssetId;
use crate::error::{Result, XcmError};
use crate::location::Location;
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AssetRegistry {
    entries: BTreeMap<String, AssetId>,
}

impl AssetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name → location`
    pub fn define(&mut self, name: &str, location: Location) -> Result<AssetId> {
        location.validate()?;
        if self.entries.contains_key(name) {
            return Err(XcmError::DuplicateAssetName(name.to_string()));
        }
        let id = AssetId(location);
        self.entries.insert(name.to_string(), id.clone());
        Ok(id)
    }

    /// Look up the id registered under `name`
    pub fn resolve(&self, name: &str) -> Result<AssetId> {
        self.entries
            .get(name)
            .cloned()
            .ok_or_else(|| XcmError::UnknownAsset(name.to_string()))
    }

    /// Whether some name in this registry resolves to `id`
    pub fn defines(&self, id: &AssetId) -> bool {
        self.entries.values().any(|defined| defined == id)
    }

    /// Reverse lookup, used when rendering programs
    pub fn name_of(&self, id: &AssetId) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, defined)| *defined == id)
            .map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AssetId)> {
        self.entries.iter().map(|(name, id)| (name.as_str(), id))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
