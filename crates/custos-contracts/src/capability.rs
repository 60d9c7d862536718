//! Capability tags and capability sets.
//!
//! CUSTOS attaches a capability set to every unit of data and a single
//! capability to every proposed action. Capabilities are opaque: equality
//! and set membership are the only operations. Derived data attenuates —
//! its capability set is the intersection of its parents' sets, so trust
//! only narrows through derivation.

use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An opaque capability tag.
///
/// Capability names should describe what the data is trusted to do:
/// e.g. "user_query", "trusted_email", "data_analysis".
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Capability(pub String);

impl Capability {
    /// Construct a capability from any string-like value.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The well-known default tag for actions with no declared capability.
    pub fn untrusted() -> Self {
        Self("untrusted".to_string())
    }

    /// The tag name as a plain string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Capability {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// A set of capability tags attached to a data node or required by a tool.
///
/// Serializes as a sorted list so that serialized forms (and anything
/// hashed over them, like audit chain entries) are canonical.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilitySet {
    inner: HashSet<Capability>,
}

impl CapabilitySet {
    /// The empty capability set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant a capability to this set. Granting twice is a no-op.
    pub fn grant(&mut self, capability: Capability) {
        self.inner.insert(capability);
    }

    /// Revoke a capability. Returns false if it was not present.
    pub fn revoke(&mut self, capability: &Capability) -> bool {
        self.inner.remove(capability)
    }

    /// Return true if the set contains the given capability.
    pub fn has(&self, capability: &Capability) -> bool {
        self.inner.contains(capability)
    }

    /// The attenuation operator: capabilities present in both sets.
    pub fn intersection(&self, other: &CapabilitySet) -> CapabilitySet {
        CapabilitySet {
            inner: self.inner.intersection(&other.inner).cloned().collect(),
        }
    }

    /// Return true if every capability in `self` is also in `other`.
    pub fn is_subset(&self, other: &CapabilitySet) -> bool {
        self.inner.is_subset(&other.inner)
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Iterate over the capabilities in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = &Capability> {
        self.inner.iter()
    }

    /// Materialize the set as a lexicographically sorted sequence.
    ///
    /// Used wherever a deterministic ordering is observable: provenance
    /// snapshots, serialized forms, log lines.
    pub fn sorted(&self) -> Vec<Capability> {
        let mut caps: Vec<Capability> = self.inner.iter().cloned().collect();
        caps.sort();
        caps
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<&'a str> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        iter.into_iter().map(Capability::new).collect()
    }
}

impl Serialize for CapabilitySet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.sorted().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CapabilitySet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let caps = Vec::<Capability>::deserialize(deserializer)?;
        Ok(caps.into_iter().collect())
    }
}
