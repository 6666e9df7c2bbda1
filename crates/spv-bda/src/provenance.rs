use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;

/// The root storage location a buffer device address was traced back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BindingIdentity {
    /// A resource slot bound from outside the shader.
    DescriptorBinding {
        /// Descriptor set index.
        set: u32,
        /// Binding index within the set.
        binding: u32,
    },
    /// The push-constant block; it has no set/binding.
    PushConstantBlock,
}

impl fmt::Display for BindingIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingIdentity::DescriptorBinding { set, binding } => {
                write!(f, "set: {set}, binding: {binding}")
            }
            BindingIdentity::PushConstantBlock => write!(f, "push-constant-block"),
        }
    }
}

/// The key under which provenance entries deduplicate.
///
/// The key is a pure function of the resolved storage path: re-deriving the
/// same path always produces the same key, so two traces that reach the same
/// member collapse to one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProvenanceKey {
    /// Where the address lives.
    pub identity: BindingIdentity,
    /// Cumulative byte offset of the member within its block.
    pub byte_offset: u32,
    /// Declared element stride when the member is an array of addresses;
    /// zero otherwise.
    pub array_stride: u32,
}

/// Human-readable path to the member: the root binding/block name (or its
/// parenthesized type name when anonymous), then one segment per resolved
/// member.
pub type MemberPath = Vec<String>;

/// The aggregated result of one analysis run.
///
/// Key-unique; insertion of a duplicate key replaces the stored path (the
/// paths of duplicate keys describe the same storage location, so last write
/// wins is harmless). Iteration order is an implementation detail; callers
/// needing a specific order must sort explicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvenanceMap {
    entries: BTreeMap<ProvenanceKey, MemberPath>,
}

impl ProvenanceMap {
    /// Inserts or replaces the entry for `key`.
    pub fn insert(&mut self, key: ProvenanceKey, path: MemberPath) {
        self.entries.insert(key, path);
    }

    /// Looks up the path recorded for `key`.
    pub fn get(&self, key: &ProvenanceKey) -> Option<&MemberPath> {
        self.entries.get(key)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no provenance was resolved.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over all entries.
    pub fn iter(&self) -> impl Iterator<Item = (&ProvenanceKey, &MemberPath)> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a ProvenanceMap {
    type Item = (&'a ProvenanceKey, &'a MemberPath);
    type IntoIter = btree_map::Iter<'a, ProvenanceKey, MemberPath>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
