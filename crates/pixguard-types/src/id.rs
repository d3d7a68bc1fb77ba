//! Numeric resource ids and the oversized-id set

use std::collections::BTreeSet;
use std::fmt::{self, Display, Formatter};

/// Numeric resource id as stored in compiled identifier modules
///
/// Ids are `CONSTANT_Integer` values, so they are signed 32-bit. Display uses
/// the conventional `0x7f08xxxx` hex form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ResourceId(i32);

impl ResourceId {
    /// Wrap a raw id
    #[inline]
    #[must_use]
    pub const fn new(raw: i32) -> Self {
        Self(raw)
    }

    /// Raw id value
    #[inline]
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }

    /// Zero means "no resource" in attribute lookups
    #[inline]
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl Display for ResourceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

impl From<i32> for ResourceId {
    fn from(raw: i32) -> Self {
        Self(raw)
    }
}

/// Frozen set of ids whose loads go through the pluggable loader
///
/// Ordered so that serializing it is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OversizedSet(BTreeSet<ResourceId>);

impl OversizedSet {
    /// Empty set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Build from raw ids, as found in a generated artifact
    #[must_use]
    pub fn from_raw(ids: &[i32]) -> Self {
        ids.iter().copied().map(ResourceId::new).collect()
    }

    /// Membership test
    #[inline]
    #[must_use]
    pub fn contains(&self, id: ResourceId) -> bool {
        self.0.contains(&id)
    }

    /// Ids in ascending order
    pub fn iter(&self) -> impl Iterator<Item = ResourceId> + '_ {
        self.0.iter().copied()
    }

    /// Number of ids
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<ResourceId> for OversizedSet {
    fn from_iter<I: IntoIterator<Item = ResourceId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a OversizedSet {
    type Item = &'a ResourceId;
    type IntoIter = std::collections::btree_set::Iter<'a, ResourceId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
