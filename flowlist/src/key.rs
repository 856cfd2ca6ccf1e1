use crate::types::PositionRecord;

#[cfg(not(feature = "std"))]
use alloc::collections::BTreeMap;
#[cfg(feature = "std")]
use std::collections::HashMap;

#[cfg(feature = "std")]
pub(crate) type RecordMap<K> = HashMap<K, PositionRecord>;
#[cfg(not(feature = "std"))]
pub(crate) type RecordMap<K> = BTreeMap<K, PositionRecord>;

/// Bound for item identities: a stable key, unique within the list, never reused
/// while the item is logically present.
#[cfg(feature = "std")]
pub trait IdentityKey: core::hash::Hash + Eq + Clone {}
#[cfg(feature = "std")]
impl<K: core::hash::Hash + Eq + Clone> IdentityKey for K {}

#[cfg(not(feature = "std"))]
pub trait IdentityKey: Ord + Clone {}
#[cfg(not(feature = "std"))]
impl<K: Ord + Clone> IdentityKey for K {}
