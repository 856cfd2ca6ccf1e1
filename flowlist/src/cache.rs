use alloc::vec::Vec;

use crate::key::{IdentityKey, RecordMap};
use crate::types::PositionRecord;

/// The authoritative mapping of item identity ↔ index ↔ height ↔ offset.
///
/// Two views are kept mutually consistent at all times:
/// - identity → [`PositionRecord`] for identity-keyed lookups, and
/// - index → identity (an ordered list) for range queries.
///
/// Lookups for absent identities/indices return `None`; they never panic. The
/// mutation half of this type (height changes, inserts, deletes, and the offset
/// reflow they require) lives in `reflow.rs`.
#[derive(Clone, Debug)]
pub struct PositionCache<K> {
    pub(crate) records: RecordMap<K>,
    pub(crate) order: Vec<K>,
}

impl<K: IdentityKey> PositionCache<K> {
    pub fn new() -> Self {
        Self {
            records: RecordMap::<K>::default(),
            order: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get(&self, key: &K) -> Option<&PositionRecord> {
        self.records.get(key)
    }

    pub fn index_of(&self, key: &K) -> Option<usize> {
        self.records.get(key).map(|rec| rec.index)
    }

    pub fn identity_at(&self, index: usize) -> Option<&K> {
        self.order.get(index)
    }

    pub fn record_at(&self, index: usize) -> Option<&PositionRecord> {
        self.records.get(self.order.get(index)?)
    }

    /// Upserts a record, overwriting all fields at once.
    ///
    /// The index → identity slot is kept consistent: `record.index == len`
    /// appends, a smaller index overwrites that slot. An index beyond the tail is
    /// a caller bug and is ignored.
    pub fn set(&mut self, key: K, record: PositionRecord) {
        let index = record.index;
        if index > self.order.len() {
            fwarn!(index, len = self.order.len(), "set: index beyond tail");
            debug_assert!(
                index <= self.order.len(),
                "PositionCache::set index beyond tail (index={index}, len={})",
                self.order.len()
            );
            return;
        }
        if index == self.order.len() {
            self.order.push(key.clone());
        } else {
            self.order[index] = key.clone();
        }
        self.records.insert(key, record);
    }

    /// Rewrites the index and identity mappings for `from..` to match `keys`.
    ///
    /// Used after an insert/delete has shifted every following item's logical
    /// index. Offsets are not touched; that is the reflow layer's job.
    pub fn renumber(&mut self, from: usize, keys: &[K]) {
        self.order.truncate(from);
        self.order.extend_from_slice(keys);
        for i in from..self.order.len() {
            if let Some(rec) = self.records.get_mut(&self.order[i]) {
                rec.index = i;
            }
        }
    }

    /// Deletes the record for `key`, renumbers everything after the removed
    /// slot, and drops the now-unused trailing slot.
    ///
    /// Offsets of the following items are left as-is; callers that need them
    /// re-derived go through `remove_entry` instead.
    pub fn remove(&mut self, key: &K) -> Option<PositionRecord> {
        let record = self.records.remove(key)?;
        let index = record.index;
        debug_assert!(
            index < self.order.len(),
            "PositionCache::remove record index out of bounds (index={index}, len={})",
            self.order.len()
        );
        if index < self.order.len() {
            self.order.remove(index);
            for i in index..self.order.len() {
                if let Some(rec) = self.records.get_mut(&self.order[i]) {
                    rec.index = i;
                }
            }
        }
        Some(record)
    }

    /// Drops all records. Used on full dataset replacement.
    pub fn clear(&mut self) {
        fdebug!(len = self.order.len(), "clear");
        self.records.clear();
        self.order.clear();
    }

    /// Resolves a scroll-axis offset to the index of the item whose
    /// `[offset, offset + height)` interval contains it.
    ///
    /// Probes at or beyond the total extent resolve to the last index. Returns
    /// `None` only when the cache is empty.
    ///
    /// Offsets are non-decreasing in index order, so this is a binary search
    /// over the ordered identities rather than the linear scan a naive
    /// implementation would use.
    pub fn index_at_offset(&self, offset: u64) -> Option<usize> {
        let count = self.order.len();
        if count == 0 {
            return None;
        }
        if offset >= self.total_extent() {
            return Some(count - 1);
        }

        // Greatest index whose record offset is <= the probe. Zero-height runs
        // share an offset; landing on the last of the run keeps the containing
        // interval non-empty.
        let mut lo = 0usize;
        let mut hi = count - 1;
        while lo < hi {
            let mid = lo + (hi - lo).div_ceil(2);
            let Some(rec) = self.record_at(mid) else {
                debug_assert!(false, "identity at index {mid} has no record");
                return None;
            };
            if rec.offset <= offset {
                lo = mid;
            } else {
                hi = mid - 1;
            }
        }
        Some(lo)
    }
}
