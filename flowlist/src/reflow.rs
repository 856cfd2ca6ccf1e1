//! Offset reflow: the mutation half of [`PositionCache`].
//!
//! Every mutation here leaves the cache fully consistent before returning, so a
//! reader can never observe a partially-reflowed state. The walk is O(k) in the
//! number of items after the mutation point. That trade-off keeps inserts and
//! removals trivial compared to an interval-tree layout; the cost center is a
//! height change on a very early item of a very long list.

use crate::cache::PositionCache;
use crate::key::IdentityKey;
use crate::types::PositionRecord;

impl<K: IdentityKey> PositionCache<K> {
    /// Updates an item's height from a real measurement and re-derives the
    /// offset of every following item.
    ///
    /// Returns the height delta (0 for an unknown identity or an unchanged
    /// height). The record's `measured` flag is set either way: a measurement
    /// that happens to match the estimate still counts as measured.
    pub fn set_item_height(&mut self, key: &K, new_height: u32) -> i64 {
        let (old, from) = match self.records.get_mut(key) {
            Some(rec) => {
                let old = rec.height;
                rec.height = new_height;
                rec.measured = true;
                (old, rec.index + 1)
            }
            None => {
                fwarn!("set_item_height: unknown identity");
                return 0;
            }
        };
        if old == new_height {
            return 0;
        }
        ftrace!(index = from - 1, old, new = new_height, "set_item_height");
        self.reflow_forward(from);
        new_height as i64 - old as i64
    }

    /// Inserts a new, not-yet-measured item at `index`.
    ///
    /// The new item's offset comes from its predecessor (0 at the head); the
    /// forward walk then renumbers and re-offsets every following item. Rejects
    /// an index beyond the tail or an identity that is already present.
    pub fn insert(&mut self, index: usize, key: K, height: u32) -> bool {
        if index > self.order.len() {
            fwarn!(index, len = self.order.len(), "insert: index beyond tail");
            return false;
        }
        if self.records.contains_key(&key) {
            fwarn!("insert: identity already present");
            return false;
        }
        let offset = match index.checked_sub(1).and_then(|i| self.record_at(i)) {
            Some(prev) => prev.end(),
            None => 0,
        };
        self.order.insert(index, key.clone());
        self.records.insert(
            key,
            PositionRecord {
                index,
                height,
                offset,
                measured: false,
            },
        );
        self.reflow_forward(index + 1);
        true
    }

    /// Removes an item and re-derives the offsets of everything after it.
    ///
    /// The height is zeroed before the walk so that anything still holding the
    /// slot sees a collapsing item rather than a stale one; the record is then
    /// physically dropped and the tail renumbered.
    pub fn remove_entry(&mut self, key: &K) -> bool {
        let from = match self.records.get_mut(key) {
            Some(rec) => {
                rec.height = 0;
                rec.index + 1
            }
            None => {
                fwarn!("remove_entry: unknown identity");
                return false;
            }
        };
        self.reflow_forward(from);
        self.remove(key);
        true
    }

    /// Total estimated scroll extent: `offset(last) + height(last)`, 0 if empty.
    pub fn total_extent(&self) -> u64 {
        match self.order.last().and_then(|key| self.records.get(key)) {
            Some(rec) => rec.end(),
            None => 0,
        }
    }

    /// Re-derives `index` and `offset` for every item from `from` onward.
    ///
    /// Running it again with no intervening mutation is a no-op by construction:
    /// each offset is recomputed from its predecessor alone.
    pub(crate) fn reflow_forward(&mut self, from: usize) {
        let mut offset = match from.checked_sub(1).and_then(|i| self.record_at(i)) {
            Some(prev) => prev.end(),
            None => 0,
        };
        for i in from..self.order.len() {
            let Some(rec) = self.records.get_mut(&self.order[i]) else {
                debug_assert!(false, "identity at index {i} has no record");
                continue;
            };
            rec.index = i;
            rec.offset = offset;
            offset = offset.saturating_add(rec.height as u64);
        }
    }
}
