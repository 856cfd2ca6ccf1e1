use core::fmt;

use flowlist::{IdentityKey, PositionCache};

/// A scroll anchor used to preserve visual position across data changes.
///
/// Typical use case: chat/timeline "prepend" (load older items above) without
/// the content the user is looking at jumping.
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollAnchor<K> {
    pub key: K,
    /// Distance from the anchor item's start to the viewport top at capture time.
    pub disparity: u64,
}

impl<K: fmt::Debug> fmt::Debug for ScrollAnchor<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollAnchor")
            .field("key", &self.key)
            .field("disparity", &self.disparity)
            .finish()
    }
}

/// Captures an anchor for the item at the top of the viewport.
///
/// Returns `None` when the cache is empty.
pub fn capture_anchor<K: IdentityKey>(
    cache: &PositionCache<K>,
    scroll_offset: u64,
) -> Option<ScrollAnchor<K>> {
    let index = cache.index_at_offset(scroll_offset)?;
    let record = cache.record_at(index)?;
    let key = cache.identity_at(index)?.clone();
    Some(ScrollAnchor {
        key,
        disparity: scroll_offset.saturating_sub(record.offset),
    })
}

/// Resolves a previously captured anchor against the current cache state.
///
/// The returned offset restores the visual position the anchor recorded, after
/// prepended content has shifted the anchor item. `None` when the anchor item is
/// no longer present; the caller decides how loudly to report that.
pub fn apply_anchor<K: IdentityKey>(
    cache: &PositionCache<K>,
    anchor: &ScrollAnchor<K>,
) -> Option<u64> {
    let record = cache.get(&anchor.key)?;
    Some(record.offset.saturating_add(anchor.disparity))
}
