use core::cmp;

use crate::cache::PositionCache;
use crate::key::IdentityKey;
use crate::types::{ScrollDirection, WindowRange};

/// Inputs for [`compute_range`]. Pure data; the cache supplies the geometry.
#[derive(Clone, Copy, Debug)]
pub struct WindowParams {
    pub scroll_offset: u64,
    pub viewport_size: u32,
    pub direction: ScrollDirection,
    pub overscan: usize,
}

/// Computes the index range that must be mounted for the given scroll state.
///
/// The current index is the item whose `[offset, offset + height)` interval
/// contains `scroll_offset` (clamped to the last item past the extent). The
/// overscan margin is placed behind the scroll direction's leading edge:
/// scrolling forward keeps a single row above and overscans below, scrolling
/// backward mirrors that.
///
/// Returns `None` for an empty cache. Mounting everything when windowing is
/// disabled is the caller's configuration, not a separate algorithm here.
pub fn compute_range<K: IdentityKey>(
    cache: &PositionCache<K>,
    params: &WindowParams,
) -> Option<WindowRange> {
    let count = cache.len();
    let current = cache.index_at_offset(params.scroll_offset)?;
    let visible = items_in_viewport(cache, current, params.scroll_offset, params.viewport_size);
    let last = count - 1;

    let (start_index, end_index) = match params.direction {
        ScrollDirection::Forward => (
            current.saturating_sub(1),
            cmp::min(last, current + visible + params.overscan),
        ),
        ScrollDirection::Backward => (
            current.saturating_sub(params.overscan),
            cmp::min(last, current + visible),
        ),
    };

    Some(WindowRange {
        start_index,
        end_index,
    })
}

/// Number of items from `current` onward that intersect the viewport interval
/// `[scroll_offset, scroll_offset + viewport_size)`.
fn items_in_viewport<K: IdentityKey>(
    cache: &PositionCache<K>,
    current: usize,
    scroll_offset: u64,
    viewport_size: u32,
) -> usize {
    let viewport_end = scroll_offset.saturating_add(viewport_size as u64);
    let mut visible = 0usize;
    let mut index = current;
    while let Some(rec) = cache.record_at(index) {
        if rec.offset >= viewport_end {
            break;
        }
        visible += 1;
        index += 1;
    }
    visible
}
