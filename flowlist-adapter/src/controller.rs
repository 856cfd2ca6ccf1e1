use alloc::sync::Arc;
use core::cell::Cell;
use core::cmp;
use core::fmt;

use flowlist::{
    IdentityKey, PositionCache, PositionRecord, ScrollDirection, WindowParams, WindowRange,
    compute_range,
};

use crate::anchor::{ScrollAnchor, apply_anchor, capture_anchor};
use crate::options::ControllerOptions;
use crate::store::DataStore;

/// One mounted cell, as handed to the rendering surface.
#[derive(Debug)]
pub struct WindowItem<'a, K, T> {
    pub key: &'a K,
    pub index: usize,
    pub item: &'a T,
    pub offset: u64,
    pub height: u32,
    pub measured: bool,
    /// Transient programmatic-scroll highlight.
    pub highlighted: bool,
}

/// Which part of the load/anchor protocol is currently in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    /// A top load was requested; the anchor for the prepend is captured.
    LoadingTop,
    /// Prepended content landed; a restoring scroll command is owed to the host.
    ScrollAnchoring,
    /// A programmatic scroll was issued; the target stays highlighted until the
    /// timer expires or the next scroll event.
    Settling,
}

#[derive(Clone, Debug)]
struct Highlight<K> {
    key: K,
    expires_at_ms: u64,
}

/// Orchestrates scroll handling, load-more triggering with hysteresis, scroll
/// anchoring on prepend, and programmatic scrolling over a [`DataStore`] and a
/// [`PositionCache`].
///
/// Single-threaded and event-driven: the controller is the only mutator of the
/// cache, and every delivered event (scroll, measurement, API call) runs to
/// completion before the next, so reads always observe a fully reflowed cache.
///
/// The host drives it by calling:
/// - `update_dataset` once up front (and on full replacement)
/// - `on_scroll` / `on_item_height` when UI events occur
/// - `tick(now_ms)` each frame/timer tick
/// - `take_pending_scroll()` each render pass, applying the returned offset to
///   the real scroll container
pub struct ListController<K, T> {
    options: ControllerOptions<K, T>,
    store: DataStore<K, T>,
    cache: PositionCache<K>,

    scroll_offset: u64,
    direction: Option<ScrollDirection>,
    is_scrolling: bool,
    last_scroll_event_ms: Option<u64>,

    phase: Phase,
    top_load_armed: bool,
    bottom_load_armed: bool,
    suppress_top_once: bool,
    initial_load_done: bool,
    measured_count: usize,
    scroll_back_armed: bool,
    first_visible: usize,
    anchor: Option<ScrollAnchor<K>>,
    pending_scroll: Option<u64>,
    highlight: Option<Highlight<K>>,
    initialized: bool,

    notify_depth: Cell<usize>,
    notify_pending: Cell<bool>,
}

impl<K: IdentityKey, T> ListController<K, T> {
    pub fn new(options: ControllerOptions<K, T>) -> Self {
        Self {
            options,
            store: DataStore::new(),
            cache: PositionCache::new(),
            scroll_offset: 0,
            direction: None,
            is_scrolling: false,
            last_scroll_event_ms: None,
            phase: Phase::Idle,
            top_load_armed: true,
            bottom_load_armed: true,
            suppress_top_once: false,
            initial_load_done: false,
            measured_count: 0,
            scroll_back_armed: false,
            first_visible: 0,
            anchor: None,
            pending_scroll: None,
            highlight: None,
            initialized: false,
            notify_depth: Cell::new(0),
            notify_pending: Cell::new(false),
        }
    }

    pub fn options(&self) -> &ControllerOptions<K, T> {
        &self.options
    }

    pub fn store(&self) -> &DataStore<K, T> {
        &self.store
    }

    pub fn cache(&self) -> &PositionCache<K> {
        &self.cache
    }

    pub fn item_count(&self) -> usize {
        self.store.len()
    }

    pub fn scroll_offset(&self) -> u64 {
        self.scroll_offset
    }

    pub fn scroll_direction(&self) -> Option<ScrollDirection> {
        self.direction
    }

    pub fn is_scrolling(&self) -> bool {
        self.is_scrolling
    }

    pub fn is_loading_top(&self) -> bool {
        self.phase == Phase::LoadingTop
    }

    pub fn initial_load_done(&self) -> bool {
        self.initial_load_done
    }

    pub fn highlighted_item(&self) -> Option<&K> {
        self.highlight.as_ref().map(|h| &h.key)
    }

    pub fn total_extent(&self) -> u64 {
        self.cache.total_extent()
    }

    pub fn max_scroll_offset(&self) -> u64 {
        self.cache
            .total_extent()
            .saturating_sub(self.options.viewport_height as u64)
    }

    pub fn clamp_scroll_offset(&self, offset: u64) -> u64 {
        offset.min(self.max_scroll_offset())
    }

    pub fn set_viewport_height(&mut self, viewport_height: u32) {
        if self.options.viewport_height == viewport_height {
            return;
        }
        self.options.viewport_height = viewport_height;
        self.notify();
    }

    pub fn set_load_more_top(&mut self, f: Option<impl Fn() + Send + Sync + 'static>) {
        self.options.load_more_top = f.map(|f| Arc::new(f) as _);
    }

    pub fn set_load_more_bottom(&mut self, f: Option<impl Fn() + Send + Sync + 'static>) {
        self.options.load_more_bottom = f.map(|f| Arc::new(f) as _);
    }

    pub fn set_on_change(
        &mut self,
        f: Option<impl Fn(&ListController<K, T>) + Send + Sync + 'static>,
    ) {
        self.options.on_change = f.map(|f| Arc::new(f) as _);
        self.notify();
    }

    /// Replaces the whole dataset and rebuilds positioning from scratch, every
    /// item at the configured default height.
    ///
    /// This is the initialization step: the programmatic scroll/insert/remove
    /// API refuses to run before the first call.
    ///
    /// Returns `false` when the dataset was invalid (duplicate identity); the
    /// engine then proceeds with an empty list.
    pub fn update_dataset(&mut self, entries: impl IntoIterator<Item = (K, T)>) -> bool {
        let valid = self.store.replace_all(entries);

        self.cache.clear();
        let default = self.options.default_height;
        let mut offset = 0u64;
        for (index, entry) in self.store.iter().enumerate() {
            self.cache.set(
                entry.key.clone(),
                PositionRecord {
                    index,
                    height: default,
                    offset,
                    measured: false,
                },
            );
            offset = offset.saturating_add(default as u64);
        }

        self.initialized = true;
        self.measured_count = 0;
        self.scroll_back_armed = false;
        self.anchor = None;
        self.highlight = None;
        self.phase = Phase::Idle;
        self.top_load_armed = true;
        self.bottom_load_armed = true;
        self.first_visible = self.cache.index_at_offset(self.scroll_offset).unwrap_or(0);

        if self.options.start_at_bottom && !self.store.is_empty() {
            // Wait until the items are measured, then jump to the end; the jump
            // would land wrong while extents are still estimates.
            self.initial_load_done = false;
        } else {
            self.initial_load_done = true;
            // The initial offset sits at 0, below the top threshold; one scroll
            // cycle of suppression avoids a spurious load.
            self.suppress_top_once = true;
        }

        fdebug!(
            len = self.store.len(),
            valid,
            start_at_bottom = self.options.start_at_bottom,
            "update_dataset"
        );
        self.notify();
        valid
    }

    /// Inserts one item, positioned at the default height until measured.
    ///
    /// A prepend (insert at or before the first visible item) while anchoring is
    /// armed owes the host a position-restoring scroll command on the next
    /// render pass.
    pub fn insert_item(&mut self, index: usize, key: K, item: T) -> bool {
        self.ensure_initialized("insert_item");
        let prepend = index <= self.first_visible;
        let displaced = !self.cache.is_empty();

        if !self.store.insert(index, key.clone(), item) {
            return false;
        }

        // The scroll-back path has no load-time anchor; capture one against the
        // pre-insert layout.
        if prepend && self.anchor.is_none() && self.scroll_back_armed {
            self.anchor = capture_anchor(&self.cache, self.scroll_offset);
        }
        self.cache.insert(index, key, self.options.default_height);

        if prepend {
            if displaced {
                self.first_visible += 1;
            }
            let armed = self.phase == Phase::LoadingTop || self.scroll_back_armed;
            if armed && self.anchor.is_some() {
                self.phase = Phase::ScrollAnchoring;
            }
        }

        self.notify();
        true
    }

    /// Removes one item by identity. Unknown identities are logged no-ops.
    pub fn remove_item(&mut self, key: &K) -> bool {
        self.ensure_initialized("remove_item");
        let Some(record) = self.cache.get(key) else {
            fwarn!("remove_item: unknown identity");
            return false;
        };
        let index = record.index;
        let was_measured = record.measured;

        let removed = self.store.remove(index, 1);
        debug_assert_eq!(removed, 1, "store and cache disagree on index {index}");
        self.cache.remove_entry(key);

        if was_measured {
            self.measured_count = self.measured_count.saturating_sub(1);
        }
        if index < self.first_visible {
            self.first_visible -= 1;
        }
        if self.highlight.as_ref().is_some_and(|h| &h.key == key) {
            self.highlight = None;
        }
        if self.anchor.as_ref().is_some_and(|a| &a.key == key) {
            self.anchor = None;
        }

        self.notify();
        true
    }

    /// A real measured height for a mounted cell.
    ///
    /// Measurements may arrive after the item was removed (the cell collapses
    /// while unmounting); those are logged no-ops.
    pub fn on_item_height(&mut self, key: &K, new_height: u32) {
        let Some(record) = self.cache.get(key) else {
            fwarn!(new_height, "on_item_height: unknown identity");
            return;
        };
        let index = record.index;
        let was_measured = record.measured;
        let old_offset = record.offset;

        let delta = self.cache.set_item_height(key, new_height);
        if !was_measured {
            self.measured_count += 1;
        }

        // An early item changing before the first load completes means content
        // the user scrolled back over is still settling; arm the prepend anchor.
        if !self.initial_load_done && index < self.first_visible {
            self.scroll_back_armed = true;
        }

        // A late measurement above the viewport would visibly shift what the
        // user is looking at; compensate the scroll position by the same delta.
        if self.initial_load_done && delta != 0 && old_offset < self.scroll_offset {
            self.scroll_offset = if delta > 0 {
                self.scroll_offset.saturating_add(delta as u64)
            } else {
                self.scroll_offset.saturating_sub((-delta) as u64)
            };
            self.pending_scroll = Some(self.scroll_offset);
        }

        self.maybe_finish_initial_load();
        self.notify();
    }

    /// Batch entry point for a measurement source's coalescing window. Fires a
    /// single change notification for the whole batch.
    pub fn on_item_heights(&mut self, measurements: impl IntoIterator<Item = (K, u32)>) {
        self.batch_update(|c| {
            for (key, height) in measurements {
                c.on_item_height(&key, height);
            }
        });
    }

    /// A scroll offset reported by the host's scroll container.
    pub fn on_scroll(&mut self, offset: u64, now_ms: u64) {
        ftrace!(offset, now_ms, "on_scroll");
        self.direction = match offset.cmp(&self.scroll_offset) {
            cmp::Ordering::Greater => Some(ScrollDirection::Forward),
            cmp::Ordering::Less => Some(ScrollDirection::Backward),
            cmp::Ordering::Equal => self.direction,
        };
        self.scroll_offset = offset;
        self.is_scrolling = true;
        self.last_scroll_event_ms = Some(now_ms);

        // A scroll event ends the programmatic-scroll settling period.
        if self.phase == Phase::Settling {
            self.phase = Phase::Idle;
            self.highlight = None;
        }

        self.first_visible = self.cache.index_at_offset(offset).unwrap_or(0);
        self.evaluate_load_triggers(offset);
        self.notify();
    }

    /// Advances timers: `is_scrolling` debouncing and highlight expiry.
    pub fn tick(&mut self, now_ms: u64) {
        if self.is_scrolling {
            if let Some(last) = self.last_scroll_event_ms {
                if now_ms.saturating_sub(last) >= self.options.is_scrolling_reset_delay_ms {
                    self.is_scrolling = false;
                    self.direction = None;
                    self.last_scroll_event_ms = None;
                    self.notify();
                }
            }
        }

        if let Some(highlight) = &self.highlight {
            if now_ms >= highlight.expires_at_ms {
                self.highlight = None;
                if self.phase == Phase::Settling {
                    self.phase = Phase::Idle;
                }
                self.notify();
            }
        }
    }

    /// The scroll command owed to the host, if any: an anchor restoration after
    /// a prepend, a programmatic scroll target, or a measurement compensation.
    ///
    /// The host applies the returned offset to its real scroll container and
    /// reports the result back through `on_scroll`.
    pub fn take_pending_scroll(&mut self) -> Option<u64> {
        if self.phase == Phase::ScrollAnchoring {
            self.phase = Phase::Idle;
            self.scroll_back_armed = false;
            match self.anchor.take() {
                Some(anchor) => match apply_anchor(&self.cache, &anchor) {
                    Some(target) => self.pending_scroll = Some(target),
                    None => fwarn!("anchor identity vanished before restore"),
                },
                None => fwarn!("anchoring entered without a captured anchor"),
            }
        }
        self.pending_scroll.take()
    }

    /// Scrolls so the given item sits at the viewport top, with a transient
    /// highlight. Unknown identities are logged no-ops.
    pub fn scroll_to_item(&mut self, key: &K, now_ms: u64) {
        self.ensure_initialized("scroll_to_item");
        let Some(record) = self.cache.get(key) else {
            fwarn!("scroll_to_item: unknown identity");
            return;
        };
        let target = self.clamp_scroll_offset(record.offset);
        self.queue_programmatic_scroll(target, Some(key.clone()), now_ms);
    }

    pub fn scroll_to_top(&mut self, now_ms: u64) {
        self.ensure_initialized("scroll_to_top");
        let key = self.cache.identity_at(0).cloned();
        self.queue_programmatic_scroll(0, key, now_ms);
    }

    pub fn scroll_to_bottom(&mut self, now_ms: u64) {
        self.ensure_initialized("scroll_to_bottom");
        let key = match self.cache.len() {
            0 => None,
            len => self.cache.identity_at(len - 1).cloned(),
        };
        self.queue_programmatic_scroll(self.max_scroll_offset(), key, now_ms);
    }

    /// The index range the rendering surface must keep mounted, or `None` for
    /// an empty list. With `virtualize` off this is simply the whole list.
    pub fn window(&self) -> Option<WindowRange> {
        let count = self.cache.len();
        if count == 0 {
            return None;
        }
        if !self.options.virtualize {
            return Some(WindowRange {
                start_index: 0,
                end_index: count - 1,
            });
        }
        compute_range(
            &self.cache,
            &WindowParams {
                scroll_offset: self.scroll_offset,
                viewport_size: self.options.viewport_height,
                direction: self.direction.unwrap_or(ScrollDirection::Forward),
                overscan: self.options.overscan,
            },
        )
    }

    /// Iterates the mounted cells without allocating. The surface removes items
    /// through [`Self::remove_item`] and reports heights through
    /// [`Self::on_item_height`].
    pub fn for_each_window_item(&self, mut f: impl FnMut(WindowItem<'_, K, T>)) {
        let Some(range) = self.window() else {
            return;
        };
        for index in range.indices() {
            let Some(entry) = self.store.get_at(index) else {
                debug_assert!(false, "store and cache disagree on index {index}");
                continue;
            };
            let Some(record) = self.cache.get(&entry.key) else {
                debug_assert!(false, "store entry at index {index} has no record");
                continue;
            };
            f(WindowItem {
                key: &entry.key,
                index,
                item: &entry.item,
                offset: record.offset,
                height: record.height,
                measured: record.measured,
                highlighted: self.highlight.as_ref().is_some_and(|h| h.key == entry.key),
            });
        }
    }

    /// Batches multiple updates into a single `on_change` notification.
    pub fn batch_update(&mut self, f: impl FnOnce(&mut Self)) {
        let depth = self.notify_depth.get();
        self.notify_depth.set(depth.saturating_add(1));

        f(self);

        let depth = self.notify_depth.get();
        debug_assert!(depth > 0, "notify_depth underflow");
        let next = depth.saturating_sub(1);
        self.notify_depth.set(next);

        if next == 0 && self.notify_pending.replace(false) {
            self.notify_now();
        }
    }

    fn queue_programmatic_scroll(&mut self, target: u64, key: Option<K>, now_ms: u64) {
        self.pending_scroll = Some(target);
        self.highlight = key.map(|key| Highlight {
            key,
            expires_at_ms: now_ms.saturating_add(self.options.highlight_duration_ms),
        });
        self.phase = Phase::Settling;
        self.notify();
    }

    fn evaluate_load_triggers(&mut self, offset: u64) {
        let suppressed = core::mem::replace(&mut self.suppress_top_once, false);

        if offset < self.options.top_threshold {
            if self.initial_load_done
                && self.top_load_armed
                && !suppressed
                && self.phase != Phase::LoadingTop
            {
                self.begin_top_load(offset);
            }
        } else {
            if self.phase == Phase::LoadingTop {
                self.phase = Phase::Idle;
            }
            self.top_load_armed = true;
        }

        let viewport = self.options.viewport_height as u64;
        let extent = self.cache.total_extent();
        let threshold =
            extent.saturating_sub(viewport.saturating_add(self.options.bottom_threshold_gap));
        if extent > viewport && offset >= threshold {
            if self.initial_load_done && self.bottom_load_armed {
                self.bottom_load_armed = false;
                match &self.options.load_more_bottom {
                    Some(load) => load(),
                    None => fwarn!("bottom load triggered with no provider registered"),
                }
            }
        } else {
            self.bottom_load_armed = true;
        }
    }

    fn begin_top_load(&mut self, offset: u64) {
        self.phase = Phase::LoadingTop;
        self.top_load_armed = false;
        self.anchor = capture_anchor(&self.cache, offset);
        fdebug!(offset, "top load triggered");
        match &self.options.load_more_top {
            Some(load) => load(),
            None => fwarn!("top load triggered with no provider registered"),
        }
    }

    fn maybe_finish_initial_load(&mut self) {
        if self.initial_load_done || !self.options.start_at_bottom {
            return;
        }
        let count = self.store.len();
        if count == 0 {
            return;
        }
        if self.measured_count >= count - 1 {
            self.initial_load_done = true;
            self.pending_scroll = Some(self.max_scroll_offset());
            fdebug!(count, "initial load complete, jumping to end");
        }
    }

    fn ensure_initialized(&self, op: &str) {
        assert!(
            self.initialized,
            "ListController::{op} called before the first update_dataset"
        );
    }

    fn notify_now(&self) {
        if let Some(on_change) = &self.options.on_change {
            on_change(self);
        }
    }

    fn notify(&self) {
        if self.notify_depth.get() > 0 {
            self.notify_pending.set(true);
            return;
        }
        self.notify_now();
    }
}

impl<K: IdentityKey + fmt::Debug, T> fmt::Debug for ListController<K, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListController")
            .field("item_count", &self.store.len())
            .field("scroll_offset", &self.scroll_offset)
            .field("total_extent", &self.cache.total_extent())
            .field("phase", &self.phase)
            .field("initial_load_done", &self.initial_load_done)
            .field("measured_count", &self.measured_count)
            .finish_non_exhaustive()
    }
}
