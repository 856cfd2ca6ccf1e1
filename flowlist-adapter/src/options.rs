use alloc::sync::Arc;
use core::fmt;

use crate::controller::ListController;

/// A load-more slot. Fire-and-forget: the controller never awaits it; the
/// provider is expected to eventually call back into the controller's
/// `insert_item`/`update_dataset`.
pub type LoadMoreCallback = Arc<dyn Fn() + Send + Sync>;

/// Fired after any observable controller state change. Compound mutations are
/// coalesced into a single call.
pub type OnChangeCallback<K, T> = Arc<dyn Fn(&ListController<K, T>) + Send + Sync>;

/// Configuration for [`ListController`].
///
/// Cheap to clone: callbacks are stored in `Arc`s.
pub struct ControllerOptions<K, T> {
    /// Height assumed for an item until its first real measurement. Nonzero.
    pub default_height: u32,
    pub viewport_height: u32,
    /// Extra items mounted beyond the visible viewport.
    pub overscan: usize,
    /// Defer "initial load done" until items are measured, then jump to the end.
    pub start_at_bottom: bool,
    /// When `false`, the window spans the whole list. A configuration, not a
    /// separate algorithm.
    pub virtualize: bool,
    /// Scroll offsets below this trigger a top load.
    pub top_threshold: u64,
    /// A bottom load triggers within this distance of the very end
    /// (`total_extent - viewport_height - bottom_threshold_gap`).
    pub bottom_threshold_gap: u64,
    /// How long a programmatic scroll target stays highlighted.
    pub highlight_duration_ms: u64,
    /// Debounced fallback duration for resetting `is_scrolling`.
    pub is_scrolling_reset_delay_ms: u64,
    pub load_more_top: Option<LoadMoreCallback>,
    pub load_more_bottom: Option<LoadMoreCallback>,
    pub on_change: Option<OnChangeCallback<K, T>>,
}

impl<K, T> ControllerOptions<K, T> {
    pub fn new(default_height: u32) -> Self {
        assert!(default_height > 0, "default_height must be nonzero");
        Self {
            default_height,
            viewport_height: 0,
            overscan: 3,
            start_at_bottom: false,
            virtualize: true,
            top_threshold: 50,
            bottom_threshold_gap: 2,
            highlight_duration_ms: 1500,
            is_scrolling_reset_delay_ms: 150,
            load_more_top: None,
            load_more_bottom: None,
            on_change: None,
        }
    }

    pub fn with_viewport_height(mut self, viewport_height: u32) -> Self {
        self.viewport_height = viewport_height;
        self
    }

    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    pub fn with_start_at_bottom(mut self, start_at_bottom: bool) -> Self {
        self.start_at_bottom = start_at_bottom;
        self
    }

    pub fn with_virtualize(mut self, virtualize: bool) -> Self {
        self.virtualize = virtualize;
        self
    }

    pub fn with_top_threshold(mut self, top_threshold: u64) -> Self {
        self.top_threshold = top_threshold;
        self
    }

    pub fn with_bottom_threshold_gap(mut self, bottom_threshold_gap: u64) -> Self {
        self.bottom_threshold_gap = bottom_threshold_gap;
        self
    }

    pub fn with_highlight_duration_ms(mut self, highlight_duration_ms: u64) -> Self {
        self.highlight_duration_ms = highlight_duration_ms;
        self
    }

    pub fn with_is_scrolling_reset_delay_ms(mut self, delay_ms: u64) -> Self {
        self.is_scrolling_reset_delay_ms = delay_ms;
        self
    }

    pub fn with_load_more_top(mut self, f: Option<impl Fn() + Send + Sync + 'static>) -> Self {
        self.load_more_top = f.map(|f| Arc::new(f) as _);
        self
    }

    pub fn with_load_more_bottom(mut self, f: Option<impl Fn() + Send + Sync + 'static>) -> Self {
        self.load_more_bottom = f.map(|f| Arc::new(f) as _);
        self
    }

    pub fn with_on_change(
        mut self,
        f: Option<impl Fn(&ListController<K, T>) + Send + Sync + 'static>,
    ) -> Self {
        self.on_change = f.map(|f| Arc::new(f) as _);
        self
    }
}

impl<K, T> Clone for ControllerOptions<K, T> {
    fn clone(&self) -> Self {
        Self {
            default_height: self.default_height,
            viewport_height: self.viewport_height,
            overscan: self.overscan,
            start_at_bottom: self.start_at_bottom,
            virtualize: self.virtualize,
            top_threshold: self.top_threshold,
            bottom_threshold_gap: self.bottom_threshold_gap,
            highlight_duration_ms: self.highlight_duration_ms,
            is_scrolling_reset_delay_ms: self.is_scrolling_reset_delay_ms,
            load_more_top: self.load_more_top.clone(),
            load_more_bottom: self.load_more_bottom.clone(),
            on_change: self.on_change.clone(),
        }
    }
}

impl<K, T> fmt::Debug for ControllerOptions<K, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerOptions")
            .field("default_height", &self.default_height)
            .field("viewport_height", &self.viewport_height)
            .field("overscan", &self.overscan)
            .field("start_at_bottom", &self.start_at_bottom)
            .field("virtualize", &self.virtualize)
            .field("top_threshold", &self.top_threshold)
            .field("bottom_threshold_gap", &self.bottom_threshold_gap)
            .field("highlight_duration_ms", &self.highlight_duration_ms)
            .field(
                "is_scrolling_reset_delay_ms",
                &self.is_scrolling_reset_delay_ms,
            )
            .finish_non_exhaustive()
    }
}
