//! A headless windowing engine for long lists with variably-sized items.
//!
//! For the host-facing layer (data store, scroll controller, anchoring), see the
//! `flowlist-adapter` crate.
//!
//! This crate focuses on the core bookkeeping needed to render massive lists at
//! interactive frame rates: an identity-keyed position cache, incremental offset
//! reflow after height changes and inserts/deletes, fast offset → index lookup,
//! and overscanned mount-range computation.
//!
//! It is UI-agnostic. A TUI/GUI layer is expected to provide:
//! - viewport size and scroll offsets
//! - a default height estimate and (eventually) real per-item measurements
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod cache;
mod key;
mod reflow;
mod types;
mod window;

#[cfg(test)]
mod tests;

pub use cache::PositionCache;
pub use key::IdentityKey;
pub use types::{PositionRecord, ScrollDirection, WindowRange};
pub use window::{WindowParams, compute_range};
