//! Data store and scroll controller for the `flowlist` crate.
//!
//! The `flowlist` crate is UI-agnostic and focuses on the core math and state.
//! This crate provides the host-facing layer a rendering surface drives:
//!
//! - An ordered, identity-keyed [`DataStore`] with synchronous change events
//! - A [`ListController`] orchestrating scroll handling, load-more hysteresis,
//!   scroll anchoring on prepend, and programmatic scrolling
//! - Scroll-anchor capture/apply helpers (chat/timeline prepend without jumps)
//!
//! This crate is intentionally framework-agnostic (no ratatui/egui bindings).
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod anchor;
mod controller;
mod options;
mod store;


pub use anchor::{ScrollAnchor, apply_anchor, capture_anchor};
pub use controller::{ListController, WindowItem};
pub use options::{ControllerOptions, LoadMoreCallback, OnChangeCallback};
pub use store::{DataStore, StoreEntry, StoreEvent, StoreListener};
