//! A headless windowed virtualization engine.
//!
//! For two-dimensional collections (rows × columns), see the `virtual-window-grid` crate.
//!
//! Given a scroll offset, a viewport extent, an item count and a per-item size estimate, the
//! engine computes which items must be materialized and where each one starts. Real sizes are
//! reported back as items are laid out; start offsets are then recomputed lazily from the first
//! changed index onward instead of from scratch.
//!
//! It is UI-agnostic. A TUI/GUI layer is expected to provide:
//! - viewport extent and scroll offset on every query
//! - item size estimates and (optionally) measured sizes
//! - (optionally) stable item keys, so measurements survive inserts, removals and reorders
//!
//! ```
//! use virtual_window::{Viewport, Virtualizer, VirtualizerOptions};
//!
//! let mut v = Virtualizer::new(VirtualizerOptions::new(1000, |_| 40).with_overscan(2));
//! let window = v.query(Viewport::new(0, 400));
//! assert_eq!(window.range().as_range(), 0..12);
//!
//! v.report_measurement(5, 80);
//! assert_eq!(v.offset_of(6), Some(280));
//! assert_eq!(v.total_extent(), 40_040);
//! ```
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod key;
mod offset_table;
mod options;
mod range;
mod size_model;
mod types;
mod virtualizer;

#[cfg(test)]
mod tests;

pub use key::StableKey;
pub use options::{DEFAULT_OVERSCAN, VirtualizerOptions};
pub use types::{
    Align, ItemKey, ItemState, MeasureOutcome, Placement, Viewport, VirtualRange, VisibleWindow,
};
pub use virtualizer::Virtualizer;
