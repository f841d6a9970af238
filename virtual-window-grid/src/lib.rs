//! Grid virtualization for the `virtual-window` crate.
//!
//! A grid is virtualized by rows: `count` items in `column_count` columns become
//! `ceil(count / column_count)` rows, and only the row axis is windowed. Every materialized row
//! carries the flat item indexes it holds; laying those out horizontally is left to the caller.
//!
//! ```
//! use virtual_window::Viewport;
//! use virtual_window_grid::{GridOptions, GridVirtualizer};
//!
//! let mut grid = GridVirtualizer::new(GridOptions::uniform(97, 5, 100)).unwrap();
//! assert_eq!(grid.row_count(), 20);
//! assert_eq!(grid.row_items(19), Some(95..97));
//!
//! let window = grid.query(Viewport::new(0, 250));
//! assert_eq!(window.row_range().as_range(), 0..5);
//! assert_eq!(window.item_range(), 0..25);
//! ```
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod error;
mod grid;
mod options;
mod types;


pub use error::GridError;
pub use grid::GridVirtualizer;
pub use options::{DEFAULT_ROW_OVERSCAN, GridOptions};
pub use types::{GridCell, GridRow, GridWindow};
