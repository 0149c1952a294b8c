//! Swappable 2D-array layouts with a PPM rotation tool built on top.
//!
//! # Two-Layout Design
//!
//! - **Flat** ([`Array2`]): one contiguous row-major buffer. Fast for
//!   row-wise walks, strided (and cache-hostile) for column-wise walks.
//! - **Blocked** ([`BlockedArray2`]): a grid of square cache-sized tiles,
//!   each tile contiguous. Spatially close cells share a tile, so locality
//!   holds in both axes at the cost of a two-level address translation.
//!
//! Client code is written once against the [`Grid2`] trait and bound to
//! either layout at run time via [`Layout`]. Each layout fills in the
//! traversal slots it supports (row/col-major for flat, block-major for
//! blocked) and designates a default; callers check [`Grid2::supports`]
//! before requesting a specific order.
//!
//! The [`OpRotate`] pipeline demonstrates the point of the abstraction: the
//! same rotation code runs against both layouts and any supported traversal
//! order, with identical results and very different cache behavior.
//!
//! # Example
//!
//! ```
//! use rusty_grids::{Grid2, Layout, Traversal};
//!
//! let mut grid = Layout::Blocked.new_grid(64, 48, 0u32);
//! *grid.at_mut(10, 20) = 7;
//! assert_eq!(*grid.at(10, 20), 7);
//!
//! assert!(grid.supports(Traversal::BlockMajor));
//! assert!(!grid.supports(Traversal::RowMajor));
//!
//! let mut count = 0;
//! grid.map_default(&mut |_col, _row, _cell| count += 1);
//! assert_eq!(count, 64 * 48);
//! ```

#[doc(hidden)]
pub mod bench_utils;

mod array2;
mod blocked;
mod buffer;
mod grid;
mod ppm;
mod rotate;

pub use crate::array2::Array2;
pub use crate::blocked::{BlockedArray2, TARGET_BLOCK_BYTES};
pub use crate::grid::{Grid2, Layout, Traversal};
pub use crate::ppm::{Ppm, PpmError, Rgb};
pub use crate::rotate::{OpRotate, Rotation, append_timing_summary};
