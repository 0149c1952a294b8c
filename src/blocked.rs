//! Cache-blocked 2D array: a grid of square tiles, each one contiguous.
//!
//! # Memory Layout
//!
//! The array is split into `ceil(width / block_size)` by
//! `ceil(height / block_size)` blocks. Every block owns a linear buffer of
//! `block_size * block_size` cells, so spatially close cells share a block
//! and therefore share cache lines no matter whether the caller walks rows
//! or columns. Edge blocks that stick out past `width` or `height` are
//! allocated at full size; the padding cells exist only to keep the address
//! arithmetic total and are never visited by traversal.
//!
//! Looking up `(col, row)` is a two-level translation:
//!
//! ```text
//! block  = blocks[(row / bs) * grid_width + (col / bs)]
//! offset = bs * (row % bs) + (col % bs)
//! ```

use crate::buffer::{Allocation, ElemBuffer};

/// Byte budget for one block when the block size is chosen automatically.
///
/// 64 KiB lets roughly two blocks sit in a typical L2 cache at once, which is
/// what a source/destination copy needs.
pub const TARGET_BLOCK_BYTES: usize = 64 * 1024;

/// A 2D array backed by a grid of fixed-size square blocks.
///
/// All blocks are allocated eagerly at construction and freed as a unit on
/// drop; no block is ever reallocated or resized.
#[derive(Debug)]
pub struct BlockedArray2<T> {
    width: usize,
    height: usize,
    block_size: usize,
    grid_width: usize,
    grid_height: usize,
    blocks: Vec<ElemBuffer<T>>,
}

impl<T: Copy> BlockedArray2<T> {
    /// Creates a `width x height` array tiled into `block_size`-sided blocks,
    /// every cell set to `fill`.
    pub fn new(width: usize, height: usize, block_size: usize, fill: T) -> Self {
        assert!(width > 0 && height > 0, "array dimensions must be positive");
        assert!(block_size > 0, "block size must be positive");

        let grid_width = width.div_ceil(block_size);
        let grid_height = height.div_ceil(block_size);
        let cells = block_size
            .checked_mul(block_size)
            .expect("block size overflow");

        let mut blocks = Vec::with_capacity(grid_width * grid_height);
        for _ in 0..grid_width * grid_height {
            blocks.push(ElemBuffer::new(cells, fill, Allocation::default()));
        }

        Self {
            width,
            height,
            block_size,
            grid_width,
            grid_height,
            blocks,
        }
    }

    /// Creates the array with an automatically chosen block size.
    ///
    /// See [`auto_block_size`](Self::auto_block_size) for the policy.
    pub fn with_default_block_size(width: usize, height: usize, fill: T) -> Self {
        Self::new(width, height, Self::auto_block_size(width, height), fill)
    }

    /// Picks the largest block size whose cells fit in [`TARGET_BLOCK_BYTES`],
    /// clamped to `1..=max(width, height)`.
    ///
    /// The upper clamp stops a small array from degenerating into one block
    /// far larger than the array itself.
    pub fn auto_block_size(width: usize, height: usize) -> usize {
        let elem_size = std::mem::size_of::<T>();
        assert!(elem_size > 0, "element size must be positive");
        let mut block_size = ((TARGET_BLOCK_BYTES / elem_size) as f64).sqrt() as usize;
        if block_size < 1 {
            block_size = 1;
        }
        block_size.min(width.max(height)).max(1)
    }

    /// Returns the width in cells.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the height in cells.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the block side length in cells.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    #[inline]
    fn translate(&self, col: usize, row: usize) -> (usize, usize) {
        assert!(
            col < self.width && row < self.height,
            "index ({col}, {row}) out of bounds for {}x{} array",
            self.width,
            self.height
        );
        let bs = self.block_size;
        let block = (row / bs) * self.grid_width + (col / bs);
        let offset = bs * (row % bs) + (col % bs);
        (block, offset)
    }

    /// Returns the cell at `(col, row)`.
    #[inline]
    pub fn at(&self, col: usize, row: usize) -> &T {
        let (block, offset) = self.translate(col, row);
        &self.blocks[block][offset]
    }

    /// Returns the cell at `(col, row)` mutably.
    #[inline]
    pub fn at_mut(&mut self, col: usize, row: usize) -> &mut T {
        let (block, offset) = self.translate(col, row);
        &mut self.blocks[block][offset]
    }

    /// Visits every in-bounds cell exactly once, one whole block at a time.
    ///
    /// Blocks are walked row-major over the grid (outer loop over block rows,
    /// inner over block columns) and each block's buffer is walked linearly.
    /// Padding cells in edge blocks are skipped. Callers must not rely on the
    /// block iteration order; only the exactly-once guarantee is contractual.
    pub fn map_block_major(&self, mut visit: impl FnMut(usize, usize, &T)) {
        let bs = self.block_size;
        for block_row in 0..self.grid_height {
            for block_col in 0..self.grid_width {
                let block = &self.blocks[block_row * self.grid_width + block_col];
                for idx in 0..bs * bs {
                    let col = block_col * bs + idx % bs;
                    let row = block_row * bs + idx / bs;
                    if col >= self.width || row >= self.height {
                        continue;
                    }
                    visit(col, row, &block[idx]);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_dimensions_round_up() {
        let arr = BlockedArray2::new(5, 3, 2, 0u8);
        assert_eq!(arr.grid_width, 3);
        assert_eq!(arr.grid_height, 2);
        assert_eq!(arr.blocks.len(), 6);
        // Edge blocks are allocated at full size.
        assert!(arr.blocks.iter().all(|b| b.len() == 4));
    }

    #[test]
    fn translation_addresses_expected_block() {
        let arr = BlockedArray2::new(5, 5, 2, 0u8);
        // (3, 4) lives in block (1, 2) at in-block offset 2*(4%2) + 3%2 = 1.
        assert_eq!(arr.translate(3, 4), (2 * 3 + 1, 1));
    }

    #[test]
    fn writes_land_where_reads_look() {
        let mut arr = BlockedArray2::new(7, 4, 3, 0u32);
        for row in 0..4 {
            for col in 0..7 {
                *arr.at_mut(col, row) = (row * 7 + col) as u32;
            }
        }
        for row in 0..4 {
            for col in 0..7 {
                assert_eq!(*arr.at(col, row), (row * 7 + col) as u32);
            }
        }
    }

    #[test]
    fn block_major_skips_padding() {
        // 3x3 with block size 2: edge blocks carry padding cells.
        let arr = BlockedArray2::new(3, 3, 2, 0u8);
        let mut count = 0;
        arr.map_block_major(|col, row, _| {
            assert!(col < 3 && row < 3);
            count += 1;
        });
        assert_eq!(count, 9);
    }

    #[test]
    fn block_major_exhausts_blocks_one_at_a_time() {
        let arr = BlockedArray2::new(4, 4, 2, 0u8);
        let mut order = Vec::new();
        arr.map_block_major(|col, row, _| order.push((col, row)));
        // First four visits stay inside block (0, 0).
        assert_eq!(&order[..4], &[(0, 0), (1, 0), (0, 1), (1, 1)]);
        // Next block to the right, then the second block row.
        assert_eq!(&order[4..8], &[(2, 0), (3, 0), (2, 1), (3, 1)]);
        assert_eq!(order.len(), 16);
    }

    #[test]
    fn auto_block_size_respects_budget_and_extent() {
        // u8: sqrt(65536 / 1) = 256, clamped by the array extent.
        assert_eq!(BlockedArray2::<u8>::auto_block_size(4096, 4096), 256);
        assert_eq!(BlockedArray2::<u8>::auto_block_size(100, 40), 100);
        // Oversized element: block size bottoms out at 1.
        assert_eq!(BlockedArray2::<[u8; 100_000]>::auto_block_size(8, 8), 1);
    }

    #[test]
    #[should_panic(expected = "block size must be positive")]
    fn zero_block_size_is_rejected() {
        BlockedArray2::new(4, 4, 0, 0u8);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn at_panics_out_of_range() {
        let arr = BlockedArray2::new(4, 4, 2, 0u8);
        arr.at(0, 4);
    }
}
