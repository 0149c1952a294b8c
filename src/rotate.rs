//! Quarter-turn rotation of a pixel map through the grid abstraction.
//!
//! # Pipeline
//!
//! The pipeline is a strict one-way flow: a loaded image goes in, a rotated
//! image comes out, and the source is released as soon as its pixels have
//! been transferred. [`OpRotate::apply`] consumes the source to make the
//! flow irreversible at the type level.
//!
//! The operator only ever touches the raster through [`Grid2`], so it runs
//! unchanged against the flat and the blocked layout. The destination is
//! constructed through the same layout kind as the source. The caller picks
//! the traversal order; the order changes how the source is walked (and
//! therefore how the caches behave) but never the resulting image.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use std::time::{Duration, Instant};

use crate::grid::{Grid2, Traversal};
use crate::ppm::{Ppm, Rgb};

/// Rotation angle, restricted to quarter turns.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Rotation {
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Parses a degree count; anything but 0/90/180/270 is rejected.
    pub fn from_degrees(degrees: u32) -> Option<Self> {
        match degrees {
            0 => Some(Rotation::Deg0),
            90 => Some(Rotation::Deg90),
            180 => Some(Rotation::Deg180),
            270 => Some(Rotation::Deg270),
            _ => None,
        }
    }

    /// The angle in degrees.
    pub fn degrees(self) -> u32 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// True for the quarter turns that swap width and height.
    pub fn swaps_dimensions(self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }

    /// Maps a source coordinate to its destination coordinate.
    ///
    /// `width` and `height` are the source dimensions. For 90 and 270 the
    /// destination has swapped dimensions.
    #[inline]
    pub fn destination(self, col: usize, row: usize, width: usize, height: usize) -> (usize, usize) {
        match self {
            Rotation::Deg0 => (col, row),
            Rotation::Deg90 => (height - 1 - row, col),
            Rotation::Deg180 => (width - 1 - col, height - 1 - row),
            Rotation::Deg270 => (row, width - 1 - col),
        }
    }
}

/// Everything the per-element visit needs, threaded through by reference.
struct TransformContext<'a> {
    dest: &'a mut dyn Grid2<Rgb>,
    rotation: Rotation,
    src_width: usize,
    src_height: usize,
}

impl TransformContext<'_> {
    #[inline]
    fn store(&mut self, col: usize, row: usize, px: Rgb) {
        let (dest_col, dest_row) =
            self.rotation
                .destination(col, row, self.src_width, self.src_height);
        *self.dest.at_mut(dest_col, dest_row) = px;
    }
}

/// Rotation operator over a capability-bound pixel map.
#[derive(Copy, Clone, Debug)]
pub struct OpRotate {
    rotation: Rotation,
}

impl OpRotate {
    pub fn new(rotation: Rotation) -> Self {
        Self { rotation }
    }

    /// Destination dimensions for a `width x height` source.
    pub fn output_dimensions(&self, width: usize, height: usize) -> (usize, usize) {
        if self.rotation.swaps_dimensions() {
            (height, width)
        } else {
            (width, height)
        }
    }

    /// Rotates a raster into a freshly constructed grid of the same layout
    /// kind, walking the source in the given order.
    ///
    /// Panics if `order` is a traversal slot the source layout leaves unset;
    /// callers taking the order from configuration must check
    /// [`Grid2::supports`] before any work is done.
    pub fn rotate_grid(&self, src: &dyn Grid2<Rgb>, order: Traversal) -> Box<dyn Grid2<Rgb>> {
        assert!(
            src.supports(order),
            "{:?} layout does not support {} traversal",
            src.layout(),
            order.label()
        );

        let (src_width, src_height) = (src.width(), src.height());
        let (dest_width, dest_height) = self.output_dimensions(src_width, src_height);
        let mut dest = src.empty_like(dest_width, dest_height, Rgb::default());

        let mut ctx = TransformContext {
            dest: dest.as_mut(),
            rotation: self.rotation,
            src_width,
            src_height,
        };
        src.map(order, &mut |col, row, px| ctx.store(col, row, *px));

        dest
    }

    /// Runs the full pipeline step: transform, release the source, hand the
    /// rotated image forward.
    pub fn apply(&self, src: Ppm, order: Traversal) -> Ppm {
        self.apply_timed(src, order).0
    }

    /// Like [`apply`](OpRotate::apply) but also reports how long the
    /// traversal-plus-transfer took, for the timing log.
    pub fn apply_timed(&self, src: Ppm, order: Traversal) -> (Ppm, Duration) {
        let maxval = src.maxval();
        let start = Instant::now();
        let dest = self.rotate_grid(src.pixels.as_ref(), order);
        let elapsed = start.elapsed();
        drop(src);
        (Ppm::from_grid(dest, maxval), elapsed)
    }
}

/// Appends one human-readable timing block to the log file.
///
/// The file is created if missing, opened for append, and closed before
/// returning. A failure here never corrupts the pipeline output; the caller
/// decides whether to surface it.
pub fn append_timing_summary(
    path: &Path,
    elapsed: Duration,
    pixel_count: usize,
    order: Traversal,
    rotation: Rotation,
) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let total_ms = elapsed.as_secs_f64() * 1000.0;
    let per_pixel_ms = total_ms / pixel_count.max(1) as f64;
    writeln!(file, "Overall time: {total_ms:.6} ms")?;
    writeln!(file, "Time per pixel: {per_pixel_ms:.9} ms")?;
    writeln!(file, "Traversal: {}", order.label())?;
    writeln!(file, "Rotation: {} degrees", rotation.degrees())?;
    writeln!(file, "----------------------------------------")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_degrees_accepts_quarter_turns_only() {
        assert_eq!(Rotation::from_degrees(0), Some(Rotation::Deg0));
        assert_eq!(Rotation::from_degrees(90), Some(Rotation::Deg90));
        assert_eq!(Rotation::from_degrees(180), Some(Rotation::Deg180));
        assert_eq!(Rotation::from_degrees(270), Some(Rotation::Deg270));
        assert_eq!(Rotation::from_degrees(45), None);
        assert_eq!(Rotation::from_degrees(360), None);
    }

    #[test]
    fn destination_mapping_per_angle() {
        // 2 wide, 3 tall source; corner (0, 0) and an interior cell.
        assert_eq!(Rotation::Deg0.destination(0, 0, 2, 3), (0, 0));
        assert_eq!(Rotation::Deg90.destination(0, 0, 2, 3), (2, 0));
        assert_eq!(Rotation::Deg180.destination(0, 0, 2, 3), (1, 2));
        assert_eq!(Rotation::Deg270.destination(0, 0, 2, 3), (0, 1));
        assert_eq!(Rotation::Deg90.destination(1, 2, 2, 3), (0, 1));
        assert_eq!(Rotation::Deg270.destination(1, 2, 2, 3), (2, 0));
    }

    #[test]
    fn output_dimensions_swap_on_odd_quarter_turns() {
        assert_eq!(OpRotate::new(Rotation::Deg0).output_dimensions(4, 7), (4, 7));
        assert_eq!(OpRotate::new(Rotation::Deg90).output_dimensions(4, 7), (7, 4));
        assert_eq!(OpRotate::new(Rotation::Deg180).output_dimensions(4, 7), (4, 7));
        assert_eq!(OpRotate::new(Rotation::Deg270).output_dimensions(4, 7), (7, 4));
    }
}
