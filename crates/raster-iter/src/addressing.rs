//! Element addressing strategies.
//!
//! An [`Addressing`] turns the cursor position and the origin of the bound
//! tile into a `(bank, index)` pair for each band. Cursors call
//! [`rebase`](Addressing::rebase) once per tile crossing and the cheap
//! [`step_x`](Addressing::step_x)/[`step_y`](Addressing::step_y) on every
//! single step.
//!
//! # Strategies
//!
//! - [`GenericAddressing`] - Any layout; recomputes the local coordinate
//!   through [`ElementLayout::element_index`] on every access
//! - [`InterleavedAddressing`] - Component-interleaved layouts only; keeps a
//!   flat offset in global coordinates and a band-offset table corrected
//!   for the bound tile's origin
//!
//! For the interleaved strategy:
//!
//! ```text
//! offset      = x * pixel_stride + y * scanline_stride       (global)
//! adjusted[b] = band_offset[b] - (ox * pixel_stride + oy * scanline_stride)
//! index(b)    = offset + adjusted[b]
//! ```
//!
//! Moving to a tile with origin `(ox', oy')` subtracts
//! `(ox' - ox) * pixel_stride + (oy' - oy) * scanline_stride` from each
//! adjusted entry; the offset itself never needs recomputing.

use raster_core::{ElementLayout, Error, Result};

/// Maps a cursor position to buffer indices.
pub trait Addressing: Sized {
    /// Prepares addressing for `layout`.
    ///
    /// # Errors
    ///
    /// [`Error::LayoutMismatch`] if the strategy cannot serve the layout.
    fn new(layout: &ElementLayout) -> Result<Self>;

    /// Switches to a tile whose local `(0, 0)` is global `(origin_x, origin_y)`.
    fn rebase(&mut self, origin_x: i32, origin_y: i32);

    /// Sets the absolute global position.
    fn locate(&mut self, x: i32, y: i32);

    /// Moves the position horizontally.
    fn step_x(&mut self, dx: i32);

    /// Moves the position vertically.
    fn step_y(&mut self, dy: i32);

    /// Bank and element index of `band` at the current position.
    fn index(&self, band: usize) -> (usize, usize);
}

/// Layout-agnostic addressing.
#[derive(Debug, Clone)]
pub struct GenericAddressing {
    layout: ElementLayout,
    x: i32,
    y: i32,
    origin_x: i32,
    origin_y: i32,
}

impl Addressing for GenericAddressing {
    fn new(layout: &ElementLayout) -> Result<Self> {
        Ok(Self {
            layout: layout.clone(),
            x: 0,
            y: 0,
            origin_x: 0,
            origin_y: 0,
        })
    }

    #[inline]
    fn rebase(&mut self, origin_x: i32, origin_y: i32) {
        self.origin_x = origin_x;
        self.origin_y = origin_y;
    }

    #[inline]
    fn locate(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
    }

    #[inline]
    fn step_x(&mut self, dx: i32) {
        self.x += dx;
    }

    #[inline]
    fn step_y(&mut self, dy: i32) {
        self.y += dy;
    }

    #[inline]
    fn index(&self, band: usize) -> (usize, usize) {
        debug_assert!(self.x >= self.origin_x && self.y >= self.origin_y);
        self.layout.element_index(
            (self.x - self.origin_x) as usize,
            (self.y - self.origin_y) as usize,
            band,
        )
    }
}

/// Flat-offset addressing for component-interleaved layouts.
#[derive(Debug, Clone)]
pub struct InterleavedAddressing {
    pixel_stride: isize,
    scanline_stride: isize,
    offset: isize,
    origin_x: i32,
    origin_y: i32,
    adjusted: Vec<isize>,
}

impl InterleavedAddressing {
    /// Current flat offset (global coordinates, before band adjustment).
    #[inline]
    pub fn offset(&self) -> isize {
        self.offset
    }
}

impl Addressing for InterleavedAddressing {
    fn new(layout: &ElementLayout) -> Result<Self> {
        if !layout.is_component_interleaved() {
            return Err(Error::layout_mismatch(format!(
                "{}-band layout with banks {:?} and offsets {:?} is not component-interleaved",
                layout.num_bands(),
                layout.bank_indices(),
                layout.band_offsets()
            )));
        }
        Ok(Self {
            pixel_stride: layout.pixel_stride() as isize,
            scanline_stride: layout.scanline_stride() as isize,
            offset: 0,
            origin_x: 0,
            origin_y: 0,
            adjusted: layout.band_offsets().iter().map(|&o| o as isize).collect(),
        })
    }

    #[inline]
    fn rebase(&mut self, origin_x: i32, origin_y: i32) {
        let delta = (origin_x - self.origin_x) as isize * self.pixel_stride
            + (origin_y - self.origin_y) as isize * self.scanline_stride;
        if delta != 0 {
            for adj in &mut self.adjusted {
                *adj -= delta;
            }
        }
        self.origin_x = origin_x;
        self.origin_y = origin_y;
    }

    #[inline]
    fn locate(&mut self, x: i32, y: i32) {
        self.offset = x as isize * self.pixel_stride + y as isize * self.scanline_stride;
    }

    #[inline]
    fn step_x(&mut self, dx: i32) {
        self.offset += dx as isize * self.pixel_stride;
    }

    #[inline]
    fn step_y(&mut self, dy: i32) {
        self.offset += dy as isize * self.scanline_stride;
    }

    #[inline]
    fn index(&self, band: usize) -> (usize, usize) {
        let idx = self.offset + self.adjusted[band];
        debug_assert!(idx >= 0, "position left of or above the bound tile");
        (0, idx as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use raster_core::ElementType;

    #[test]
    fn test_interleaved_rejects_banded() {
        let layout = ElementLayout::banded(ElementType::U8, 3, 4).unwrap();
        let err = InterleavedAddressing::new(&layout).unwrap_err();
        assert!(err.is_layout_error());
        assert!(GenericAddressing::new(&layout).is_ok());
    }

    #[test]
    fn test_strategies_agree() {
        let layout = ElementLayout::interleaved(ElementType::F32, 3, 4).unwrap();
        let mut generic = GenericAddressing::new(&layout).unwrap();
        let mut flat = InterleavedAddressing::new(&layout).unwrap();

        for (ox, oy) in [(0, 0), (4, 0), (-4, 8), (4, 4)] {
            generic.rebase(ox, oy);
            flat.rebase(ox, oy);
            generic.locate(ox + 1, oy + 2);
            flat.locate(ox + 1, oy + 2);
            for b in 0..3 {
                assert_eq!(generic.index(b), flat.index(b), "origin ({ox},{oy}) band {b}");
            }
            generic.step_x(2);
            flat.step_x(2);
            generic.step_y(1);
            flat.step_y(1);
            assert_eq!(generic.index(2), flat.index(2));
        }
    }

    #[test]
    fn test_rebase_keeps_offset() {
        let layout = ElementLayout::interleaved(ElementType::U8, 2, 2).unwrap();
        let mut flat = InterleavedAddressing::new(&layout).unwrap();
        flat.locate(3, 1);
        let before = flat.offset();
        flat.rebase(2, 0);
        assert_eq!(flat.offset(), before);
        // local (1, 1) in a 2-wide, 2-band tile
        assert_eq!(flat.index(1), (0, 2 + 4 + 1));
    }
}
