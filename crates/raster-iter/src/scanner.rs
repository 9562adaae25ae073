//! Sequential and bidirectional scanning cursor.
//!
//! [`Scanner`] combines three parts chosen at compile time:
//!
//! - a [`Binding`] holding the current tile (borrowed for readers, leased
//!   for writers)
//! - an [`Addressing`] strategy turning the position into buffer indices
//! - a direction marker, [`Forward`] or [`Bidirectional`]
//!
//! Navigation updates the [`ScanState`], steps the addressing, and rebinds
//! only when the state reports a different tile than the bound one while
//! the position is inside the bounds. This is the only place a tile is
//! fetched, so a row of single steps inside one tile never touches the
//! source.
//!
//! Concrete cursors are the type aliases in [`fallback`](crate::fallback),
//! [`interleaved`](crate::interleaved) and [`writable`](crate::writable).

use std::marker::PhantomData;

use raster_core::{Rect, Result, TileGrid, TiledImage, WritableTiledImage};
use tracing::debug;

use crate::addressing::{Addressing, InterleavedAddressing};
use crate::binding::{
    Binding, LeaseSlot, ReadBinding, TileStore, TileView, TypedBinding, TypedWriteBinding, WriteBinding,
};
use crate::scan::{resolve_bounds, ScanState};
use crate::traits::{RectIter, RookIter, WritableRectIter};

/// Marker: forward-only scan ([`RectIter`]).
#[derive(Debug, Clone, Copy, Default)]
pub struct Forward;

/// Marker: bidirectional scan ([`RookIter`]).
#[derive(Debug, Clone, Copy, Default)]
pub struct Bidirectional;

#[derive(Debug, Clone, Copy)]
enum Step {
    X(i32),
    Y(i32),
    Locate,
}

/// Scanning cursor over a rectangle of a tiled image.
pub struct Scanner<B, A, D = Forward> {
    binding: B,
    addr: A,
    state: ScanState,
    _dir: PhantomData<D>,
}

impl<'a, S, V, A, D> Scanner<ReadBinding<'a, S, V>, A, D>
where
    S: TiledImage + ?Sized,
    V: TileView<'a>,
    A: Addressing,
{
    /// Creates a read cursor over `bounds` clipped to the image.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidRegion`](raster_core::Error::InvalidRegion) if the
    /// bounds miss the image, layout errors if this cursor kind cannot
    /// serve the source's layout, or the first tile fetch failure.
    pub fn new(source: &'a S, bounds: Rect) -> Result<Self> {
        let region = resolve_bounds(source.bounds(), bounds)?;
        let addr = A::new(source.layout())?;
        let grid = source.tile_grid();
        let (binding, origin) =
            ReadBinding::open(source, grid.x_to_tile_x(region.x), grid.y_to_tile_y(region.y))?;
        Self::assemble(binding, addr, Some(origin), grid, region)
    }
}

impl<'a, S, St, A, D> Scanner<LeaseSlot<'a, S, St>, A, D>
where
    S: WritableTiledImage + ?Sized,
    St: TileStore,
    A: Addressing,
{
    /// Creates a write cursor over `bounds` clipped to the image.
    ///
    /// The first tile is checked out immediately.
    pub fn new(source: &'a mut S, bounds: Rect) -> Result<Self> {
        let region = resolve_bounds(source.bounds(), bounds)?;
        let addr = A::new(source.layout())?;
        let grid = source.tile_grid();
        let binding = LeaseSlot::new(source)?;
        Self::assemble(binding, addr, None, grid, region)
    }
}

impl<B: Binding, A: Addressing, D> Scanner<B, A, D> {
    fn assemble(binding: B, mut addr: A, origin: Option<(i32, i32)>, grid: TileGrid, region: Rect) -> Result<Self> {
        let state = ScanState::new(grid, region, binding.layout().num_bands());
        if let Some((ox, oy)) = origin {
            addr.rebase(ox, oy);
        }
        debug!(
            bounds = %region,
            element = %binding.layout().element_type(),
            bands = state.num_bands(),
            cursor = std::any::type_name::<A>(),
            "Created scanner"
        );
        let mut scanner = Self {
            binding,
            addr,
            state,
            _dir: PhantomData,
        };
        scanner.settle(Step::Locate)?;
        Ok(scanner)
    }

    /// Keeps addressing and binding in line with the state after a move.
    #[inline]
    fn settle(&mut self, step: Step) -> Result<()> {
        match step {
            Step::X(dx) => self.addr.step_x(dx),
            Step::Y(dy) => self.addr.step_y(dy),
            Step::Locate => {
                let (x, y) = self.state.position();
                self.addr.locate(x, y);
            }
        }
        if !self.state.line_in_bounds() {
            return self.binding.unbind();
        }
        let tile = self.state.tile();
        if self.state.pixel_in_bounds() && self.binding.bound() != Some(tile) {
            let (ox, oy) = self.binding.bind(tile.0, tile.1)?;
            self.addr.rebase(ox, oy);
        }
        Ok(())
    }

    #[inline]
    fn index(&self, band: usize) -> (usize, usize) {
        debug_assert!(
            self.state.line_in_bounds() && self.state.pixel_in_bounds(),
            "sample accessed at {:?} outside {}",
            self.state.position(),
            self.state.bounds()
        );
        debug_assert!(band < self.state.num_bands());
        self.addr.index(band)
    }

    /// Tile index the position belongs to.
    pub fn tile(&self) -> (i32, i32) {
        self.state.tile()
    }
}

impl<B: Binding, A: Addressing, D> RectIter for Scanner<B, A, D> {
    #[inline]
    fn bounds(&self) -> Rect {
        self.state.bounds()
    }

    #[inline]
    fn num_bands(&self) -> usize {
        self.state.num_bands()
    }

    #[inline]
    fn position(&self) -> (i32, i32) {
        self.state.position()
    }

    #[inline]
    fn band(&self) -> usize {
        self.state.band()
    }

    fn start_lines(&mut self) -> Result<()> {
        self.state.start_lines();
        self.settle(Step::Locate)
    }

    #[inline]
    fn next_line(&mut self) -> Result<()> {
        self.state.next_line();
        self.settle(Step::Y(1))
    }

    fn jump_lines(&mut self, n: i32) -> Result<()> {
        self.state.jump_lines(n)?;
        self.settle(Step::Y(n))
    }

    #[inline]
    fn finished_lines(&self) -> bool {
        self.state.finished_lines()
    }

    fn start_pixels(&mut self) -> Result<()> {
        self.state.start_pixels();
        self.settle(Step::Locate)
    }

    #[inline]
    fn next_pixel(&mut self) -> Result<()> {
        self.state.next_pixel();
        self.settle(Step::X(1))
    }

    fn jump_pixels(&mut self, n: i32) -> Result<()> {
        self.state.jump_pixels(n)?;
        self.settle(Step::X(n))
    }

    #[inline]
    fn finished_pixels(&self) -> bool {
        self.state.finished_pixels()
    }

    #[inline]
    fn start_bands(&mut self) {
        self.state.start_bands();
    }

    #[inline]
    fn next_band(&mut self) {
        self.state.next_band();
    }

    #[inline]
    fn finished_bands(&self) -> bool {
        self.state.finished_bands()
    }

    #[inline]
    fn sample_band(&self, band: usize) -> i32 {
        let (bank, idx) = self.index(band);
        self.binding.get_i32(bank, idx)
    }

    #[inline]
    fn sample_band_f32(&self, band: usize) -> f32 {
        let (bank, idx) = self.index(band);
        self.binding.get_f32(bank, idx)
    }

    #[inline]
    fn sample_band_f64(&self, band: usize) -> f64 {
        let (bank, idx) = self.index(band);
        self.binding.get_f64(bank, idx)
    }
}

impl<B: Binding, A: Addressing> RookIter for Scanner<B, A, Bidirectional> {
    fn end_lines(&mut self) -> Result<()> {
        self.state.end_lines();
        self.settle(Step::Locate)
    }

    #[inline]
    fn prev_line(&mut self) -> Result<()> {
        self.state.prev_line();
        self.settle(Step::Y(-1))
    }

    #[inline]
    fn finished_lines_top(&self) -> bool {
        self.state.finished_lines_top()
    }

    fn end_pixels(&mut self) -> Result<()> {
        self.state.end_pixels();
        self.settle(Step::Locate)
    }

    #[inline]
    fn prev_pixel(&mut self) -> Result<()> {
        self.state.prev_pixel();
        self.settle(Step::X(-1))
    }

    #[inline]
    fn finished_pixels_left(&self) -> bool {
        self.state.finished_pixels_left()
    }

    #[inline]
    fn end_bands(&mut self) {
        self.state.end_bands();
    }

    #[inline]
    fn prev_band(&mut self) {
        self.state.prev_band();
    }

    #[inline]
    fn finished_bands_top(&self) -> bool {
        self.state.finished_bands_top()
    }
}

impl<B: WriteBinding, A: Addressing, D> WritableRectIter for Scanner<B, A, D> {
    #[inline]
    fn set_sample_band(&mut self, band: usize, value: i32) {
        let (bank, idx) = self.index(band);
        self.binding.set_i32(bank, idx, value);
    }

    #[inline]
    fn set_sample_band_f32(&mut self, band: usize, value: f32) {
        let (bank, idx) = self.index(band);
        self.binding.set_f32(bank, idx, value);
    }

    #[inline]
    fn set_sample_band_f64(&mut self, band: usize, value: f64) {
        let (bank, idx) = self.index(band);
        self.binding.set_f64(bank, idx, value);
    }

    fn done(&mut self) -> Result<()> {
        self.binding.unbind()
    }
}

impl<B: TypedBinding, D> Scanner<B, InterleavedAddressing, D> {
    /// Element of the current band, without conversion.
    #[inline]
    pub fn elem(&self) -> B::Elem {
        self.elem_band(self.state.band())
    }

    /// Element of `band` at the current pixel, without conversion.
    #[inline]
    pub fn elem_band(&self, band: usize) -> B::Elem {
        let (_, idx) = self.index(band);
        self.binding.elem(idx)
    }
}

impl<B: TypedWriteBinding, D> Scanner<B, InterleavedAddressing, D> {
    /// Stores an element in the current band, without conversion.
    #[inline]
    pub fn set_elem(&mut self, value: B::Elem) {
        let band = self.state.band();
        self.set_elem_band(band, value);
    }

    /// Stores an element in `band` of the current pixel, without conversion.
    #[inline]
    pub fn set_elem_band(&mut self, band: usize, value: B::Elem) {
        let (_, idx) = self.index(band);
        self.binding.set_elem(idx, value);
    }
}
