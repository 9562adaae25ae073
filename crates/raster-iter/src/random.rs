//! Random-access cursor.
//!
//! [`RandomCursor`] answers `(x, y, band)` queries in any order. At
//! construction it builds one lookup table per axis mapping every coordinate
//! of the bounds to its tile index, so a query costs two table reads and a
//! comparison with the bound tile; the source is only consulted when the
//! query lands in a different tile.
//!
//! Write cursors bind lazily: no tile is checked out until the first query.

use raster_core::{Axis, Error, Rect, Result, TileGrid, TiledImage, WritableTiledImage};
use tracing::debug;

use crate::addressing::{Addressing, InterleavedAddressing};
use crate::binding::{
    Binding, LeaseSlot, ReadBinding, TileStore, TileView, TypedBinding, TypedWriteBinding, WriteBinding,
};
use crate::scan::resolve_bounds;
use crate::traits::{RandomIter, WritableRandomIter};

/// Random-access cursor over a rectangle of a tiled image.
pub struct RandomCursor<B, A> {
    binding: B,
    addr: A,
    bounds: Rect,
    x_tiles: Vec<i32>,
    y_tiles: Vec<i32>,
    num_bands: usize,
}

impl<'a, S, V, A> RandomCursor<ReadBinding<'a, S, V>, A>
where
    S: TiledImage + ?Sized,
    V: TileView<'a>,
    A: Addressing,
{
    /// Creates a read cursor over `bounds` clipped to the image.
    pub fn new(source: &'a S, bounds: Rect) -> Result<Self> {
        let region = resolve_bounds(source.bounds(), bounds)?;
        let mut addr = A::new(source.layout())?;
        let grid = source.tile_grid();
        let (binding, (ox, oy)) =
            ReadBinding::open(source, grid.x_to_tile_x(region.x), grid.y_to_tile_y(region.y))?;
        addr.rebase(ox, oy);
        Ok(Self::assemble(binding, addr, grid, region))
    }
}

impl<'a, S, St, A> RandomCursor<LeaseSlot<'a, S, St>, A>
where
    S: WritableTiledImage + ?Sized,
    St: TileStore,
    A: Addressing,
{
    /// Creates a write cursor over `bounds` clipped to the image.
    ///
    /// Call [`done`](RandomIter::done) when finished so the last lease is
    /// returned; dropping the cursor releases it too but logs a warning.
    pub fn new(source: &'a mut S, bounds: Rect) -> Result<Self> {
        let region = resolve_bounds(source.bounds(), bounds)?;
        let addr = A::new(source.layout())?;
        let grid = source.tile_grid();
        let binding = LeaseSlot::new(source)?;
        Ok(Self::assemble(binding, addr, grid, region))
    }
}

impl<B: Binding, A: Addressing> RandomCursor<B, A> {
    fn assemble(binding: B, addr: A, grid: TileGrid, region: Rect) -> Self {
        let x_tiles = (region.x..region.right()).map(|x| grid.x_to_tile_x(x)).collect();
        let y_tiles = (region.y..region.bottom()).map(|y| grid.y_to_tile_y(y)).collect();
        let num_bands = binding.layout().num_bands();
        debug!(
            bounds = %region,
            element = %binding.layout().element_type(),
            bands = num_bands,
            "Created random cursor"
        );
        Self {
            binding,
            addr,
            bounds: region,
            x_tiles,
            y_tiles,
            num_bands,
        }
    }

    /// Moves to `(x, y)`, rebinding if it lies in another tile.
    fn seek(&mut self, x: i32, y: i32) -> Result<()> {
        let b = self.bounds;
        if x < b.x || x > b.max_x() {
            return Err(Error::out_of_bounds(Axis::X, x, b.x, b.max_x()));
        }
        if y < b.y || y > b.max_y() {
            return Err(Error::out_of_bounds(Axis::Y, y, b.y, b.max_y()));
        }
        let tile = (
            self.x_tiles[(x - b.x) as usize],
            self.y_tiles[(y - b.y) as usize],
        );
        if self.binding.bound() != Some(tile) {
            let (ox, oy) = self.binding.bind(tile.0, tile.1)?;
            self.addr.rebase(ox, oy);
        }
        self.addr.locate(x, y);
        Ok(())
    }

    #[inline]
    fn index(&self, band: usize) -> (usize, usize) {
        debug_assert!(band < self.num_bands);
        self.addr.index(band)
    }
}

impl<B: Binding, A: Addressing> RandomIter for RandomCursor<B, A> {
    #[inline]
    fn bounds(&self) -> Rect {
        self.bounds
    }

    #[inline]
    fn num_bands(&self) -> usize {
        self.num_bands
    }

    fn sample(&mut self, x: i32, y: i32, band: usize) -> Result<i32> {
        self.seek(x, y)?;
        let (bank, idx) = self.index(band);
        Ok(self.binding.get_i32(bank, idx))
    }

    fn sample_f32(&mut self, x: i32, y: i32, band: usize) -> Result<f32> {
        self.seek(x, y)?;
        let (bank, idx) = self.index(band);
        Ok(self.binding.get_f32(bank, idx))
    }

    fn sample_f64(&mut self, x: i32, y: i32, band: usize) -> Result<f64> {
        self.seek(x, y)?;
        let (bank, idx) = self.index(band);
        Ok(self.binding.get_f64(bank, idx))
    }

    fn pixel(&mut self, x: i32, y: i32, out: &mut [i32]) -> Result<()> {
        self.seek(x, y)?;
        for (band, v) in out.iter_mut().enumerate().take(self.num_bands) {
            let (bank, idx) = self.index(band);
            *v = self.binding.get_i32(bank, idx);
        }
        Ok(())
    }

    fn pixel_f32(&mut self, x: i32, y: i32, out: &mut [f32]) -> Result<()> {
        self.seek(x, y)?;
        for (band, v) in out.iter_mut().enumerate().take(self.num_bands) {
            let (bank, idx) = self.index(band);
            *v = self.binding.get_f32(bank, idx);
        }
        Ok(())
    }

    fn pixel_f64(&mut self, x: i32, y: i32, out: &mut [f64]) -> Result<()> {
        self.seek(x, y)?;
        for (band, v) in out.iter_mut().enumerate().take(self.num_bands) {
            let (bank, idx) = self.index(band);
            *v = self.binding.get_f64(bank, idx);
        }
        Ok(())
    }

    fn done(&mut self) -> Result<()> {
        self.binding.unbind()
    }
}

impl<B: WriteBinding, A: Addressing> WritableRandomIter for RandomCursor<B, A> {
    fn set_sample(&mut self, x: i32, y: i32, band: usize, value: i32) -> Result<()> {
        self.seek(x, y)?;
        let (bank, idx) = self.index(band);
        self.binding.set_i32(bank, idx, value);
        Ok(())
    }

    fn set_sample_f32(&mut self, x: i32, y: i32, band: usize, value: f32) -> Result<()> {
        self.seek(x, y)?;
        let (bank, idx) = self.index(band);
        self.binding.set_f32(bank, idx, value);
        Ok(())
    }

    fn set_sample_f64(&mut self, x: i32, y: i32, band: usize, value: f64) -> Result<()> {
        self.seek(x, y)?;
        let (bank, idx) = self.index(band);
        self.binding.set_f64(bank, idx, value);
        Ok(())
    }

    fn set_pixel(&mut self, x: i32, y: i32, values: &[i32]) -> Result<()> {
        self.seek(x, y)?;
        for (band, &v) in values.iter().enumerate().take(self.num_bands) {
            let (bank, idx) = self.index(band);
            self.binding.set_i32(bank, idx, v);
        }
        Ok(())
    }

    fn set_pixel_f32(&mut self, x: i32, y: i32, values: &[f32]) -> Result<()> {
        self.seek(x, y)?;
        for (band, &v) in values.iter().enumerate().take(self.num_bands) {
            let (bank, idx) = self.index(band);
            self.binding.set_f32(bank, idx, v);
        }
        Ok(())
    }

    fn set_pixel_f64(&mut self, x: i32, y: i32, values: &[f64]) -> Result<()> {
        self.seek(x, y)?;
        for (band, &v) in values.iter().enumerate().take(self.num_bands) {
            let (bank, idx) = self.index(band);
            self.binding.set_f64(bank, idx, v);
        }
        Ok(())
    }
}

impl<B: TypedBinding> RandomCursor<B, InterleavedAddressing> {
    /// Element at `(x, y, band)`, without conversion.
    pub fn elem(&mut self, x: i32, y: i32, band: usize) -> Result<B::Elem> {
        self.seek(x, y)?;
        let (_, idx) = self.index(band);
        Ok(self.binding.elem(idx))
    }
}

impl<B: TypedWriteBinding> RandomCursor<B, InterleavedAddressing> {
    /// Stores an element at `(x, y, band)`, without conversion.
    pub fn set_elem(&mut self, x: i32, y: i32, band: usize, value: B::Elem) -> Result<()> {
        self.seek(x, y)?;
        let (_, idx) = self.index(band);
        self.binding.set_elem(idx, value);
        Ok(())
    }
}
