//! Memory-backed tiled image.
//!
//! [`TiledRaster`] implements [`TiledImage`] and [`WritableTiledImage`] over
//! tiles held in memory. Tiles are created lazily on first touch, either
//! zero-filled or by a user-supplied loader (standing in for a decoder), and
//! write leases are tracked so that unbalanced checkouts can be detected.
//!
//! # Example
//!
//! ```rust
//! use raster_core::{ElementType, Rect, TiledImage, TiledRaster};
//!
//! let mut raster = TiledRaster::builder(Rect::from_size(4, 4))
//!     .tile_size(2, 2)
//!     .bands(3)
//!     .element_type(ElementType::U8)
//!     .build()
//!     .unwrap();
//!
//! raster.fill_tile(0, 0, &[10.0, 20.0, 30.0]).unwrap();
//! assert_eq!(raster.sample_f64(1, 1, 2).unwrap(), 30.0);
//! assert_eq!(raster.tile_grid().x_to_tile_x(3), 1);
//! ```
//!
//! # Thread Safety
//!
//! `TiledRaster` is `Send + Sync`: lazy creation goes through [`OnceLock`]
//! and the request counters are atomic, so shared readers on several threads
//! are fine. Checkout and release need `&mut self`.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

use tracing::{debug, trace};

use crate::format::ElementType;
use crate::grid::TileGrid;
use crate::layout::ElementLayout;
use crate::rect::Rect;
use crate::source::{TiledImage, WritableTiledImage};
use crate::tile::Tile;
use crate::{Error, ReleaseError, Result};

/// Default tile edge length used by [`TiledRasterBuilder`].
pub const DEFAULT_TILE_SIZE: u32 = 64;

/// Produces the tile at a tile index.
pub type TileLoader = Box<dyn Fn(i32, i32) -> Result<Tile> + Send + Sync>;

/// Access counters of a [`TiledRaster`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TileStats {
    /// Calls to [`TiledImage::tile`]
    pub requests: usize,
    /// Tiles created (zero-filled or loaded)
    pub loads: usize,
    /// Successful write checkouts
    pub checkouts: usize,
    /// Successful releases
    pub releases: usize,
}

impl TileStats {
    /// Checkouts not yet released.
    #[inline]
    pub fn outstanding(&self) -> usize {
        self.checkouts - self.releases
    }
}

/// In-memory tiled raster.
pub struct TiledRaster {
    bounds: Rect,
    grid: TileGrid,
    layout: ElementLayout,
    // top-left tile index and tile counts of the bounds
    min_tx: i32,
    min_ty: i32,
    cols: usize,
    rows: usize,
    padding: (u32, u32),
    slots: Vec<OnceLock<Tile>>,
    leased: Vec<bool>,
    loader: Option<TileLoader>,
    requests: AtomicUsize,
    loads: AtomicUsize,
    checkouts: usize,
    releases: usize,
}

impl fmt::Debug for TiledRaster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TiledRaster")
            .field("bounds", &self.bounds)
            .field("grid", &self.grid)
            .field("layout", &self.layout)
            .field("tiles", &(self.cols, self.rows))
            .field("loader", &self.loader.is_some())
            .field("stats", &self.stats())
            .finish()
    }
}

impl TiledRaster {
    /// Creates a zero-filled raster.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidDimensions`] for empty bounds,
    /// [`Error::LayoutMismatch`] if the scanline stride is too small for
    /// the tile width.
    pub fn new(bounds: Rect, grid: TileGrid, layout: ElementLayout) -> Result<Self> {
        Self::with_padding(bounds, grid, layout, (0, 0))
    }

    /// Starts a [`TiledRasterBuilder`].
    pub fn builder(bounds: Rect) -> TiledRasterBuilder {
        TiledRasterBuilder::new(bounds)
    }

    fn with_padding(bounds: Rect, grid: TileGrid, layout: ElementLayout, padding: (u32, u32)) -> Result<Self> {
        if bounds.is_empty() {
            return Err(Error::invalid_dimensions(bounds.width, bounds.height, "empty image bounds"));
        }
        let row_width = grid.tile_width + padding.0;
        let max_offset = layout.band_offsets().iter().copied().max().unwrap_or(0);
        let row_len = (row_width as usize - 1) * layout.pixel_stride() + max_offset + 1;
        if grid.tile_height + padding.1 > 1 && layout.scanline_stride() < row_len {
            return Err(Error::layout_mismatch(format!(
                "scanline stride {} overlaps rows of {} elements",
                layout.scanline_stride(),
                row_len
            )));
        }

        let ((min_tx, max_tx), (min_ty, max_ty)) = grid.tile_span(&bounds);
        let cols = (max_tx - min_tx + 1) as usize;
        let rows = (max_ty - min_ty + 1) as usize;
        debug!(
            %bounds,
            tile_width = grid.tile_width,
            tile_height = grid.tile_height,
            cols,
            rows,
            element = %layout.element_type(),
            bands = layout.num_bands(),
            "Created tiled raster"
        );

        Ok(Self {
            bounds,
            grid,
            layout,
            min_tx,
            min_ty,
            cols,
            rows,
            padding,
            slots: (0..cols * rows).map(|_| OnceLock::new()).collect(),
            leased: vec![false; cols * rows],
            loader: None,
            requests: AtomicUsize::new(0),
            loads: AtomicUsize::new(0),
            checkouts: 0,
            releases: 0,
        })
    }

    /// Installs a loader used to produce tiles on first touch.
    pub fn set_loader(&mut self, loader: TileLoader) {
        self.loader = Some(loader);
    }

    /// Access counters.
    pub fn stats(&self) -> TileStats {
        TileStats {
            requests: self.requests.load(Ordering::Relaxed),
            loads: self.loads.load(Ordering::Relaxed),
            checkouts: self.checkouts,
            releases: self.releases,
        }
    }

    /// Resets the request counter.
    pub fn reset_requests(&self) {
        self.requests.store(0, Ordering::Relaxed);
    }

    /// Number of tiles `(columns, rows)` covering the bounds.
    pub fn tile_count(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }

    /// Whether tile `(tile_x, tile_y)` is currently checked out.
    pub fn is_leased(&self, tile_x: i32, tile_y: i32) -> bool {
        self.slot_index(tile_x, tile_y).is_some_and(|i| self.leased[i])
    }

    fn slot_index(&self, tile_x: i32, tile_y: i32) -> Option<usize> {
        let cx = tile_x.checked_sub(self.min_tx)?;
        let cy = tile_y.checked_sub(self.min_ty)?;
        if cx < 0 || cy < 0 || cx as usize >= self.cols || cy as usize >= self.rows {
            return None;
        }
        Some(cy as usize * self.cols + cx as usize)
    }

    fn checked_slot(&self, tile_x: i32, tile_y: i32) -> Result<usize> {
        let idx = self
            .slot_index(tile_x, tile_y)
            .ok_or_else(|| Error::tile_fetch(tile_x, tile_y, "tile index outside image"))?;
        if self.leased[idx] {
            return Err(Error::TileCheckedOut { tile_x, tile_y });
        }
        Ok(idx)
    }

    /// Creates tile `(tile_x, tile_y)` from the loader or zero-filled.
    fn produce(&self, tile_x: i32, tile_y: i32) -> Result<Tile> {
        self.loads.fetch_add(1, Ordering::Relaxed);
        let (start_x, end_x) = self.grid.tile_x_range(tile_x);
        let (start_y, end_y) = self.grid.tile_y_range(tile_y);

        let Some(loader) = &self.loader else {
            trace!(tile_x, tile_y, "Allocating zero tile");
            let (px, py) = self.padding;
            let data = self
                .layout
                .allocate(self.grid.tile_width + px, self.grid.tile_height + py);
            return Ok(Tile::new(data, start_x - px as i32, start_y - py as i32));
        };

        trace!(tile_x, tile_y, "Loading tile");
        let tile = loader(tile_x, tile_y)?;
        if tile.origin_x > start_x || tile.origin_y > start_y {
            return Err(Error::tile_fetch(
                tile_x,
                tile_y,
                format!(
                    "tile origin ({}, {}) lies past tile start ({}, {})",
                    tile.origin_x, tile.origin_y, start_x, start_y
                ),
            ));
        }
        let width = (end_x - tile.origin_x + 1) as u32;
        let height = (end_y - tile.origin_y + 1) as u32;
        self.layout
            .validate(&tile.data, width, height)
            .map_err(|e| Error::tile_fetch(tile_x, tile_y, e.to_string()))?;
        Ok(tile)
    }

    /// Mutable access to a tile, creating it if needed.
    ///
    /// # Errors
    ///
    /// [`Error::TileCheckedOut`] while the tile is leased.
    pub fn tile_mut(&mut self, tile_x: i32, tile_y: i32) -> Result<&mut Tile> {
        let idx = self.checked_slot(tile_x, tile_y)?;
        if self.slots[idx].get().is_none() {
            let tile = self.produce(tile_x, tile_y)?;
            self.slots[idx] = OnceLock::from(tile);
        }
        self.slots[idx]
            .get_mut()
            .ok_or_else(|| Error::tile_fetch(tile_x, tile_y, "tile vanished"))
    }

    /// Sets every pixel of one tile to `values` (one per band).
    pub fn fill_tile(&mut self, tile_x: i32, tile_y: i32, values: &[f64]) -> Result<()> {
        let (sx, ex) = self.grid.tile_x_range(tile_x);
        let (sy, ey) = self.grid.tile_y_range(tile_y);
        let layout = self.layout.clone();
        let bands = layout.num_bands().min(values.len());
        let tile = self.tile_mut(tile_x, tile_y)?;
        for y in sy..=ey {
            for x in sx..=ex {
                let (lx, ly) = tile.to_local(x, y);
                for (b, &v) in values.iter().enumerate().take(bands) {
                    layout.set_sample_f64(lx, ly, b, &mut tile.data, v);
                }
            }
        }
        Ok(())
    }

    /// Sets every sample in the bounds to `f(x, y, band)`.
    pub fn fill_with(&mut self, mut f: impl FnMut(i32, i32, usize) -> f64) -> Result<()> {
        let bands = self.layout.num_bands();
        let bounds = self.bounds;
        for (x, y) in bounds.iter_coords() {
            for b in 0..bands {
                self.set_sample_f64(x, y, b, f(x, y, b))?;
            }
        }
        Ok(())
    }

    /// Reads one sample by global coordinate.
    pub fn sample_f64(&self, x: i32, y: i32, band: usize) -> Result<f64> {
        let tile = self.tile(self.grid.x_to_tile_x(x), self.grid.y_to_tile_y(y))?;
        let (lx, ly) = tile.to_local(x, y);
        Ok(self.layout.sample_f64(lx, ly, band, &tile.data))
    }

    /// Writes one sample by global coordinate.
    pub fn set_sample_f64(&mut self, x: i32, y: i32, band: usize, value: f64) -> Result<()> {
        let layout = self.layout.clone();
        let tile = self.tile_mut(self.grid.x_to_tile_x(x), self.grid.y_to_tile_y(y))?;
        let (lx, ly) = tile.to_local(x, y);
        layout.set_sample_f64(lx, ly, band, &mut tile.data, value);
        Ok(())
    }
}

impl TiledImage for TiledRaster {
    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn tile_grid(&self) -> TileGrid {
        self.grid
    }

    fn layout(&self) -> &ElementLayout {
        &self.layout
    }

    fn tile(&self, tile_x: i32, tile_y: i32) -> Result<&Tile> {
        self.requests.fetch_add(1, Ordering::Relaxed);
        let idx = self.checked_slot(tile_x, tile_y)?;
        let slot = &self.slots[idx];
        if let Some(tile) = slot.get() {
            return Ok(tile);
        }
        // First stored tile wins; a concurrent duplicate is dropped.
        let _ = slot.set(self.produce(tile_x, tile_y)?);
        slot.get()
            .ok_or_else(|| Error::tile_fetch(tile_x, tile_y, "tile vanished"))
    }
}

impl WritableTiledImage for TiledRaster {
    fn checkout_tile(&mut self, tile_x: i32, tile_y: i32) -> Result<Tile> {
        let idx = self.checked_slot(tile_x, tile_y)?;
        let tile = match self.slots[idx].take() {
            Some(tile) => tile,
            None => self.produce(tile_x, tile_y)?,
        };
        self.leased[idx] = true;
        self.checkouts += 1;
        debug!(tile_x, tile_y, "Checked out tile");
        Ok(tile)
    }

    fn release_tile(&mut self, tile_x: i32, tile_y: i32, tile: Tile) -> std::result::Result<(), ReleaseError> {
        let Some(idx) = self.slot_index(tile_x, tile_y).filter(|&i| self.leased[i]) else {
            return Err(ReleaseError::new(Error::LeaseNotHeld { tile_x, tile_y }, tile));
        };
        self.slots[idx] = OnceLock::from(tile);
        self.leased[idx] = false;
        self.releases += 1;
        debug!(tile_x, tile_y, "Released tile");
        Ok(())
    }
}

/// Builder for [`TiledRaster`].
///
/// Defaults: 64x64 tiles anchored at the bounds origin, one `u8` band,
/// interleaved layout, no padding, zero-filled tiles.
#[must_use]
pub struct TiledRasterBuilder {
    bounds: Rect,
    tile_width: u32,
    tile_height: u32,
    grid_offset: Option<(i32, i32)>,
    bands: usize,
    element_type: ElementType,
    banded: bool,
    padding: (u32, u32),
    loader: Option<TileLoader>,
}

impl TiledRasterBuilder {
    /// Creates a builder for an image covering `bounds`.
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            tile_width: DEFAULT_TILE_SIZE,
            tile_height: DEFAULT_TILE_SIZE,
            grid_offset: None,
            bands: 1,
            element_type: ElementType::U8,
            banded: false,
            padding: (0, 0),
            loader: None,
        }
    }

    /// Tile dimensions.
    pub fn tile_size(mut self, width: u32, height: u32) -> Self {
        self.tile_width = width;
        self.tile_height = height;
        self
    }

    /// Grid offset (defaults to the bounds origin).
    pub fn grid_offset(mut self, x: i32, y: i32) -> Self {
        self.grid_offset = Some((x, y));
        self
    }

    /// Number of bands.
    pub fn bands(mut self, bands: usize) -> Self {
        self.bands = bands;
        self
    }

    /// Element type.
    pub fn element_type(mut self, element_type: ElementType) -> Self {
        self.element_type = element_type;
        self
    }

    /// Use one bank per band instead of interleaving.
    pub fn banded(mut self, banded: bool) -> Self {
        self.banded = banded;
        self
    }

    /// Store each tile with extra columns on the left and rows on top, so
    /// its buffer origin differs from its grid placement.
    pub fn padding(mut self, x: u32, y: u32) -> Self {
        self.padding = (x, y);
        self
    }

    /// Produce tiles with `loader` instead of zero-filling.
    pub fn loader(mut self, loader: impl Fn(i32, i32) -> Result<Tile> + Send + Sync + 'static) -> Self {
        self.loader = Some(Box::new(loader));
        self
    }

    /// Builds the raster.
    pub fn build(self) -> Result<TiledRaster> {
        let (ox, oy) = self.grid_offset.unwrap_or((self.bounds.x, self.bounds.y));
        let grid = TileGrid::new(self.tile_width, self.tile_height, ox, oy)?;
        let row_width = self.tile_width + self.padding.0;
        let layout = if self.banded {
            ElementLayout::banded(self.element_type, self.bands, row_width)?
        } else {
            ElementLayout::interleaved(self.element_type, self.bands, row_width)?
        };
        let mut raster = TiledRaster::with_padding(self.bounds, grid, layout, self.padding)?;
        raster.loader = self.loader;
        Ok(raster)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::DataBuffer;

    fn raster_4x4() -> TiledRaster {
        TiledRaster::builder(Rect::from_size(4, 4))
            .tile_size(2, 2)
            .bands(3)
            .build()
            .unwrap()
    }

    #[test]
    fn test_lazy_zero_tiles() {
        let raster = raster_4x4();
        assert_eq!(raster.tile_count(), (2, 2));
        assert_eq!(raster.stats().loads, 0);

        let tile = raster.tile(1, 1).unwrap();
        assert_eq!((tile.origin_x, tile.origin_y), (2, 2));
        assert_eq!(tile.data.bank_len(0), 12);

        raster.tile(1, 1).unwrap();
        let stats = raster.stats();
        assert_eq!(stats.loads, 1);
        assert_eq!(stats.requests, 2);
    }

    #[test]
    fn test_tile_outside_image() {
        let raster = raster_4x4();
        assert!(matches!(raster.tile(2, 0), Err(Error::TileFetch { .. })));
        assert!(raster.tile(0, -1).is_err());
    }

    #[test]
    fn test_fill_and_sample() {
        let mut raster = raster_4x4();
        raster.fill_tile(1, 0, &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(raster.sample_f64(3, 1, 1).unwrap(), 2.0);
        assert_eq!(raster.sample_f64(1, 1, 1).unwrap(), 0.0);

        raster.fill_with(|x, y, b| (x + 10 * y) as f64 + b as f64 * 100.0).unwrap();
        assert_eq!(raster.sample_f64(2, 3, 2).unwrap(), 232.0);
    }

    #[test]
    fn test_checkout_release() {
        let mut raster = raster_4x4();
        raster.fill_tile(0, 0, &[7.0, 7.0, 7.0]).unwrap();

        let mut tile = raster.checkout_tile(0, 0).unwrap();
        assert!(raster.is_leased(0, 0));
        assert!(matches!(raster.tile(0, 0), Err(Error::TileCheckedOut { .. })));
        assert!(raster.checkout_tile(0, 0).unwrap_err().is_lease_error());

        tile.data.set_i32(0, 0, 42);
        raster.release_tile(0, 0, tile).unwrap();
        assert!(!raster.is_leased(0, 0));
        assert_eq!(raster.sample_f64(0, 0, 0).unwrap(), 42.0);
        assert_eq!(raster.sample_f64(1, 1, 0).unwrap(), 7.0);

        let stats = raster.stats();
        assert_eq!((stats.checkouts, stats.releases), (1, 1));
        assert_eq!(stats.outstanding(), 0);
    }

    #[test]
    fn test_tile_range_spans_negative_origin() {
        let raster = TiledRaster::builder(Rect::new(-3, 1, 10, 5))
            .tile_size(4, 4)
            .grid_offset(0, 0)
            .build()
            .unwrap();
        assert_eq!(raster.tile_range(), ((-1, 1), (0, 1)));
        assert_eq!(raster.tile_count(), (3, 2));
    }

    #[test]
    fn test_release_without_lease() {
        let mut raster = raster_4x4();
        let tile = raster.tile(0, 0).unwrap().clone();
        let refused = raster.release_tile(0, 0, tile.clone()).unwrap_err();
        assert!(matches!(refused.error, Error::LeaseNotHeld { tile_x: 0, tile_y: 0 }));
        assert_eq!(refused.tile, tile);
    }

    #[test]
    fn test_padding_moves_origin() {
        let mut raster = TiledRaster::builder(Rect::from_size(4, 4))
            .tile_size(2, 2)
            .padding(1, 3)
            .build()
            .unwrap();
        let tile = raster.tile(1, 0).unwrap();
        assert_eq!((tile.origin_x, tile.origin_y), (1, -3));

        raster.set_sample_f64(2, 0, 0, 9.0).unwrap();
        assert_eq!(raster.sample_f64(2, 0, 0).unwrap(), 9.0);
        assert_eq!(raster.sample_f64(3, 0, 0).unwrap(), 0.0);
    }

    #[test]
    fn test_loader() {
        let raster = TiledRaster::builder(Rect::from_size(4, 2))
            .tile_size(2, 2)
            .element_type(ElementType::F32)
            .loader(|tx, _ty| {
                if tx == 1 {
                    return Err(Error::tile_fetch(tx, 0, "corrupt"));
                }
                Ok(Tile::new(DataBuffer::from_banks(vec![vec![0.5f32; 4]]), 0, 0))
            })
            .build()
            .unwrap();

        assert_eq!(raster.sample_f64(1, 1, 0).unwrap(), 0.5);
        let err = raster.tile(1, 0).unwrap_err();
        assert!(err.to_string().contains("corrupt"));
    }

    #[test]
    fn test_loader_rejects_bad_tiles() {
        let raster = TiledRaster::builder(Rect::from_size(2, 2))
            .tile_size(2, 2)
            .loader(|_, _| Ok(Tile::new(DataBuffer::zeroed(ElementType::U8, 1, 3), 0, 0)))
            .build()
            .unwrap();
        assert!(matches!(raster.tile(0, 0), Err(Error::TileFetch { .. })));

        let raster = TiledRaster::builder(Rect::from_size(2, 2))
            .tile_size(2, 2)
            .loader(|_, _| Ok(Tile::new(DataBuffer::zeroed(ElementType::U8, 1, 4), 1, 0)))
            .build()
            .unwrap();
        assert!(raster.tile(0, 0).is_err());
    }

    #[test]
    fn test_negative_grid_offset() {
        let raster = TiledRaster::builder(Rect::new(-3, -3, 6, 6))
            .tile_size(4, 4)
            .grid_offset(-4, -4)
            .build()
            .unwrap();
        assert_eq!(raster.tile_count(), (2, 2));
        assert_eq!(raster.tile(0, 0).unwrap().origin_x, -4);
        assert_eq!(raster.tile(1, 1).unwrap().origin_y, 0);
    }

    #[test]
    fn test_stride_overlap_rejected() {
        let grid = TileGrid::new(4, 4, 0, 0).unwrap();
        let layout = ElementLayout::interleaved(ElementType::U8, 3, 2).unwrap();
        assert!(TiledRaster::new(Rect::from_size(8, 8), grid, layout).is_err());
    }
}
