//! Tiled image source traits.
//!
//! These traits are the seam between the iteration engine and whatever owns
//! the pixels: a decoder, a cache, or the in-memory [`TiledRaster`].
//!
//! # Architecture
//!
//! ```text
//! +-------------------+        +------------------------+
//! | TiledImage        | <----- | WritableTiledImage     |
//! |  bounds()         |        |  checkout_tile()       |
//! |  tile_grid()      |        |  release_tile()        |
//! |  layout()         |        +------------------------+
//! |  tile()           |
//! +-------------------+
//!          ^
//!          |
//! +-------------------+
//! | TiledRaster       |
//! +-------------------+
//! ```
//!
//! # Ownership
//!
//! The source is the sole owner of its tiles. Read cursors borrow tiles
//! (`&Tile`) for as long as they borrow the source. Writers take a tile out
//! of the source with [`WritableTiledImage::checkout_tile`] and must hand it
//! back with [`WritableTiledImage::release_tile`]; while checked out, the
//! tile is exclusively theirs and the source refuses to give it to anyone
//! else.
//!
//! [`TiledRaster`]: crate::raster::TiledRaster

use crate::grid::TileGrid;
use crate::layout::ElementLayout;
use crate::rect::Rect;
use crate::tile::Tile;
use crate::{ReleaseError, Result};

/// Read access to a tile-backed raster.
pub trait TiledImage {
    /// Logical pixel region of the image.
    fn bounds(&self) -> Rect;

    /// Tile grid geometry.
    fn tile_grid(&self) -> TileGrid;

    /// Element layout shared by every tile.
    fn layout(&self) -> &ElementLayout;

    /// Returns tile `(tile_x, tile_y)`, fetching it if necessary.
    ///
    /// # Errors
    ///
    /// [`Error::TileFetch`](crate::Error::TileFetch) if the tile cannot be
    /// produced, [`Error::TileCheckedOut`](crate::Error::TileCheckedOut) if
    /// a writer currently holds it.
    fn tile(&self, tile_x: i32, tile_y: i32) -> Result<&Tile>;

    /// Number of bands per pixel.
    fn num_bands(&self) -> usize {
        self.layout().num_bands()
    }

    /// Inclusive tile index ranges covering the image bounds.
    fn tile_range(&self) -> ((i32, i32), (i32, i32)) {
        self.tile_grid().tile_span(&self.bounds())
    }
}

/// Write access through exclusive tile leases.
///
/// Every successful `checkout_tile` must be paired with exactly one
/// `release_tile` for the same tile index.
pub trait WritableTiledImage: TiledImage {
    /// Takes tile `(tile_x, tile_y)` out of the source for writing.
    ///
    /// # Errors
    ///
    /// [`Error::TileCheckedOut`](crate::Error::TileCheckedOut) if the tile is
    /// already leased, [`Error::TileFetch`](crate::Error::TileFetch) if it
    /// cannot be produced.
    fn checkout_tile(&mut self, tile_x: i32, tile_y: i32) -> Result<Tile>;

    /// Returns a leased tile to the source.
    ///
    /// # Errors
    ///
    /// [`Error::LeaseNotHeld`](crate::Error::LeaseNotHeld) if the tile was
    /// not checked out. A refused tile comes back inside the [`ReleaseError`]
    /// and the lease, if any, stays open.
    fn release_tile(&mut self, tile_x: i32, tile_y: i32, tile: Tile) -> std::result::Result<(), ReleaseError>;
}

impl<S: TiledImage + ?Sized> TiledImage for &S {
    fn bounds(&self) -> Rect {
        (**self).bounds()
    }

    fn tile_grid(&self) -> TileGrid {
        (**self).tile_grid()
    }

    fn layout(&self) -> &ElementLayout {
        (**self).layout()
    }

    fn tile(&self, tile_x: i32, tile_y: i32) -> Result<&Tile> {
        (**self).tile(tile_x, tile_y)
    }
}
