//! # raster-core
//!
//! Core types for tile-backed raster images.
//!
//! This crate holds the data model the pixel-iteration engine in
//! `raster-iter` is built on:
//!
//! - [`Rect`] - Image and iteration bounds
//! - [`TileGrid`] - Geometry resolver mapping coordinates to tiles
//! - [`ElementType`], [`Element`] - `u8` / `f32` / `f64` element types
//! - [`ElementLayout`] - How bands are packed into a tile buffer
//! - [`DataBuffer`], [`Tile`] - Banked element storage plus origin translation
//! - [`TiledImage`], [`WritableTiledImage`] - The tile source seam
//! - [`TiledRaster`] - In-memory tile source with lazy tiles and write leases
//! - [`Error`], [`Result`] - Error taxonomy shared by the whole workspace
//!
//! ## Crate Structure
//!
//! ```text
//! raster-core (this crate)
//!    ^
//!    |
//!    +-- raster-iter (cursors, factory, parallel strips, alpha)
//!    +-- raster-cli
//!    +-- raster-bench
//! ```
//!
//! ## Example
//!
//! ```rust
//! use raster_core::prelude::*;
//!
//! let raster = TiledRaster::builder(Rect::new(-8, -8, 32, 32))
//!     .tile_size(16, 16)
//!     .bands(4)
//!     .element_type(ElementType::F32)
//!     .build()?;
//!
//! let grid = raster.tile_grid();
//! let tile = raster.tile(grid.x_to_tile_x(0), grid.y_to_tile_y(0))?;
//! assert_eq!((tile.origin_x, tile.origin_y), (-8, -8));
//! # Ok::<(), raster_core::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod buffer;
pub mod error;
pub mod format;
pub mod grid;
pub mod layout;
pub mod raster;
pub mod rect;
pub mod source;
pub mod tile;

// Re-exports for convenience
pub use buffer::DataBuffer;
pub use error::*;
pub use format::*;
pub use grid::TileGrid;
pub use layout::ElementLayout;
pub use raster::{TileLoader, TileStats, TiledRaster, TiledRasterBuilder, DEFAULT_TILE_SIZE};
pub use rect::Rect;
pub use source::{TiledImage, WritableTiledImage};
pub use tile::Tile;

/// Prelude module for convenient imports.
///
/// # Usage
///
/// ```
/// use raster_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::buffer::DataBuffer;
    pub use crate::error::{Axis, Error, Result};
    pub use crate::format::{Element, ElementType};
    pub use crate::grid::TileGrid;
    pub use crate::layout::ElementLayout;
    pub use crate::raster::{TiledRaster, TiledRasterBuilder};
    pub use crate::rect::Rect;
    pub use crate::source::{TiledImage, WritableTiledImage};
    pub use crate::tile::Tile;
}
