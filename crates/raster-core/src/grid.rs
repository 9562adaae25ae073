//! Tile grid geometry.
//!
//! A [`TileGrid`] partitions the whole image plane into tiles of
//! `tile_width x tile_height` pixels, anchored at `(x_offset, y_offset)`.
//! Every global coordinate belongs to exactly one tile:
//!
//! ```text
//! tile_x = floor((x - x_offset) / tile_width)
//! tile_start = tile_x * tile_width + x_offset
//! tile_end   = tile_start + tile_width - 1        (inclusive)
//! ```
//!
//! Division rounds toward negative infinity, so coordinates left of the grid
//! offset land in negative tile indices.
//!
//! # Example
//!
//! ```rust
//! use raster_core::TileGrid;
//!
//! let grid = TileGrid::new(64, 32, 10, -5).unwrap();
//! assert_eq!(grid.x_to_tile_x(10), 0);
//! assert_eq!(grid.x_to_tile_x(9), -1);
//! assert_eq!(grid.tile_x_range(1), (74, 137));
//! assert_eq!(grid.y_to_tile_y(-6), -1);
//! ```

use crate::{Error, Rect, Result};

/// Tile grid parameters of a tiled image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileGrid {
    /// Width of every tile in pixels (> 0)
    pub tile_width: u32,
    /// Height of every tile in pixels (> 0)
    pub tile_height: u32,
    /// X coordinate of the left edge of tile column 0
    pub x_offset: i32,
    /// Y coordinate of the top edge of tile row 0
    pub y_offset: i32,
}

/// Floor division for a positive divisor.
#[inline]
fn floor_div(num: i64, den: i64) -> i64 {
    num.div_euclid(den)
}

impl TileGrid {
    /// Creates a tile grid.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] if either tile dimension is zero
    /// or does not fit in an `i32`.
    pub fn new(tile_width: u32, tile_height: u32, x_offset: i32, y_offset: i32) -> Result<Self> {
        if tile_width == 0 || tile_height == 0 {
            return Err(Error::invalid_dimensions(
                tile_width,
                tile_height,
                "tile size must be positive",
            ));
        }
        if tile_width > i32::MAX as u32 || tile_height > i32::MAX as u32 {
            return Err(Error::invalid_dimensions(
                tile_width,
                tile_height,
                "tile size exceeds i32 range",
            ));
        }
        Ok(Self {
            tile_width,
            tile_height,
            x_offset,
            y_offset,
        })
    }

    /// Tile column containing global X coordinate `x`.
    #[inline]
    pub fn x_to_tile_x(&self, x: i32) -> i32 {
        floor_div(x as i64 - self.x_offset as i64, self.tile_width as i64) as i32
    }

    /// Tile row containing global Y coordinate `y`.
    #[inline]
    pub fn y_to_tile_y(&self, y: i32) -> i32 {
        floor_div(y as i64 - self.y_offset as i64, self.tile_height as i64) as i32
    }

    /// Left edge of tile column `tile_x`.
    #[inline]
    pub fn tile_x_start(&self, tile_x: i32) -> i32 {
        tile_x * self.tile_width as i32 + self.x_offset
    }

    /// Top edge of tile row `tile_y`.
    #[inline]
    pub fn tile_y_start(&self, tile_y: i32) -> i32 {
        tile_y * self.tile_height as i32 + self.y_offset
    }

    /// Inclusive X range `(start, end)` owned by tile column `tile_x`.
    #[inline]
    pub fn tile_x_range(&self, tile_x: i32) -> (i32, i32) {
        let start = self.tile_x_start(tile_x);
        (start, start + self.tile_width as i32 - 1)
    }

    /// Inclusive Y range `(start, end)` owned by tile row `tile_y`.
    #[inline]
    pub fn tile_y_range(&self, tile_y: i32) -> (i32, i32) {
        let start = self.tile_y_start(tile_y);
        (start, start + self.tile_height as i32 - 1)
    }

    /// Pixel rectangle of tile `(tile_x, tile_y)`.
    #[inline]
    pub fn tile_rect(&self, tile_x: i32, tile_y: i32) -> Rect {
        Rect::new(
            self.tile_x_start(tile_x),
            self.tile_y_start(tile_y),
            self.tile_width,
            self.tile_height,
        )
    }

    /// Inclusive tile index ranges `((min_tx, max_tx), (min_ty, max_ty))`
    /// touched by a non-empty rectangle.
    pub fn tile_span(&self, rect: &Rect) -> ((i32, i32), (i32, i32)) {
        debug_assert!(!rect.is_empty());
        (
            (self.x_to_tile_x(rect.x), self.x_to_tile_x(rect.max_x())),
            (self.y_to_tile_y(rect.y), self.y_to_tile_y(rect.max_y())),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_tile_size_rejected() {
        assert!(TileGrid::new(0, 16, 0, 0).is_err());
        assert!(TileGrid::new(16, 0, 0, 0).is_err());
    }

    #[test]
    fn test_tile_index_positive() {
        let grid = TileGrid::new(4, 8, 0, 0).unwrap();
        assert_eq!(grid.x_to_tile_x(0), 0);
        assert_eq!(grid.x_to_tile_x(3), 0);
        assert_eq!(grid.x_to_tile_x(4), 1);
        assert_eq!(grid.y_to_tile_y(7), 0);
        assert_eq!(grid.y_to_tile_y(8), 1);
    }

    #[test]
    fn test_tile_index_negative_floors() {
        let grid = TileGrid::new(4, 4, 0, 0).unwrap();
        assert_eq!(grid.x_to_tile_x(-1), -1);
        assert_eq!(grid.x_to_tile_x(-4), -1);
        assert_eq!(grid.x_to_tile_x(-5), -2);
    }

    #[test]
    fn test_grid_offset() {
        let grid = TileGrid::new(10, 10, 3, -7).unwrap();
        assert_eq!(grid.x_to_tile_x(3), 0);
        assert_eq!(grid.x_to_tile_x(2), -1);
        assert_eq!(grid.y_to_tile_y(-7), 0);
        assert_eq!(grid.y_to_tile_y(-8), -1);
        assert_eq!(grid.tile_x_range(0), (3, 12));
        assert_eq!(grid.tile_y_range(-1), (-17, -8));
    }

    #[test]
    fn test_ranges_cover_plane_without_gaps() {
        let grid = TileGrid::new(3, 5, -2, 1).unwrap();
        for x in -20..20 {
            let tx = grid.x_to_tile_x(x);
            let (start, end) = grid.tile_x_range(tx);
            assert!(start <= x && x <= end, "x={x} tile={tx} range=({start},{end})");
            // adjacent tiles abut exactly
            assert_eq!(grid.tile_x_range(tx + 1).0, end + 1);
        }
    }

    #[test]
    fn test_tile_span() {
        let grid = TileGrid::new(2, 2, 0, 0).unwrap();
        let span = grid.tile_span(&Rect::new(1, 1, 3, 2));
        assert_eq!(span, ((0, 1), (0, 1)));
        assert_eq!(grid.tile_rect(1, 1), Rect::new(2, 2, 2, 2));
    }
}
