//! Scan position state shared by the sequential and bidirectional cursors.
//!
//! [`ScanState`] is pure geometry: it tracks the current line, pixel and band
//! inside the iteration bounds, plus the tile owning the position. The tile
//! range of the current tile is cached, so a single step only consults the
//! [`TileGrid`] when it passes a cached boundary.
//!
//! The tile index is only advanced while the position is inside the bounds.
//! Stepping one past the last line or pixel therefore never names a tile
//! that the cursor would have to fetch.

use raster_core::{Axis, Error, Rect, Result, TileGrid};

/// Intersects the requested bounds with the image bounds.
///
/// # Errors
///
/// [`Error::InvalidRegion`] if the two do not overlap.
pub fn resolve_bounds(image: Rect, requested: Rect) -> Result<Rect> {
    requested
        .intersect(&image)
        .ok_or_else(|| Error::invalid_region(requested.x, requested.y, requested.width, requested.height))
}

/// Line, pixel and band position of a scanning cursor.
#[derive(Debug, Clone)]
pub struct ScanState {
    grid: TileGrid,
    bounds: Rect,
    first_x: i32,
    last_x: i32,
    first_y: i32,
    last_y: i32,
    x: i32,
    y: i32,
    band: i32,
    num_bands: i32,
    tile_x: i32,
    tile_y: i32,
    // inclusive pixel range of the current tile
    tile_x_start: i32,
    tile_x_end: i32,
    tile_y_start: i32,
    tile_y_end: i32,
}

impl ScanState {
    /// Creates a state positioned at the top-left of `bounds`, band 0.
    ///
    /// `bounds` must be non-empty (see [`resolve_bounds`]).
    pub fn new(grid: TileGrid, bounds: Rect, num_bands: usize) -> Self {
        debug_assert!(!bounds.is_empty());
        let tile_x = grid.x_to_tile_x(bounds.x);
        let tile_y = grid.y_to_tile_y(bounds.y);
        let (tile_x_start, tile_x_end) = grid.tile_x_range(tile_x);
        let (tile_y_start, tile_y_end) = grid.tile_y_range(tile_y);
        Self {
            grid,
            bounds,
            first_x: bounds.x,
            last_x: bounds.max_x(),
            first_y: bounds.y,
            last_y: bounds.max_y(),
            x: bounds.x,
            y: bounds.y,
            band: 0,
            num_bands: num_bands as i32,
            tile_x,
            tile_y,
            tile_x_start,
            tile_x_end,
            tile_y_start,
            tile_y_end,
        }
    }

    /// Iteration bounds.
    #[inline]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Current pixel position.
    #[inline]
    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    /// Current band. Only meaningful while bands are not finished.
    #[inline]
    pub fn band(&self) -> usize {
        debug_assert!(self.band >= 0 && self.band < self.num_bands);
        self.band as usize
    }

    /// Number of bands.
    #[inline]
    pub fn num_bands(&self) -> usize {
        self.num_bands as usize
    }

    /// Tile owning the position (the last in-bounds tile once past the end).
    #[inline]
    pub fn tile(&self) -> (i32, i32) {
        (self.tile_x, self.tile_y)
    }

    /// Whether the current line lies inside the bounds.
    #[inline]
    pub fn line_in_bounds(&self) -> bool {
        self.y >= self.first_y && self.y <= self.last_y
    }

    /// Whether the current pixel lies inside the bounds.
    #[inline]
    pub fn pixel_in_bounds(&self) -> bool {
        self.x >= self.first_x && self.x <= self.last_x
    }

    #[inline]
    fn refresh_tile_x(&mut self) {
        if (self.x < self.tile_x_start || self.x > self.tile_x_end) && self.pixel_in_bounds() {
            self.tile_x = self.grid.x_to_tile_x(self.x);
            (self.tile_x_start, self.tile_x_end) = self.grid.tile_x_range(self.tile_x);
        }
    }

    #[inline]
    fn refresh_tile_y(&mut self) {
        if (self.y < self.tile_y_start || self.y > self.tile_y_end) && self.line_in_bounds() {
            self.tile_y = self.grid.y_to_tile_y(self.y);
            (self.tile_y_start, self.tile_y_end) = self.grid.tile_y_range(self.tile_y);
        }
    }

    fn jump_target(pos: i32, n: i32, first: i32, last: i32, axis: Axis) -> Result<i32> {
        let target = pos as i64 + n as i64;
        if target < first as i64 || target > last as i64 {
            let position = target.clamp(i32::MIN as i64, i32::MAX as i64) as i32;
            return Err(Error::out_of_bounds(axis, position, first, last));
        }
        Ok(target as i32)
    }

    // === Lines ===

    /// Moves to the first line.
    pub fn start_lines(&mut self) {
        self.y = self.first_y;
        self.refresh_tile_y();
    }

    /// Moves to the last line.
    pub fn end_lines(&mut self) {
        self.y = self.last_y;
        self.refresh_tile_y();
    }

    /// Moves down one line.
    #[inline]
    pub fn next_line(&mut self) {
        self.y += 1;
        self.refresh_tile_y();
    }

    /// Moves up one line.
    #[inline]
    pub fn prev_line(&mut self) {
        self.y -= 1;
        self.refresh_tile_y();
    }

    /// Moves `n` lines; fails without moving if the target is outside the bounds.
    pub fn jump_lines(&mut self, n: i32) -> Result<()> {
        self.y = Self::jump_target(self.y, n, self.first_y, self.last_y, Axis::Y)?;
        self.refresh_tile_y();
        Ok(())
    }

    /// True once the position is below the last line.
    #[inline]
    pub fn finished_lines(&self) -> bool {
        self.y > self.last_y
    }

    /// True once the position is above the first line.
    #[inline]
    pub fn finished_lines_top(&self) -> bool {
        self.y < self.first_y
    }

    // === Pixels ===

    /// Moves to the first pixel of the line.
    pub fn start_pixels(&mut self) {
        self.x = self.first_x;
        self.refresh_tile_x();
    }

    /// Moves to the last pixel of the line.
    pub fn end_pixels(&mut self) {
        self.x = self.last_x;
        self.refresh_tile_x();
    }

    /// Moves right one pixel.
    #[inline]
    pub fn next_pixel(&mut self) {
        self.x += 1;
        self.refresh_tile_x();
    }

    /// Moves left one pixel.
    #[inline]
    pub fn prev_pixel(&mut self) {
        self.x -= 1;
        self.refresh_tile_x();
    }

    /// Moves `n` pixels; fails without moving if the target is outside the bounds.
    pub fn jump_pixels(&mut self, n: i32) -> Result<()> {
        self.x = Self::jump_target(self.x, n, self.first_x, self.last_x, Axis::X)?;
        self.refresh_tile_x();
        Ok(())
    }

    /// True once the position is right of the last pixel.
    #[inline]
    pub fn finished_pixels(&self) -> bool {
        self.x > self.last_x
    }

    /// True once the position is left of the first pixel.
    #[inline]
    pub fn finished_pixels_left(&self) -> bool {
        self.x < self.first_x
    }

    // === Bands ===

    /// Moves to band 0.
    #[inline]
    pub fn start_bands(&mut self) {
        self.band = 0;
    }

    /// Moves to the last band.
    #[inline]
    pub fn end_bands(&mut self) {
        self.band = self.num_bands - 1;
    }

    /// Moves to the next band.
    #[inline]
    pub fn next_band(&mut self) {
        self.band += 1;
    }

    /// Moves to the previous band.
    #[inline]
    pub fn prev_band(&mut self) {
        self.band -= 1;
    }

    /// True once past the last band.
    #[inline]
    pub fn finished_bands(&self) -> bool {
        self.band >= self.num_bands
    }

    /// True once before band 0.
    #[inline]
    pub fn finished_bands_top(&self) -> bool {
        self.band < 0
    }
}
