//! Cursor traits exposed to image-processing code.
//!
//! # Traversal Disciplines
//!
//! - [`RectIter`] - Sequential scan: lines, then pixels within a line, then
//!   bands within a pixel, forward only
//! - [`RookIter`] - Bidirectional scan: everything in [`RectIter`] plus
//!   backward steps and starting from the end
//! - [`RandomIter`] - Direct `(x, y, band)` queries in any order
//!
//! Each has a writable counterpart adding `set_*` operations.
//!
//! # Scan Protocol
//!
//! ```text
//! start_lines
//! while !finished_lines
//!     start_pixels
//!     while !finished_pixels
//!         start_bands
//!         while !finished_bands
//!             sample()
//!             next_band
//!         next_pixel
//!     next_line
//! ```
//!
//! `next_line` keeps the pixel and band position; `next_pixel` keeps the band.
//! Navigation that may cross into another tile returns [`Result`], since the
//! tile has to be fetched from the source. Sample accessors are infallible
//! and must only be called while the position is inside the bounds.
//!
//! `jump_*` outside the bounds fails with
//! [`Error::OutOfBounds`](raster_core::Error::OutOfBounds); the position
//! afterwards is unspecified.
//!
//! When a step fails to fetch the next tile, the position has already moved
//! but the cursor still holds the previous tile. After a navigation error,
//! reposition (`start_*`, `end_*`, or a jump back) before sampling again.

use raster_core::{Rect, Result};

/// Sequential scan over a rectangle.
pub trait RectIter {
    /// Iteration bounds (the requested rectangle clipped to the image).
    fn bounds(&self) -> Rect;

    /// Number of bands per pixel.
    fn num_bands(&self) -> usize;

    /// Current `(x, y)` position.
    fn position(&self) -> (i32, i32);

    /// Current band.
    fn band(&self) -> usize;

    // === Lines ===

    /// Moves to the first line.
    fn start_lines(&mut self) -> Result<()>;

    /// Moves down one line.
    fn next_line(&mut self) -> Result<()>;

    /// Moves `n` lines (negative moves up).
    fn jump_lines(&mut self, n: i32) -> Result<()>;

    /// True once below the last line.
    fn finished_lines(&self) -> bool;

    /// [`next_line`](Self::next_line) then [`finished_lines`](Self::finished_lines).
    fn next_line_done(&mut self) -> Result<bool> {
        self.next_line()?;
        Ok(self.finished_lines())
    }

    // === Pixels ===

    /// Moves to the first pixel of the line.
    fn start_pixels(&mut self) -> Result<()>;

    /// Moves right one pixel.
    ///
    /// On a tile-fetch error the cursor must be repositioned before the
    /// next sample.
    fn next_pixel(&mut self) -> Result<()>;

    /// Moves `n` pixels (negative moves left).
    fn jump_pixels(&mut self, n: i32) -> Result<()>;

    /// True once right of the last pixel.
    fn finished_pixels(&self) -> bool;

    /// [`next_pixel`](Self::next_pixel) then [`finished_pixels`](Self::finished_pixels).
    fn next_pixel_done(&mut self) -> Result<bool> {
        self.next_pixel()?;
        Ok(self.finished_pixels())
    }

    // === Bands ===

    /// Moves to band 0.
    fn start_bands(&mut self);

    /// Moves to the next band.
    fn next_band(&mut self);

    /// True once past the last band.
    fn finished_bands(&self) -> bool;

    /// [`next_band`](Self::next_band) then [`finished_bands`](Self::finished_bands).
    fn next_band_done(&mut self) -> bool {
        self.next_band();
        self.finished_bands()
    }

    // === Samples ===

    /// Sample of `band` at the current pixel as `i32`.
    fn sample_band(&self, band: usize) -> i32;

    /// Sample of `band` at the current pixel as `f32`.
    fn sample_band_f32(&self, band: usize) -> f32;

    /// Sample of `band` at the current pixel as `f64`.
    fn sample_band_f64(&self, band: usize) -> f64;

    /// Sample of the current band as `i32`.
    #[inline]
    fn sample(&self) -> i32 {
        self.sample_band(self.band())
    }

    /// Sample of the current band as `f32`.
    #[inline]
    fn sample_f32(&self) -> f32 {
        self.sample_band_f32(self.band())
    }

    /// Sample of the current band as `f64`.
    #[inline]
    fn sample_f64(&self) -> f64 {
        self.sample_band_f64(self.band())
    }

    /// Copies the current pixel into `out` (up to `num_bands` entries).
    fn pixel(&self, out: &mut [i32]) {
        for (band, v) in out.iter_mut().enumerate().take(self.num_bands()) {
            *v = self.sample_band(band);
        }
    }

    /// Copies the current pixel into `out` as `f32`.
    fn pixel_f32(&self, out: &mut [f32]) {
        for (band, v) in out.iter_mut().enumerate().take(self.num_bands()) {
            *v = self.sample_band_f32(band);
        }
    }

    /// Copies the current pixel into `out` as `f64`.
    fn pixel_f64(&self, out: &mut [f64]) {
        for (band, v) in out.iter_mut().enumerate().take(self.num_bands()) {
            *v = self.sample_band_f64(band);
        }
    }
}

/// Bidirectional scan over a rectangle.
pub trait RookIter: RectIter {
    /// Moves to the last line.
    fn end_lines(&mut self) -> Result<()>;

    /// Moves up one line.
    fn prev_line(&mut self) -> Result<()>;

    /// True once above the first line.
    fn finished_lines_top(&self) -> bool;

    /// [`prev_line`](Self::prev_line) then [`finished_lines_top`](Self::finished_lines_top).
    fn prev_line_done(&mut self) -> Result<bool> {
        self.prev_line()?;
        Ok(self.finished_lines_top())
    }

    /// Moves to the last pixel of the line.
    fn end_pixels(&mut self) -> Result<()>;

    /// Moves left one pixel.
    fn prev_pixel(&mut self) -> Result<()>;

    /// True once left of the first pixel.
    fn finished_pixels_left(&self) -> bool;

    /// [`prev_pixel`](Self::prev_pixel) then [`finished_pixels_left`](Self::finished_pixels_left).
    fn prev_pixel_done(&mut self) -> Result<bool> {
        self.prev_pixel()?;
        Ok(self.finished_pixels_left())
    }

    /// Moves to the last band.
    fn end_bands(&mut self);

    /// Moves to the previous band.
    fn prev_band(&mut self);

    /// True once before band 0.
    fn finished_bands_top(&self) -> bool;

    /// [`prev_band`](Self::prev_band) then [`finished_bands_top`](Self::finished_bands_top).
    fn prev_band_done(&mut self) -> bool {
        self.prev_band();
        self.finished_bands_top()
    }
}

/// Random access inside a rectangle.
///
/// Queries outside the bounds fail with
/// [`Error::OutOfBounds`](raster_core::Error::OutOfBounds).
pub trait RandomIter {
    /// Iteration bounds.
    fn bounds(&self) -> Rect;

    /// Number of bands per pixel.
    fn num_bands(&self) -> usize;

    /// Sample at `(x, y, band)` as `i32`.
    fn sample(&mut self, x: i32, y: i32, band: usize) -> Result<i32>;

    /// Sample at `(x, y, band)` as `f32`.
    fn sample_f32(&mut self, x: i32, y: i32, band: usize) -> Result<f32>;

    /// Sample at `(x, y, band)` as `f64`.
    fn sample_f64(&mut self, x: i32, y: i32, band: usize) -> Result<f64>;

    /// Copies pixel `(x, y)` into `out`.
    fn pixel(&mut self, x: i32, y: i32, out: &mut [i32]) -> Result<()>;

    /// Copies pixel `(x, y)` into `out` as `f32`.
    fn pixel_f32(&mut self, x: i32, y: i32, out: &mut [f32]) -> Result<()>;

    /// Copies pixel `(x, y)` into `out` as `f64`.
    fn pixel_f64(&mut self, x: i32, y: i32, out: &mut [f64]) -> Result<()>;

    /// Releases resources held by the cursor. Idempotent.
    fn done(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Sequential scan with write access.
pub trait WritableRectIter: RectIter {
    /// Stores `value` in `band` of the current pixel.
    fn set_sample_band(&mut self, band: usize, value: i32);

    /// Stores an `f32` in `band` of the current pixel.
    fn set_sample_band_f32(&mut self, band: usize, value: f32);

    /// Stores an `f64` in `band` of the current pixel.
    fn set_sample_band_f64(&mut self, band: usize, value: f64);

    /// Stores `value` in the current band.
    #[inline]
    fn set_sample(&mut self, value: i32) {
        let band = self.band();
        self.set_sample_band(band, value);
    }

    /// Stores an `f32` in the current band.
    #[inline]
    fn set_sample_f32(&mut self, value: f32) {
        let band = self.band();
        self.set_sample_band_f32(band, value);
    }

    /// Stores an `f64` in the current band.
    #[inline]
    fn set_sample_f64(&mut self, value: f64) {
        let band = self.band();
        self.set_sample_band_f64(band, value);
    }

    /// Stores the current pixel from `values` (up to `num_bands` entries).
    fn set_pixel(&mut self, values: &[i32]) {
        for (band, &v) in values.iter().enumerate().take(self.num_bands()) {
            self.set_sample_band(band, v);
        }
    }

    /// Stores the current pixel from `f32` values.
    fn set_pixel_f32(&mut self, values: &[f32]) {
        for (band, &v) in values.iter().enumerate().take(self.num_bands()) {
            self.set_sample_band_f32(band, v);
        }
    }

    /// Stores the current pixel from `f64` values.
    fn set_pixel_f64(&mut self, values: &[f64]) {
        for (band, &v) in values.iter().enumerate().take(self.num_bands()) {
            self.set_sample_band_f64(band, v);
        }
    }

    /// Returns the held write lease to the source. Idempotent.
    ///
    /// Scans that run past the last line release on their own; call this
    /// when stopping early.
    fn done(&mut self) -> Result<()>;
}

/// Bidirectional scan with write access.
pub trait WritableRookIter: WritableRectIter + RookIter {}

impl<T: WritableRectIter + RookIter + ?Sized> WritableRookIter for T {}

/// Random access with write access.
pub trait WritableRandomIter: RandomIter {
    /// Stores `value` at `(x, y, band)`.
    fn set_sample(&mut self, x: i32, y: i32, band: usize, value: i32) -> Result<()>;

    /// Stores an `f32` at `(x, y, band)`.
    fn set_sample_f32(&mut self, x: i32, y: i32, band: usize, value: f32) -> Result<()>;

    /// Stores an `f64` at `(x, y, band)`.
    fn set_sample_f64(&mut self, x: i32, y: i32, band: usize, value: f64) -> Result<()>;

    /// Stores pixel `(x, y)` from `values`.
    fn set_pixel(&mut self, x: i32, y: i32, values: &[i32]) -> Result<()>;

    /// Stores pixel `(x, y)` from `f32` values.
    fn set_pixel_f32(&mut self, x: i32, y: i32, values: &[f32]) -> Result<()>;

    /// Stores pixel `(x, y)` from `f64` values.
    fn set_pixel_f64(&mut self, x: i32, y: i32, values: &[f64]) -> Result<()>;
}
