//! Fallback cursor family.
//!
//! Works for any [`ElementLayout`](raster_core::ElementLayout): banked or
//! interleaved, any strides, any element type. Each access resolves the
//! local coordinate through the layout and reads through the type-erased
//! [`DataBuffer`](raster_core::DataBuffer) accessors, so it pays a type
//! dispatch per sample. Use the [`interleaved`](crate::interleaved) family
//! when the layout allows it, or let the [`factory`](crate::factory) choose.
//!
//! # Example
//!
//! ```rust
//! use raster_core::{Rect, TiledRaster};
//! use raster_iter::fallback::RectIterFallback;
//! use raster_iter::RectIter;
//!
//! let mut raster = TiledRaster::builder(Rect::from_size(4, 4))
//!     .tile_size(2, 2)
//!     .bands(2)
//!     .banded(true)
//!     .build()?;
//! raster.fill_with(|x, y, b| (x + 4 * y) as f64 + b as f64)?;
//!
//! let mut it = RectIterFallback::new(&raster, Rect::new(1, 1, 2, 2))?;
//! let mut seen = Vec::new();
//! while !it.finished_lines() {
//!     it.start_pixels()?;
//!     while !it.finished_pixels() {
//!         seen.push(it.sample_band(1));
//!         it.next_pixel()?;
//!     }
//!     it.next_line()?;
//! }
//! assert_eq!(seen, vec![6, 7, 10, 11]);
//! # Ok::<(), raster_core::Error>(())
//! ```

use crate::addressing::GenericAddressing;
use crate::binding::{BufferView, ReadBinding};
use crate::random::RandomCursor;
use crate::scanner::{Bidirectional, Forward, Scanner};

/// Sequential read cursor for any layout.
pub type RectIterFallback<'a, S> = Scanner<ReadBinding<'a, S, BufferView<'a>>, GenericAddressing, Forward>;

/// Bidirectional read cursor for any layout.
pub type RookIterFallback<'a, S> = Scanner<ReadBinding<'a, S, BufferView<'a>>, GenericAddressing, Bidirectional>;

/// Random-access read cursor for any layout.
pub type RandomIterFallback<'a, S> = RandomCursor<ReadBinding<'a, S, BufferView<'a>>, GenericAddressing>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{RandomIter, RectIter, RookIter};
    use raster_core::{ElementType, Error, Rect, TiledImage, TiledRaster};

    fn banded() -> TiledRaster {
        let mut raster = TiledRaster::builder(Rect::from_size(5, 3))
            .tile_size(2, 2)
            .bands(3)
            .banded(true)
            .element_type(ElementType::F64)
            .build()
            .unwrap();
        raster
            .fill_with(|x, y, b| x as f64 + 10.0 * y as f64 + 0.25 * b as f64)
            .unwrap();
        raster
    }

    #[test]
    fn test_scan_banded_row_major() {
        let raster = banded();
        let mut it = RectIterFallback::new(&raster, raster.bounds()).unwrap();
        let mut out = Vec::new();
        while !it.finished_lines() {
            it.start_pixels().unwrap();
            while !it.finished_pixels() {
                let (x, y) = it.position();
                it.start_bands();
                while !it.finished_bands() {
                    assert_eq!(it.sample_f64(), x as f64 + 10.0 * y as f64 + 0.25 * it.band() as f64);
                    it.next_band();
                }
                out.push((x, y));
                it.next_pixel().unwrap();
            }
            it.next_line().unwrap();
        }
        assert_eq!(out.len(), 15);
        assert_eq!(out[5], (0, 1));
    }

    #[test]
    fn test_fetches_only_on_crossing() {
        let raster = banded();
        raster.reset_requests();
        let mut it = RectIterFallback::new(&raster, Rect::new(0, 0, 2, 2)).unwrap();
        while !it.finished_lines() {
            it.start_pixels().unwrap();
            while !it.next_pixel_done().unwrap() {}
            it.next_line().unwrap();
        }
        // whole region inside tile (0, 0)
        assert_eq!(raster.stats().requests, 1);
    }

    #[test]
    fn test_rook_backwards() {
        let raster = banded();
        let mut it = RookIterFallback::new(&raster, raster.bounds()).unwrap();
        it.end_lines().unwrap();
        it.end_pixels().unwrap();
        it.end_bands();
        let mut visited = 0;
        while !it.finished_lines_top() {
            it.end_pixels().unwrap();
            while !it.finished_pixels_left() {
                let (x, y) = it.position();
                assert_eq!(it.sample_band_f64(2), x as f64 + 10.0 * y as f64 + 0.5);
                visited += 1;
                it.prev_pixel().unwrap();
            }
            it.prev_line().unwrap();
        }
        assert_eq!(visited, 15);
        assert!(!it.prev_band_done());
        assert_eq!(it.band(), 1);
    }

    #[test]
    fn test_random_queries() {
        let raster = banded();
        let mut it = RandomIterFallback::new(&raster, Rect::new(1, 0, 3, 3)).unwrap();
        assert_eq!(it.sample_f64(3, 2, 1).unwrap(), 23.25);
        assert_eq!(it.sample(1, 0, 0).unwrap(), 1);
        let mut px = [0.0; 3];
        it.pixel_f64(2, 1, &mut px).unwrap();
        assert_eq!(px, [12.0, 12.25, 12.5]);

        let err = it.sample(0, 0, 0).unwrap_err();
        assert!(matches!(err, Error::OutOfBounds { position: 0, min: 1, max: 3, .. }));
        assert!(it.sample(1, 3, 0).unwrap_err().is_bounds_error());
    }

    #[test]
    fn test_empty_intersection_rejected() {
        let raster = banded();
        let err = RectIterFallback::new(&raster, Rect::new(5, 0, 2, 2)).err().unwrap();
        assert!(matches!(err, Error::InvalidRegion { .. }));
    }
}
