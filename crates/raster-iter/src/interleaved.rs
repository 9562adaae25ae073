//! Fast-path cursor family for component-interleaved layouts.
//!
//! These cursors only accept layouts where every band of a pixel sits in
//! bank 0 at offsets `0..num_bands` (see
//! [`ElementLayout::is_component_interleaved`](raster_core::ElementLayout::is_component_interleaved)).
//! In exchange they:
//!
//! - keep a flat offset that single steps update by one stride
//! - rebase a small band-offset table on tile crossings instead of
//!   recomputing positions
//! - read from a cached `&[T]`, monomorphized per element type, so the
//!   innermost loop has no type dispatch
//!
//! Construction fails with
//! [`Error::LayoutMismatch`](raster_core::Error::LayoutMismatch) for a
//! non-interleaved layout and with
//! [`Error::ElementTypeMismatch`](raster_core::Error::ElementTypeMismatch)
//! when `T` differs from the layout's element type.
//!
//! # Example
//!
//! ```rust
//! use raster_core::{ElementType, Rect, TiledRaster};
//! use raster_iter::interleaved::RectIterF32;
//! use raster_iter::RectIter;
//!
//! let mut raster = TiledRaster::builder(Rect::from_size(8, 8))
//!     .tile_size(4, 4)
//!     .bands(4)
//!     .element_type(ElementType::F32)
//!     .build()?;
//! raster.fill_tile(1, 1, &[0.5, 0.25, 0.125, 1.0])?;
//!
//! let mut it = RectIterF32::new(&raster, Rect::new(4, 4, 4, 4))?;
//! assert_eq!(it.elem_band(3), 1.0);
//! it.jump_pixels(2)?;
//! assert_eq!(it.elem_band(1), 0.25);
//! # Ok::<(), raster_core::Error>(())
//! ```

use crate::addressing::InterleavedAddressing;
use crate::binding::{ReadBinding, SliceView};
use crate::random::RandomCursor;
use crate::scanner::{Bidirectional, Forward, Scanner};

/// Sequential read cursor over interleaved elements of type `T`.
pub type RectIterInterleaved<'a, S, T> = Scanner<ReadBinding<'a, S, SliceView<'a, T>>, InterleavedAddressing, Forward>;

/// Bidirectional read cursor over interleaved elements of type `T`.
pub type RookIterInterleaved<'a, S, T> =
    Scanner<ReadBinding<'a, S, SliceView<'a, T>>, InterleavedAddressing, Bidirectional>;

/// Random-access read cursor over interleaved elements of type `T`.
pub type RandomIterInterleaved<'a, S, T> = RandomCursor<ReadBinding<'a, S, SliceView<'a, T>>, InterleavedAddressing>;

/// Sequential cursor over interleaved `u8`.
pub type RectIterU8<'a, S> = RectIterInterleaved<'a, S, u8>;
/// Sequential cursor over interleaved `f32`.
pub type RectIterF32<'a, S> = RectIterInterleaved<'a, S, f32>;
/// Sequential cursor over interleaved `f64`.
pub type RectIterF64<'a, S> = RectIterInterleaved<'a, S, f64>;

/// Bidirectional cursor over interleaved `u8`.
pub type RookIterU8<'a, S> = RookIterInterleaved<'a, S, u8>;
/// Bidirectional cursor over interleaved `f32`.
pub type RookIterF32<'a, S> = RookIterInterleaved<'a, S, f32>;
/// Bidirectional cursor over interleaved `f64`.
pub type RookIterF64<'a, S> = RookIterInterleaved<'a, S, f64>;

/// Random-access cursor over interleaved `u8`.
pub type RandomIterU8<'a, S> = RandomIterInterleaved<'a, S, u8>;
/// Random-access cursor over interleaved `f32`.
pub type RandomIterF32<'a, S> = RandomIterInterleaved<'a, S, f32>;
/// Random-access cursor over interleaved `f64`.
pub type RandomIterF64<'a, S> = RandomIterInterleaved<'a, S, f64>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{RandomIter, RectIter, RookIter};
    use raster_core::{ElementType, Error, Rect, TiledImage, TiledRaster};

    fn u8_raster(padding: u32) -> TiledRaster {
        let mut raster = TiledRaster::builder(Rect::new(-3, 2, 7, 5))
            .tile_size(3, 2)
            .grid_offset(-4, 1)
            .padding(padding, padding)
            .bands(2)
            .build()
            .unwrap();
        raster
            .fill_with(|x, y, b| ((x + 3) + 10 * (y - 2) + 100 * b as i32) as f64)
            .unwrap();
        raster
    }

    #[test]
    fn test_rejects_banded_layout() {
        let raster = TiledRaster::builder(Rect::from_size(4, 4))
            .bands(3)
            .banded(true)
            .build()
            .unwrap();
        let err = RectIterU8::new(&raster, raster.bounds()).err().unwrap();
        assert!(matches!(err, Error::LayoutMismatch { .. }));
    }

    #[test]
    fn test_rejects_wrong_element_type() {
        let raster = u8_raster(0);
        let err = RectIterF32::new(&raster, raster.bounds()).err().unwrap();
        assert!(matches!(
            err,
            Error::ElementTypeMismatch { expected: ElementType::F32, got: ElementType::U8 }
        ));
        assert!(RandomIterF64::new(&raster, raster.bounds()).is_err());
    }

    #[test]
    fn test_scan_negative_offsets_and_padding() {
        for padding in [0, 2] {
            let raster = u8_raster(padding);
            let mut it = RectIterU8::new(&raster, raster.bounds()).unwrap();
            let mut count = 0;
            while !it.finished_lines() {
                it.start_pixels().unwrap();
                while !it.finished_pixels() {
                    let (x, y) = it.position();
                    assert_eq!(it.elem_band(0) as i32, (x + 3) + 10 * (y - 2), "at ({x},{y})");
                    assert_eq!(it.sample_band(1), (x + 3) + 10 * (y - 2) + 100);
                    count += 1;
                    it.next_pixel().unwrap();
                }
                it.next_line().unwrap();
            }
            assert_eq!(count, 35);
        }
    }

    #[test]
    fn test_rook_jumps_across_tiles() {
        let raster = u8_raster(1);
        let mut it = RookIterU8::new(&raster, raster.bounds()).unwrap();
        it.jump_pixels(5).unwrap();
        it.jump_lines(3).unwrap();
        assert_eq!(it.position(), (2, 5));
        assert_eq!(it.sample(), 5 + 30);
        it.prev_pixel().unwrap();
        it.prev_line().unwrap();
        assert_eq!(it.sample(), 4 + 20);
        it.end_lines().unwrap();
        it.end_pixels().unwrap();
        assert_eq!(it.sample_band(1), 6 + 40 + 100);
    }

    #[test]
    fn test_random_elem() {
        let raster = u8_raster(0);
        let mut it = RandomIterU8::new(&raster, raster.bounds()).unwrap();
        assert_eq!(it.elem(3, 6, 1).unwrap(), 6 + 40 + 100);
        assert_eq!(it.elem(-3, 2, 0).unwrap(), 0);
        let mut px = [0; 2];
        it.pixel(0, 4, &mut px).unwrap();
        assert_eq!(px, [23, 123]);
        assert!(it.elem(4, 2, 0).is_err());
    }
}
