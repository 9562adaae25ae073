//! Element layout of a tile buffer.
//!
//! An [`ElementLayout`] describes how the bands of each pixel are packed into
//! the banks of a tile's [`DataBuffer`]. Every tile of an image shares the
//! same layout; tiles differ only in their data and origin translation.
//!
//! # Addressing
//!
//! For a pixel at local tile coordinates `(lx, ly)`:
//!
//! ```text
//! bank  = bank_indices[band]
//! index = band_offsets[band] + lx * pixel_stride + ly * scanline_stride
//! ```
//!
//! # Common Layouts
//!
//! ```text
//! interleaved (1 bank):   RGBRGBRGB...   pixel_stride = 3, offsets = [0, 1, 2]
//! banded      (3 banks):  RRR... GGG... BBB...   pixel_stride = 1, banks = [0, 1, 2]
//! ```
//!
//! Only component-interleaved layouts can be served by the fast-path
//! cursors; [`ElementLayout::is_component_interleaved`] is the test.
//!
//! # Usage
//!
//! ```rust
//! use raster_core::{DataBuffer, ElementLayout, ElementType};
//!
//! let layout = ElementLayout::interleaved(ElementType::U8, 3, 4).unwrap();
//! assert!(layout.is_component_interleaved());
//! assert_eq!(layout.element_index(1, 1, 2), (0, 17));
//!
//! let mut buf = DataBuffer::zeroed(ElementType::U8, 1, layout.buffer_len(4, 4));
//! layout.set_sample_i32(1, 1, 2, &mut buf, 99);
//! assert_eq!(layout.sample_i32(1, 1, 2, &buf), 99);
//! ```
//!
//! # Used By
//!
//! - [`crate::raster::TiledRaster`] - Allocates and validates tile buffers
//! - `raster-iter` fallback cursors - Generic per-element access

use crate::buffer::DataBuffer;
use crate::format::ElementType;
use crate::{Error, Result};

/// Description of how bands are packed into a tile buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementLayout {
    element_type: ElementType,
    num_bands: usize,
    pixel_stride: usize,
    scanline_stride: usize,
    bank_indices: Vec<usize>,
    band_offsets: Vec<usize>,
}

impl ElementLayout {
    /// Creates a layout from explicit strides and per-band tables.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LayoutMismatch`] if there are no bands, the tables
    /// are not one entry per band, or the pixel stride is zero.
    pub fn new(
        element_type: ElementType,
        pixel_stride: usize,
        scanline_stride: usize,
        bank_indices: Vec<usize>,
        band_offsets: Vec<usize>,
    ) -> Result<Self> {
        let num_bands = bank_indices.len();
        if num_bands == 0 {
            return Err(Error::layout_mismatch("layout has no bands"));
        }
        if band_offsets.len() != num_bands {
            return Err(Error::layout_mismatch(format!(
                "{} bank indices but {} band offsets",
                num_bands,
                band_offsets.len()
            )));
        }
        if pixel_stride == 0 {
            return Err(Error::layout_mismatch("pixel stride must be positive"));
        }
        Ok(Self {
            element_type,
            num_bands,
            pixel_stride,
            scanline_stride,
            bank_indices,
            band_offsets,
        })
    }

    /// Component-interleaved layout: one bank, bands adjacent per pixel.
    pub fn interleaved(element_type: ElementType, num_bands: usize, tile_width: u32) -> Result<Self> {
        Self::new(
            element_type,
            num_bands,
            num_bands * tile_width as usize,
            vec![0; num_bands],
            (0..num_bands).collect(),
        )
    }

    /// Fully banded layout: one bank per band.
    pub fn banded(element_type: ElementType, num_bands: usize, tile_width: u32) -> Result<Self> {
        Self::new(
            element_type,
            1,
            tile_width as usize,
            (0..num_bands).collect(),
            vec![0; num_bands],
        )
    }

    /// Element type of every band.
    #[inline]
    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    /// Number of bands per pixel.
    #[inline]
    pub fn num_bands(&self) -> usize {
        self.num_bands
    }

    /// Elements between horizontally adjacent pixels.
    #[inline]
    pub fn pixel_stride(&self) -> usize {
        self.pixel_stride
    }

    /// Elements between vertically adjacent pixels.
    #[inline]
    pub fn scanline_stride(&self) -> usize {
        self.scanline_stride
    }

    /// Bank holding each band.
    #[inline]
    pub fn bank_indices(&self) -> &[usize] {
        &self.bank_indices
    }

    /// Offset of each band within its bank.
    #[inline]
    pub fn band_offsets(&self) -> &[usize] {
        &self.band_offsets
    }

    /// Number of banks a tile buffer needs.
    pub fn num_banks(&self) -> usize {
        self.bank_indices.iter().copied().max().map_or(0, |b| b + 1)
    }

    /// Whether every band lives in bank 0 at offsets `0..num_bands`.
    pub fn is_component_interleaved(&self) -> bool {
        self.pixel_stride >= self.num_bands
            && self.bank_indices.iter().all(|&b| b == 0)
            && self.band_offsets.iter().copied().eq(0..self.num_bands)
    }

    /// Bank and index of `band` at local position `(lx, ly)`.
    #[inline]
    pub fn element_index(&self, lx: usize, ly: usize, band: usize) -> (usize, usize) {
        (
            self.bank_indices[band],
            self.band_offsets[band] + lx * self.pixel_stride + ly * self.scanline_stride,
        )
    }

    /// Minimum bank length for a `width x height` tile.
    pub fn buffer_len(&self, width: u32, height: u32) -> usize {
        if width == 0 || height == 0 {
            return 0;
        }
        let last = (width as usize - 1) * self.pixel_stride
            + (height as usize - 1) * self.scanline_stride;
        self.band_offsets.iter().map(|o| last + o + 1).max().unwrap_or(0)
    }

    /// Allocates a zero-filled buffer for a `width x height` tile.
    pub fn allocate(&self, width: u32, height: u32) -> DataBuffer {
        DataBuffer::zeroed(self.element_type, self.num_banks(), self.buffer_len(width, height))
    }

    /// Checks that `buffer` can hold a `width x height` tile in this layout.
    ///
    /// # Errors
    ///
    /// [`Error::ElementTypeMismatch`] on a type difference,
    /// [`Error::LayoutMismatch`] if a bank is missing or too short.
    pub fn validate(&self, buffer: &DataBuffer, width: u32, height: u32) -> Result<()> {
        if buffer.element_type() != self.element_type {
            return Err(Error::element_type_mismatch(self.element_type, buffer.element_type()));
        }
        if buffer.num_banks() < self.num_banks() {
            return Err(Error::layout_mismatch(format!(
                "buffer has {} banks, layout needs {}",
                buffer.num_banks(),
                self.num_banks()
            )));
        }
        let need = self.buffer_len(width, height);
        for bank in 0..self.num_banks() {
            if buffer.bank_len(bank) < need {
                return Err(Error::layout_mismatch(format!(
                    "bank {} holds {} elements, {}x{} tile needs {}",
                    bank,
                    buffer.bank_len(bank),
                    width,
                    height,
                    need
                )));
            }
        }
        Ok(())
    }

    /// Reads a sample as `i32`.
    #[inline]
    pub fn sample_i32(&self, lx: usize, ly: usize, band: usize, buffer: &DataBuffer) -> i32 {
        let (bank, idx) = self.element_index(lx, ly, band);
        buffer.get_i32(bank, idx)
    }

    /// Reads a sample as `f32`.
    #[inline]
    pub fn sample_f32(&self, lx: usize, ly: usize, band: usize, buffer: &DataBuffer) -> f32 {
        let (bank, idx) = self.element_index(lx, ly, band);
        buffer.get_f32(bank, idx)
    }

    /// Reads a sample as `f64`.
    #[inline]
    pub fn sample_f64(&self, lx: usize, ly: usize, band: usize, buffer: &DataBuffer) -> f64 {
        let (bank, idx) = self.element_index(lx, ly, band);
        buffer.get_f64(bank, idx)
    }

    /// Writes a sample from an `i32`.
    #[inline]
    pub fn set_sample_i32(&self, lx: usize, ly: usize, band: usize, buffer: &mut DataBuffer, value: i32) {
        let (bank, idx) = self.element_index(lx, ly, band);
        buffer.set_i32(bank, idx, value);
    }

    /// Writes a sample from an `f32`.
    #[inline]
    pub fn set_sample_f32(&self, lx: usize, ly: usize, band: usize, buffer: &mut DataBuffer, value: f32) {
        let (bank, idx) = self.element_index(lx, ly, band);
        buffer.set_f32(bank, idx, value);
    }

    /// Writes a sample from an `f64`.
    #[inline]
    pub fn set_sample_f64(&self, lx: usize, ly: usize, band: usize, buffer: &mut DataBuffer, value: f64) {
        let (bank, idx) = self.element_index(lx, ly, band);
        buffer.set_f64(bank, idx, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interleaved() {
        let layout = ElementLayout::interleaved(ElementType::F32, 4, 8).unwrap();
        assert_eq!(layout.pixel_stride(), 4);
        assert_eq!(layout.scanline_stride(), 32);
        assert_eq!(layout.num_banks(), 1);
        assert!(layout.is_component_interleaved());
        assert_eq!(layout.element_index(2, 3, 1), (0, 1 + 8 + 96));
        assert_eq!(layout.buffer_len(8, 8), 256);
    }

    #[test]
    fn test_banded() {
        let layout = ElementLayout::banded(ElementType::U8, 3, 5).unwrap();
        assert_eq!(layout.num_banks(), 3);
        assert!(!layout.is_component_interleaved());
        assert_eq!(layout.element_index(4, 2, 2), (2, 14));
        assert_eq!(layout.buffer_len(5, 3), 15);
    }

    #[test]
    fn test_single_band_banded_is_interleaved() {
        let layout = ElementLayout::banded(ElementType::F64, 1, 16).unwrap();
        assert!(layout.is_component_interleaved());
    }

    #[test]
    fn test_padded_pixel_stride_still_interleaved() {
        // RGB stored in 4-element pixels
        let layout = ElementLayout::new(ElementType::U8, 4, 16, vec![0; 3], vec![0, 1, 2]).unwrap();
        assert!(layout.is_component_interleaved());
        assert_eq!(layout.buffer_len(4, 4), 3 * 4 + 3 * 16 + 3);
    }

    #[test]
    fn test_swapped_offsets_not_interleaved() {
        let layout = ElementLayout::new(ElementType::U8, 3, 12, vec![0; 3], vec![2, 1, 0]).unwrap();
        assert!(!layout.is_component_interleaved());
    }

    #[test]
    fn test_invalid_layouts() {
        assert!(ElementLayout::new(ElementType::U8, 1, 1, vec![], vec![]).is_err());
        assert!(ElementLayout::new(ElementType::U8, 1, 1, vec![0, 0], vec![0]).is_err());
        assert!(ElementLayout::new(ElementType::U8, 0, 1, vec![0], vec![0]).is_err());
    }

    #[test]
    fn test_validate() {
        let layout = ElementLayout::banded(ElementType::U8, 2, 4).unwrap();
        assert!(layout.validate(&layout.allocate(4, 4), 4, 4).is_ok());

        let short = DataBuffer::zeroed(ElementType::U8, 2, 15);
        assert!(layout.validate(&short, 4, 4).unwrap_err().is_layout_error());

        let one_bank = DataBuffer::zeroed(ElementType::U8, 1, 16);
        assert!(layout.validate(&one_bank, 4, 4).is_err());

        let wrong_type = DataBuffer::zeroed(ElementType::F32, 2, 16);
        assert!(matches!(
            layout.validate(&wrong_type, 4, 4),
            Err(Error::ElementTypeMismatch { .. })
        ));
    }

    #[test]
    fn test_type_erased_samples() {
        let layout = ElementLayout::banded(ElementType::F64, 2, 2).unwrap();
        let mut buf = layout.allocate(2, 2);
        layout.set_sample_f64(1, 1, 1, &mut buf, 2.75);
        assert_eq!(layout.sample_f64(1, 1, 1, &buf), 2.75);
        assert_eq!(layout.sample_i32(1, 1, 1, &buf), 2);
        assert_eq!(layout.sample_f32(1, 1, 0, &buf), 0.0);
    }
}
