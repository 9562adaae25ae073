//! Banked element storage for one tile.
//!
//! A [`DataBuffer`] holds one or more banks of a single element type. Fully
//! interleaved layouts use one bank; fully banded layouts use one bank per
//! band. Which bank and index a sample lives at is decided by
//! [`ElementLayout`](crate::ElementLayout), not by the buffer.
//!
//! The `get_*`/`set_*` methods are the type-erased accessors: they dispatch
//! on the element type for every call and convert with the rules described
//! in [`format`](crate::format). Hot loops should use the typed bank views
//! from [`Element::bank`](crate::Element::bank) instead.
//!
//! ```rust
//! use raster_core::{DataBuffer, ElementType};
//!
//! let mut buf = DataBuffer::zeroed(ElementType::U8, 1, 4);
//! buf.set_f64(0, 2, 42.9);
//! assert_eq!(buf.get_i32(0, 2), 42);
//! assert_eq!(buf.get_f32(0, 2), 42.0);
//! ```

use crate::format::{Element, ElementType};

/// Banked element buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum DataBuffer {
    /// 8-bit unsigned banks.
    U8(Vec<Vec<u8>>),
    /// 32-bit float banks.
    F32(Vec<Vec<f32>>),
    /// 64-bit float banks.
    F64(Vec<Vec<f64>>),
}

/// Applies `$body` to the banks of `$buf` whatever their element type.
macro_rules! with_banks {
    ($buf:expr, $banks:ident => $body:expr) => {
        match $buf {
            DataBuffer::U8($banks) => $body,
            DataBuffer::F32($banks) => $body,
            DataBuffer::F64($banks) => $body,
        }
    };
}

impl DataBuffer {
    /// Creates a zero-filled buffer with `num_banks` banks of `len` elements.
    pub fn zeroed(element_type: ElementType, num_banks: usize, len: usize) -> Self {
        match element_type {
            ElementType::U8 => Self::U8(vec![vec![0; len]; num_banks]),
            ElementType::F32 => Self::F32(vec![vec![0.0; len]; num_banks]),
            ElementType::F64 => Self::F64(vec![vec![0.0; len]; num_banks]),
        }
    }

    /// Creates a buffer from typed banks.
    pub fn from_banks<T: Element>(banks: Vec<Vec<T>>) -> Self {
        T::into_buffer(banks)
    }

    /// Element type of every bank.
    #[inline]
    pub fn element_type(&self) -> ElementType {
        match self {
            Self::U8(_) => ElementType::U8,
            Self::F32(_) => ElementType::F32,
            Self::F64(_) => ElementType::F64,
        }
    }

    /// Number of banks.
    #[inline]
    pub fn num_banks(&self) -> usize {
        with_banks!(self, banks => banks.len())
    }

    /// Number of elements in `bank`, or 0 if the bank does not exist.
    #[inline]
    pub fn bank_len(&self, bank: usize) -> usize {
        with_banks!(self, banks => banks.get(bank).map_or(0, Vec::len))
    }

    /// Reads an element as `i32`.
    ///
    /// # Panics
    ///
    /// Panics if `bank` or `index` is out of range.
    #[inline]
    pub fn get_i32(&self, bank: usize, index: usize) -> i32 {
        with_banks!(self, banks => banks[bank][index].to_i32())
    }

    /// Reads an element as `f32`.
    #[inline]
    pub fn get_f32(&self, bank: usize, index: usize) -> f32 {
        with_banks!(self, banks => banks[bank][index].to_f32())
    }

    /// Reads an element as `f64`.
    #[inline]
    pub fn get_f64(&self, bank: usize, index: usize) -> f64 {
        with_banks!(self, banks => banks[bank][index].to_f64())
    }

    /// Writes an `i32`, narrowing to the element type.
    ///
    /// # Panics
    ///
    /// Panics if `bank` or `index` is out of range.
    #[inline]
    pub fn set_i32(&mut self, bank: usize, index: usize, value: i32) {
        with_banks!(self, banks => banks[bank][index] = Element::from_i32(value))
    }

    /// Writes an `f32`, narrowing to the element type.
    #[inline]
    pub fn set_f32(&mut self, bank: usize, index: usize, value: f32) {
        with_banks!(self, banks => banks[bank][index] = Element::from_f32(value))
    }

    /// Writes an `f64`, narrowing to the element type.
    #[inline]
    pub fn set_f64(&mut self, bank: usize, index: usize, value: f64) {
        with_banks!(self, banks => banks[bank][index] = Element::from_f64(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_zeroed() {
        let buf = DataBuffer::zeroed(ElementType::F64, 3, 10);
        assert_eq!(buf.element_type(), ElementType::F64);
        assert_eq!(buf.num_banks(), 3);
        assert_eq!(buf.bank_len(2), 10);
        assert_eq!(buf.bank_len(3), 0);
        assert_eq!(buf.get_f64(1, 9), 0.0);
    }

    #[test]
    fn test_from_banks() {
        let buf = DataBuffer::from_banks(vec![vec![1.5f32, 2.5], vec![3.5, 4.5]]);
        assert_eq!(buf.element_type(), ElementType::F32);
        assert_eq!(buf.get_f32(1, 0), 3.5);
        assert_eq!(buf.get_i32(0, 1), 2);
    }

    #[test]
    fn test_type_erased_round_trip() {
        let mut buf = DataBuffer::zeroed(ElementType::U8, 1, 2);
        buf.set_i32(0, 0, 511);
        assert_eq!(buf.get_i32(0, 0), 255);
        buf.set_f32(0, 1, -0.5);
        assert_eq!(buf.get_i32(0, 1), 0);

        let mut buf = DataBuffer::zeroed(ElementType::F32, 1, 1);
        buf.set_f64(0, 0, 1.0 / 3.0);
        assert_eq!(buf.get_f64(0, 0), (1.0f64 / 3.0) as f32 as f64);
        assert_relative_eq!(buf.get_f64(0, 0), 1.0 / 3.0, epsilon = 1e-7);
    }

    #[test]
    #[should_panic]
    fn test_out_of_range_panics() {
        let buf = DataBuffer::zeroed(ElementType::U8, 1, 2);
        buf.get_i32(0, 2);
    }
}
