//! Element types stored in tile buffers.
//!
//! # Types
//!
//! - [`ElementType`] - Runtime tag for the element type of a layout or buffer
//! - [`Element`] - Trait implemented by `u8`, `f32` and `f64`, giving the
//!   conversions used by the type-erased accessors and the typed bank views
//!   used by the fast-path cursors
//!
//! # Conversions
//!
//! The type-erased accessors convert between the stored element and the
//! requested representation:
//!
//! | stored | as `i32`              | as `f32`        | as `f64`  |
//! |--------|-----------------------|-----------------|-----------|
//! | `u8`   | zero-extended         | exact           | exact     |
//! | `f32`  | truncated, saturating | exact           | exact     |
//! | `f64`  | truncated, saturating | rounded         | exact     |
//!
//! Storing narrows the other way: integers keep their low 8 bits when written
//! to `u8`, floats are truncated toward zero first (NaN becomes 0).
//!
//! ```rust
//! use raster_core::{Element, ElementType};
//!
//! assert_eq!(u8::TYPE, ElementType::U8);
//! assert_eq!(u8::from_i32(300), 44);
//! assert_eq!(u8::from_f32(7.9), 7);
//! assert_eq!(f32::from_f64(0.1).to_f64(), 0.1f32 as f64);
//! assert_eq!(f64::NAN.to_i32(), 0);
//! ```

use crate::buffer::DataBuffer;

/// Runtime element type of a tile buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ElementType {
    /// 8-bit unsigned integer.
    #[default]
    U8,
    /// 32-bit single-precision float.
    F32,
    /// 64-bit double-precision float.
    F64,
}

impl ElementType {
    /// Number of bytes per element.
    #[inline]
    pub const fn bytes(&self) -> usize {
        match self {
            Self::U8 => 1,
            Self::F32 => 4,
            Self::F64 => 8,
        }
    }

    /// Whether this is a floating-point type.
    #[inline]
    pub const fn is_float(&self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    /// Value representing full intensity.
    ///
    /// 255 for `u8`, 1.0 for the float types. Used to normalize alpha.
    #[inline]
    pub const fn unit(&self) -> f64 {
        match self {
            Self::U8 => 255.0,
            Self::F32 | Self::F64 => 1.0,
        }
    }

    /// Short name for display.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::U8 => "u8",
            Self::F32 => "f32",
            Self::F64 => "f64",
        }
    }

    /// Parses the short name produced by [`name`](Self::name).
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "u8" | "byte" => Some(Self::U8),
            "f32" | "float" => Some(Self::F32),
            "f64" | "double" => Some(Self::F64),
            _ => None,
        }
    }
}

impl std::fmt::Display for ElementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Trait for element types a tile buffer can hold.
///
/// Implemented for `u8`, `f32` and `f64`. The fast-path cursors are generic
/// over this trait, so each element type gets its own monomorphized sample
/// path.
pub trait Element: Copy + Default + PartialEq + PartialOrd + std::fmt::Debug + Send + Sync + 'static {
    /// Runtime tag for this type.
    const TYPE: ElementType;

    /// Converts to `i32` (floats truncate toward zero and saturate).
    fn to_i32(self) -> i32;

    /// Converts to `f32`.
    fn to_f32(self) -> f32;

    /// Converts to `f64`.
    fn to_f64(self) -> f64;

    /// Converts from `i32` (narrowing keeps the low bits).
    fn from_i32(v: i32) -> Self;

    /// Converts from `f32`.
    fn from_f32(v: f32) -> Self;

    /// Converts from `f64`.
    fn from_f64(v: f64) -> Self;

    /// Wraps typed banks into a [`DataBuffer`].
    fn into_buffer(banks: Vec<Vec<Self>>) -> DataBuffer;

    /// Borrows the banks of `buffer` if it holds this element type.
    fn banks(buffer: &DataBuffer) -> Option<&[Vec<Self>]>;

    /// Mutably borrows the banks of `buffer` if it holds this element type.
    fn banks_mut(buffer: &mut DataBuffer) -> Option<&mut [Vec<Self>]>;

    /// Borrows one bank of `buffer` if it holds this element type.
    #[inline]
    fn bank(buffer: &DataBuffer, bank: usize) -> Option<&[Self]> {
        Self::banks(buffer)?.get(bank).map(Vec::as_slice)
    }

    /// Mutably borrows one bank of `buffer` if it holds this element type.
    #[inline]
    fn bank_mut(buffer: &mut DataBuffer, bank: usize) -> Option<&mut [Self]> {
        Self::banks_mut(buffer)?.get_mut(bank).map(Vec::as_mut_slice)
    }
}

impl Element for u8 {
    const TYPE: ElementType = ElementType::U8;

    #[inline]
    fn into_buffer(banks: Vec<Vec<Self>>) -> DataBuffer {
        DataBuffer::U8(banks)
    }

    #[inline]
    fn to_i32(self) -> i32 {
        self as i32
    }

    #[inline]
    fn to_f32(self) -> f32 {
        self as f32
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_i32(v: i32) -> Self {
        v as u8
    }

    #[inline]
    fn from_f32(v: f32) -> Self {
        (v as i32) as u8
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        (v as i32) as u8
    }

    #[inline]
    fn banks(buffer: &DataBuffer) -> Option<&[Vec<Self>]> {
        match buffer {
            DataBuffer::U8(banks) => Some(banks),
            _ => None,
        }
    }

    #[inline]
    fn banks_mut(buffer: &mut DataBuffer) -> Option<&mut [Vec<Self>]> {
        match buffer {
            DataBuffer::U8(banks) => Some(banks),
            _ => None,
        }
    }
}

impl Element for f32 {
    const TYPE: ElementType = ElementType::F32;

    #[inline]
    fn into_buffer(banks: Vec<Vec<Self>>) -> DataBuffer {
        DataBuffer::F32(banks)
    }

    #[inline]
    fn to_i32(self) -> i32 {
        self as i32
    }

    #[inline]
    fn to_f32(self) -> f32 {
        self
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_i32(v: i32) -> Self {
        v as f32
    }

    #[inline]
    fn from_f32(v: f32) -> Self {
        v
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v as f32
    }

    #[inline]
    fn banks(buffer: &DataBuffer) -> Option<&[Vec<Self>]> {
        match buffer {
            DataBuffer::F32(banks) => Some(banks),
            _ => None,
        }
    }

    #[inline]
    fn banks_mut(buffer: &mut DataBuffer) -> Option<&mut [Vec<Self>]> {
        match buffer {
            DataBuffer::F32(banks) => Some(banks),
            _ => None,
        }
    }
}

impl Element for f64 {
    const TYPE: ElementType = ElementType::F64;

    #[inline]
    fn into_buffer(banks: Vec<Vec<Self>>) -> DataBuffer {
        DataBuffer::F64(banks)
    }

    #[inline]
    fn to_i32(self) -> i32 {
        self as i32
    }

    #[inline]
    fn to_f32(self) -> f32 {
        self as f32
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }

    #[inline]
    fn from_i32(v: i32) -> Self {
        v as f64
    }

    #[inline]
    fn from_f32(v: f32) -> Self {
        v as f64
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v
    }

    #[inline]
    fn banks(buffer: &DataBuffer) -> Option<&[Vec<Self>]> {
        match buffer {
            DataBuffer::F64(banks) => Some(banks),
            _ => None,
        }
    }

    #[inline]
    fn banks_mut(buffer: &mut DataBuffer) -> Option<&mut [Vec<Self>]> {
        match buffer {
            DataBuffer::F64(banks) => Some(banks),
            _ => None,
        }
    }
}
