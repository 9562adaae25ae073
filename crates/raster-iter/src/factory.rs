//! Cursor selection by layout.
//!
//! The `create_*` functions inspect the source's [`ElementLayout`] once and
//! build the fastest cursor that can serve it:
//!
//! | Layout                              | Cursor                 |
//! |-------------------------------------|------------------------|
//! | component-interleaved `u8`          | [`CursorKind::U8`]     |
//! | component-interleaved `f32`         | [`CursorKind::F32`]    |
//! | component-interleaved `f64`         | [`CursorKind::F64`]    |
//! | anything else (banded, gaps, ...)   | [`CursorKind::Fallback`] |
//!
//! The result is an enum implementing the same traits as the cursor it
//! wraps, so callers write their loop once. The enum match happens per
//! call; code that wants the typed fast path without it should name the
//! concrete cursor from [`interleaved`](crate::interleaved) instead.
//!
//! # Example
//!
//! ```rust
//! use raster_core::{ElementType, Rect, TiledRaster};
//! use raster_iter::factory::{self, CursorKind};
//! use raster_iter::RectIter;
//!
//! let raster = TiledRaster::builder(Rect::from_size(16, 16))
//!     .element_type(ElementType::F32)
//!     .bands(3)
//!     .build()?;
//! let it = factory::create_rect(&raster, Rect::from_size(16, 16))?;
//! assert_eq!(it.kind(), CursorKind::F32);
//! assert_eq!(it.num_bands(), 3);
//! # Ok::<(), raster_core::Error>(())
//! ```

use std::fmt;

use raster_core::{ElementLayout, ElementType, Rect, Result, TiledImage, WritableTiledImage};
use tracing::debug;

use crate::fallback::{RandomIterFallback, RectIterFallback, RookIterFallback};
use crate::interleaved::{
    RandomIterF32, RandomIterF64, RandomIterU8, RectIterF32, RectIterF64, RectIterU8, RookIterF32, RookIterF64,
    RookIterU8,
};
use crate::traits::{RandomIter, RectIter, RookIter, WritableRandomIter, WritableRectIter};
use crate::writable::{
    WritableRandomIterF32, WritableRandomIterF64, WritableRandomIterFallback, WritableRandomIterU8,
    WritableRectIterF32, WritableRectIterF64, WritableRectIterFallback, WritableRectIterU8, WritableRookIterF32,
    WritableRookIterF64, WritableRookIterFallback, WritableRookIterU8,
};

/// Cursor family picked for a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CursorKind {
    /// Generic accessors, any layout.
    Fallback,
    /// Interleaved `u8` fast path.
    U8,
    /// Interleaved `f32` fast path.
    F32,
    /// Interleaved `f64` fast path.
    F64,
}

impl CursorKind {
    /// Picks the cursor family for `layout`.
    pub fn select(layout: &ElementLayout) -> Self {
        if !layout.is_component_interleaved() {
            return Self::Fallback;
        }
        match layout.element_type() {
            ElementType::U8 => Self::U8,
            ElementType::F32 => Self::F32,
            ElementType::F64 => Self::F64,
        }
    }

    /// Whether this is one of the typed fast paths.
    pub fn is_fast_path(self) -> bool {
        self != Self::Fallback
    }
}

impl fmt::Display for CursorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Fallback => "fallback",
            Self::U8 => "interleaved-u8",
            Self::F32 => "interleaved-f32",
            Self::F64 => "interleaved-f64",
        };
        f.write_str(name)
    }
}

fn select_logged(layout: &ElementLayout, bounds: Rect, discipline: &str) -> CursorKind {
    let kind = CursorKind::select(layout);
    debug!(%kind, %bounds, discipline, bands = layout.num_bands(), "Selected cursor");
    kind
}

macro_rules! dispatch {
    ($name:ident, $value:expr, $it:ident => $body:expr) => {
        match $value {
            $name::Fallback($it) => $body,
            $name::U8($it) => $body,
            $name::F32($it) => $body,
            $name::F64($it) => $body,
        }
    };
}

macro_rules! any_cursor {
    ($(#[$meta:meta])* $name:ident<$bound:ident> { $fallback:ident, $u8:ident, $f32:ident, $f64:ident }) => {
        $(#[$meta])*
        pub enum $name<'a, S: $bound + ?Sized> {
            /// Generic cursor.
            Fallback($fallback<'a, S>),
            /// Interleaved `u8` cursor.
            U8($u8<'a, S>),
            /// Interleaved `f32` cursor.
            F32($f32<'a, S>),
            /// Interleaved `f64` cursor.
            F64($f64<'a, S>),
        }

        impl<'a, S: $bound + ?Sized> $name<'a, S> {
            /// Family of the wrapped cursor.
            pub fn kind(&self) -> CursorKind {
                match self {
                    Self::Fallback(_) => CursorKind::Fallback,
                    Self::U8(_) => CursorKind::U8,
                    Self::F32(_) => CursorKind::F32,
                    Self::F64(_) => CursorKind::F64,
                }
            }
        }
    };
}

macro_rules! impl_rect_iter {
    ($name:ident<$bound:ident>) => {
        impl<'a, S: $bound + ?Sized> RectIter for $name<'a, S> {
            fn bounds(&self) -> Rect {
                dispatch!($name, self, it => RectIter::bounds(it))
            }
            fn num_bands(&self) -> usize {
                dispatch!($name, self, it => RectIter::num_bands(it))
            }
            fn position(&self) -> (i32, i32) {
                dispatch!($name, self, it => it.position())
            }
            fn band(&self) -> usize {
                dispatch!($name, self, it => it.band())
            }
            fn start_lines(&mut self) -> Result<()> {
                dispatch!($name, self, it => it.start_lines())
            }
            fn next_line(&mut self) -> Result<()> {
                dispatch!($name, self, it => it.next_line())
            }
            fn jump_lines(&mut self, n: i32) -> Result<()> {
                dispatch!($name, self, it => it.jump_lines(n))
            }
            fn finished_lines(&self) -> bool {
                dispatch!($name, self, it => it.finished_lines())
            }
            fn start_pixels(&mut self) -> Result<()> {
                dispatch!($name, self, it => it.start_pixels())
            }
            fn next_pixel(&mut self) -> Result<()> {
                dispatch!($name, self, it => it.next_pixel())
            }
            fn jump_pixels(&mut self, n: i32) -> Result<()> {
                dispatch!($name, self, it => it.jump_pixels(n))
            }
            fn finished_pixels(&self) -> bool {
                dispatch!($name, self, it => it.finished_pixels())
            }
            fn start_bands(&mut self) {
                dispatch!($name, self, it => it.start_bands())
            }
            fn next_band(&mut self) {
                dispatch!($name, self, it => it.next_band())
            }
            fn finished_bands(&self) -> bool {
                dispatch!($name, self, it => it.finished_bands())
            }
            fn sample_band(&self, band: usize) -> i32 {
                dispatch!($name, self, it => it.sample_band(band))
            }
            fn sample_band_f32(&self, band: usize) -> f32 {
                dispatch!($name, self, it => it.sample_band_f32(band))
            }
            fn sample_band_f64(&self, band: usize) -> f64 {
                dispatch!($name, self, it => it.sample_band_f64(band))
            }
        }
    };
}

macro_rules! impl_rook_iter {
    ($name:ident<$bound:ident>) => {
        impl<'a, S: $bound + ?Sized> RookIter for $name<'a, S> {
            fn end_lines(&mut self) -> Result<()> {
                dispatch!($name, self, it => it.end_lines())
            }
            fn prev_line(&mut self) -> Result<()> {
                dispatch!($name, self, it => it.prev_line())
            }
            fn finished_lines_top(&self) -> bool {
                dispatch!($name, self, it => it.finished_lines_top())
            }
            fn end_pixels(&mut self) -> Result<()> {
                dispatch!($name, self, it => it.end_pixels())
            }
            fn prev_pixel(&mut self) -> Result<()> {
                dispatch!($name, self, it => it.prev_pixel())
            }
            fn finished_pixels_left(&self) -> bool {
                dispatch!($name, self, it => it.finished_pixels_left())
            }
            fn end_bands(&mut self) {
                dispatch!($name, self, it => it.end_bands())
            }
            fn prev_band(&mut self) {
                dispatch!($name, self, it => it.prev_band())
            }
            fn finished_bands_top(&self) -> bool {
                dispatch!($name, self, it => it.finished_bands_top())
            }
        }
    };
}

macro_rules! impl_writable_rect_iter {
    ($name:ident) => {
        impl<'a, S: WritableTiledImage + ?Sized> WritableRectIter for $name<'a, S> {
            fn set_sample_band(&mut self, band: usize, value: i32) {
                dispatch!($name, self, it => it.set_sample_band(band, value))
            }
            fn set_sample_band_f32(&mut self, band: usize, value: f32) {
                dispatch!($name, self, it => it.set_sample_band_f32(band, value))
            }
            fn set_sample_band_f64(&mut self, band: usize, value: f64) {
                dispatch!($name, self, it => it.set_sample_band_f64(band, value))
            }
            fn done(&mut self) -> Result<()> {
                dispatch!($name, self, it => WritableRectIter::done(it))
            }
        }
    };
}

macro_rules! impl_random_iter {
    ($name:ident<$bound:ident>) => {
        impl<'a, S: $bound + ?Sized> RandomIter for $name<'a, S> {
            fn bounds(&self) -> Rect {
                dispatch!($name, self, it => RandomIter::bounds(it))
            }
            fn num_bands(&self) -> usize {
                dispatch!($name, self, it => RandomIter::num_bands(it))
            }
            fn sample(&mut self, x: i32, y: i32, band: usize) -> Result<i32> {
                dispatch!($name, self, it => RandomIter::sample(it, x, y, band))
            }
            fn sample_f32(&mut self, x: i32, y: i32, band: usize) -> Result<f32> {
                dispatch!($name, self, it => RandomIter::sample_f32(it, x, y, band))
            }
            fn sample_f64(&mut self, x: i32, y: i32, band: usize) -> Result<f64> {
                dispatch!($name, self, it => RandomIter::sample_f64(it, x, y, band))
            }
            fn pixel(&mut self, x: i32, y: i32, out: &mut [i32]) -> Result<()> {
                dispatch!($name, self, it => RandomIter::pixel(it, x, y, out))
            }
            fn pixel_f32(&mut self, x: i32, y: i32, out: &mut [f32]) -> Result<()> {
                dispatch!($name, self, it => RandomIter::pixel_f32(it, x, y, out))
            }
            fn pixel_f64(&mut self, x: i32, y: i32, out: &mut [f64]) -> Result<()> {
                dispatch!($name, self, it => RandomIter::pixel_f64(it, x, y, out))
            }
            fn done(&mut self) -> Result<()> {
                dispatch!($name, self, it => RandomIter::done(it))
            }
        }
    };
}

any_cursor!(
    /// Sequential read cursor chosen by [`create_rect`].
    AnyRectIter<TiledImage> { RectIterFallback, RectIterU8, RectIterF32, RectIterF64 }
);
any_cursor!(
    /// Bidirectional read cursor chosen by [`create_rook`].
    AnyRookIter<TiledImage> { RookIterFallback, RookIterU8, RookIterF32, RookIterF64 }
);
any_cursor!(
    /// Random-access read cursor chosen by [`create_random`].
    AnyRandomIter<TiledImage> { RandomIterFallback, RandomIterU8, RandomIterF32, RandomIterF64 }
);
any_cursor!(
    /// Sequential write cursor chosen by [`create_writable_rect`].
    AnyWritableRectIter<WritableTiledImage> {
        WritableRectIterFallback, WritableRectIterU8, WritableRectIterF32, WritableRectIterF64
    }
);
any_cursor!(
    /// Bidirectional write cursor chosen by [`create_writable_rook`].
    AnyWritableRookIter<WritableTiledImage> {
        WritableRookIterFallback, WritableRookIterU8, WritableRookIterF32, WritableRookIterF64
    }
);
any_cursor!(
    /// Random-access write cursor chosen by [`create_writable_random`].
    AnyWritableRandomIter<WritableTiledImage> {
        WritableRandomIterFallback, WritableRandomIterU8, WritableRandomIterF32, WritableRandomIterF64
    }
);

impl_rect_iter!(AnyRectIter<TiledImage>);
impl_rect_iter!(AnyRookIter<TiledImage>);
impl_rook_iter!(AnyRookIter<TiledImage>);
impl_random_iter!(AnyRandomIter<TiledImage>);

impl_rect_iter!(AnyWritableRectIter<WritableTiledImage>);
impl_writable_rect_iter!(AnyWritableRectIter);
impl_rect_iter!(AnyWritableRookIter<WritableTiledImage>);
impl_rook_iter!(AnyWritableRookIter<WritableTiledImage>);
impl_writable_rect_iter!(AnyWritableRookIter);
impl_random_iter!(AnyWritableRandomIter<WritableTiledImage>);

impl<'a, S: WritableTiledImage + ?Sized> WritableRandomIter for AnyWritableRandomIter<'a, S> {
    fn set_sample(&mut self, x: i32, y: i32, band: usize, value: i32) -> Result<()> {
        dispatch!(AnyWritableRandomIter, self, it => it.set_sample(x, y, band, value))
    }
    fn set_sample_f32(&mut self, x: i32, y: i32, band: usize, value: f32) -> Result<()> {
        dispatch!(AnyWritableRandomIter, self, it => it.set_sample_f32(x, y, band, value))
    }
    fn set_sample_f64(&mut self, x: i32, y: i32, band: usize, value: f64) -> Result<()> {
        dispatch!(AnyWritableRandomIter, self, it => it.set_sample_f64(x, y, band, value))
    }
    fn set_pixel(&mut self, x: i32, y: i32, values: &[i32]) -> Result<()> {
        dispatch!(AnyWritableRandomIter, self, it => it.set_pixel(x, y, values))
    }
    fn set_pixel_f32(&mut self, x: i32, y: i32, values: &[f32]) -> Result<()> {
        dispatch!(AnyWritableRandomIter, self, it => it.set_pixel_f32(x, y, values))
    }
    fn set_pixel_f64(&mut self, x: i32, y: i32, values: &[f64]) -> Result<()> {
        dispatch!(AnyWritableRandomIter, self, it => it.set_pixel_f64(x, y, values))
    }
}

// === Constructors ===

/// Sequential read cursor over `bounds` of `source`.
pub fn create_rect<'a, S: TiledImage + ?Sized>(source: &'a S, bounds: Rect) -> Result<AnyRectIter<'a, S>> {
    Ok(match select_logged(source.layout(), bounds, "rect") {
        CursorKind::Fallback => AnyRectIter::Fallback(RectIterFallback::new(source, bounds)?),
        CursorKind::U8 => AnyRectIter::U8(RectIterU8::new(source, bounds)?),
        CursorKind::F32 => AnyRectIter::F32(RectIterF32::new(source, bounds)?),
        CursorKind::F64 => AnyRectIter::F64(RectIterF64::new(source, bounds)?),
    })
}

/// Bidirectional read cursor over `bounds` of `source`.
pub fn create_rook<'a, S: TiledImage + ?Sized>(source: &'a S, bounds: Rect) -> Result<AnyRookIter<'a, S>> {
    Ok(match select_logged(source.layout(), bounds, "rook") {
        CursorKind::Fallback => AnyRookIter::Fallback(RookIterFallback::new(source, bounds)?),
        CursorKind::U8 => AnyRookIter::U8(RookIterU8::new(source, bounds)?),
        CursorKind::F32 => AnyRookIter::F32(RookIterF32::new(source, bounds)?),
        CursorKind::F64 => AnyRookIter::F64(RookIterF64::new(source, bounds)?),
    })
}

/// Random-access read cursor over `bounds` of `source`.
pub fn create_random<'a, S: TiledImage + ?Sized>(source: &'a S, bounds: Rect) -> Result<AnyRandomIter<'a, S>> {
    Ok(match select_logged(source.layout(), bounds, "random") {
        CursorKind::Fallback => AnyRandomIter::Fallback(RandomIterFallback::new(source, bounds)?),
        CursorKind::U8 => AnyRandomIter::U8(RandomIterU8::new(source, bounds)?),
        CursorKind::F32 => AnyRandomIter::F32(RandomIterF32::new(source, bounds)?),
        CursorKind::F64 => AnyRandomIter::F64(RandomIterF64::new(source, bounds)?),
    })
}

/// Sequential write cursor over `bounds` of `source`.
pub fn create_writable_rect<'a, S: WritableTiledImage + ?Sized>(
    source: &'a mut S,
    bounds: Rect,
) -> Result<AnyWritableRectIter<'a, S>> {
    Ok(match select_logged(source.layout(), bounds, "writable-rect") {
        CursorKind::Fallback => AnyWritableRectIter::Fallback(WritableRectIterFallback::new(source, bounds)?),
        CursorKind::U8 => AnyWritableRectIter::U8(WritableRectIterU8::new(source, bounds)?),
        CursorKind::F32 => AnyWritableRectIter::F32(WritableRectIterF32::new(source, bounds)?),
        CursorKind::F64 => AnyWritableRectIter::F64(WritableRectIterF64::new(source, bounds)?),
    })
}

/// Bidirectional write cursor over `bounds` of `source`.
pub fn create_writable_rook<'a, S: WritableTiledImage + ?Sized>(
    source: &'a mut S,
    bounds: Rect,
) -> Result<AnyWritableRookIter<'a, S>> {
    Ok(match select_logged(source.layout(), bounds, "writable-rook") {
        CursorKind::Fallback => AnyWritableRookIter::Fallback(WritableRookIterFallback::new(source, bounds)?),
        CursorKind::U8 => AnyWritableRookIter::U8(WritableRookIterU8::new(source, bounds)?),
        CursorKind::F32 => AnyWritableRookIter::F32(WritableRookIterF32::new(source, bounds)?),
        CursorKind::F64 => AnyWritableRookIter::F64(WritableRookIterF64::new(source, bounds)?),
    })
}

/// Random-access write cursor over `bounds` of `source`.
pub fn create_writable_random<'a, S: WritableTiledImage + ?Sized>(
    source: &'a mut S,
    bounds: Rect,
) -> Result<AnyWritableRandomIter<'a, S>> {
    Ok(match select_logged(source.layout(), bounds, "writable-random") {
        CursorKind::Fallback => AnyWritableRandomIter::Fallback(WritableRandomIterFallback::new(source, bounds)?),
        CursorKind::U8 => AnyWritableRandomIter::U8(WritableRandomIterU8::new(source, bounds)?),
        CursorKind::F32 => AnyWritableRandomIter::F32(WritableRandomIterF32::new(source, bounds)?),
        CursorKind::F64 => AnyWritableRandomIter::F64(WritableRandomIterF64::new(source, bounds)?),
    })
}
