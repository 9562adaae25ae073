//! # raster-iter
//!
//! Pixel cursors over tile-backed rasters.
//!
//! Image-processing code walks pixels through a cursor and never sees how a
//! tile's memory is laid out: banked or interleaved, `u8`/`f32`/`f64`,
//! arbitrary strides, tiles translated away from their grid position. The
//! cursor fetches tiles from a [`TiledImage`](raster_core::TiledImage) only
//! when it crosses into a new one.
//!
//! ## Cursor Families
//!
//! | Module          | Layouts                  | Per-sample cost          |
//! |-----------------|--------------------------|--------------------------|
//! | [`fallback`]    | any                      | layout lookup + type match |
//! | [`interleaved`] | component-interleaved    | slice index              |
//! | [`writable`]    | both of the above        | as the read counterpart  |
//!
//! Each family offers three disciplines: [`RectIter`] (sequential),
//! [`RookIter`] (bidirectional) and [`RandomIter`]. The [`factory`] picks
//! the fastest family for a source at runtime.
//!
//! ## Extras
//!
//! - [`parallel`] - One cursor per thread over tile-row strips (feature
//!   `parallel`, on by default)
//! - [`alpha`] - Premultiply and unpremultiply in place
//!
//! ## Example
//!
//! ```rust
//! use raster_iter::prelude::*;
//!
//! let mut raster = TiledRaster::builder(Rect::from_size(64, 48))
//!     .tile_size(16, 16)
//!     .bands(3)
//!     .build()?;
//! raster.fill_with(|x, y, b| ((x + y) % 4 + b as i32) as f64)?;
//!
//! let mut it = factory::create_rect(&raster, Rect::new(8, 8, 32, 16))?;
//! let mut total = 0i64;
//! while !it.finished_lines() {
//!     it.start_pixels()?;
//!     while !it.finished_pixels() {
//!         total += it.sample_band(2) as i64;
//!         it.next_pixel()?;
//!     }
//!     it.next_line()?;
//! }
//! assert_eq!(total, 32 * 16 * 2 + 32 * 16 * 3 / 2);
//! # Ok::<(), raster_core::Error>(())
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//! traits       cursor API
//!   ^
//! scanner / random        generic cursors
//!   ^           ^
//! scan        addressing, binding
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod addressing;
pub mod alpha;
pub mod binding;
pub mod factory;
pub mod fallback;
pub mod interleaved;
#[cfg(feature = "parallel")]
pub mod parallel;
pub mod random;
pub mod scan;
pub mod scanner;
pub mod traits;
pub mod writable;

// Re-exports for convenience
pub use factory::{
    create_random, create_rect, create_rook, create_writable_random, create_writable_rect, create_writable_rook,
    CursorKind,
};
pub use random::RandomCursor;
pub use scanner::{Bidirectional, Forward, Scanner};
pub use traits::{RandomIter, RectIter, RookIter, WritableRandomIter, WritableRectIter, WritableRookIter};

/// Prelude module for convenient imports.
///
/// # Usage
///
/// ```
/// use raster_iter::prelude::*;
/// ```
pub mod prelude {
    pub use crate::factory::{self, CursorKind};
    pub use crate::fallback::{RandomIterFallback, RectIterFallback, RookIterFallback};
    pub use crate::interleaved::{
        RandomIterF32, RandomIterF64, RandomIterU8, RectIterF32, RectIterF64, RectIterU8, RookIterF32, RookIterF64,
        RookIterU8,
    };
    pub use crate::traits::{RandomIter, RectIter, RookIter, WritableRandomIter, WritableRectIter, WritableRookIter};
    pub use crate::writable::{
        WritableRandomIterFallback, WritableRectIterFallback, WritableRookIterFallback,
    };
    pub use raster_core::prelude::*;
}
