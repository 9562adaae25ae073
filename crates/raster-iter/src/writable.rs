//! Writable cursor families.
//!
//! Every writable cursor binds tiles through a [`LeaseSlot`]: the tile under
//! the cursor is checked out of the [`WritableTiledImage`] before its first
//! sample is touched and handed back when the cursor moves to another tile.
//! Sequential scans give the last lease back once they step past the last
//! line; random cursors and scans stopped early must call `done()`:
//!
//! ```rust
//! use raster_core::{Rect, TiledRaster};
//! use raster_iter::writable::WritableRandomIterU8;
//! use raster_iter::{RandomIter, WritableRandomIter};
//!
//! let mut raster = TiledRaster::builder(Rect::from_size(4, 4)).tile_size(2, 2).build()?;
//! let mut it = WritableRandomIterU8::new(&mut raster, Rect::from_size(4, 4))?;
//! it.set_sample(3, 3, 0, 200)?;
//! it.set_sample(0, 0, 0, 7)?;
//! it.done()?;
//! drop(it);
//!
//! assert_eq!(raster.sample_f64(3, 3, 0)?, 200.0);
//! assert_eq!(raster.stats().outstanding(), 0);
//! # Ok::<(), raster_core::Error>(())
//! ```
//!
//! A cursor dropped while holding a lease still releases it, with a
//! warning in the log.
//!
//! [`LeaseSlot`]: crate::binding::LeaseSlot
//! [`WritableTiledImage`]: raster_core::WritableTiledImage

use crate::addressing::{GenericAddressing, InterleavedAddressing};
use crate::binding::{BufferStore, LeaseSlot, SliceStore};
use crate::random::RandomCursor;
use crate::scanner::{Bidirectional, Forward, Scanner};

// === Fallback ===

/// Sequential write cursor for any layout.
pub type WritableRectIterFallback<'a, S> = Scanner<LeaseSlot<'a, S, BufferStore>, GenericAddressing, Forward>;

/// Bidirectional write cursor for any layout.
pub type WritableRookIterFallback<'a, S> = Scanner<LeaseSlot<'a, S, BufferStore>, GenericAddressing, Bidirectional>;

/// Random-access write cursor for any layout.
pub type WritableRandomIterFallback<'a, S> = RandomCursor<LeaseSlot<'a, S, BufferStore>, GenericAddressing>;

// === Interleaved ===

/// Sequential write cursor over interleaved elements of type `T`.
pub type WritableRectIterInterleaved<'a, S, T> =
    Scanner<LeaseSlot<'a, S, SliceStore<T>>, InterleavedAddressing, Forward>;

/// Bidirectional write cursor over interleaved elements of type `T`.
pub type WritableRookIterInterleaved<'a, S, T> =
    Scanner<LeaseSlot<'a, S, SliceStore<T>>, InterleavedAddressing, Bidirectional>;

/// Random-access write cursor over interleaved elements of type `T`.
pub type WritableRandomIterInterleaved<'a, S, T> = RandomCursor<LeaseSlot<'a, S, SliceStore<T>>, InterleavedAddressing>;

/// Sequential write cursor over interleaved `u8`.
pub type WritableRectIterU8<'a, S> = WritableRectIterInterleaved<'a, S, u8>;
/// Sequential write cursor over interleaved `f32`.
pub type WritableRectIterF32<'a, S> = WritableRectIterInterleaved<'a, S, f32>;
/// Sequential write cursor over interleaved `f64`.
pub type WritableRectIterF64<'a, S> = WritableRectIterInterleaved<'a, S, f64>;

/// Bidirectional write cursor over interleaved `u8`.
pub type WritableRookIterU8<'a, S> = WritableRookIterInterleaved<'a, S, u8>;
/// Bidirectional write cursor over interleaved `f32`.
pub type WritableRookIterF32<'a, S> = WritableRookIterInterleaved<'a, S, f32>;
/// Bidirectional write cursor over interleaved `f64`.
pub type WritableRookIterF64<'a, S> = WritableRookIterInterleaved<'a, S, f64>;

/// Random-access write cursor over interleaved `u8`.
pub type WritableRandomIterU8<'a, S> = WritableRandomIterInterleaved<'a, S, u8>;
/// Random-access write cursor over interleaved `f32`.
pub type WritableRandomIterF32<'a, S> = WritableRandomIterInterleaved<'a, S, f32>;
/// Random-access write cursor over interleaved `f64`.
pub type WritableRandomIterF64<'a, S> = WritableRandomIterInterleaved<'a, S, f64>;
