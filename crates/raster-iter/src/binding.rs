//! Tile bindings: how a cursor holds the tile it is currently on.
//!
//! A cursor owns exactly one binding record. On every tile crossing it asks
//! the binding to switch tiles and gets back the new tile's origin, which it
//! feeds to its [`Addressing`](crate::addressing::Addressing).
//!
//! # Read bindings
//!
//! [`ReadBinding`] borrows tiles from a [`TiledImage`] for the cursor's
//! lifetime and accesses them through a [`TileView`]:
//!
//! - [`BufferView`] - type-erased [`DataBuffer`] accessors, any layout
//! - [`SliceView`] - cached `&[T]` of bank 0, no per-sample type dispatch
//!
//! # Write bindings
//!
//! [`LeaseSlot`] holds a scoped write lease. The tile is checked out of the
//! [`WritableTiledImage`] on first touch, moved into a [`TileStore`], and
//! handed back when the cursor moves to another tile, when
//! [`unbind`](Binding::unbind) is called, or on drop.
//!
//! - [`BufferStore`] - owns the whole tile, type-erased accessors
//! - [`SliceStore`] - owns bank 0 as a `Vec<T>` while leased

use raster_core::{
    DataBuffer, Element, ElementLayout, Error, ReleaseError, Result, Tile, TiledImage, WritableTiledImage,
};
use tracing::{trace, warn};

// === Views over borrowed tiles ===

/// Read access to a borrowed tile buffer.
pub trait TileView<'a>: Sized {
    /// Checks at construction time that the view can serve `layout`.
    fn accepts(_layout: &ElementLayout) -> Result<()> {
        Ok(())
    }

    /// Wraps a tile.
    fn bind(tile: &'a Tile) -> Result<Self>;

    /// Element as `i32`.
    fn get_i32(&self, bank: usize, index: usize) -> i32;

    /// Element as `f32`.
    fn get_f32(&self, bank: usize, index: usize) -> f32;

    /// Element as `f64`.
    fn get_f64(&self, bank: usize, index: usize) -> f64;
}

/// Type-erased view used by the fallback cursors.
#[derive(Debug, Clone, Copy)]
pub struct BufferView<'a> {
    data: &'a DataBuffer,
}

impl<'a> TileView<'a> for BufferView<'a> {
    #[inline]
    fn bind(tile: &'a Tile) -> Result<Self> {
        Ok(Self { data: &tile.data })
    }

    #[inline]
    fn get_i32(&self, bank: usize, index: usize) -> i32 {
        self.data.get_i32(bank, index)
    }

    #[inline]
    fn get_f32(&self, bank: usize, index: usize) -> f32 {
        self.data.get_f32(bank, index)
    }

    #[inline]
    fn get_f64(&self, bank: usize, index: usize) -> f64 {
        self.data.get_f64(bank, index)
    }
}

/// Typed view of bank 0 used by the interleaved cursors.
#[derive(Debug, Clone, Copy)]
pub struct SliceView<'a, T> {
    data: &'a [T],
}

impl<'a, T: Element> SliceView<'a, T> {
    /// Element at `index`.
    #[inline]
    pub fn elem(&self, index: usize) -> T {
        self.data[index]
    }
}

impl<'a, T: Element> TileView<'a> for SliceView<'a, T> {
    fn accepts(layout: &ElementLayout) -> Result<()> {
        if layout.element_type() != T::TYPE {
            return Err(Error::element_type_mismatch(T::TYPE, layout.element_type()));
        }
        Ok(())
    }

    #[inline]
    fn bind(tile: &'a Tile) -> Result<Self> {
        T::bank(&tile.data, 0)
            .map(|data| Self { data })
            .ok_or_else(|| Error::element_type_mismatch(T::TYPE, tile.data.element_type()))
    }

    #[inline]
    fn get_i32(&self, _bank: usize, index: usize) -> i32 {
        self.data[index].to_i32()
    }

    #[inline]
    fn get_f32(&self, _bank: usize, index: usize) -> f32 {
        self.data[index].to_f32()
    }

    #[inline]
    fn get_f64(&self, _bank: usize, index: usize) -> f64 {
        self.data[index].to_f64()
    }
}

// === Stores for leased tiles ===

/// Owned storage for a tile while it is leased.
pub trait TileStore: Sized {
    /// Checks at construction time that the store can serve `layout`.
    fn accepts(_layout: &ElementLayout) -> Result<()> {
        Ok(())
    }

    /// Placeholder used while no tile is leased.
    fn empty() -> Self;

    /// Takes ownership of a leased tile, or gives it back if unusable.
    fn from_tile(tile: Tile) -> std::result::Result<Self, Tile>;

    /// Reassembles the tile for release.
    fn into_tile(self) -> Tile;

    /// Origin translation of the held tile.
    fn origin(&self) -> (i32, i32);

    /// Element as `i32`.
    fn get_i32(&self, bank: usize, index: usize) -> i32;
    /// Element as `f32`.
    fn get_f32(&self, bank: usize, index: usize) -> f32;
    /// Element as `f64`.
    fn get_f64(&self, bank: usize, index: usize) -> f64;
    /// Stores an `i32`.
    fn set_i32(&mut self, bank: usize, index: usize, value: i32);
    /// Stores an `f32`.
    fn set_f32(&mut self, bank: usize, index: usize, value: f32);
    /// Stores an `f64`.
    fn set_f64(&mut self, bank: usize, index: usize, value: f64);
}

fn empty_tile() -> Tile {
    Tile::new(DataBuffer::U8(Vec::new()), 0, 0)
}

/// Whole-tile store used by the fallback writers.
#[derive(Debug)]
pub struct BufferStore {
    tile: Tile,
}

impl TileStore for BufferStore {
    fn empty() -> Self {
        Self { tile: empty_tile() }
    }

    fn from_tile(tile: Tile) -> std::result::Result<Self, Tile> {
        Ok(Self { tile })
    }

    fn into_tile(self) -> Tile {
        self.tile
    }

    #[inline]
    fn origin(&self) -> (i32, i32) {
        (self.tile.origin_x, self.tile.origin_y)
    }

    #[inline]
    fn get_i32(&self, bank: usize, index: usize) -> i32 {
        self.tile.data.get_i32(bank, index)
    }

    #[inline]
    fn get_f32(&self, bank: usize, index: usize) -> f32 {
        self.tile.data.get_f32(bank, index)
    }

    #[inline]
    fn get_f64(&self, bank: usize, index: usize) -> f64 {
        self.tile.data.get_f64(bank, index)
    }

    #[inline]
    fn set_i32(&mut self, bank: usize, index: usize, value: i32) {
        self.tile.data.set_i32(bank, index, value);
    }

    #[inline]
    fn set_f32(&mut self, bank: usize, index: usize, value: f32) {
        self.tile.data.set_f32(bank, index, value);
    }

    #[inline]
    fn set_f64(&mut self, bank: usize, index: usize, value: f64) {
        self.tile.data.set_f64(bank, index, value);
    }
}

/// Typed store used by the interleaved writers.
///
/// Bank 0 is moved out of the tile into `bank` for the duration of the
/// lease, so every access is a plain slice index.
#[derive(Debug)]
pub struct SliceStore<T> {
    bank: Vec<T>,
    rest: Tile,
}

impl<T: Element> SliceStore<T> {
    /// Element at `index`.
    #[inline]
    pub fn elem(&self, index: usize) -> T {
        self.bank[index]
    }

    /// Stores `value` at `index`.
    #[inline]
    pub fn set_elem(&mut self, index: usize, value: T) {
        self.bank[index] = value;
    }
}

impl<T: Element> TileStore for SliceStore<T> {
    fn accepts(layout: &ElementLayout) -> Result<()> {
        if layout.element_type() != T::TYPE {
            return Err(Error::element_type_mismatch(T::TYPE, layout.element_type()));
        }
        Ok(())
    }

    fn empty() -> Self {
        Self {
            bank: Vec::new(),
            rest: empty_tile(),
        }
    }

    fn from_tile(mut tile: Tile) -> std::result::Result<Self, Tile> {
        let taken = T::banks_mut(&mut tile.data)
            .and_then(|banks| banks.first_mut())
            .map(std::mem::take);
        match taken {
            Some(bank) => Ok(Self { bank, rest: tile }),
            None => Err(tile),
        }
    }

    fn into_tile(self) -> Tile {
        let mut tile = self.rest;
        if let Some(slot) = T::banks_mut(&mut tile.data).and_then(|banks| banks.first_mut()) {
            *slot = self.bank;
        }
        tile
    }

    #[inline]
    fn origin(&self) -> (i32, i32) {
        (self.rest.origin_x, self.rest.origin_y)
    }

    #[inline]
    fn get_i32(&self, _bank: usize, index: usize) -> i32 {
        self.bank[index].to_i32()
    }

    #[inline]
    fn get_f32(&self, _bank: usize, index: usize) -> f32 {
        self.bank[index].to_f32()
    }

    #[inline]
    fn get_f64(&self, _bank: usize, index: usize) -> f64 {
        self.bank[index].to_f64()
    }

    #[inline]
    fn set_i32(&mut self, _bank: usize, index: usize, value: i32) {
        self.bank[index] = T::from_i32(value);
    }

    #[inline]
    fn set_f32(&mut self, _bank: usize, index: usize, value: f32) {
        self.bank[index] = T::from_f32(value);
    }

    #[inline]
    fn set_f64(&mut self, _bank: usize, index: usize, value: f64) {
        self.bank[index] = T::from_f64(value);
    }
}

// === Bindings ===

/// The tile a cursor is currently bound to.
pub trait Binding {
    /// Element layout of the source.
    fn layout(&self) -> &ElementLayout;

    /// Tile index currently bound, if any.
    fn bound(&self) -> Option<(i32, i32)>;

    /// Binds tile `(tile_x, tile_y)` and returns its origin translation.
    fn bind(&mut self, tile_x: i32, tile_y: i32) -> Result<(i32, i32)>;

    /// Gives up the current tile where that matters (write leases).
    ///
    /// Idempotent. Read bindings keep their borrow.
    fn unbind(&mut self) -> Result<()>;

    /// Element as `i32`.
    fn get_i32(&self, bank: usize, index: usize) -> i32;
    /// Element as `f32`.
    fn get_f32(&self, bank: usize, index: usize) -> f32;
    /// Element as `f64`.
    fn get_f64(&self, bank: usize, index: usize) -> f64;
}

/// A binding that can also write.
pub trait WriteBinding: Binding {
    /// Stores an `i32`.
    fn set_i32(&mut self, bank: usize, index: usize, value: i32);
    /// Stores an `f32`.
    fn set_f32(&mut self, bank: usize, index: usize, value: f32);
    /// Stores an `f64`.
    fn set_f64(&mut self, bank: usize, index: usize, value: f64);
}

/// A binding with direct typed element access.
pub trait TypedBinding: Binding {
    /// Element type of the bound bank.
    type Elem: Element;

    /// Element at `index` of bank 0.
    fn elem(&self, index: usize) -> Self::Elem;
}

/// A typed binding that can also write.
pub trait TypedWriteBinding: TypedBinding + WriteBinding {
    /// Stores `value` at `index` of bank 0.
    fn set_elem(&mut self, index: usize, value: Self::Elem);
}

/// Borrowed-tile binding for read cursors.
pub struct ReadBinding<'a, S: ?Sized, V> {
    source: &'a S,
    view: V,
    tile: (i32, i32),
}

impl<'a, S: TiledImage + ?Sized, V: TileView<'a>> ReadBinding<'a, S, V> {
    /// Binds tile `(tile_x, tile_y)` of `source`.
    pub fn open(source: &'a S, tile_x: i32, tile_y: i32) -> Result<(Self, (i32, i32))> {
        V::accepts(source.layout())?;
        let tile = source.tile(tile_x, tile_y)?;
        let view = V::bind(tile)?;
        Ok((
            Self {
                source,
                view,
                tile: (tile_x, tile_y),
            },
            (tile.origin_x, tile.origin_y),
        ))
    }
}

impl<'a, S: TiledImage + ?Sized, V: TileView<'a>> Binding for ReadBinding<'a, S, V> {
    fn layout(&self) -> &ElementLayout {
        self.source.layout()
    }

    #[inline]
    fn bound(&self) -> Option<(i32, i32)> {
        Some(self.tile)
    }

    fn bind(&mut self, tile_x: i32, tile_y: i32) -> Result<(i32, i32)> {
        let source: &'a S = self.source;
        let tile = source.tile(tile_x, tile_y)?;
        self.view = V::bind(tile)?;
        self.tile = (tile_x, tile_y);
        trace!(tile_x, tile_y, "Bound tile");
        Ok((tile.origin_x, tile.origin_y))
    }

    #[inline]
    fn unbind(&mut self) -> Result<()> {
        Ok(())
    }

    #[inline]
    fn get_i32(&self, bank: usize, index: usize) -> i32 {
        self.view.get_i32(bank, index)
    }

    #[inline]
    fn get_f32(&self, bank: usize, index: usize) -> f32 {
        self.view.get_f32(bank, index)
    }

    #[inline]
    fn get_f64(&self, bank: usize, index: usize) -> f64 {
        self.view.get_f64(bank, index)
    }
}

impl<'a, S: TiledImage + ?Sized, T: Element> TypedBinding for ReadBinding<'a, S, SliceView<'a, T>> {
    type Elem = T;

    #[inline]
    fn elem(&self, index: usize) -> T {
        self.view.elem(index)
    }
}

/// Scoped write lease on one tile.
///
/// At most one tile is held at a time. Binding another tile releases the
/// held one first. Dropping the slot while a lease is held releases it and
/// logs a warning, since the owning cursor was abandoned without
/// [`unbind`](Binding::unbind).
pub struct LeaseSlot<'a, S: WritableTiledImage + ?Sized, St: TileStore> {
    source: &'a mut S,
    store: St,
    held: Option<(i32, i32)>,
}

impl<'a, S: WritableTiledImage + ?Sized, St: TileStore> LeaseSlot<'a, S, St> {
    /// Creates an empty slot over `source`.
    pub fn new(source: &'a mut S) -> Result<Self> {
        St::accepts(source.layout())?;
        Ok(Self {
            source,
            store: St::empty(),
            held: None,
        })
    }

    /// Returns the held tile to the source, if any.
    ///
    /// If the source refuses the tile, the lease stays held with its data
    /// intact and the release can be retried.
    pub fn release(&mut self) -> Result<()> {
        let Some((tile_x, tile_y)) = self.held else {
            return Ok(());
        };
        let store = std::mem::replace(&mut self.store, St::empty());
        match self.source.release_tile(tile_x, tile_y, store.into_tile()) {
            Ok(()) => {
                self.held = None;
                trace!(tile_x, tile_y, "Released write lease");
                Ok(())
            }
            Err(ReleaseError { error, tile }) => {
                match St::from_tile(tile) {
                    Ok(store) => self.store = store,
                    Err(_) => self.held = None,
                }
                warn!(tile_x, tile_y, %error, "Source refused write lease release");
                Err(error)
            }
        }
    }
}

impl<'a, S: WritableTiledImage + ?Sized, St: TileStore> Binding for LeaseSlot<'a, S, St> {
    fn layout(&self) -> &ElementLayout {
        self.source.layout()
    }

    #[inline]
    fn bound(&self) -> Option<(i32, i32)> {
        self.held
    }

    fn bind(&mut self, tile_x: i32, tile_y: i32) -> Result<(i32, i32)> {
        if self.held == Some((tile_x, tile_y)) {
            return Ok(self.store.origin());
        }
        self.release()?;
        let tile = self.source.checkout_tile(tile_x, tile_y)?;
        match St::from_tile(tile) {
            Ok(store) => {
                self.store = store;
                self.held = Some((tile_x, tile_y));
                trace!(tile_x, tile_y, "Acquired write lease");
                Ok(self.store.origin())
            }
            Err(tile) => {
                let got = tile.data.element_type();
                self.source.release_tile(tile_x, tile_y, tile)?;
                Err(Error::element_type_mismatch(self.source.layout().element_type(), got))
            }
        }
    }

    fn unbind(&mut self) -> Result<()> {
        self.release()
    }

    #[inline]
    fn get_i32(&self, bank: usize, index: usize) -> i32 {
        self.store.get_i32(bank, index)
    }

    #[inline]
    fn get_f32(&self, bank: usize, index: usize) -> f32 {
        self.store.get_f32(bank, index)
    }

    #[inline]
    fn get_f64(&self, bank: usize, index: usize) -> f64 {
        self.store.get_f64(bank, index)
    }
}

impl<'a, S: WritableTiledImage + ?Sized, St: TileStore> WriteBinding for LeaseSlot<'a, S, St> {
    #[inline]
    fn set_i32(&mut self, bank: usize, index: usize, value: i32) {
        self.store.set_i32(bank, index, value);
    }

    #[inline]
    fn set_f32(&mut self, bank: usize, index: usize, value: f32) {
        self.store.set_f32(bank, index, value);
    }

    #[inline]
    fn set_f64(&mut self, bank: usize, index: usize, value: f64) {
        self.store.set_f64(bank, index, value);
    }
}

impl<'a, S: WritableTiledImage + ?Sized, T: Element> TypedBinding for LeaseSlot<'a, S, SliceStore<T>> {
    type Elem = T;

    #[inline]
    fn elem(&self, index: usize) -> T {
        self.store.elem(index)
    }
}

impl<'a, S: WritableTiledImage + ?Sized, T: Element> TypedWriteBinding for LeaseSlot<'a, S, SliceStore<T>> {
    #[inline]
    fn set_elem(&mut self, index: usize, value: T) {
        self.store.set_elem(index, value);
    }
}

impl<'a, S: WritableTiledImage + ?Sized, St: TileStore> Drop for LeaseSlot<'a, S, St> {
    fn drop(&mut self) {
        if let Some((tile_x, tile_y)) = self.held {
            warn!(tile_x, tile_y, "Write cursor dropped while holding a lease; releasing");
            if let Err(err) = self.release() {
                warn!(tile_x, tile_y, %err, "Failed to release write lease on drop");
            }
        }
    }
}
