//! Rectangle type for image, tile and iteration bounds.
//!
//! # Coordinate System
//!
//! All coordinates use the standard image convention:
//! - X increases to the right
//! - Y increases downward
//!
//! Origins are signed: tiled images and their tile grids may start at
//! negative coordinates.
//!
//! ```text
//! (x,y) ──────────► X
//!   │   ┌──────────┐
//!   │   │  width   │ height
//!   │   └──────────┘
//!   ▼            (max_x, max_y) inclusive
//!   Y
//! ```
//!
//! # Usage
//!
//! ```rust
//! use raster_core::Rect;
//!
//! let rect = Rect::new(-4, 2, 10, 5);
//! assert_eq!(rect.max_x(), 5);
//! assert!(rect.contains(-4, 2));
//! assert!(!rect.contains(6, 2));
//!
//! let other = Rect::new(0, 0, 4, 4);
//! assert_eq!(rect.intersect(&other), Some(Rect::new(0, 2, 4, 2)));
//! ```

/// A rectangle defined by origin (x, y) and dimensions (width, height).
///
/// A rectangle with zero width or height is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(C)]
pub struct Rect {
    /// X coordinate of the left edge (inclusive)
    pub x: i32,
    /// Y coordinate of the top edge (inclusive)
    pub y: i32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Rect {
    /// Creates a new rectangle with the given origin and dimensions.
    #[inline]
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rectangle from origin (0, 0) with given dimensions.
    #[inline]
    pub const fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// X coordinate of the right edge (exclusive).
    #[inline]
    pub const fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    /// Y coordinate of the bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    /// Largest X coordinate inside the rectangle.
    ///
    /// Only meaningful for non-empty rectangles.
    #[inline]
    pub const fn max_x(&self) -> i32 {
        self.right() - 1
    }

    /// Largest Y coordinate inside the rectangle.
    ///
    /// Only meaningful for non-empty rectangles.
    #[inline]
    pub const fn max_y(&self) -> i32 {
        self.bottom() - 1
    }

    /// Returns the area of the rectangle in pixels.
    #[inline]
    pub const fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Returns `true` if the rectangle has zero area.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns `true` if the point (px, py) is inside this rectangle.
    ///
    /// Inclusive on the left/top edges, exclusive on the right/bottom edges.
    #[inline]
    pub const fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }

    /// Returns `true` if this rectangle fully contains another.
    #[inline]
    pub const fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Returns the intersection of this rectangle with another.
    ///
    /// Returns `None` if the rectangles don't overlap.
    #[inline]
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if x < right && y < bottom {
            Some(Rect::new(x, y, (right - x) as u32, (bottom - y) as u32))
        } else {
            None
        }
    }

    /// Returns this rectangle translated by (dx, dy).
    #[inline]
    pub const fn translate(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Returns an iterator over all (x, y) coordinates in this rectangle.
    ///
    /// Iterates row by row, left to right, top to bottom.
    ///
    /// ```rust
    /// use raster_core::Rect;
    ///
    /// let coords: Vec<_> = Rect::new(-1, 0, 2, 2).iter_coords().collect();
    /// assert_eq!(coords, vec![(-1, 0), (0, 0), (-1, 1), (0, 1)]);
    /// ```
    #[inline]
    pub fn iter_coords(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        (self.y..self.bottom()).flat_map(move |y| (self.x..self.right()).map(move |x| (x, y)))
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Rect({}, {}, {}x{})",
            self.x, self.y, self.width, self.height
        )
    }
}
