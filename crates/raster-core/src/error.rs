//! Error types for raster-core and the iteration engine built on it.
//!
//! Every failure the cursors can report is a variant of [`Error`]:
//!
//! - Navigation outside the iteration bounds
//! - Element-layout contract violations (detected at construction)
//! - Tile-fetch failures from the image source
//! - Write-lease discipline violations
//!
//! Errors are returned synchronously to the caller. Nothing in this crate
//! retries, clamps or recovers on its own.
//!
//! # Usage
//!
//! ```rust
//! use raster_core::{Axis, Error, Result};
//!
//! fn jump_to(y: i32, first: i32, last: i32) -> Result<i32> {
//!     if y < first || y > last {
//!         return Err(Error::out_of_bounds(Axis::Y, y, first, last));
//!     }
//!     Ok(y)
//! }
//!
//! assert!(jump_to(10, 0, 3).unwrap_err().is_bounds_error());
//! ```
//!
//! # Dependencies
//!
//! - [`thiserror`] - For derive macro error implementation

use crate::format::ElementType;
use crate::tile::Tile;
use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Axis of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Horizontal (pixel) axis.
    X,
    /// Vertical (line) axis.
    Y,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::X => write!(f, "x"),
            Self::Y => write!(f, "y"),
        }
    }
}

/// Errors raised by tile sources and pixel cursors.
///
/// # Categories
///
/// - **Bounds errors**: [`OutOfBounds`](Error::OutOfBounds), [`InvalidRegion`](Error::InvalidRegion)
/// - **Layout errors**: [`LayoutMismatch`](Error::LayoutMismatch), [`ElementTypeMismatch`](Error::ElementTypeMismatch)
/// - **Source errors**: [`TileFetch`](Error::TileFetch)
/// - **Lease errors**: [`TileCheckedOut`](Error::TileCheckedOut), [`LeaseNotHeld`](Error::LeaseNotHeld)
#[derive(Debug, Error)]
pub enum Error {
    /// A jump or random-access query targeted a position outside the
    /// iteration bounds.
    ///
    /// The cursor position after this error is unspecified.
    #[error("{axis} = {position} is outside iteration bounds [{min}, {max}]")]
    OutOfBounds {
        /// Axis of the offending coordinate
        axis: Axis,
        /// Requested coordinate
        position: i32,
        /// Smallest valid coordinate (inclusive)
        min: i32,
        /// Largest valid coordinate (inclusive)
        max: i32,
    },

    /// Requested region does not overlap the image.
    #[error("region ({rx}, {ry}, {rw}x{rh}) does not intersect image bounds")]
    InvalidRegion {
        /// Region X origin
        rx: i32,
        /// Region Y origin
        ry: i32,
        /// Region width
        rw: u32,
        /// Region height
        rh: u32,
    },

    /// The element layout cannot be served by the requested cursor or
    /// disagrees with a tile's buffer.
    #[error("layout mismatch: {reason}")]
    LayoutMismatch {
        /// What was wrong with the layout
        reason: String,
    },

    /// A typed cursor was requested for a different element type.
    #[error("element type mismatch: expected {expected}, got {got}")]
    ElementTypeMismatch {
        /// Element type required by the cursor
        expected: ElementType,
        /// Element type found in the layout or buffer
        got: ElementType,
    },

    /// The image source failed to produce a tile.
    #[error("failed to fetch tile ({tile_x}, {tile_y}): {reason}")]
    TileFetch {
        /// Tile column
        tile_x: i32,
        /// Tile row
        tile_y: i32,
        /// Failure description from the source
        reason: String,
    },

    /// The tile is currently checked out for writing.
    #[error("tile ({tile_x}, {tile_y}) is checked out for writing")]
    TileCheckedOut {
        /// Tile column
        tile_x: i32,
        /// Tile row
        tile_y: i32,
    },

    /// A release was attempted for a tile that is not checked out.
    #[error("no write lease held on tile ({tile_x}, {tile_y})")]
    LeaseNotHeld {
        /// Tile column
        tile_x: i32,
        /// Tile row
        tile_y: i32,
    },

    /// Invalid geometry (zero tile size, zero bands, buffer too small).
    #[error("invalid dimensions: {width}x{height} ({reason})")]
    InvalidDimensions {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
        /// Reason why dimensions are invalid
        reason: String,
    },

    /// Generic error with custom message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Creates an [`Error::OutOfBounds`] error.
    #[inline]
    pub fn out_of_bounds(axis: Axis, position: i32, min: i32, max: i32) -> Self {
        Self::OutOfBounds {
            axis,
            position,
            min,
            max,
        }
    }

    /// Creates an [`Error::InvalidRegion`] error.
    #[inline]
    pub fn invalid_region(rx: i32, ry: i32, rw: u32, rh: u32) -> Self {
        Self::InvalidRegion { rx, ry, rw, rh }
    }

    /// Creates an [`Error::LayoutMismatch`] error.
    #[inline]
    pub fn layout_mismatch(reason: impl Into<String>) -> Self {
        Self::LayoutMismatch {
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::ElementTypeMismatch`] error.
    #[inline]
    pub fn element_type_mismatch(expected: ElementType, got: ElementType) -> Self {
        Self::ElementTypeMismatch { expected, got }
    }

    /// Creates an [`Error::TileFetch`] error.
    #[inline]
    pub fn tile_fetch(tile_x: i32, tile_y: i32, reason: impl Into<String>) -> Self {
        Self::TileFetch {
            tile_x,
            tile_y,
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::InvalidDimensions`] error.
    #[inline]
    pub fn invalid_dimensions(width: u32, height: u32, reason: impl Into<String>) -> Self {
        Self::InvalidDimensions {
            width,
            height,
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::Other`] error.
    #[inline]
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Returns `true` if this is a bounds-related error.
    #[inline]
    pub fn is_bounds_error(&self) -> bool {
        matches!(self, Self::OutOfBounds { .. } | Self::InvalidRegion { .. })
    }

    /// Returns `true` if this is a layout contract violation.
    #[inline]
    pub fn is_layout_error(&self) -> bool {
        matches!(
            self,
            Self::LayoutMismatch { .. } | Self::ElementTypeMismatch { .. }
        )
    }

    /// Returns `true` if this is a write-lease violation.
    #[inline]
    pub fn is_lease_error(&self) -> bool {
        matches!(self, Self::TileCheckedOut { .. } | Self::LeaseNotHeld { .. })
    }
}

/// A release the source refused. The tile is handed back so the caller
/// still owns its data.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct ReleaseError {
    /// Why the source refused the tile.
    pub error: Error,
    /// The tile that was not taken back.
    pub tile: Tile,
}

impl ReleaseError {
    /// Wraps `error` together with the refused `tile`.
    pub fn new(error: Error, tile: Tile) -> Self {
        Self { error, tile }
    }
}

impl From<ReleaseError> for Error {
    fn from(err: ReleaseError) -> Self {
        err.error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_bounds() {
        let err = Error::out_of_bounds(Axis::Y, 17, 2, 9);
        let msg = err.to_string();
        assert!(msg.contains("y = 17"));
        assert!(msg.contains("[2, 9]"));
        assert!(err.is_bounds_error());
        assert!(!err.is_layout_error());
    }

    #[test]
    fn test_release_error_keeps_tile() {
        let tile = Tile::new(crate::DataBuffer::from_banks(vec![vec![3u8, 4]]), 1, 2);
        let refused = ReleaseError::new(Error::LeaseNotHeld { tile_x: 0, tile_y: 0 }, tile);
        assert_eq!(refused.tile.data.get_i32(0, 1), 4);
        assert!(refused.to_string().contains("no write lease"));
        let err: Error = refused.into();
        assert!(err.is_lease_error());
    }

    #[test]
    fn test_layout_errors() {
        let err = Error::element_type_mismatch(ElementType::F32, ElementType::U8);
        assert!(err.to_string().contains("expected f32, got u8"));
        assert!(err.is_layout_error());

        let err = Error::layout_mismatch("bands are banked");
        assert!(err.to_string().contains("bands are banked"));
        assert!(err.is_layout_error());
    }

    #[test]
    fn test_lease_errors() {
        let err = Error::TileCheckedOut { tile_x: 1, tile_y: -2 };
        assert!(err.to_string().contains("(1, -2)"));
        assert!(err.is_lease_error());
        assert!(!err.is_bounds_error());
    }

    #[test]
    fn test_tile_fetch() {
        let err = Error::tile_fetch(3, 4, "decoder gave up");
        let msg = err.to_string();
        assert!(msg.contains("(3, 4)"));
        assert!(msg.contains("decoder gave up"));
    }
}
