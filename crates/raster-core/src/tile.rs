//! A single tile: element buffer plus origin translation.

use crate::buffer::DataBuffer;

/// One tile of a tiled image.
///
/// `origin_x`/`origin_y` give the global pixel coordinate that local buffer
/// position `(0, 0)` corresponds to. For most sources this is the tile's grid
/// placement, but a tile may be stored with a different internal origin
/// (for example a tile shared between two placements, or a buffer padded on
/// the top-left). Cursors always address a pixel as
/// `(x - origin_x, y - origin_y)` within the buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    /// Element storage
    pub data: DataBuffer,
    /// Global X of local column 0
    pub origin_x: i32,
    /// Global Y of local row 0
    pub origin_y: i32,
}

impl Tile {
    /// Creates a tile.
    #[inline]
    pub fn new(data: DataBuffer, origin_x: i32, origin_y: i32) -> Self {
        Self {
            data,
            origin_x,
            origin_y,
        }
    }

    /// Converts a global coordinate to local buffer coordinates.
    ///
    /// The result is only meaningful for pixels the tile actually covers.
    #[inline]
    pub fn to_local(&self, x: i32, y: i32) -> (usize, usize) {
        debug_assert!(x >= self.origin_x && y >= self.origin_y);
        ((x - self.origin_x) as usize, (y - self.origin_y) as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::ElementType;

    #[test]
    fn test_to_local() {
        let tile = Tile::new(DataBuffer::zeroed(ElementType::U8, 1, 4), -6, 10);
        assert_eq!(tile.to_local(-6, 10), (0, 0));
        assert_eq!(tile.to_local(-5, 11), (1, 1));
    }
}
