use tilebrot_core::CoreError;

use crate::error::RenderError;

/// A rectangular tile within the frame, as half-open pixel ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub x_start: u32,
    pub x_end: u32,
    pub y_start: u32,
    pub y_end: u32,
}

impl Tile {
    #[inline]
    pub fn width(&self) -> u32 {
        self.x_end - self.x_start
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.y_end - self.y_start
    }

    /// Number of pixels in this tile.
    pub fn pixel_count(&self) -> usize {
        self.width() as usize * self.height() as usize
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        (self.x_start..self.x_end).contains(&x) && (self.y_start..self.y_end).contains(&y)
    }
}

/// The tiles of one frame together with the pixel count they cover.
///
/// The collector waits for exactly [`pixel_count`](Self::pixel_count)
/// results, so this is the only place that number is derived.
#[derive(Debug, Clone)]
pub struct TileGrid {
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
    pixel_count: usize,
}

impl TileGrid {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Total pixels covered by all tiles.
    pub fn pixel_count(&self) -> usize {
        self.pixel_count
    }

    /// Check that the tiles cover exactly `width × height` pixels.
    pub fn validate(&self) -> crate::Result<()> {
        let expected = self.width as usize * self.height as usize;
        let in_bounds = self.tiles.iter().all(|t| {
            t.x_start < t.x_end
                && t.x_end <= self.width
                && t.y_start < t.y_end
                && t.y_end <= self.height
        });
        if !in_bounds || self.pixel_count != expected {
            return Err(RenderError::GeometryMismatch {
                expected,
                actual: self.pixel_count,
            });
        }
        Ok(())
    }
}

/// Split `[0, len)` into `count` spans of `len / count`, the last one
/// absorbing the remainder.
fn spans(len: u32, count: u32) -> impl Iterator<Item = (u32, u32)> {
    let span = len / count;
    (0..count).map(move |i| {
        let start = i * span;
        let end = if i + 1 == count { len } else { start + span };
        (start, end)
    })
}

/// Partition a `width × height` frame into a `tiles_x × tiles_y` grid.
///
/// Tiles are returned row-major. Tile counts larger than the frame dimension
/// are clamped so that no tile is empty.
pub fn partition(width: u32, height: u32, tiles_x: u32, tiles_y: u32) -> crate::Result<TileGrid> {
    if width == 0 || height == 0 {
        return Err(CoreError::InvalidDimensions { width, height }.into());
    }
    if tiles_x == 0 || tiles_y == 0 {
        return Err(RenderError::InvalidTileGrid { tiles_x, tiles_y });
    }
    let tiles_x = tiles_x.min(width);
    let tiles_y = tiles_y.min(height);

    let mut tiles = Vec::with_capacity(tiles_x as usize * tiles_y as usize);
    for (y_start, y_end) in spans(height, tiles_y) {
        for (x_start, x_end) in spans(width, tiles_x) {
            tiles.push(Tile {
                x_start,
                x_end,
                y_start,
                y_end,
            });
        }
    }
    let pixel_count = tiles.iter().map(Tile::pixel_count).sum();

    let grid = TileGrid {
        width,
        height,
        tiles,
        pixel_count,
    };
    grid.validate()?;
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_exact_cover(width: u32, height: u32, tiles_x: u32, tiles_y: u32) {
        let grid = partition(width, height, tiles_x, tiles_y).unwrap();
        let mut covered = vec![false; (width * height) as usize];
        for tile in grid.tiles() {
            for py in tile.y_start..tile.y_end {
                for px in tile.x_start..tile.x_end {
                    let idx = py as usize * width as usize + px as usize;
                    assert!(!covered[idx], "pixel ({px}, {py}) covered twice");
                    covered[idx] = true;
                }
            }
        }
        assert!(
            covered.iter().all(|&c| c),
            "{width}×{height} / {tiles_x}×{tiles_y}: all pixels must be covered"
        );
        assert_eq!(grid.pixel_count(), (width * height) as usize);
    }

    #[test]
    fn even_division_covers_frame() {
        assert_exact_cover(640, 640, 10, 10);
    }

    #[test]
    fn uneven_division_covers_frame() {
        assert_exact_cover(641, 479, 10, 7);
        assert_exact_cover(13, 17, 4, 5);
        assert_exact_cover(99, 1, 8, 1);
    }

    #[test]
    fn coverage_over_many_shapes() {
        for width in 1..24 {
            for height in [1, 5, 16] {
                for tiles in 1..9 {
                    assert_exact_cover(width, height, tiles, tiles.max(2) - 1);
                }
            }
        }
    }

    #[test]
    fn last_tile_absorbs_remainder() {
        let grid = partition(105, 10, 10, 1).unwrap();
        let last = grid.tiles().last().unwrap();
        assert_eq!(last.x_start, 90);
        assert_eq!(last.x_end, 105);
        assert_eq!(grid.tiles()[0].width(), 10);
    }

    #[test]
    fn single_tile_is_whole_frame() {
        let grid = partition(37, 21, 1, 1).unwrap();
        assert_eq!(grid.len(), 1);
        assert_eq!(
            grid.tiles()[0],
            Tile {
                x_start: 0,
                x_end: 37,
                y_start: 0,
                y_end: 21
            }
        );
    }

    #[test]
    fn too_many_tiles_are_clamped() {
        let grid = partition(3, 2, 10, 10).unwrap();
        assert_eq!(grid.len(), 6);
        assert!(grid.tiles().iter().all(|t| t.pixel_count() == 1));
    }

    #[test]
    fn tiles_are_row_major() {
        let grid = partition(4, 4, 2, 2).unwrap();
        let origins: Vec<_> = grid.tiles().iter().map(|t| (t.x_start, t.y_start)).collect();
        assert_eq!(origins, vec![(0, 0), (2, 0), (0, 2), (2, 2)]);
    }

    #[test]
    fn rejects_degenerate_input() {
        assert!(matches!(
            partition(10, 10, 0, 3),
            Err(RenderError::InvalidTileGrid { .. })
        ));
        assert!(partition(0, 10, 1, 1).is_err());
    }

    #[test]
    fn validate_detects_gap() {
        let mut grid = partition(10, 10, 2, 2).unwrap();
        grid.tiles.pop();
        grid.pixel_count = grid.tiles.iter().map(Tile::pixel_count).sum();
        assert!(matches!(
            grid.validate(),
            Err(RenderError::GeometryMismatch {
                expected: 100,
                actual: 75
            })
        ));
    }

    #[test]
    fn tile_contains_is_half_open() {
        let t = Tile {
            x_start: 2,
            x_end: 4,
            y_start: 0,
            y_end: 1,
        };
        assert!(t.contains(2, 0));
        assert!(t.contains(3, 0));
        assert!(!t.contains(4, 0));
        assert!(!t.contains(2, 1));
    }
}
