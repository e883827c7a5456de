use geom::v64;

use crate::Color;

/// A `width x height` raster, row-major, `(0, 0)` is the top-left cell.
#[derive(Debug, Clone)]
pub struct Grid<T> {
    width: u32,
    height: u32,
    cells: Vec<T>,
}

/// Diffuse color lookup table.
pub type Texture = Grid<Color>;

/// Tangent-space normal perturbations, each component in `[-1, 1]`.
pub type BumpMap = Grid<v64>;

impl<T: Copy> Grid<T> {
    pub(crate) fn new(width: u32, height: u32, cells: Vec<T>) -> Grid<T> {
        assert!(width as usize * height as usize == cells.len());
        Grid { width, height, cells }
    }

    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> T) -> Grid<T> {
        let cells = (0..height).flat_map(|y| (0..width).map(move |x| (x, y)));
        let cells = cells.map(|(x, y)| f(x, y)).collect();
        Grid { width, height, cells }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Panics if `(x, y)` is outside the grid.
    pub fn get(&self, x: u32, y: u32) -> T {
        assert!(x < self.width && y < self.height);
        self.cells[y as usize * self.width as usize + x as usize]
    }
}

#[test]
fn test_grid_is_row_major() {
    let grid = Grid::from_fn(3, 2, |x, y| x + 10 * y);
    assert_eq!(grid.get(2, 0), 2);
    assert_eq!(grid.get(0, 1), 10);
    assert_eq!(grid.get(2, 1), 12);
    assert_eq!(Grid::new(3, 2, vec![0, 1, 2, 10, 11, 12]).get(1, 1), 11);
}
