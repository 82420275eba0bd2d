use std::fmt;

use serde::{Deserialize, Serialize};

/// A numbered piece placed at a board cell.
///
/// Tiles carry no identity across moves: a tilt relocates values, and
/// `Game::tile` reports whatever value currently sits in a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    pub value: u32,
    pub col: usize,
    pub row: usize,
}

impl Tile {
    /// Create a tile of `value` at (`col`, `row`).
    ///
    /// Panics if `value` is not a power of two of at least 2.
    #[inline]
    pub fn new(value: u32, col: usize, row: usize) -> Self {
        assert!(
            is_valid_value(value),
            "tile value {value} is not a power of two >= 2"
        );
        Tile { value, col, row }
    }
}

/// True for 2, 4, 8, ...
#[inline]
pub fn is_valid_value(value: u32) -> bool {
    value >= 2 && value.is_power_of_two()
}

/// Fixed-size square storage of optional tile values.
///
/// Coordinates are `(col, row)` with row 0 at the bottom edge. The grid owns
/// no game rules; it only guarantees at most one value per cell.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    size: usize,
    cells: Vec<Option<u32>>,
}

impl Grid {
    /// An empty `size` x `size` grid. Panics if `size` is zero.
    pub fn new(size: usize) -> Self {
        assert!(size > 0, "board size must be positive");
        Grid {
            size,
            cells: vec![None; size * size],
        }
    }

    /// Build a grid from `values[row][col]`, row 0 at the bottom, 0 for empty.
    ///
    /// Panics on a non-square matrix or a value that is not a power of two.
    pub fn from_values(values: &[Vec<u32>]) -> Self {
        let size = values.len();
        let mut grid = Grid::new(size);
        for (row, line) in values.iter().enumerate() {
            assert_eq!(
                line.len(),
                size,
                "row {row} has {} cells, expected {size}",
                line.len()
            );
            for (col, &value) in line.iter().enumerate() {
                if value != 0 {
                    grid.place(Tile::new(value, col, row));
                }
            }
        }
        grid
    }

    /// Number of cells along one side.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    fn index(&self, col: usize, row: usize) -> usize {
        assert!(
            col < self.size && row < self.size,
            "cell ({col}, {row}) is outside a {0}x{0} board",
            self.size
        );
        row * self.size + col
    }

    /// Value at (`col`, `row`), `None` if the cell is empty.
    #[inline]
    pub fn get(&self, col: usize, row: usize) -> Option<u32> {
        self.cells[self.index(col, row)]
    }

    /// Overwrite the cell at (`col`, `row`).
    #[inline]
    pub(crate) fn set(&mut self, col: usize, row: usize, value: Option<u32>) {
        let idx = self.index(col, row);
        self.cells[idx] = value;
    }

    /// Put `tile` on its cell. Panics if the cell is occupied.
    pub fn place(&mut self, tile: Tile) {
        let idx = self.index(tile.col, tile.row);
        assert!(
            self.cells[idx].is_none(),
            "cell ({}, {}) is already occupied by {}",
            tile.col,
            tile.row,
            self.cells[idx].unwrap_or_default()
        );
        self.cells[idx] = Some(tile.value);
    }

    /// Empty every cell.
    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(|c| *c = None);
    }

    /// Iterate occupied cells as tiles, row by row from the bottom.
    pub fn tiles(&self) -> impl Iterator<Item = Tile> + '_ {
        self.cells.iter().enumerate().filter_map(move |(idx, cell)| {
            cell.map(|value| Tile {
                value,
                col: idx % self.size,
                row: idx / self.size,
            })
        })
    }

    /// Coordinates of every empty cell, row by row from the bottom.
    pub fn empty_cells(&self) -> Vec<(usize, usize)> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_none())
            .map(|(idx, _)| (idx % self.size, idx / self.size))
            .collect()
    }

    /// Count the number of empty cells.
    #[inline]
    pub fn count_empty(&self) -> usize {
        self.cells.iter().filter(|c| c.is_none()).count()
    }

    /// Sum of all tile values on the grid.
    pub fn total_value(&self) -> u64 {
        self.cells.iter().flatten().map(|&v| v as u64).sum()
    }

    /// Highest tile value present, 0 on an empty grid.
    pub fn highest_tile(&self) -> u32 {
        self.cells.iter().flatten().copied().max().unwrap_or(0)
    }

    /// Values as `[row][col]` with row 0 at the bottom and 0 for empty cells.
    pub fn to_values(&self) -> Vec<Vec<u32>> {
        self.cells
            .chunks(self.size)
            .map(|line| line.iter().map(|c| c.unwrap_or(0)).collect())
            .collect()
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Grid{:?}", self.to_values())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_values_places_row_zero_at_bottom() {
        let grid = Grid::from_values(&[vec![2, 0], vec![0, 4]]);
        assert_eq!(grid.get(0, 0), Some(2));
        assert_eq!(grid.get(1, 1), Some(4));
        assert_eq!(grid.get(1, 0), None);
        assert_eq!(grid.to_values(), vec![vec![2, 0], vec![0, 4]]);
    }

    #[test]
    fn counts_and_totals() {
        let grid = Grid::from_values(&[vec![2, 2, 0], vec![0, 8, 0], vec![0, 0, 16]]);
        assert_eq!(grid.count_empty(), 5);
        assert_eq!(grid.total_value(), 28);
        assert_eq!(grid.highest_tile(), 16);
        assert_eq!(grid.tiles().count(), 4);
        assert_eq!(grid.empty_cells().len(), 5);
        assert_eq!(Grid::new(3).highest_tile(), 0);
    }

    #[test]
    fn clear_empties_every_cell() {
        let mut grid = Grid::from_values(&[vec![2, 4], vec![8, 16]]);
        grid.clear();
        assert_eq!(grid.count_empty(), 4);
        assert_eq!(grid, Grid::new(2));
    }

    #[test]
    #[should_panic(expected = "already occupied")]
    fn place_on_occupied_cell_panics() {
        let mut grid = Grid::new(4);
        grid.place(Tile::new(2, 1, 1));
        grid.place(Tile::new(4, 1, 1));
    }

    #[test]
    #[should_panic(expected = "board size must be positive")]
    fn zero_size_panics() {
        let _ = Grid::new(0);
    }

    #[test]
    #[should_panic(expected = "not a power of two")]
    fn odd_value_panics() {
        let _ = Grid::from_values(&[vec![3]]);
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn out_of_range_read_panics() {
        let _ = Grid::new(2).get(2, 0);
    }
}
