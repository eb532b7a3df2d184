//! 2D grid for the world.

use serde::{Deserialize, Serialize};
use wator_core::{Cell, Coord};

/// A square toroidal grid, stored row-major
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    size: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Create an all-empty grid of `size × size` cells
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![Cell::empty(); size * size],
        }
    }

    /// Shape is the caller's invariant.
    pub(crate) fn from_raw(size: usize, cells: Vec<Cell>) -> Self {
        debug_assert_eq!(cells.len(), size * size);
        Self { size, cells }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Map an index at most one step outside `[0, size)` back into range
    pub fn wrap(&self, i: isize) -> usize {
        let size = self.size as isize;
        if i < 0 {
            (i + size) as usize
        } else if i >= size {
            (i - size) as usize
        } else {
            i as usize
        }
    }

    /// The four orthogonal neighbours in North, South, West, East order
    pub fn neighbors(&self, coord: Coord) -> [Coord; 4] {
        let row = coord.row as isize;
        let col = coord.col as isize;
        [
            Coord::new(self.wrap(row - 1), coord.col),
            Coord::new(self.wrap(row + 1), coord.col),
            Coord::new(coord.row, self.wrap(col - 1)),
            Coord::new(coord.row, self.wrap(col + 1)),
        ]
    }

    pub fn get(&self, coord: Coord) -> &Cell {
        &self.cells[self.index_of(coord)]
    }

    pub fn set(&mut self, coord: Coord, cell: Cell) {
        let index = self.index_of(coord);
        self.cells[index] = cell;
    }

    pub fn index_of(&self, coord: Coord) -> usize {
        coord.row * self.size + coord.col
    }

    pub fn coord_of(&self, index: usize) -> Coord {
        Coord::new(index / self.size, index % self.size)
    }

    /// Cells of one row
    pub fn row(&self, row: usize) -> &[Cell] {
        let start = row * self.size;
        &self.cells[start..start + self.size]
    }

    /// Iterator over all cells with coordinates, row-major
    pub fn iter(&self) -> impl Iterator<Item = (Coord, &Cell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| (self.coord_of(i), cell))
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }
}
