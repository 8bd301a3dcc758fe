//! Dense walkability grid consulted by the pathfinding engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::CellCoord;

/// Walkability state of a single grid cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellState {
    /// Enemies may traverse the cell.
    #[default]
    Open,
    /// The player sealed the cell off.
    Blocked,
}

/// Errors reported when addressing cells of a [`Grid`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum GridError {
    /// The referenced cell lies outside the grid bounds.
    #[error("cell ({x}, {z}) lies outside the {size}x{size} grid")]
    InvalidCoordinate {
        /// Requested coordinate along the x axis.
        x: u32,
        /// Requested coordinate along the z axis.
        z: u32,
        /// Side length of the grid that rejected the coordinate.
        size: u32,
    },
}

/// Square grid of cell states stored densely in `x * size + z` order.
///
/// The grid is created once with a fixed side length and never resized. Only
/// the walkability of individual cells changes over its lifetime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    size: u32,
    cells: Vec<CellState>,
}

impl Grid {
    /// Creates a fully open grid with `size × size` cells.
    #[must_use]
    pub fn new(size: u32) -> Self {
        let side = usize::try_from(size).unwrap_or(0);
        let count = side.checked_mul(side).unwrap_or(0);
        Self {
            size,
            cells: vec![CellState::Open; count],
        }
    }

    /// Number of cells along each edge of the grid.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Total number of cells stored by the grid.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether the cell lies within the grid bounds.
    #[must_use]
    pub const fn is_valid(&self, cell: CellCoord) -> bool {
        cell.x() < self.size && cell.z() < self.size
    }

    /// Retrieves the state stored for the provided cell.
    pub fn state(&self, cell: CellCoord) -> Result<CellState, GridError> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied())
            .ok_or(invalid_coordinate(cell, self.size))
    }

    /// Reports whether the cell is blocked.
    ///
    /// Cells outside the grid are never walkable and therefore report `true`.
    #[must_use]
    pub fn is_blocked(&self, cell: CellCoord) -> bool {
        self.state(cell)
            .map_or(true, |state| state == CellState::Blocked)
    }

    /// Marks the cell as blocked or open.
    pub fn set_blocked(&mut self, cell: CellCoord, blocked: bool) -> Result<(), GridError> {
        let error = invalid_coordinate(cell, self.size);
        let index = self.index(cell).ok_or(error)?;
        let slot = self.cells.get_mut(index).ok_or(error)?;
        *slot = if blocked {
            CellState::Blocked
        } else {
            CellState::Open
        };
        Ok(())
    }

    /// Flat storage index of the cell, if it lies inside the grid.
    #[must_use]
    pub fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.is_valid(cell) {
            return None;
        }

        let side = usize::try_from(self.size).ok()?;
        let x = usize::try_from(cell.x()).ok()?;
        let z = usize::try_from(cell.z()).ok()?;
        x.checked_mul(side)?.checked_add(z)
    }

    /// Iterator over every blocked cell in storage order.
    pub fn blocked_cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        let size = self.size;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, state)| **state == CellState::Blocked)
            .filter_map(move |(index, _)| {
                let side = usize::try_from(size).ok().filter(|side| *side > 0)?;
                let x = u32::try_from(index / side).ok()?;
                let z = u32::try_from(index % side).ok()?;
                Some(CellCoord::new(x, z))
            })
    }

    /// Cardinal neighbours of the cell that lie inside the grid.
    ///
    /// Neighbours are yielded in `+z`, `+x`, `-z`, `-x` order regardless of
    /// their walkability.
    #[must_use]
    pub fn neighbors(&self, cell: CellCoord) -> Neighbors {
        let mut neighbors = Neighbors::default();

        if let Some(z) = cell.z().checked_add(1) {
            if z < self.size {
                neighbors.push(CellCoord::new(cell.x(), z));
            }
        }
        if let Some(x) = cell.x().checked_add(1) {
            if x < self.size {
                neighbors.push(CellCoord::new(x, cell.z()));
            }
        }
        if let Some(z) = cell.z().checked_sub(1) {
            neighbors.push(CellCoord::new(cell.x(), z));
        }
        if let Some(x) = cell.x().checked_sub(1) {
            neighbors.push(CellCoord::new(x, cell.z()));
        }

        neighbors
    }
}

/// Fixed-capacity iterator over the cardinal neighbours of a cell.
#[derive(Clone, Debug, Default)]
pub struct Neighbors {
    buffer: [Option<CellCoord>; 4],
    len: usize,
    cursor: usize,
}

impl Neighbors {
    fn push(&mut self, cell: CellCoord) {
        if self.len < self.buffer.len() {
            self.buffer[self.len] = Some(cell);
            self.len += 1;
        }
    }
}

impl Iterator for Neighbors {
    type Item = CellCoord;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.len {
            return None;
        }

        let value = self.buffer[self.cursor];
        self.cursor += 1;
        value
    }
}

const fn invalid_coordinate(cell: CellCoord, size: u32) -> GridError {
    GridError::InvalidCoordinate {
        x: cell.x(),
        z: cell.z(),
        size,
    }
}
