//! Immutable route produced by a single pathfinding search.

use serde::{Deserialize, Serialize};

use crate::CellCoord;

/// Ordered cells leading from the start cell to the end cell, both inclusive.
///
/// A path never changes after the search that produced it returns. Cloning
/// yields an independent copy, which is how every spawned enemy receives its
/// own route: later grid edits and searches cannot reach enemies in flight.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Path {
    cells: Vec<CellCoord>,
}

impl Path {
    /// Wraps the provided start-to-end cell sequence.
    #[must_use]
    pub fn new(cells: Vec<CellCoord>) -> Self {
        Self { cells }
    }

    /// Cells composing the path in travel order.
    #[must_use]
    pub fn cells(&self) -> &[CellCoord] {
        &self.cells
    }

    /// Number of cells on the path, endpoints included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether the path contains no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of single-cell moves required to walk the path.
    #[must_use]
    pub fn steps(&self) -> usize {
        self.cells.len().saturating_sub(1)
    }

    /// Cell stored at the provided cursor, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<CellCoord> {
        self.cells.get(index).copied()
    }

    /// First cell of the path.
    #[must_use]
    pub fn start(&self) -> Option<CellCoord> {
        self.cells.first().copied()
    }

    /// Last cell of the path.
    #[must_use]
    pub fn end(&self) -> Option<CellCoord> {
        self.cells.last().copied()
    }

    /// Iterator over the cells in travel order.
    pub fn iter(&self) -> impl Iterator<Item = &CellCoord> {
        self.cells.iter()
    }

    /// Reports whether the path visits the provided cell.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.cells.contains(&cell)
    }
}
