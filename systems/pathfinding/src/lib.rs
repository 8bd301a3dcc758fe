#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! A* pathfinding over the walkability grid.
//!
//! Searches move between cardinal neighbours only, every edge costs one and
//! the Manhattan distance to the end cell guides the expansion order. The
//! heuristic is admissible and consistent on this grid, so the first time the
//! end cell is popped from the open set its path is optimal and closed nodes
//! never need to be reopened.
//!
//! Among open nodes with equal f-scores the one discovered first is expanded
//! first. That order is an implementation detail: callers must not depend on
//! which of several equally short paths is returned.

use std::{cmp::Ordering, collections::BinaryHeap};

use path_defence_core::{CellCoord, Grid, Path};
use tracing::trace;

const UNVISITED: u32 = u32::MAX;

/// Finds the shortest walkable path between `start` and `end`.
///
/// Returns `None` when the cells are not connected through open cells, or
/// when either endpoint is blocked or outside the grid. A missing path is an
/// expected outcome, not an error.
#[must_use]
pub fn find_path(grid: &Grid, start: CellCoord, end: CellCoord) -> Option<Path> {
    Pathfinder::new().find_path(grid, start, end)
}

/// Reusable A* search that keeps its scratch buffers between searches.
///
/// Scratch storage is flat and indexed the same way as the grid, so repeated
/// searches over the same grid perform no per-node allocation.
#[derive(Debug, Default)]
pub struct Pathfinder {
    g_score: Vec<u32>,
    came_from: Vec<Option<CellCoord>>,
    closed: Vec<bool>,
    open: BinaryHeap<OpenNode>,
    sequence: u64,
    nodes_expanded: usize,
}

impl Pathfinder {
    /// Creates a pathfinder with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes finalized by the most recent search.
    #[must_use]
    pub fn nodes_expanded(&self) -> usize {
        self.nodes_expanded
    }

    /// Finds the shortest walkable path between `start` and `end`.
    ///
    /// The grid is only read. See [`find_path`] for the result contract.
    pub fn find_path(&mut self, grid: &Grid, start: CellCoord, end: CellCoord) -> Option<Path> {
        self.prepare(grid.cell_count());

        if grid.is_blocked(start) || grid.is_blocked(end) {
            trace!(?start, ?end, "endpoint not walkable");
            return None;
        }

        let start_index = grid.index(start)?;
        self.g_score[start_index] = 0;
        self.push(start, start.manhattan_distance(end));

        while let Some(node) = self.open.pop() {
            let Some(current_index) = grid.index(node.cell) else {
                continue;
            };

            if self.closed[current_index] {
                continue;
            }

            let current_g = self.g_score[current_index];
            // Entries superseded by a cheaper route carry a larger f-score.
            if node.f != current_g.saturating_add(node.cell.manhattan_distance(end)) {
                continue;
            }

            self.nodes_expanded += 1;

            if node.cell == end {
                let path = self.reconstruct(grid, end);
                trace!(
                    expanded = self.nodes_expanded,
                    steps = path.steps(),
                    "path found"
                );
                return Some(path);
            }

            self.closed[current_index] = true;
            let tentative_g = current_g.saturating_add(1);

            for neighbor in grid.neighbors(node.cell) {
                if grid.is_blocked(neighbor) {
                    continue;
                }

                let Some(neighbor_index) = grid.index(neighbor) else {
                    continue;
                };

                if self.closed[neighbor_index] {
                    continue;
                }

                if tentative_g >= self.g_score[neighbor_index] {
                    continue;
                }

                self.came_from[neighbor_index] = Some(node.cell);
                self.g_score[neighbor_index] = tentative_g;
                self.push(
                    neighbor,
                    tentative_g.saturating_add(neighbor.manhattan_distance(end)),
                );
            }
        }

        trace!(expanded = self.nodes_expanded, ?start, ?end, "no path");
        None
    }

    fn prepare(&mut self, cell_count: usize) {
        self.g_score.clear();
        self.g_score.resize(cell_count, UNVISITED);
        self.came_from.clear();
        self.came_from.resize(cell_count, None);
        self.closed.clear();
        self.closed.resize(cell_count, false);
        self.open.clear();
        self.sequence = 0;
        self.nodes_expanded = 0;
    }

    fn push(&mut self, cell: CellCoord, f: u32) {
        self.open.push(OpenNode {
            f,
            sequence: self.sequence,
            cell,
        });
        self.sequence = self.sequence.wrapping_add(1);
    }

    fn reconstruct(&self, grid: &Grid, end: CellCoord) -> Path {
        let mut cells = vec![end];
        let mut current = end;

        while let Some(previous) = grid
            .index(current)
            .and_then(|index| self.came_from.get(index).copied().flatten())
        {
            cells.push(previous);
            current = previous;
        }

        cells.reverse();
        Path::new(cells)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct OpenNode {
    f: u32,
    sequence: u64,
    cell: CellCoord,
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
