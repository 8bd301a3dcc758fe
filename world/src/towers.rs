//! Authoritative tower state management utilities.

use std::collections::BTreeMap;

use path_defence_core::{CellCoord, TowerId, TowerKind, TowerSnapshot};

/// Snapshot of a tower stored inside the world.
#[derive(Clone, Debug)]
struct TowerState {
    kind: TowerKind,
    cell: CellCoord,
}

/// Registry that stores towers and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct TowerRegistry {
    entries: BTreeMap<TowerId, TowerState>,
    next_tower_id: TowerId,
}

impl TowerRegistry {
    /// Creates an empty tower registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_tower_id: TowerId::new(0),
        }
    }

    /// Stores a new tower and returns the identifier allocated to it.
    pub(crate) fn insert(&mut self, kind: TowerKind, cell: CellCoord) -> TowerId {
        let id = self.next_tower_id;
        self.next_tower_id = TowerId::new(id.get().saturating_add(1));
        let _ = self.entries.insert(id, TowerState { kind, cell });
        id
    }

    /// Identifier of the tower hosted by the cell, if any.
    pub(crate) fn at(&self, cell: CellCoord) -> Option<TowerId> {
        self.entries
            .iter()
            .find(|(_, tower)| tower.cell == cell)
            .map(|(id, _)| *id)
    }

    /// Snapshots of every tower in identifier order.
    pub(crate) fn snapshots(&self) -> Vec<TowerSnapshot> {
        self.entries
            .iter()
            .map(|(id, tower)| TowerSnapshot {
                id: *id,
                kind: tower.kind,
                cell: tower.cell,
            })
            .collect()
    }
}
