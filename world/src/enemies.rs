//! Enemy roster that walks every active enemy along its own path.

use glam::Vec2;
use path_defence_core::{CellCoord, EnemyId, EnemySnapshot, EnemyTemplate, Event, Path};

/// Result of applying damage to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum DamageOutcome {
    /// No active enemy carries the identifier.
    Missing,
    /// The enemy survived the hit.
    Wounded,
    /// The enemy died and was removed from the roster.
    Killed {
        /// Reward carried by the enemy.
        reward: u32,
    },
}

/// Exclusive owner of all active enemies.
#[derive(Debug)]
pub(crate) struct EnemyRoster {
    enemies: Vec<Enemy>,
    next_enemy_id: EnemyId,
    cell_spacing: f32,
    arrival_threshold: f32,
}

impl EnemyRoster {
    pub(crate) fn new(cell_spacing: f32, arrival_threshold: f32) -> Self {
        Self {
            enemies: Vec::new(),
            next_enemy_id: EnemyId::new(0),
            cell_spacing,
            arrival_threshold,
        }
    }

    /// Places a new enemy on the first cell of its path.
    ///
    /// Returns `None` without spawning when the path is empty.
    pub(crate) fn spawn(&mut self, template: EnemyTemplate, path: Path) -> Option<(EnemyId, Vec2)> {
        let position = world_position(path.start()?, self.cell_spacing);
        let id = self.next_enemy_id;
        self.next_enemy_id = EnemyId::new(id.get().saturating_add(1));
        self.enemies.push(Enemy {
            id,
            health: template.health(),
            speed: template.speed(),
            reward: template.reward(),
            path,
            path_index: 0,
            position,
            ticks_walked: 0,
            reached: 0.0,
        });
        Some((id, position))
    }

    /// Moves every enemy for one tick and removes the ones that arrived.
    ///
    /// Enemies never observe each other, so the update order is irrelevant.
    /// Arrivals are removed before this returns; the identifiers are reported
    /// in roster order.
    pub(crate) fn advance(&mut self, out_events: &mut Vec<Event>) -> Vec<EnemyId> {
        let cell_spacing = self.cell_spacing;
        let arrival_threshold = self.arrival_threshold;
        let mut arrived = Vec::new();

        for enemy in &mut self.enemies {
            let travel = enemy.travel(cell_spacing, arrival_threshold);
            if travel.moved {
                out_events.push(Event::EnemyMoved {
                    enemy: enemy.id,
                    position: enemy.position,
                });
            }
            if travel.arrived {
                arrived.push(enemy.id);
            }
        }

        if !arrived.is_empty() {
            self.enemies.retain(|enemy| !arrived.contains(&enemy.id));
        }

        arrived
    }

    /// Subtracts health from the enemy, removing it when health runs out.
    pub(crate) fn damage(&mut self, id: EnemyId, amount: u32) -> DamageOutcome {
        let Some(index) = self.enemies.iter().position(|enemy| enemy.id == id) else {
            return DamageOutcome::Missing;
        };

        let enemy = &mut self.enemies[index];
        enemy.health = enemy.health.saturating_sub(amount);
        if enemy.health > 0 {
            return DamageOutcome::Wounded;
        }

        let removed = self.enemies.remove(index);
        DamageOutcome::Killed {
            reward: removed.reward,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.enemies.len()
    }

    pub(crate) fn path_of(&self, id: EnemyId) -> Option<&Path> {
        self.enemies
            .iter()
            .find(|enemy| enemy.id == id)
            .map(|enemy| &enemy.path)
    }

    pub(crate) fn snapshots(&self) -> Vec<EnemySnapshot> {
        let mut snapshots: Vec<EnemySnapshot> = self
            .enemies
            .iter()
            .map(|enemy| EnemySnapshot {
                id: enemy.id,
                position: enemy.position,
                health: enemy.health,
                path_index: enemy.path_index,
                path_len: enemy.path.len(),
            })
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.id);
        snapshots
    }
}

#[derive(Clone, Debug)]
struct Enemy {
    id: EnemyId,
    health: u32,
    speed: f32,
    reward: u32,
    path: Path,
    path_index: usize,
    position: Vec2,
    ticks_walked: u64,
    reached: f64,
}

#[derive(Clone, Copy, Debug, Default)]
struct Travel {
    moved: bool,
    arrived: bool,
}

impl Enemy {
    /// Spends one tick worth of movement walking the path.
    ///
    /// Distance walked is `ticks * speed` along the path, so an enemy reaches
    /// the end of a path of length `L` after exactly `ceil(L / speed)` ticks.
    /// A waypoint counts as reached once the walked distance covers it, up to
    /// rounding tolerance capped by `arrival_threshold`.
    fn travel(&mut self, cell_spacing: f32, arrival_threshold: f32) -> Travel {
        self.ticks_walked = self.ticks_walked.saturating_add(1);
        let walked = self.ticks_walked as f64 * f64::from(self.speed.max(0.0));
        let slack = (walked * f64::from(f32::EPSILON)).min(f64::from(arrival_threshold.max(0.0)));
        let before = self.position;

        loop {
            let Some(cell) = self.path.get(self.path_index) else {
                return Travel {
                    moved: self.position != before,
                    arrived: true,
                };
            };

            let from = self
                .path_index
                .checked_sub(1)
                .and_then(|index| self.path.get(index))
                .map_or(self.position, |previous| {
                    world_position(previous, cell_spacing)
                });
            let to = world_position(cell, cell_spacing);
            let segment = f64::from(from.distance(to));
            let along = walked - self.reached;

            if segment <= along + slack {
                self.reached += segment;
                self.position = to;
                self.path_index += 1;
                continue;
            }

            let fraction = (along / segment).max(0.0) as f32;
            self.position = from.lerp(to, fraction);
            return Travel {
                moved: self.position != before,
                arrived: false,
            };
        }
    }
}

/// World-space position of the cell's centre on the x/z plane.
pub(crate) fn world_position(cell: CellCoord, cell_spacing: f32) -> Vec2 {
    Vec2::new(cell.x() as f32 * cell_spacing, cell.z() as f32 * cell_spacing)
}
