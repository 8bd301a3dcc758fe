#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Path Defence.
//!
//! The world owns the grid, the current start-to-end path, every active enemy,
//! the tower registry and the defender economy. It is mutated exclusively via
//! [`apply`], which reports every observable change as an [`Event`].

mod enemies;
mod towers;

use path_defence_core::{
    CellCoord, CellState, Command, Economy, EconomyDelta, EnemyId, EnemyTemplate, Event, Grid,
    GridError, Path, PlacementError, PlayMode, RemovalCause, ToggleRejection, TowerKind, WaveNumber,
};
use path_defence_system_pathfinding::Pathfinder;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    enemies::{DamageOutcome, EnemyRoster},
    towers::TowerRegistry,
};

const DEFAULT_GRID_SIZE: u32 = 8;
const DEFAULT_CELL_SPACING: f32 = 7.5;
const DEFAULT_ARRIVAL_THRESHOLD: f32 = 0.1;
const DEFAULT_ARRIVAL_PENALTY: i32 = 10;

/// Layout and tuning parameters used to build a [`World`].
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Number of cells along each edge of the square grid.
    pub grid_size: u32,
    /// Cell where every enemy enters the maze.
    pub start: CellCoord,
    /// Cell enemies walk towards; the far corner when omitted.
    pub end: Option<CellCoord>,
    /// World units between the centres of adjacent cells.
    pub cell_spacing: f32,
    /// Distance below which an enemy counts as standing on a path cell.
    pub arrival_threshold: f32,
    /// Health removed from the defender for every enemy reaching the end.
    pub arrival_penalty: i32,
    /// Resources available when the session starts.
    pub economy: Economy,
}

impl WorldConfig {
    /// Cell enemies walk towards once defaults are resolved.
    #[must_use]
    pub fn resolved_end(&self) -> CellCoord {
        self.end.unwrap_or_else(|| {
            let last = self.grid_size.saturating_sub(1);
            CellCoord::new(last, last)
        })
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            start: CellCoord::new(0, 0),
            end: None,
            cell_spacing: DEFAULT_CELL_SPACING,
            arrival_threshold: DEFAULT_ARRIVAL_THRESHOLD,
            arrival_penalty: DEFAULT_ARRIVAL_PENALTY,
            economy: Economy::default(),
        }
    }
}

/// Errors raised while building a world from a configuration.
#[derive(Debug, Error)]
pub enum WorldError {
    /// The grid would contain no cells.
    #[error("grid size must be at least one cell")]
    EmptyGrid,
    /// The start or end cell lies outside the grid.
    #[error("path endpoint is invalid: {0}")]
    InvalidEndpoint(#[from] GridError),
    /// No walkable route joins the start and end cells.
    #[error("start {start:?} and end {end:?} are not connected")]
    Disconnected {
        /// Configured start cell.
        start: CellCoord,
        /// Configured end cell.
        end: CellCoord,
    },
}

/// Represents the authoritative Path Defence world state.
#[derive(Debug)]
pub struct World {
    grid: Grid,
    start: CellCoord,
    end: CellCoord,
    path: Path,
    pathfinder: Pathfinder,
    play_mode: PlayMode,
    economy: Economy,
    defeated: bool,
    arrival_penalty: i32,
    cell_spacing: f32,
    current_wave: Option<WaveNumber>,
    complete: bool,
    enemies: EnemyRoster,
    towers: TowerRegistry,
}

impl World {
    /// Creates a new world with a fully open grid.
    pub fn new(config: &WorldConfig) -> Result<Self, WorldError> {
        if config.grid_size == 0 {
            return Err(WorldError::EmptyGrid);
        }

        let grid = Grid::new(config.grid_size);
        let start = config.start;
        let end = config.resolved_end();
        let _ = grid.state(start)?;
        let _ = grid.state(end)?;

        let mut pathfinder = Pathfinder::new();
        let path = pathfinder
            .find_path(&grid, start, end)
            .ok_or(WorldError::Disconnected { start, end })?;

        info!(
            size = config.grid_size,
            ?start,
            ?end,
            steps = path.steps(),
            "world created"
        );

        Ok(Self {
            grid,
            start,
            end,
            path,
            pathfinder,
            play_mode: PlayMode::Edit,
            economy: config.economy,
            defeated: config.economy.is_defeated(),
            arrival_penalty: config.arrival_penalty,
            cell_spacing: config.cell_spacing,
            current_wave: None,
            complete: false,
            enemies: EnemyRoster::new(config.cell_spacing, config.arrival_threshold),
            towers: TowerRegistry::new(),
        })
    }

    fn recompute_path(&mut self) -> Option<Path> {
        self.pathfinder.find_path(&self.grid, self.start, self.end)
    }

    fn toggle_cell(&mut self, cell: CellCoord, out_events: &mut Vec<Event>) {
        let blocked = match self.grid.state(cell) {
            Ok(state) => state == CellState::Open,
            Err(error) => {
                debug!(%error, "toggle rejected");
                reject_toggle(cell, ToggleRejection::InvalidCoordinate, out_events);
                return;
            }
        };

        if self.towers.at(cell).is_some() {
            reject_toggle(cell, ToggleRejection::Occupied, out_events);
            return;
        }

        if self.grid.set_blocked(cell, blocked).is_err() {
            reject_toggle(cell, ToggleRejection::InvalidCoordinate, out_events);
            return;
        }

        match self.recompute_path() {
            Some(path) => {
                debug!(?cell, blocked, steps = path.steps(), "cell toggled");
                self.path = path.clone();
                out_events.push(Event::CellToggled { cell, blocked });
                out_events.push(Event::PathRecomputed { path });
            }
            None if blocked => {
                // Roll back to the last connected grid.
                let restored = self.grid.set_blocked(cell, false);
                debug_assert!(restored.is_ok(), "validated cell failed to roll back");
                if let Some(path) = self.recompute_path() {
                    self.path = path.clone();
                    out_events.push(Event::PathRecomputed { path });
                }
                reject_toggle(cell, ToggleRejection::WouldSealPath, out_events);
            }
            None => {
                warn!(?cell, "grid disconnected after unblocking a cell");
                out_events.push(Event::CellToggled { cell, blocked });
            }
        }
    }

    fn set_play_mode(&mut self, mode: PlayMode, out_events: &mut Vec<Event>) {
        if self.play_mode == mode {
            return;
        }
        self.play_mode = mode;
        out_events.push(Event::PlayModeChanged { mode });
    }

    fn place_tower(&mut self, kind: TowerKind, cell: CellCoord, out_events: &mut Vec<Event>) {
        if let Err(reason) = self.validate_placement(kind, cell) {
            debug!(?kind, ?cell, %reason, "tower placement rejected");
            out_events.push(Event::TowerPlacementRejected { kind, cell, reason });
            return;
        }

        let tower = self.towers.insert(kind, cell);
        out_events.push(Event::TowerPlaced { tower, kind, cell });
        self.apply_economy(EconomyDelta::purchase(kind.cost()), out_events);
    }

    fn validate_placement(&self, kind: TowerKind, cell: CellCoord) -> Result<(), PlacementError> {
        if self.play_mode != PlayMode::Defend {
            return Err(PlacementError::InvalidMode);
        }

        match self.grid.state(cell) {
            Err(_) => return Err(PlacementError::InvalidCoordinate),
            Ok(CellState::Blocked) => return Err(PlacementError::Blocked),
            Ok(CellState::Open) => {}
        }

        if self.towers.at(cell).is_some() {
            return Err(PlacementError::Occupied);
        }

        let required = kind.cost();
        let available = self.economy.currency();
        if available < required {
            return Err(PlacementError::InsufficientCurrency {
                required,
                available,
            });
        }

        Ok(())
    }

    fn spawn_enemy(&mut self, template: EnemyTemplate, path: Path, out_events: &mut Vec<Event>) {
        match self.enemies.spawn(template, path) {
            Some((enemy, position)) => {
                debug!(enemy = enemy.get(), "enemy spawned");
                out_events.push(Event::EnemySpawned {
                    enemy,
                    position,
                    template,
                });
            }
            None => warn!("spawn ignored: enemy path is empty"),
        }
    }

    fn advance_enemies(&mut self, out_events: &mut Vec<Event>) {
        let arrived = self.enemies.advance(out_events);
        for enemy in arrived {
            debug!(enemy = enemy.get(), "enemy reached the end");
            out_events.push(Event::EnemyRemoved {
                enemy,
                cause: RemovalCause::Arrived,
            });
            self.apply_economy(EconomyDelta::arrival(self.arrival_penalty), out_events);
        }
    }

    fn damage_enemy(&mut self, enemy: EnemyId, amount: u32, out_events: &mut Vec<Event>) {
        match self.enemies.damage(enemy, amount) {
            DamageOutcome::Missing => debug!(enemy = enemy.get(), "damage for unknown enemy"),
            DamageOutcome::Wounded => {}
            DamageOutcome::Killed { reward } => {
                debug!(enemy = enemy.get(), reward, "enemy killed");
                out_events.push(Event::EnemyRemoved {
                    enemy,
                    cause: RemovalCause::Killed,
                });
                self.apply_economy(EconomyDelta::kill(reward), out_events);
            }
        }
    }

    fn apply_economy(&mut self, delta: EconomyDelta, out_events: &mut Vec<Event>) {
        let before = self.economy;
        let after = before.apply(delta);
        self.economy = after;

        if after.health() != before.health() {
            out_events.push(Event::HealthChanged {
                value: after.health(),
            });
        }
        if after.score() != before.score() {
            out_events.push(Event::ScoreChanged {
                value: after.score(),
            });
        }
        if after.currency() != before.currency() {
            out_events.push(Event::CurrencyChanged {
                value: after.currency(),
            });
        }

        if after.is_defeated() && !self.defeated {
            self.defeated = true;
            warn!(health = after.health(), "defender defeated");
            out_events.push(Event::DefenderDefeated);
        }
    }
}

fn reject_toggle(cell: CellCoord, reason: ToggleRejection, out_events: &mut Vec<Event>) {
    out_events.push(Event::CellToggleRejected { cell, reason });
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            out_events.push(Event::TimeAdvanced { dt });
            world.advance_enemies(out_events);
        }
        Command::ToggleCell { cell } => world.toggle_cell(cell, out_events),
        Command::SetPlayMode { mode } => world.set_play_mode(mode, out_events),
        Command::PlaceTower { kind, cell } => world.place_tower(kind, cell, out_events),
        Command::BeginWave { wave } => {
            info!(wave = wave.get(), "wave started");
            world.current_wave = Some(wave);
            out_events.push(Event::WaveChanged { wave });
        }
        Command::SpawnEnemy { template, path } => world.spawn_enemy(template, path, out_events),
        Command::DamageEnemy { enemy, amount } => world.damage_enemy(enemy, amount, out_events),
        Command::CompleteGame => {
            if !world.complete {
                world.complete = true;
                info!("all waves completed");
                out_events.push(Event::GameCompleted);
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use glam::Vec2;
    use path_defence_core::{
        CellCoord, Economy, EnemyId, EnemySnapshot, Grid, Path, PlayMode, TowerId, TowerSnapshot,
        WaveNumber,
    };

    use super::World;

    /// Provides read-only access to the walkability grid.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        &world.grid
    }

    /// Cell where enemies enter the maze.
    #[must_use]
    pub fn start(world: &World) -> CellCoord {
        world.start
    }

    /// Cell enemies walk towards.
    #[must_use]
    pub fn end(world: &World) -> CellCoord {
        world.end
    }

    /// Most recently computed start-to-end path.
    #[must_use]
    pub fn path(world: &World) -> &Path {
        &world.path
    }

    /// Reports whether the provided cell is blocked; out-of-bounds cells are.
    #[must_use]
    pub fn is_blocked(world: &World, cell: CellCoord) -> bool {
        world.grid.is_blocked(cell)
    }

    /// Reports the active play mode.
    #[must_use]
    pub fn play_mode(world: &World) -> PlayMode {
        world.play_mode
    }

    /// Current defender resources.
    #[must_use]
    pub fn economy(world: &World) -> Economy {
        world.economy
    }

    /// Wave most recently started, if any.
    #[must_use]
    pub fn current_wave(world: &World) -> Option<WaveNumber> {
        world.current_wave
    }

    /// Reports whether the wave schedule has been exhausted.
    #[must_use]
    pub fn is_complete(world: &World) -> bool {
        world.complete
    }

    /// Reports whether the defender health has been depleted.
    #[must_use]
    pub fn is_defeated(world: &World) -> bool {
        world.defeated
    }

    /// Number of enemies currently in the maze.
    #[must_use]
    pub fn enemy_count(world: &World) -> usize {
        world.enemies.len()
    }

    /// Snapshots of all active enemies ordered by identifier.
    #[must_use]
    pub fn enemies(world: &World) -> Vec<EnemySnapshot> {
        world.enemies.snapshots()
    }

    /// Path owned by the provided enemy.
    #[must_use]
    pub fn enemy_path(world: &World, enemy: EnemyId) -> Option<&Path> {
        world.enemies.path_of(enemy)
    }

    /// Tower hosted by the provided cell, if any.
    #[must_use]
    pub fn tower_at(world: &World, cell: CellCoord) -> Option<TowerId> {
        world.towers.at(cell)
    }

    /// Snapshots of every placed tower ordered by identifier.
    #[must_use]
    pub fn towers(world: &World) -> Vec<TowerSnapshot> {
        world.towers.snapshots()
    }

    /// World-space position of the centre of the provided cell.
    #[must_use]
    pub fn cell_position(world: &World, cell: CellCoord) -> Vec2 {
        super::enemies::world_position(cell, world.cell_spacing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_targets_the_far_corner() {
        let config = WorldConfig::default();
        assert_eq!(config.resolved_end(), CellCoord::new(7, 7));

        let world = World::new(&config).expect("default world");
        assert_eq!(query::path(&world).len(), 15);
        assert_eq!(query::play_mode(&world), PlayMode::Edit);
        assert_eq!(query::economy(&world), Economy::new(100, 0, 1_000));
    }

    #[test]
    fn invalid_configurations_are_rejected() {
        let empty = WorldConfig {
            grid_size: 0,
            ..WorldConfig::default()
        };
        assert!(matches!(World::new(&empty), Err(WorldError::EmptyGrid)));

        let outside = WorldConfig {
            end: Some(CellCoord::new(8, 0)),
            ..WorldConfig::default()
        };
        assert!(matches!(
            World::new(&outside),
            Err(WorldError::InvalidEndpoint(_))
        ));
    }

    #[test]
    fn play_mode_changes_are_reported_once() {
        let mut world = World::new(&WorldConfig::default()).expect("default world");
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::SetPlayMode {
                mode: PlayMode::Defend,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::SetPlayMode {
                mode: PlayMode::Defend,
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::PlayModeChanged {
                mode: PlayMode::Defend
            }]
        );
    }

    #[test]
    fn game_completion_is_reported_once() {
        let mut world = World::new(&WorldConfig::default()).expect("default world");
        let mut events = Vec::new();

        apply(&mut world, Command::CompleteGame, &mut events);
        apply(&mut world, Command::CompleteGame, &mut events);

        assert_eq!(events, vec![Event::GameCompleted]);
        assert!(query::is_complete(&world));
    }

    #[test]
    fn config_deserializes_with_partial_fields() {
        let config: WorldConfig = toml::from_str(
            r#"
                grid_size = 5
                arrival_penalty = 25
                start = { x = 0, z = 4 }
            "#,
        )
        .expect("valid toml");

        assert_eq!(config.grid_size, 5);
        assert_eq!(config.arrival_penalty, 25);
        assert_eq!(config.start, CellCoord::new(0, 4));
        assert_eq!(config.resolved_end(), CellCoord::new(4, 4));
        assert_eq!(config.economy, Economy::default());
    }
}
