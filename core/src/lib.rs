#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Path Defence engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots such as the [`Grid`], and respond exclusively with new command
//! batches.

mod grid;
mod path;

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use grid::{CellState, Grid, GridError, Neighbors};
pub use path::Path;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    ///
    /// Enemies travel their configured speed once per tick; spawn cadences
    /// accumulate the delta.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Flips the blocked state of a cell as a single transaction.
    ToggleCell {
        /// Cell the player selected.
        cell: CellCoord,
    },
    /// Requests that the world transition to the provided play mode.
    SetPlayMode {
        /// Mode the world should activate.
        mode: PlayMode,
    },
    /// Requests placement of a tower on the provided cell.
    PlaceTower {
        /// Type of tower to construct.
        kind: TowerKind,
        /// Cell that hosts the tower.
        cell: CellCoord,
    },
    /// Announces that the wave director started a new wave.
    BeginWave {
        /// Number of the wave that started.
        wave: WaveNumber,
    },
    /// Requests that an enemy enter the maze along its own path.
    SpawnEnemy {
        /// Statistics assigned to the spawned enemy.
        template: EnemyTemplate,
        /// Route the enemy follows; owned by the enemy from now on.
        path: Path,
    },
    /// Deals damage to an active enemy.
    DamageEnemy {
        /// Identifier of the enemy that was hit.
        enemy: EnemyId,
        /// Amount of health removed by the hit.
        amount: u32,
    },
    /// Announces that the wave schedule is exhausted.
    CompleteGame,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a cell changed its blocked state.
    CellToggled {
        /// Cell whose state changed.
        cell: CellCoord,
        /// Whether the cell is blocked after the toggle.
        blocked: bool,
    },
    /// Reports that a toggle request left the grid unchanged.
    CellToggleRejected {
        /// Cell named by the request.
        cell: CellCoord,
        /// Specific reason the toggle was rejected.
        reason: ToggleRejection,
    },
    /// Publishes the path computed after the grid changed.
    PathRecomputed {
        /// Fresh start-to-end path over the current grid.
        path: Path,
    },
    /// Announces that the simulation entered a new play mode.
    PlayModeChanged {
        /// Mode that became active.
        mode: PlayMode,
    },
    /// Confirms that an enemy entered the maze.
    EnemySpawned {
        /// Identifier allocated to the enemy.
        enemy: EnemyId,
        /// World-space position of the enemy at spawn.
        position: Vec2,
        /// Statistics applied to the enemy.
        template: EnemyTemplate,
    },
    /// Reports the new position of an enemy that travelled this tick.
    EnemyMoved {
        /// Identifier of the enemy that moved.
        enemy: EnemyId,
        /// World-space position after the move.
        position: Vec2,
    },
    /// Confirms that an enemy left the simulation.
    EnemyRemoved {
        /// Identifier of the removed enemy.
        enemy: EnemyId,
        /// Why the enemy was removed.
        cause: RemovalCause,
    },
    /// Reports the defender health after a change.
    HealthChanged {
        /// Current defender health.
        value: i32,
    },
    /// Reports the score after a change.
    ScoreChanged {
        /// Current score.
        value: u32,
    },
    /// Reports the currency after a change.
    CurrencyChanged {
        /// Current currency.
        value: u32,
    },
    /// Reports that a new wave became current.
    WaveChanged {
        /// Number of the current wave.
        wave: WaveNumber,
    },
    /// Signals that no configured wave remains.
    GameCompleted,
    /// Signals that the defender health dropped to zero or below.
    DefenderDefeated,
    /// Confirms that a tower was placed.
    TowerPlaced {
        /// Identifier assigned to the tower.
        tower: TowerId,
        /// Type of tower that was placed.
        kind: TowerKind,
        /// Cell hosting the tower.
        cell: CellCoord,
    },
    /// Reports that a tower placement request was rejected.
    TowerPlacementRejected {
        /// Type of tower requested.
        kind: TowerKind,
        /// Cell named by the request.
        cell: CellCoord,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
}

/// Location of a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    x: u32,
    z: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(x: u32, z: u32) -> Self {
        Self { x, z }
    }

    /// Zero-based index along the x axis.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based index along the z axis.
    #[must_use]
    pub const fn z(&self) -> u32 {
        self.z
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.x.abs_diff(other.x) + self.z.abs_diff(other.z)
    }
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// One-based number of a wave within the schedule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WaveNumber(u32);

impl WaveNumber {
    /// Creates a new wave number.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric value of the wave number.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Wave that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

/// Describes the active interaction mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlayMode {
    /// Maze editing mode; towers cannot be placed.
    Edit,
    /// Defence mode; towers may be placed.
    Defend,
}

/// Statistics shared by every enemy of a wave.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyTemplate {
    health: u32,
    speed: f32,
    reward: u32,
    scale: f32,
}

impl EnemyTemplate {
    /// Creates a new enemy template.
    #[must_use]
    pub const fn new(health: u32, speed: f32, reward: u32, scale: f32) -> Self {
        Self {
            health,
            speed,
            reward,
            scale,
        }
    }

    /// Health an enemy starts with.
    #[must_use]
    pub const fn health(&self) -> u32 {
        self.health
    }

    /// Distance in world units travelled per tick.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// Currency and score credited when the enemy is killed.
    #[must_use]
    pub const fn reward(&self) -> u32 {
        self.reward
    }

    /// Visual scale forwarded to presentation.
    #[must_use]
    pub const fn scale(&self) -> f32 {
        self.scale
    }
}

/// Spawn definition of a single wave.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaveConfig {
    enemy_count: u32,
    spawn_interval_ms: u64,
    enemy: EnemyTemplate,
}

impl WaveConfig {
    /// Creates a new wave definition.
    #[must_use]
    pub const fn new(enemy_count: u32, spawn_interval: Duration, enemy: EnemyTemplate) -> Self {
        Self {
            enemy_count,
            spawn_interval_ms: saturating_millis(spawn_interval),
            enemy,
        }
    }

    /// Number of enemies spawned by the wave.
    #[must_use]
    pub const fn enemy_count(&self) -> u32 {
        self.enemy_count
    }

    /// Simulated time between consecutive spawns.
    #[must_use]
    pub const fn spawn_interval(&self) -> Duration {
        Duration::from_millis(self.spawn_interval_ms)
    }

    /// Template applied to every enemy of the wave.
    #[must_use]
    pub const fn enemy(&self) -> EnemyTemplate {
        self.enemy
    }
}

const fn saturating_millis(duration: Duration) -> u64 {
    let millis = duration.as_millis();
    if millis > u64::MAX as u128 {
        u64::MAX
    } else {
        millis as u64
    }
}

/// Ordered wave definitions indexed by [`WaveNumber`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WaveSchedule {
    waves: Vec<WaveConfig>,
}

impl WaveSchedule {
    /// Creates a schedule from waves listed in play order.
    #[must_use]
    pub fn new(waves: Vec<WaveConfig>) -> Self {
        Self { waves }
    }

    /// Definition of the provided wave, or `None` past the last wave.
    #[must_use]
    pub fn get(&self, wave: WaveNumber) -> Option<&WaveConfig> {
        let index = usize::try_from(wave.get()).ok()?.checked_sub(1)?;
        self.waves.get(index)
    }

    /// Number of configured waves.
    #[must_use]
    pub fn len(&self) -> usize {
        self.waves.len()
    }

    /// Reports whether no wave is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waves.is_empty()
    }
}

impl Default for WaveSchedule {
    fn default() -> Self {
        Self::new(vec![
            WaveConfig::new(
                10,
                Duration::from_millis(1_000),
                EnemyTemplate::new(100, 0.05, 10, 0.5),
            ),
            WaveConfig::new(
                15,
                Duration::from_millis(800),
                EnemyTemplate::new(150, 0.06, 15, 0.6),
            ),
        ])
    }
}

/// Policy deciding how the next wave starts once a wave is cleared.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Progression {
    /// The next wave waits for an explicit start request.
    #[default]
    Manual,
    /// The next wave starts after the delay elapses in simulated time.
    Automatic {
        /// Delay in milliseconds between clearing a wave and the next start.
        delay_ms: u64,
    },
}

/// Lifecycle phase of the wave director.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WavePhase {
    /// No wave is running.
    Idle,
    /// Enemies of the current wave are being spawned.
    Spawning,
    /// Spawning was suspended and can resume where it stopped.
    Paused,
    /// Every enemy spawned; waiting for the last one to leave.
    WaitingForClear,
    /// The schedule has no further waves.
    Complete,
}

/// Why an enemy left the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RemovalCause {
    /// The enemy walked off the end of its path.
    Arrived,
    /// The enemy's health was depleted.
    Killed,
}

/// Types of towers that can be constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TowerKind {
    /// Inexpensive general purpose tower.
    Basic,
    /// Long range tower.
    Sniper,
    /// Area damage tower.
    Area,
}

impl TowerKind {
    /// Currency required to construct the tower.
    #[must_use]
    pub const fn cost(self) -> u32 {
        match self {
            Self::Basic => 100,
            Self::Sniper => 200,
            Self::Area => 300,
        }
    }
}

/// Reasons a tower placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum PlacementError {
    /// The simulation is in edit mode, so placement is disabled.
    #[error("towers cannot be placed while editing the maze")]
    InvalidMode,
    /// The requested cell lies outside the grid.
    #[error("cell lies outside the grid")]
    InvalidCoordinate,
    /// The requested cell is blocked.
    #[error("cell is blocked")]
    Blocked,
    /// The requested cell already hosts a tower.
    #[error("cell already hosts a tower")]
    Occupied,
    /// The player cannot afford the tower.
    #[error("tower costs {required} but only {available} is available")]
    InsufficientCurrency {
        /// Cost of the requested tower.
        required: u32,
        /// Currency held when the request was made.
        available: u32,
    },
}

/// Reasons a cell toggle request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum ToggleRejection {
    /// The requested cell lies outside the grid.
    #[error("cell lies outside the grid")]
    InvalidCoordinate,
    /// Blocking the cell would disconnect the start from the end.
    #[error("blocking the cell would seal off the path")]
    WouldSealPath,
    /// The requested cell hosts a tower.
    #[error("cell hosts a tower")]
    Occupied,
}

/// Defender resources tracked by the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Economy {
    health: i32,
    score: u32,
    currency: u32,
}

impl Economy {
    /// Creates a new economy snapshot.
    #[must_use]
    pub const fn new(health: i32, score: u32, currency: u32) -> Self {
        Self {
            health,
            score,
            currency,
        }
    }

    /// Remaining defender health.
    #[must_use]
    pub const fn health(&self) -> i32 {
        self.health
    }

    /// Accumulated score.
    #[must_use]
    pub const fn score(&self) -> u32 {
        self.score
    }

    /// Currency available for construction.
    #[must_use]
    pub const fn currency(&self) -> u32 {
        self.currency
    }

    /// Reports whether the defender health is exhausted.
    #[must_use]
    pub const fn is_defeated(&self) -> bool {
        self.health <= 0
    }

    /// Returns the economy that results from applying the delta.
    ///
    /// Score and currency saturate at zero and `u32::MAX`.
    #[must_use]
    pub fn apply(self, delta: EconomyDelta) -> Self {
        Self {
            health: self.health.saturating_add(delta.health),
            score: offset(self.score, delta.score),
            currency: offset(self.currency, delta.currency),
        }
    }
}

impl Default for Economy {
    fn default() -> Self {
        Self::new(100, 0, 1_000)
    }
}

fn offset(value: u32, delta: i64) -> u32 {
    let shifted = i64::from(value).saturating_add(delta);
    u32::try_from(shifted.max(0)).unwrap_or(u32::MAX)
}

/// Signed change applied to an [`Economy`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EconomyDelta {
    /// Change in defender health.
    pub health: i32,
    /// Change in score.
    pub score: i64,
    /// Change in currency.
    pub currency: i64,
}

impl EconomyDelta {
    /// Delta applied when an enemy reaches the end of its path.
    #[must_use]
    pub const fn arrival(penalty: i32) -> Self {
        Self {
            health: -penalty,
            score: 0,
            currency: 0,
        }
    }

    /// Delta applied when an enemy carrying `reward` is killed.
    #[must_use]
    pub const fn kill(reward: u32) -> Self {
        Self {
            health: 0,
            score: reward as i64,
            currency: reward as i64,
        }
    }

    /// Delta applied when a structure costing `cost` is purchased.
    #[must_use]
    pub const fn purchase(cost: u32) -> Self {
        Self {
            health: 0,
            score: 0,
            currency: -(cost as i64),
        }
    }
}

/// Immutable representation of a single tower used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Kind of tower that was constructed.
    pub kind: TowerKind,
    /// Cell hosting the tower.
    pub cell: CellCoord,
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// World-space position of the enemy.
    pub position: Vec2,
    /// Remaining health.
    pub health: u32,
    /// Index of the path cell the enemy is heading towards.
    pub path_index: usize,
    /// Number of cells on the enemy's own path.
    pub path_len: usize,
}

/// Combined view of the wave lifecycle and the enemies it produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaveState {
    /// Wave most recently started, if any.
    pub wave: Option<WaveNumber>,
    /// Enemies of the current wave that have not been spawned yet.
    pub remaining: u32,
    /// Enemies currently walking the maze.
    pub active: usize,
    /// Lifecycle phase of the wave director.
    pub phase: WavePhase,
}
