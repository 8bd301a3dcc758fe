#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic orchestration of the Path Defence world and its systems.
//!
//! A [`Simulation`] owns the authoritative world, the wave director and the
//! collaborator sinks. Every request is turned into commands, applied to the
//! world, and the resulting events are forwarded to the sinks and the wave
//! director until no further commands are produced.

mod sinks;

use std::time::Duration;

use path_defence_core::{
    CellCoord, Command, EnemyId, Event, PlayMode, Progression, TowerKind, WaveSchedule, WaveState,
};
use path_defence_system_pathfinding::Pathfinder;
use path_defence_system_waves::WaveDirector;
use path_defence_world::{self as world, query, World, WorldConfig, WorldError};
use serde::Deserialize;
use tracing::{debug, trace};

pub use sinks::{PresentationSink, UiSink};

/// Complete description of a session.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Board layout, movement tuning and starting economy.
    pub world: WorldConfig,
    /// Waves played in order.
    pub waves: WaveSchedule,
    /// How waves after the first one start.
    pub progression: Progression,
}

/// Single-threaded driver that wires the world to the wave director.
#[derive(Debug)]
pub struct Simulation<P = (), U = ()> {
    world: World,
    director: WaveDirector,
    pathfinder: Pathfinder,
    presentation: P,
    ui: U,
    ticks: u64,
}

impl<P, U> Simulation<P, U>
where
    P: PresentationSink,
    U: UiSink,
{
    /// Builds a session from the configuration.
    pub fn new(config: SimulationConfig, presentation: P, ui: U) -> Result<Self, WorldError> {
        let world = World::new(&config.world)?;
        let director = WaveDirector::new(config.waves, config.progression);
        Ok(Self {
            world,
            director,
            pathfinder: Pathfinder::new(),
            presentation,
            ui,
            ticks: 0,
        })
    }

    /// Advances simulated time by `dt`.
    pub fn step(&mut self, dt: Duration) {
        self.ticks = self.ticks.saturating_add(1);
        trace!(tick = self.ticks, ?dt, "step");
        self.execute(vec![Command::Tick { dt }]);
    }

    /// Toggles the blocked state of a cell.
    pub fn request_toggle_cell(&mut self, cell: CellCoord) {
        self.execute(vec![Command::ToggleCell { cell }]);
    }

    /// Starts the next wave when no wave is running.
    pub fn request_start_wave(&mut self) {
        let mut commands = Vec::new();
        self.director.start_wave(&mut commands);
        self.execute(commands);
    }

    /// Suspends spawning of the running wave.
    pub fn request_pause_wave(&mut self) {
        self.director.pause();
    }

    /// Resumes a paused wave.
    pub fn request_resume_wave(&mut self) {
        self.director.resume();
    }

    /// Places a tower on the provided cell.
    pub fn request_place_tower(&mut self, kind: TowerKind, cell: CellCoord) {
        self.execute(vec![Command::PlaceTower { kind, cell }]);
    }

    /// Switches between editing and defending.
    pub fn request_play_mode(&mut self, mode: PlayMode) {
        self.execute(vec![Command::SetPlayMode { mode }]);
    }

    /// Deals damage to an active enemy.
    pub fn damage_enemy(&mut self, enemy: EnemyId, amount: u32) {
        self.execute(vec![Command::DamageEnemy { enemy, amount }]);
    }

    /// Read-only access to the authoritative world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Read-only access to the wave director.
    #[must_use]
    pub fn director(&self) -> &WaveDirector {
        &self.director
    }

    /// Current wave lifecycle together with the active-enemy count.
    #[must_use]
    pub fn wave_state(&self) -> WaveState {
        WaveState {
            wave: self.director.current_wave(),
            remaining: self.director.enemies_remaining(),
            active: query::enemy_count(&self.world),
            phase: self.director.phase(),
        }
    }

    /// Number of steps taken so far.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Presentation sink receiving board updates.
    #[must_use]
    pub fn presentation(&self) -> &P {
        &self.presentation
    }

    /// UI sink receiving heads-up display updates.
    #[must_use]
    pub fn ui(&self) -> &U {
        &self.ui
    }

    /// Consumes the session, returning its sinks.
    pub fn into_sinks(self) -> (P, U) {
        (self.presentation, self.ui)
    }

    fn execute(&mut self, mut commands: Vec<Command>) {
        let mut events = Vec::new();
        while !commands.is_empty() {
            events.clear();
            for command in commands.drain(..) {
                world::apply(&mut self.world, command, &mut events);
            }

            self.dispatch(&events);

            let active = query::enemy_count(&self.world);
            let board = &self.world;
            let pathfinder = &mut self.pathfinder;
            self.director.handle(
                &events,
                active,
                || pathfinder.find_path(query::grid(board), query::start(board), query::end(board)),
                &mut commands,
            );
        }
    }

    fn dispatch(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::CellToggled { cell, blocked } => {
                    self.presentation.on_cell_toggled(*cell, *blocked);
                }
                Event::PathRecomputed { path } => self.presentation.on_path_recomputed(path),
                Event::EnemySpawned {
                    enemy,
                    position,
                    template,
                } => self
                    .presentation
                    .on_enemy_spawned(*enemy, *position, *template),
                Event::EnemyMoved { enemy, position } => {
                    self.presentation.on_enemy_moved(*enemy, *position);
                }
                Event::EnemyRemoved { enemy, cause } => {
                    self.presentation.on_enemy_removed(*enemy, *cause);
                }
                Event::HealthChanged { value } => self.ui.on_health_changed(*value),
                Event::ScoreChanged { value } => self.ui.on_score_changed(*value),
                Event::CurrencyChanged { value } => self.ui.on_currency_changed(*value),
                Event::WaveChanged { wave } => self.ui.on_wave_changed(*wave),
                Event::GameCompleted => self.ui.on_game_completed(),
                Event::DefenderDefeated => self.ui.on_defender_defeated(),
                Event::CellToggleRejected { cell, reason } => {
                    debug!(?cell, %reason, "toggle rejected");
                }
                Event::TowerPlacementRejected { kind, cell, reason } => {
                    debug!(?kind, ?cell, %reason, "tower placement rejected");
                }
                Event::TimeAdvanced { .. }
                | Event::PlayModeChanged { .. }
                | Event::TowerPlaced { .. } => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_parses_from_toml_with_defaults() {
        let config: SimulationConfig = toml::from_str(
            r#"
                [world]
                grid_size = 6

                [progression]
                mode = "automatic"
                delay_ms = 3000

                [[waves]]
                enemy_count = 4
                spawn_interval_ms = 250
                enemy = { health = 20, speed = 0.5, reward = 3, scale = 1.0 }
            "#,
        )
        .expect("valid config");

        assert_eq!(config.world.grid_size, 6);
        assert_eq!(config.waves.len(), 1);
        assert_eq!(config.progression, Progression::Automatic { delay_ms: 3_000 });
        assert_eq!(config.world.economy, path_defence_core::Economy::default());
    }

    #[test]
    fn empty_config_matches_defaults() {
        let config: SimulationConfig = toml::from_str("").expect("empty config");
        assert_eq!(config, SimulationConfig::default());
        assert_eq!(config.waves.len(), 2);
    }
}
