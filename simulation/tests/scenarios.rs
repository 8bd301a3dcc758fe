use std::time::Duration;

use glam::Vec2;
use path_defence_core::{
    CellCoord, EnemyId, EnemyTemplate, Path, PlayMode, RemovalCause, TowerKind, WaveConfig,
    WaveNumber, WavePhase, WaveSchedule, WaveState,
};
use path_defence_simulation::{PresentationSink, Simulation, SimulationConfig, UiSink};
use path_defence_world::query;

const TICK: Duration = Duration::from_millis(100);

#[derive(Clone, Debug, PartialEq)]
enum Entry {
    Toggled(CellCoord, bool),
    Spawned(EnemyId),
    Moved(EnemyId, Vec2),
    Removed(EnemyId, RemovalCause),
    PathSteps(usize),
    Health(i32),
    Score(u32),
    Currency(u32),
    Wave(WaveNumber),
    Completed,
    Defeated,
}

#[derive(Debug, Default)]
struct Recorder {
    entries: Vec<Entry>,
}

impl Recorder {
    fn count(&self, predicate: impl Fn(&Entry) -> bool) -> usize {
        self.entries.iter().filter(|&entry| predicate(entry)).count()
    }

    fn spawned(&self) -> usize {
        self.count(|entry| matches!(entry, Entry::Spawned(_)))
    }
}

impl PresentationSink for Recorder {
    fn on_cell_toggled(&mut self, cell: CellCoord, blocked: bool) {
        self.entries.push(Entry::Toggled(cell, blocked));
    }

    fn on_enemy_spawned(&mut self, enemy: EnemyId, _position: Vec2, _template: EnemyTemplate) {
        self.entries.push(Entry::Spawned(enemy));
    }

    fn on_enemy_moved(&mut self, enemy: EnemyId, position: Vec2) {
        self.entries.push(Entry::Moved(enemy, position));
    }

    fn on_enemy_removed(&mut self, enemy: EnemyId, cause: RemovalCause) {
        self.entries.push(Entry::Removed(enemy, cause));
    }

    fn on_path_recomputed(&mut self, path: &Path) {
        self.entries.push(Entry::PathSteps(path.steps()));
    }
}

impl UiSink for Recorder {
    fn on_health_changed(&mut self, health: i32) {
        self.entries.push(Entry::Health(health));
    }

    fn on_score_changed(&mut self, score: u32) {
        self.entries.push(Entry::Score(score));
    }

    fn on_currency_changed(&mut self, currency: u32) {
        self.entries.push(Entry::Currency(currency));
    }

    fn on_wave_changed(&mut self, wave: WaveNumber) {
        self.entries.push(Entry::Wave(wave));
    }

    fn on_game_completed(&mut self) {
        self.entries.push(Entry::Completed);
    }

    fn on_defender_defeated(&mut self) {
        self.entries.push(Entry::Defeated);
    }
}

/// One cell per tick on the default 7.5 spacing.
fn fast_enemy() -> EnemyTemplate {
    EnemyTemplate::new(50, 7.5, 5, 1.0)
}

fn config_with(waves: Vec<WaveConfig>) -> SimulationConfig {
    SimulationConfig {
        waves: WaveSchedule::new(waves),
        ..SimulationConfig::default()
    }
}

fn session(config: SimulationConfig) -> Simulation<Recorder, Recorder> {
    Simulation::new(config, Recorder::default(), Recorder::default()).expect("valid config")
}

fn run_ticks<P: PresentationSink, U: UiSink>(simulation: &mut Simulation<P, U>, ticks: usize) {
    for _ in 0..ticks {
        simulation.step(TICK);
    }
}

#[test]
fn a_wave_spawns_walks_and_clears() {
    let mut simulation = session(config_with(vec![WaveConfig::new(
        3,
        Duration::from_millis(200),
        fast_enemy(),
    )]));

    simulation.request_start_wave();
    assert_eq!(simulation.director().phase(), WavePhase::Spawning);

    run_ticks(&mut simulation, 6);
    assert_eq!(simulation.presentation().spawned(), 3);
    assert_eq!(simulation.director().phase(), WavePhase::WaitingForClear);

    run_ticks(&mut simulation, 13);
    assert_eq!(simulation.director().phase(), WavePhase::WaitingForClear);

    run_ticks(&mut simulation, 1);
    assert_eq!(simulation.director().phase(), WavePhase::Idle);
    assert_eq!(query::enemy_count(simulation.world()), 0);

    let presentation = simulation.presentation();
    assert_eq!(
        presentation.count(|entry| matches!(entry, Entry::Removed(_, RemovalCause::Arrived))),
        3
    );
    assert_eq!(
        simulation.ui().entries,
        vec![
            Entry::Wave(WaveNumber::new(1)),
            Entry::Health(90),
            Entry::Health(80),
            Entry::Health(70),
        ]
    );
}

#[test]
fn spawned_enemies_advance_one_cell_per_tick() {
    let mut simulation = session(config_with(vec![WaveConfig::new(
        1,
        Duration::from_millis(100),
        fast_enemy(),
    )]));

    simulation.request_start_wave();
    run_ticks(&mut simulation, 2);

    let enemies = query::enemies(simulation.world());
    assert_eq!(enemies.len(), 1);
    assert_eq!(enemies[0].path_len, 15);
    assert_eq!(
        simulation.presentation().entries.last(),
        Some(&Entry::Moved(enemies[0].id, enemies[0].position))
    );
    assert!((enemies[0].position.length() - 7.5).abs() < 1e-4);
}

#[test]
fn exhausting_the_schedule_completes_the_game() {
    let mut simulation = session(config_with(vec![WaveConfig::new(
        1,
        Duration::from_millis(100),
        fast_enemy(),
    )]));

    simulation.request_start_wave();
    run_ticks(&mut simulation, 20);
    assert_eq!(simulation.director().phase(), WavePhase::Idle);

    simulation.request_start_wave();

    assert_eq!(simulation.director().phase(), WavePhase::Complete);
    assert!(query::is_complete(simulation.world()));
    assert_eq!(simulation.ui().entries.last(), Some(&Entry::Completed));
}

#[test]
fn killing_the_last_enemy_clears_the_wave() {
    let mut simulation = session(config_with(vec![WaveConfig::new(
        1,
        Duration::from_millis(100),
        EnemyTemplate::new(50, 0.5, 5, 1.0),
    )]));

    simulation.request_start_wave();
    run_ticks(&mut simulation, 1);
    assert_eq!(simulation.director().phase(), WavePhase::WaitingForClear);
    let enemy = query::enemies(simulation.world())[0].id;

    simulation.damage_enemy(enemy, 20);
    assert_eq!(query::enemy_count(simulation.world()), 1);

    simulation.damage_enemy(enemy, 30);

    assert_eq!(simulation.director().phase(), WavePhase::Idle);
    assert_eq!(
        simulation.presentation().entries.last(),
        Some(&Entry::Removed(enemy, RemovalCause::Killed))
    );
    let ui = &simulation.ui().entries;
    assert!(ui.ends_with(&[Entry::Score(5), Entry::Currency(1_005)]));
}

#[test]
fn repathing_only_affects_future_spawns() {
    let mut simulation = session(config_with(vec![WaveConfig::new(
        2,
        Duration::from_millis(500),
        EnemyTemplate::new(50, 0.5, 5, 1.0),
    )]));

    simulation.request_start_wave();
    run_ticks(&mut simulation, 5);
    let first = query::enemies(simulation.world())[0].id;
    let first_path = query::enemy_path(simulation.world(), first)
        .expect("first enemy active")
        .clone();

    let blocked = first_path.get(6).expect("long path");
    simulation.request_toggle_cell(blocked);
    assert!(query::is_blocked(simulation.world(), blocked));

    run_ticks(&mut simulation, 5);
    let enemies = query::enemies(simulation.world());
    assert_eq!(enemies.len(), 2);
    let second_path = query::enemy_path(simulation.world(), enemies[1].id).expect("active");

    assert_eq!(
        query::enemy_path(simulation.world(), first),
        Some(&first_path)
    );
    assert!(first_path.contains(blocked));
    assert!(!second_path.contains(blocked));
    assert_eq!(second_path, query::path(simulation.world()));
}

#[test]
fn pausing_holds_spawns_until_resumed() {
    let mut simulation = session(config_with(vec![WaveConfig::new(
        3,
        Duration::from_millis(200),
        EnemyTemplate::new(50, 0.1, 5, 1.0),
    )]));

    simulation.request_start_wave();
    run_ticks(&mut simulation, 3);
    assert_eq!(simulation.presentation().spawned(), 1);

    simulation.request_pause_wave();
    run_ticks(&mut simulation, 20);
    assert_eq!(simulation.presentation().spawned(), 1);
    assert_eq!(simulation.director().enemies_remaining(), 2);

    simulation.request_resume_wave();
    run_ticks(&mut simulation, 1);
    assert_eq!(simulation.presentation().spawned(), 2);
    run_ticks(&mut simulation, 2);
    assert_eq!(simulation.presentation().spawned(), 3);
}

#[test]
fn sealing_the_path_is_refused_during_play() {
    let mut simulation = session(SimulationConfig::default());
    for index in 0..7 {
        simulation.request_toggle_cell(CellCoord::new(7, index));
    }
    for index in 0..6 {
        simulation.request_toggle_cell(CellCoord::new(index, 7));
    }

    simulation.request_toggle_cell(CellCoord::new(6, 7));

    assert!(!query::is_blocked(simulation.world(), CellCoord::new(6, 7)));
    assert_eq!(
        simulation
            .presentation()
            .count(|entry| matches!(entry, Entry::Toggled(_, true))),
        13
    );
    assert_eq!(
        simulation.presentation().entries.last(),
        Some(&Entry::PathSteps(14))
    );
}

#[test]
fn towers_spend_currency_through_the_ui() {
    let mut simulation = session(SimulationConfig::default());

    simulation.request_place_tower(TowerKind::Area, CellCoord::new(3, 3));
    assert!(simulation.ui().entries.is_empty());

    simulation.request_play_mode(PlayMode::Defend);
    simulation.request_place_tower(TowerKind::Area, CellCoord::new(3, 3));

    assert_eq!(simulation.ui().entries, vec![Entry::Currency(700)]);
    assert_eq!(query::towers(simulation.world()).len(), 1);
}

#[test]
fn identical_inputs_replay_identically() {
    fn scripted() -> (Recorder, Recorder) {
        let mut simulation = session(SimulationConfig::default());
        simulation.request_toggle_cell(CellCoord::new(1, 0));
        simulation.request_toggle_cell(CellCoord::new(2, 2));
        simulation.request_start_wave();
        run_ticks(&mut simulation, 40);
        simulation.request_toggle_cell(CellCoord::new(4, 5));
        run_ticks(&mut simulation, 80);
        simulation.into_sinks()
    }

    let (first_presentation, first_ui) = scripted();
    let (second_presentation, second_ui) = scripted();

    assert!(first_presentation.spawned() > 0);
    assert_eq!(first_presentation.entries, second_presentation.entries);
    assert_eq!(first_ui.entries, second_ui.entries);
}

#[test]
fn unit_sinks_run_headless() {
    let mut simulation: Simulation =
        Simulation::new(SimulationConfig::default(), (), ()).expect("default config");
    simulation.request_start_wave();
    run_ticks(&mut simulation, 50);

    assert_eq!(simulation.ticks(), 50);
    assert_eq!(
        simulation.wave_state(),
        WaveState {
            wave: Some(WaveNumber::new(1)),
            remaining: 5,
            active: 5,
            phase: WavePhase::Spawning,
        }
    );
}
