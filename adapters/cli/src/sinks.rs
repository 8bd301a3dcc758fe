//! Sinks that report simulation changes through `tracing`.

use glam::Vec2;
use path_defence_core::{CellCoord, EnemyId, EnemyTemplate, Path, RemovalCause, WaveNumber};
use path_defence_simulation::{PresentationSink, UiSink};
use tracing::{debug, info, trace, warn};

/// Presentation sink that logs board changes and tallies enemy outcomes.
#[derive(Debug, Default)]
pub(crate) struct TracingPresentation {
    pub(crate) spawned: u32,
    pub(crate) arrived: u32,
    pub(crate) killed: u32,
}

impl PresentationSink for TracingPresentation {
    fn on_cell_toggled(&mut self, cell: CellCoord, blocked: bool) {
        info!(x = cell.x(), z = cell.z(), blocked, "cell toggled");
    }

    fn on_enemy_spawned(&mut self, enemy: EnemyId, position: Vec2, template: EnemyTemplate) {
        self.spawned += 1;
        debug!(
            enemy = enemy.get(),
            x = position.x,
            z = position.y,
            health = template.health(),
            scale = template.scale(),
            "enemy spawned"
        );
    }

    fn on_enemy_moved(&mut self, enemy: EnemyId, position: Vec2) {
        trace!(enemy = enemy.get(), x = position.x, z = position.y, "enemy moved");
    }

    fn on_enemy_removed(&mut self, enemy: EnemyId, cause: RemovalCause) {
        match cause {
            RemovalCause::Arrived => self.arrived += 1,
            RemovalCause::Killed => self.killed += 1,
        }
        debug!(enemy = enemy.get(), ?cause, "enemy removed");
    }

    fn on_path_recomputed(&mut self, path: &Path) {
        info!(steps = path.steps(), "path recomputed");
    }
}

/// UI sink that logs heads-up display values.
#[derive(Debug, Default)]
pub(crate) struct TracingUi {
    pub(crate) completed: bool,
    pub(crate) defeated: bool,
}

impl UiSink for TracingUi {
    fn on_health_changed(&mut self, health: i32) {
        info!(health, "health changed");
    }

    fn on_score_changed(&mut self, score: u32) {
        debug!(score, "score changed");
    }

    fn on_currency_changed(&mut self, currency: u32) {
        debug!(currency, "currency changed");
    }

    fn on_wave_changed(&mut self, wave: WaveNumber) {
        info!(wave = wave.get(), "wave changed");
    }

    fn on_game_completed(&mut self) {
        self.completed = true;
        info!("game completed");
    }

    fn on_defender_defeated(&mut self) {
        self.defeated = true;
        warn!("defender defeated");
    }
}
