//! Collaborator interfaces notified about observable simulation changes.

use glam::Vec2;
use path_defence_core::{CellCoord, EnemyId, EnemyTemplate, Path, RemovalCause, WaveNumber};

/// Receives visual updates for the board and its enemies.
///
/// Every method defaults to a no-op so implementors only override what they
/// draw.
pub trait PresentationSink {
    /// A cell changed its blocked state.
    fn on_cell_toggled(&mut self, cell: CellCoord, blocked: bool) {
        let _ = (cell, blocked);
    }

    /// An enemy entered the maze at `position`.
    fn on_enemy_spawned(&mut self, enemy: EnemyId, position: Vec2, template: EnemyTemplate) {
        let _ = (enemy, position, template);
    }

    /// An enemy moved to `position`.
    fn on_enemy_moved(&mut self, enemy: EnemyId, position: Vec2) {
        let _ = (enemy, position);
    }

    /// An enemy left the simulation.
    fn on_enemy_removed(&mut self, enemy: EnemyId, cause: RemovalCause) {
        let _ = (enemy, cause);
    }

    /// The start-to-end path was recomputed.
    fn on_path_recomputed(&mut self, path: &Path) {
        let _ = path;
    }
}

/// Receives the values shown by the heads-up display.
pub trait UiSink {
    /// Defender health changed.
    fn on_health_changed(&mut self, health: i32) {
        let _ = health;
    }

    /// Score changed.
    fn on_score_changed(&mut self, score: u32) {
        let _ = score;
    }

    /// Currency changed.
    fn on_currency_changed(&mut self, currency: u32) {
        let _ = currency;
    }

    /// A new wave became current.
    fn on_wave_changed(&mut self, wave: WaveNumber) {
        let _ = wave;
    }

    /// The wave schedule is exhausted.
    fn on_game_completed(&mut self) {}

    /// Defender health dropped to zero or below.
    fn on_defender_defeated(&mut self) {}
}

impl PresentationSink for () {}

impl UiSink for () {}
