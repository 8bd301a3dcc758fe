#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave director that paces enemy spawns according to the wave schedule.
//!
//! The director is a pure system: it consumes world events together with the
//! active-enemy count queried after those events were applied, and answers
//! with [`Command::BeginWave`], [`Command::SpawnEnemy`] and
//! [`Command::CompleteGame`] batches.

use std::time::Duration;

use path_defence_core::{
    Command, Event, Path, Progression, WaveConfig, WaveNumber, WavePhase, WaveSchedule,
};
use tracing::{debug, info, warn};

/// Pure system that drives the wave lifecycle.
#[derive(Debug)]
pub struct WaveDirector {
    schedule: WaveSchedule,
    progression: Progression,
    phase: WavePhase,
    current_wave: Option<WaveNumber>,
    remaining: u32,
    accumulator: Duration,
    auto_start_pending: bool,
    idle_elapsed: Duration,
}

impl WaveDirector {
    /// Creates an idle director that has not started any wave yet.
    #[must_use]
    pub fn new(schedule: WaveSchedule, progression: Progression) -> Self {
        Self {
            schedule,
            progression,
            phase: WavePhase::Idle,
            current_wave: None,
            remaining: 0,
            accumulator: Duration::ZERO,
            auto_start_pending: false,
            idle_elapsed: Duration::ZERO,
        }
    }

    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> WavePhase {
        self.phase
    }

    /// Wave most recently started, if any.
    #[must_use]
    pub const fn current_wave(&self) -> Option<WaveNumber> {
        self.current_wave
    }

    /// Enemies of the current wave that have not been spawned yet.
    #[must_use]
    pub const fn enemies_remaining(&self) -> u32 {
        self.remaining
    }

    /// Policy used to start waves after a clear.
    #[must_use]
    pub const fn progression(&self) -> Progression {
        self.progression
    }

    /// Starts the next wave of the schedule.
    ///
    /// Only acts while idle. When the schedule has no further wave the
    /// director completes and emits [`Command::CompleteGame`] instead.
    pub fn start_wave(&mut self, out: &mut Vec<Command>) {
        if self.phase != WavePhase::Idle {
            debug!(phase = ?self.phase, "start request ignored");
            return;
        }

        self.auto_start_pending = false;
        self.idle_elapsed = Duration::ZERO;

        let wave = self.current_wave.map_or(WaveNumber::new(1), WaveNumber::next);
        let Some(config) = self.schedule.get(wave).copied() else {
            info!(waves = self.schedule.len(), "wave schedule exhausted");
            self.phase = WavePhase::Complete;
            out.push(Command::CompleteGame);
            return;
        };

        self.current_wave = Some(wave);
        self.remaining = config.enemy_count();
        self.accumulator = Duration::ZERO;
        self.phase = if self.remaining == 0 {
            WavePhase::WaitingForClear
        } else {
            WavePhase::Spawning
        };
        info!(
            wave = wave.get(),
            enemies = config.enemy_count(),
            interval = ?config.spawn_interval(),
            "starting wave"
        );
        out.push(Command::BeginWave { wave });
    }

    /// Suspends spawning; the cadence and remaining count are preserved.
    pub fn pause(&mut self) {
        if self.phase == WavePhase::Spawning {
            self.phase = WavePhase::Paused;
            info!(remaining = self.remaining, "wave paused");
        }
    }

    /// Resumes a paused wave that still has enemies left to spawn.
    pub fn resume(&mut self) {
        if self.phase == WavePhase::Paused && self.remaining > 0 {
            self.phase = WavePhase::Spawning;
            info!(remaining = self.remaining, "wave resumed");
        }
    }

    /// Consumes events and emits the commands the wave lifecycle requires.
    ///
    /// `active_enemies` must be read after the world applied `events`, so
    /// removals reported in the batch are already reflected. Time reported in
    /// the batch that clears a wave already counts toward automatic starts. `plan_path` is
    /// asked for a fresh path once per due spawn; `None` skips that spawn.
    pub fn handle<F>(
        &mut self,
        events: &[Event],
        active_enemies: usize,
        mut plan_path: F,
        out: &mut Vec<Command>,
    ) where
        F: FnMut() -> Option<Path>,
    {
        if self.phase == WavePhase::WaitingForClear && active_enemies == 0 {
            self.phase = WavePhase::Idle;
            self.auto_start_pending = matches!(self.progression, Progression::Automatic { .. });
            self.idle_elapsed = Duration::ZERO;
            info!(
                wave = self.current_wave.map_or(0, |wave| wave.get()),
                "wave cleared"
            );
        }

        let elapsed = elapsed_time(events);
        if elapsed.is_zero() {
            return;
        }

        match self.phase {
            WavePhase::Spawning => self.spawn_due(elapsed, &mut plan_path, out),
            WavePhase::Idle => self.count_down_auto_start(elapsed, out),
            WavePhase::Paused | WavePhase::WaitingForClear | WavePhase::Complete => {}
        }
    }

    fn spawn_due<F>(&mut self, elapsed: Duration, plan_path: &mut F, out: &mut Vec<Command>)
    where
        F: FnMut() -> Option<Path>,
    {
        let Some(config) = self.current_config() else {
            return;
        };

        self.accumulator = self.accumulator.saturating_add(elapsed);
        while self.remaining > 0 && self.accumulator >= config.spawn_interval() {
            self.accumulator -= config.spawn_interval();
            self.remaining -= 1;

            match plan_path() {
                Some(path) => out.push(Command::SpawnEnemy {
                    template: config.enemy(),
                    path,
                }),
                None => warn!(remaining = self.remaining, "no path to spawn along; skipped"),
            }
        }

        if self.remaining == 0 {
            self.phase = WavePhase::WaitingForClear;
            self.accumulator = Duration::ZERO;
            debug!("all enemies of the wave spawned");
        }
    }

    fn count_down_auto_start(&mut self, elapsed: Duration, out: &mut Vec<Command>) {
        let Progression::Automatic { delay_ms } = self.progression else {
            return;
        };
        if !self.auto_start_pending {
            return;
        }

        self.idle_elapsed = self.idle_elapsed.saturating_add(elapsed);
        if self.idle_elapsed >= Duration::from_millis(delay_ms) {
            self.start_wave(out);
        }
    }

    fn current_config(&self) -> Option<WaveConfig> {
        self.current_wave
            .and_then(|wave| self.schedule.get(wave))
            .copied()
    }
}

fn elapsed_time(events: &[Event]) -> Duration {
    events
        .iter()
        .filter_map(|event| match event {
            Event::TimeAdvanced { dt } => Some(*dt),
            _ => None,
        })
        .fold(Duration::ZERO, Duration::saturating_add)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_time_sums_only_clock_events() {
        let events = [
            Event::TimeAdvanced {
                dt: Duration::from_millis(40),
            },
            Event::GameCompleted,
            Event::TimeAdvanced {
                dt: Duration::from_millis(60),
            },
        ];
        assert_eq!(elapsed_time(&events), Duration::from_millis(100));
    }

    #[test]
    fn empty_wave_waits_for_clear_immediately() {
        let schedule = WaveSchedule::new(vec![WaveConfig::new(
            0,
            Duration::from_millis(500),
            path_defence_core::EnemyTemplate::new(1, 1.0, 1, 1.0),
        )]);
        let mut director = WaveDirector::new(schedule, Progression::Manual);
        let mut out = Vec::new();

        director.start_wave(&mut out);

        assert_eq!(director.phase(), WavePhase::WaitingForClear);
        assert_eq!(
            out,
            vec![Command::BeginWave {
                wave: WaveNumber::new(1)
            }]
        );
    }
}
