//! Race state and core simulation types
//!
//! One aggregate holds everything a run owns: config, course, bike and
//! run bookkeeping. It only changes through `tick`, `reset` and the pause
//! toggle.

use serde::{Deserialize, Serialize};

use super::obstacle::{Obstacle, generate_obstacles};
use super::rng::Mulberry32;
use super::terrain::Terrain;
use super::tick::TickInput;
use super::vehicle::Vehicle;
use crate::config::{ConfigError, WorldConfig};

/// Lifecycle of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RacePhase {
    /// Reset, waiting for the first tick
    Ready,
    /// Physics advancing
    Running,
    /// Physics frozen, still rendering
    Paused,
    /// Crossed the finish line (terminal until reset)
    Finished,
}

/// Things that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RaceEvent {
    Started,
    Paused,
    Resumed,
    Jumped,
    Finished { elapsed_secs: f64 },
}

/// Per-run bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    /// Camera x (left edge of the view)
    pub scroll_x: f32,
    /// Furthest x the bike has reached
    pub max_distance: f32,
    /// Finish time in seconds, fixed once `finished` is set
    pub elapsed_secs: f64,
    pub finished: bool,
    /// Clock reading when the run started (ms)
    pub start_timestamp_ms: f64,
}

impl RunState {
    pub fn new(start_timestamp_ms: f64) -> Self {
        Self {
            scroll_x: 0.0,
            max_distance: 0.0,
            elapsed_secs: 0.0,
            finished: false,
            start_timestamp_ms,
        }
    }
}

/// Serializable view of a run, handed to tick observers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RaceSnapshot {
    pub seed: u32,
    pub finish_x: f32,
    pub phase: RacePhase,
    pub vehicle: Vehicle,
    pub run: RunState,
}

/// Complete state of one run
#[derive(Debug, Clone)]
pub struct RaceState {
    config: WorldConfig,
    terrain: Terrain,
    obstacles: Vec<Obstacle>,
    custom_terrain: bool,
    fixed_obstacles: bool,
    pub vehicle: Vehicle,
    pub run: RunState,
    pub phase: RacePhase,
}

impl RaceState {
    /// New run; invalid config values fall back to defaults
    pub fn new(config: WorldConfig) -> Self {
        Self::build(config.sanitized(), None)
    }

    /// New run; invalid config is rejected
    pub fn try_new(config: WorldConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, None))
    }

    /// New run over a caller-supplied ground function
    pub fn with_terrain(config: WorldConfig, terrain: Terrain) -> Self {
        Self::build(config.sanitized(), Some(terrain))
    }

    fn build(config: WorldConfig, terrain: Option<Terrain>) -> Self {
        let custom_terrain = terrain.is_some();
        let terrain = terrain.unwrap_or_else(|| Terrain::Layered(config.terrain_params()));
        let obstacles = course_obstacles(&config);
        let vehicle = Vehicle::at_start(&terrain, config.start_x);
        Self {
            config,
            terrain,
            obstacles,
            custom_terrain,
            fixed_obstacles: false,
            vehicle,
            run: RunState::new(0.0),
            phase: RacePhase::Ready,
        }
    }

    /// Replace the generated layout with a fixed one
    pub fn with_obstacles(mut self, obstacles: Vec<Obstacle>) -> Self {
        self.obstacles = obstacles;
        self.fixed_obstacles = true;
        self
    }

    /// New run on `config` that keeps this run's custom terrain and fixed
    /// obstacles. Generated parts are rebuilt from the new config.
    pub fn reconfigured(&self, config: WorldConfig) -> Self {
        let terrain = self.custom_terrain.then(|| self.terrain.clone());
        let state = Self::build(config.sanitized(), terrain);
        if self.fixed_obstacles {
            state.with_obstacles(self.obstacles.clone())
        } else {
            state
        }
    }

    /// A fresh run over the same course, reset at `now_ms`
    pub fn restarted(&self, now_ms: f64) -> Self {
        let mut state = self.clone();
        state.reset(now_ms);
        state
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn seed(&self) -> u32 {
        self.config.seed
    }

    pub fn terrain(&self) -> &Terrain {
        &self.terrain
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Put the bike back on the start line and clear the run.
    ///
    /// The course (terrain and obstacles) is kept: it is a pure function
    /// of the config, so a restart races the same layout.
    pub fn reset(&mut self, now_ms: f64) {
        self.vehicle = Vehicle::at_start(&self.terrain, self.config.start_x);
        self.run = RunState::new(now_ms);
        self.phase = RacePhase::Ready;
    }

    /// Flip between Running and Paused. Other phases are left alone.
    pub fn toggle_pause(&mut self) -> Option<RaceEvent> {
        match self.phase {
            RacePhase::Running => {
                self.phase = RacePhase::Paused;
                Some(RaceEvent::Paused)
            }
            RacePhase::Paused => {
                self.phase = RacePhase::Running;
                Some(RaceEvent::Resumed)
            }
            RacePhase::Ready | RacePhase::Finished => None,
        }
    }

    /// Run the bike dynamics for one tick. Returns true if it jumped.
    pub(crate) fn step_vehicle(&mut self, input: &TickInput, dt: f32) -> bool {
        self.vehicle
            .step(input, &self.config, &self.terrain, &self.obstacles, dt)
    }

    pub fn is_finished(&self) -> bool {
        self.run.finished
    }

    /// Seconds on the race clock at `now_ms` (fixed once finished)
    pub fn elapsed_at(&self, now_ms: f64) -> f64 {
        match self.phase {
            RacePhase::Finished => self.run.elapsed_secs,
            RacePhase::Ready => 0.0,
            RacePhase::Running | RacePhase::Paused => {
                ((now_ms - self.run.start_timestamp_ms) / 1000.0).max(0.0)
            }
        }
    }

    pub fn snapshot(&self) -> RaceSnapshot {
        RaceSnapshot {
            seed: self.config.seed,
            finish_x: self.config.finish_x,
            phase: self.phase,
            vehicle: self.vehicle,
            run: self.run,
        }
    }
}

/// Obstacle layout for a config
pub fn course_obstacles(config: &WorldConfig) -> Vec<Obstacle> {
    generate_obstacles(
        &mut Mulberry32::new(config.seed),
        config.obstacle_every as f64,
        config.obstacle_start as f64,
        config.obstacle_end as f64,
    )
}
