//! Recorded input traces
//!
//! A run is fully determined by its course plus the sequence of
//! (input, dt, clock) triples fed to `tick`, so recording those is enough
//! to reproduce it.

use serde::{Deserialize, Serialize};

use super::state::{RaceEvent, RaceState};
use super::tick::{TickInput, tick};
use crate::config::WorldConfig;

/// One recorded tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraceFrame {
    pub input: TickInput,
    pub dt: f32,
    pub now_ms: f64,
}

/// Inputs of a whole run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputTrace {
    /// Clock reading the run was reset at
    pub start_ms: f64,
    pub frames: Vec<TraceFrame>,
}

impl InputTrace {
    pub fn new(start_ms: f64) -> Self {
        Self {
            start_ms,
            frames: Vec::new(),
        }
    }

    pub fn record(&mut self, input: TickInput, dt: f32, now_ms: f64) {
        self.frames.push(TraceFrame { input, dt, now_ms });
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// Tick `state` and record what was fed to it
pub fn tick_recorded(
    state: &mut RaceState,
    trace: &mut InputTrace,
    input: &TickInput,
    dt: f32,
    now_ms: f64,
) -> Vec<RaceEvent> {
    trace.record(*input, dt, now_ms);
    tick(state, input, dt, now_ms)
}

/// Re-run a trace on the generated course for `config`
pub fn replay(config: WorldConfig, trace: &InputTrace) -> (RaceState, Vec<RaceEvent>) {
    replay_course(&RaceState::new(config), trace)
}

/// Re-run a trace on the course of `course` (custom terrain and fixed
/// obstacles included). Only the course is taken from it; the run starts
/// over.
pub fn replay_course(course: &RaceState, trace: &InputTrace) -> (RaceState, Vec<RaceEvent>) {
    let mut state = course.restarted(trace.start_ms);
    let events = trace
        .frames
        .iter()
        .flat_map(|frame| tick(&mut state, &frame.input, frame.dt, frame.now_ms))
        .collect();
    (state, events)
}
