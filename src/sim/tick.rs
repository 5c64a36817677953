//! Variable timestep simulation tick
//!
//! Advances a race by one frame. Physics constants are tuned per nominal
//! frame, so the wall-clock frame time is normalized to that interval and
//! clamped so a hitch can't produce a huge step.

use serde::{Deserialize, Serialize};

use super::state::{RaceEvent, RacePhase, RaceState};
use crate::consts::*;

/// Player intent for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInput {
    pub accelerate: bool,
    /// Only acts while grounded
    pub jump: bool,
    /// Only acts while airborne
    pub tilt_left: bool,
    /// Only acts while airborne
    pub tilt_right: bool,
    /// Pause toggle (one-shot)
    pub pause: bool,
}

/// Normalized dt for a frame that took `delta_ms`; first frame is nominal
pub fn normalize_frame_dt(delta_ms: Option<f64>) -> f32 {
    match delta_ms {
        Some(ms) => ((ms.max(0.0) / NOMINAL_FRAME_MS) as f32).min(MAX_FRAME_DT),
        None => 1.0,
    }
}

/// Advance the race by one tick of normalized length `dt`
pub fn tick(state: &mut RaceState, input: &TickInput, dt: f32, now_ms: f64) -> Vec<RaceEvent> {
    let mut events = Vec::new();

    if state.phase == RacePhase::Ready {
        state.phase = RacePhase::Running;
        events.push(RaceEvent::Started);
    }

    if input.pause {
        events.extend(state.toggle_pause());
    }

    // Paused and finished runs are frozen
    if state.phase != RacePhase::Running {
        return events;
    }

    if state.step_vehicle(input, dt) {
        events.push(RaceEvent::Jumped);
    }

    let x = state.vehicle.pos.x;
    state.run.scroll_x = (x - CAMERA_LEAD).max(0.0);
    state.run.max_distance = state.run.max_distance.max(x);

    if !state.run.finished && x >= state.config().finish_x {
        let elapsed = ((now_ms - state.run.start_timestamp_ms) / 1000.0).max(0.0);
        state.run.finished = true;
        state.run.elapsed_secs = elapsed;
        state.phase = RacePhase::Finished;
        log::info!("Finished seed {} in {:.2}s", state.seed(), elapsed);
        events.push(RaceEvent::Finished {
            elapsed_secs: elapsed,
        });
    }

    events
}
