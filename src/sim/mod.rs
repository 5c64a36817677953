//! Deterministic simulation module
//!
//! All race logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only (course layout)
//! - Time enters only through `dt` and the clock value passed to `tick`
//! - No rendering or platform dependencies

pub mod obstacle;
pub mod replay;
pub mod rng;
pub mod state;
pub mod terrain;
pub mod tick;
pub mod vehicle;

pub use obstacle::{Obstacle, generate_obstacles};
pub use replay::{InputTrace, TraceFrame, replay, replay_course, tick_recorded};
pub use rng::Mulberry32;
pub use state::{RaceEvent, RacePhase, RaceSnapshot, RaceState, RunState, course_obstacles};
pub use terrain::{Terrain, TerrainParams};
pub use tick::{TickInput, normalize_frame_dt, tick};
pub use vehicle::Vehicle;
