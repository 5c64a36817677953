//! Bike Racer - a side-scrolling bike racing minigame
//!
//! Core modules:
//! - `sim`: Deterministic simulation (PRNG, terrain, obstacles, vehicle, race state)
//! - `driver`: Frame driver (scheduling, dt normalization, callbacks)
//! - `renderer`: 2D drawing of the race, substitutable for headless runs
//! - `platform`: Clock and frame scheduling abstraction
//! - `persistence`: Key-value storage (LocalStorage on web)
//! - `highscores`: Best times per course and the local leaderboard
//! - `levels`, `hotseat`: Course presets, tuning and two-player time trials
//! - `web`: Browser bindings (wasm only)

pub mod config;
pub mod driver;
pub mod highscores;
pub mod hotseat;
pub mod input;
pub mod levels;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod sim;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::{ConfigError, WorldConfig};
pub use driver::FrameDriver;
pub use highscores::BestTimes;

/// Game tuning constants
pub mod consts {
    /// Nominal frame interval the physics constants are tuned against (ms)
    pub const NOMINAL_FRAME_MS: f64 = 16.7;
    /// Largest normalized step allowed during a frame hitch
    pub const MAX_FRAME_DT: f32 = 2.5;

    /// Camera keeps the bike this far from the left edge
    pub const CAMERA_LEAD: f32 = 200.0;

    /// Upward impulse applied by a jump
    pub const JUMP_IMPULSE: f32 = 7.5;
    /// Wheel spin gained per unit of thrust (visual only)
    pub const WHEEL_SPIN_PER_THRUST: f32 = 0.25;

    /// Share of wheel penetration resolved per tick
    pub const PENETRATION_CORRECTION: f32 = 0.7;
    /// Vertical velocity multiplier on ground contact
    pub const GROUND_BOUNCE: f32 = -0.05;
    /// Exponential smoothing toward the terrain slope while grounded
    pub const SLOPE_SMOOTHING: f32 = 0.15;
    /// Angular velocity decay while grounded
    pub const GROUND_SPIN_DECAY: f32 = 0.7;

    /// Horizontal velocity multiplier when bouncing off a box
    pub const BOX_BOUNCE_X: f32 = -0.3;
    /// Vertical velocity damping when bouncing off a box (always upward)
    pub const BOX_BOUNCE_Y: f32 = 0.2;
    /// Box contact window above the top face
    pub const BOX_TOP_MARGIN: f32 = 10.0;
    /// Box contact window below the bottom face
    pub const BOX_BOTTOM_MARGIN: f32 = 2.0;
    /// Bike is placed this far above a box after a bounce
    pub const BOX_REST_OFFSET: f32 = 12.0;

    /// Acceleration applied along a ramp's angle
    pub const RAMP_ACCEL: f32 = 0.02;
    /// Ramp plank dimensions
    pub const RAMP_WIDTH: f32 = 80.0;
    pub const RAMP_HEIGHT: f32 = 40.0;
    pub const RAMP_ANGLE: f32 = -std::f32::consts::PI / 12.0;

    /// Random extra spacing added between obstacles
    pub const OBSTACLE_SPACING_JITTER: f64 = 300.0;
    /// Probability that a generated obstacle is a ramp
    pub const RAMP_PROBABILITY: f64 = 0.6;

    /// Step used for the terrain slope finite difference
    pub const SLOPE_STEP: f32 = 1.0;
}

/// Rescale `vel` so its length does not exceed `cap`
#[inline]
pub fn clamp_speed(vel: glam::Vec2, cap: f32) -> glam::Vec2 {
    let speed = vel.length();
    if speed > cap {
        vel * (cap / speed)
    } else {
        vel
    }
}

/// Unit vector for an angle in radians
#[inline]
pub fn direction(angle: f32) -> glam::Vec2 {
    glam::Vec2::new(angle.cos(), angle.sin())
}
