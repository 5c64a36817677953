//! Course presets and tuning sliders
//!
//! A level fixes the course (finish distance and seed); tuning adjusts the
//! bike. Together they produce a fresh `WorldConfig` for a new run.

use serde::{Deserialize, Serialize};

use crate::config::WorldConfig;

/// Preset course
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Level {
    pub name: &'static str,
    pub finish_x: f32,
    pub seed: u32,
}

/// Built-in courses, in menu order
pub const LEVELS: [Level; 3] = [
    Level {
        name: "Rolling Hills",
        finish_x: 3000.0,
        seed: 12345,
    },
    Level {
        name: "Valley Run",
        finish_x: 5000.0,
        seed: 777,
    },
    Level {
        name: "Long Haul",
        finish_x: 8000.0,
        seed: 2024,
    },
];

impl Level {
    /// Look up a preset by name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        LEVELS
            .iter()
            .find(|l| l.name.eq_ignore_ascii_case(name.trim()))
            .copied()
    }

    /// Best-times key for this course
    pub fn course_key(&self) -> String {
        crate::highscores::course_key(self.finish_x, self.seed)
    }
}

/// Slider-adjustable bike parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub gravity: f32,
    pub speed_cap: f32,
    pub power: f32,
    pub wheel_base: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        let config = WorldConfig::default();
        Self {
            gravity: config.gravity,
            speed_cap: config.speed_cap,
            power: config.power,
            wheel_base: config.wheel_base,
        }
    }
}

impl Tuning {
    pub const GRAVITY_RANGE: (f32, f32) = (0.2, 1.0);
    pub const SPEED_CAP_RANGE: (f32, f32) = (8.0, 20.0);
    pub const POWER_RANGE: (f32, f32) = (0.05, 0.3);
    pub const WHEEL_BASE_RANGE: (f32, f32) = (40.0, 90.0);

    /// Every value pulled into its slider range (NaN falls back to default)
    pub fn clamped(self) -> Self {
        let defaults = Self::default();
        let fit = |value: f32, (lo, hi): (f32, f32), default: f32| {
            if value.is_nan() {
                default
            } else {
                value.clamp(lo, hi)
            }
        };
        Self {
            gravity: fit(self.gravity, Self::GRAVITY_RANGE, defaults.gravity),
            speed_cap: fit(self.speed_cap, Self::SPEED_CAP_RANGE, defaults.speed_cap),
            power: fit(self.power, Self::POWER_RANGE, defaults.power),
            wheel_base: fit(self.wheel_base, Self::WHEEL_BASE_RANGE, defaults.wheel_base),
        }
    }

    /// Config for a new run of `level` with this tuning
    pub fn config_for(&self, level: &Level) -> WorldConfig {
        let tuning = self.clamped();
        WorldConfig {
            seed: level.seed,
            finish_x: level.finish_x,
            gravity: tuning.gravity,
            speed_cap: tuning.speed_cap,
            power: tuning.power,
            wheel_base: tuning.wheel_base,
            ..WorldConfig::default()
        }
    }
}
