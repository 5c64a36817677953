//! Per-run world configuration
//!
//! A config is fixed for the lifetime of a run. Tuning screens build a new
//! config and start a new run with it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::TerrainParams;

/// Invalid configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },
    #[error("gravity must not be negative (got {0})")]
    NegativeGravity(f32),
    #[error("speed cap must be positive (got {0})")]
    NonPositiveSpeedCap(f32),
    #[error("wheel base must be positive (got {0})")]
    NonPositiveWheelBase(f32),
    #[error("wheel radius must not be negative (got {0})")]
    NegativeWheelRadius(f32),
    #[error("friction must be in (0, 1] (got {0})")]
    FrictionOutOfRange(f32),
    #[error("air drag must not be negative (got {0})")]
    NegativeAirDrag(f32),
    #[error("obstacle spacing must be positive (got {0})")]
    NonPositiveObstacleSpacing(f32),
    #[error("finish line ({finish_x}) must lie past the start ({start_x})")]
    FinishBeforeStart { start_x: f32, finish_x: f32 },
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Physics and course parameters for one run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Course seed (obstacle layout)
    pub seed: u32,
    pub gravity: f32,
    /// Velocity multiplier per grounded tick
    pub friction: f32,
    /// Velocity loss per normalized tick while airborne
    pub air_drag: f32,
    pub speed_cap: f32,
    /// Forward thrust per normalized tick
    pub power: f32,
    /// Angular impulse per normalized tick of tilt
    pub torque: f32,
    pub wheel_base: f32,
    pub wheel_radius: f32,
    pub start_x: f32,
    pub finish_x: f32,
    /// Base spacing between generated obstacles
    pub obstacle_every: f32,
    pub obstacle_start: f32,
    pub obstacle_end: f32,
    pub terrain: TerrainParams,
    /// Draw terrain parameters from the seed instead of using `terrain`
    pub randomize_terrain: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: 12345,
            gravity: 0.45,
            friction: 0.985,
            air_drag: 0.0008,
            speed_cap: 12.0,
            power: 0.12,
            torque: 0.004,
            wheel_base: 60.0,
            wheel_radius: 18.0,
            start_x: 100.0,
            finish_x: 5000.0,
            obstacle_every: 400.0,
            obstacle_start: 400.0,
            obstacle_end: 4800.0,
            terrain: TerrainParams::default(),
            randomize_terrain: false,
        }
    }
}

impl WorldConfig {
    pub fn with_seed(seed: u32) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Parse a (possibly partial) JSON config and validate it
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: WorldConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Terrain parameters in effect for this run
    pub fn terrain_params(&self) -> TerrainParams {
        if self.randomize_terrain {
            TerrainParams::randomized(self.seed)
        } else {
            self.terrain
        }
    }

    /// Check every numeric field, reporting the first problem
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("gravity", self.gravity),
            ("friction", self.friction),
            ("air_drag", self.air_drag),
            ("speed_cap", self.speed_cap),
            ("power", self.power),
            ("torque", self.torque),
            ("wheel_base", self.wheel_base),
            ("wheel_radius", self.wheel_radius),
            ("start_x", self.start_x),
            ("finish_x", self.finish_x),
            ("obstacle_every", self.obstacle_every),
            ("obstacle_start", self.obstacle_start),
            ("obstacle_end", self.obstacle_end),
            ("terrain.baseline", self.terrain.baseline),
            ("terrain.amplitude_a", self.terrain.amplitude_a),
            ("terrain.frequency_a", self.terrain.frequency_a),
            ("terrain.amplitude_b", self.terrain.amplitude_b),
            ("terrain.frequency_b", self.terrain.frequency_b),
        ];
        if let Some((field, _)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ConfigError::NotFinite { field: *field });
        }

        if self.gravity < 0.0 {
            return Err(ConfigError::NegativeGravity(self.gravity));
        }
        if self.speed_cap <= 0.0 {
            return Err(ConfigError::NonPositiveSpeedCap(self.speed_cap));
        }
        if self.wheel_base <= 0.0 {
            return Err(ConfigError::NonPositiveWheelBase(self.wheel_base));
        }
        if self.wheel_radius < 0.0 {
            return Err(ConfigError::NegativeWheelRadius(self.wheel_radius));
        }
        if self.friction <= 0.0 || self.friction > 1.0 {
            return Err(ConfigError::FrictionOutOfRange(self.friction));
        }
        if self.air_drag < 0.0 {
            return Err(ConfigError::NegativeAirDrag(self.air_drag));
        }
        if self.obstacle_every <= 0.0 {
            return Err(ConfigError::NonPositiveObstacleSpacing(self.obstacle_every));
        }
        if self.finish_x <= self.start_x {
            return Err(ConfigError::FinishBeforeStart {
                start_x: self.start_x,
                finish_x: self.finish_x,
            });
        }
        Ok(())
    }

    /// Replace every invalid field with its default
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let mut config = self;

        fn fix(name: &str, value: &mut f32, fallback: f32, ok: impl Fn(f32) -> bool) {
            if !value.is_finite() || !ok(*value) {
                log::warn!("Invalid {name} ({value}), using default {fallback}");
                *value = fallback;
            }
        }

        fix("gravity", &mut config.gravity, defaults.gravity, |v| v >= 0.0);
        fix("friction", &mut config.friction, defaults.friction, |v| {
            v > 0.0 && v <= 1.0
        });
        fix("air_drag", &mut config.air_drag, defaults.air_drag, |v| v >= 0.0);
        fix("speed_cap", &mut config.speed_cap, defaults.speed_cap, |v| v > 0.0);
        fix("power", &mut config.power, defaults.power, |_| true);
        fix("torque", &mut config.torque, defaults.torque, |_| true);
        fix("wheel_base", &mut config.wheel_base, defaults.wheel_base, |v| v > 0.0);
        fix("wheel_radius", &mut config.wheel_radius, defaults.wheel_radius, |v| {
            v >= 0.0
        });
        fix("obstacle_every", &mut config.obstacle_every, defaults.obstacle_every, |v| {
            v > 0.0
        });
        fix("obstacle_start", &mut config.obstacle_start, defaults.obstacle_start, |_| true);
        fix("obstacle_end", &mut config.obstacle_end, defaults.obstacle_end, |_| true);

        let t = defaults.terrain;
        fix("terrain.baseline", &mut config.terrain.baseline, t.baseline, |_| true);
        fix("terrain.amplitude_a", &mut config.terrain.amplitude_a, t.amplitude_a, |_| true);
        fix("terrain.frequency_a", &mut config.terrain.frequency_a, t.frequency_a, |_| true);
        fix("terrain.amplitude_b", &mut config.terrain.amplitude_b, t.amplitude_b, |_| true);
        fix("terrain.frequency_b", &mut config.terrain.frequency_b, t.frequency_b, |_| true);

        fix("start_x", &mut config.start_x, defaults.start_x, |_| true);
        let start_x = config.start_x;
        fix("finish_x", &mut config.finish_x, defaults.finish_x, |v| v > start_x);
        if config.finish_x <= config.start_x {
            // Default finish can still sit behind a far custom start
            config.start_x = defaults.start_x;
            config.finish_x = defaults.finish_x;
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(WorldConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_values() {
        let bad = WorldConfig {
            wheel_base: 0.0,
            ..Default::default()
        };
        assert!(matches!(bad.validate(), Err(ConfigError::NonPositiveWheelBase(_))));

        let bad = WorldConfig {
            speed_cap: -1.0,
            ..Default::default()
        };
        assert!(matches!(bad.validate(), Err(ConfigError::NonPositiveSpeedCap(_))));

        let bad = WorldConfig {
            gravity: -0.1,
            ..Default::default()
        };
        assert!(matches!(bad.validate(), Err(ConfigError::NegativeGravity(_))));

        let bad = WorldConfig {
            power: f32::NAN,
            ..Default::default()
        };
        assert!(matches!(
            bad.validate(),
            Err(ConfigError::NotFinite { field: "power" })
        ));

        let bad = WorldConfig {
            finish_x: 50.0,
            ..Default::default()
        };
        assert!(matches!(bad.validate(), Err(ConfigError::FinishBeforeStart { .. })));
    }

    #[test]
    fn test_sanitized_restores_defaults() {
        let config = WorldConfig {
            wheel_base: -3.0,
            speed_cap: 0.0,
            gravity: f32::INFINITY,
            friction: 1.5,
            power: 0.2,
            ..Default::default()
        }
        .sanitized();

        assert_eq!(config.wheel_base, 60.0);
        assert_eq!(config.speed_cap, 12.0);
        assert_eq!(config.gravity, 0.45);
        assert_eq!(config.friction, 0.985);
        // Valid fields are kept
        assert_eq!(config.power, 0.2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sanitized_far_start() {
        let config = WorldConfig {
            start_x: 9000.0,
            finish_x: 100.0,
            ..Default::default()
        }
        .sanitized();
        assert!(config.validate().is_ok());
        assert!(config.finish_x > config.start_x);
    }

    #[test]
    fn test_partial_json() {
        let config = WorldConfig::from_json(r#"{ "seed": 7, "gravity": 0.6 }"#).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.gravity, 0.6);
        assert_eq!(config.finish_x, 5000.0);
        assert_eq!(config.terrain, TerrainParams::default());
    }

    #[test]
    fn test_json_errors() {
        assert!(matches!(
            WorldConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            WorldConfig::from_json(r#"{ "wheel_base": 0 }"#),
            Err(ConfigError::NonPositiveWheelBase(_))
        ));
    }

    #[test]
    fn test_randomized_terrain_params() {
        let mut config = WorldConfig::with_seed(99);
        assert_eq!(config.terrain_params(), TerrainParams::default());
        config.randomize_terrain = true;
        assert_eq!(config.terrain_params(), TerrainParams::randomized(99));
    }
}
