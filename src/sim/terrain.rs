//! Ground height function
//!
//! Terrain is a pure function of x: no state, no dependence on obstacles.
//! y grows downward (canvas convention), so hills have smaller heights.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::rng::Mulberry32;
use crate::consts::SLOPE_STEP;

/// Mixed into the course seed so randomized terrain draws from its own stream
const TERRAIN_STREAM: u32 = 0x9E37_79B9;

/// Two layered sines on top of a baseline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainParams {
    pub baseline: f32,
    pub amplitude_a: f32,
    pub frequency_a: f32,
    pub amplitude_b: f32,
    pub frequency_b: f32,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            baseline: 220.0,
            amplitude_a: 40.0,
            frequency_a: 0.004,
            amplitude_b: 20.0,
            frequency_b: 0.011,
        }
    }
}

impl TerrainParams {
    /// Parameters drawn from the course seed, within ±50% of the defaults.
    ///
    /// Uses a separate stream from obstacle generation, so the obstacle
    /// layout of a seed is the same with or without randomized terrain.
    pub fn randomized(seed: u32) -> Self {
        let mut rng = Mulberry32::new(seed ^ TERRAIN_STREAM);
        let base = Self::default();
        let mut jitter = |v: f32| v * (0.5 + rng.next_f32());
        Self {
            baseline: base.baseline,
            amplitude_a: jitter(base.amplitude_a),
            frequency_a: jitter(base.frequency_a),
            amplitude_b: jitter(base.amplitude_b),
            frequency_b: jitter(base.frequency_b),
        }
    }

    #[inline]
    pub fn height(&self, x: f32) -> f32 {
        self.baseline
            + self.amplitude_a * (x * self.frequency_a).sin()
            + self.amplitude_b * (x * self.frequency_b).sin()
    }
}

/// Caller-supplied height function
pub type HeightFn = Arc<dyn Fn(f32) -> f32 + Send + Sync>;

/// The ground of a course
#[derive(Clone)]
pub enum Terrain {
    Layered(TerrainParams),
    Custom(HeightFn),
}

impl fmt::Debug for Terrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Terrain::Layered(params) => f.debug_tuple("Layered").field(params).finish(),
            Terrain::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl Default for Terrain {
    fn default() -> Self {
        Terrain::Layered(TerrainParams::default())
    }
}

impl Terrain {
    /// Override the ground with any height function
    pub fn custom(f: impl Fn(f32) -> f32 + Send + Sync + 'static) -> Self {
        Terrain::Custom(Arc::new(f))
    }

    /// Flat ground at `height`
    pub fn flat(height: f32) -> Self {
        Terrain::custom(move |_| height)
    }

    /// Ground height at x
    #[inline]
    pub fn height(&self, x: f32) -> f32 {
        match self {
            Terrain::Layered(params) => params.height(x),
            Terrain::Custom(f) => f(x),
        }
    }

    /// dy/dx at x (central difference)
    #[inline]
    pub fn slope(&self, x: f32) -> f32 {
        (self.height(x + SLOPE_STEP) - self.height(x - SLOPE_STEP)) / (2.0 * SLOPE_STEP)
    }

    /// Angle of the ground surface at x, in radians
    #[inline]
    pub fn slope_angle(&self, x: f32) -> f32 {
        self.slope(x).atan2(1.0)
    }
}
