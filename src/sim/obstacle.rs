//! Course obstacles and their deterministic placement

use serde::{Deserialize, Serialize};

use super::rng::Mulberry32;
use super::terrain::Terrain;
use crate::consts::*;

/// A course obstacle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Obstacle {
    /// Boost plank: pushes along `angle` while the bike is within `width` of `x`
    Ramp {
        x: f32,
        width: f32,
        height: f32,
        angle: f32,
    },
    /// Solid crate resting on the terrain, centered on `x`
    Box { x: f32, width: f32, height: f32 },
}

impl Obstacle {
    pub fn x(&self) -> f32 {
        match *self {
            Obstacle::Ramp { x, .. } | Obstacle::Box { x, .. } => x,
        }
    }

    pub fn is_ramp(&self) -> bool {
        matches!(self, Obstacle::Ramp { .. })
    }

    pub fn is_box(&self) -> bool {
        matches!(self, Obstacle::Box { .. })
    }

    /// Height of the obstacle's top face (boxes and ramps sit on the terrain)
    pub fn top(&self, terrain: &Terrain) -> f32 {
        match *self {
            Obstacle::Ramp { x, height, .. } | Obstacle::Box { x, height, .. } => {
                terrain.height(x) - height
            }
        }
    }
}

/// Lay out obstacles from `x_min` to `x_max`.
///
/// Each step advances a cursor by `step_base` plus up to 300 units of
/// jitter and drops either a ramp (60%) or a box (40%) with random size.
/// The bound is checked before advancing, so the final obstacle can land
/// past `x_max`.
pub fn generate_obstacles(
    rng: &mut Mulberry32,
    step_base: f64,
    x_min: f64,
    x_max: f64,
) -> Vec<Obstacle> {
    let mut obstacles = Vec::new();
    if step_base <= 0.0 {
        return obstacles;
    }

    let mut cursor = x_min;
    while cursor < x_max {
        cursor += step_base + rng.next_f64() * OBSTACLE_SPACING_JITTER;
        let obstacle = if rng.next_f64() < RAMP_PROBABILITY {
            Obstacle::Ramp {
                x: cursor as f32,
                width: RAMP_WIDTH,
                height: RAMP_HEIGHT,
                angle: RAMP_ANGLE,
            }
        } else {
            let width = 30.0 + rng.next_f64() * 40.0;
            let height = 30.0 + rng.next_f64() * 60.0;
            Obstacle::Box {
                x: cursor as f32,
                width: width as f32,
                height: height as f32,
            }
        };
        obstacles.push(obstacle);
    }

    log::debug!(
        "Generated {} obstacles between {} and {}",
        obstacles.len(),
        x_min,
        x_max
    );
    obstacles
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(seed: u32) -> Vec<Obstacle> {
        generate_obstacles(&mut Mulberry32::new(seed), 400.0, 400.0, 4800.0)
    }

    #[test]
    fn test_seed_12345_layout() {
        let obstacles = course(12345);
        assert_eq!(obstacles.len(), 8);

        // First step is 400 + jitter from the start offset of 400
        let first = obstacles[0];
        assert!(first.is_ramp());
        assert!((first.x() - 1093.92).abs() < 0.1);
        assert!(first.x() - 400.0 >= 400.0 && first.x() - 400.0 < 700.0);

        match obstacles[1] {
            Obstacle::Box { x, width, height } => {
                assert!((x - 1639.18).abs() < 0.1);
                assert!((width - 50.377).abs() < 0.01);
                assert!((height - 50.848).abs() < 0.01);
            }
            other => panic!("expected box, got {other:?}"),
        }

        assert!(obstacles[2].is_box());
        assert!((obstacles[2].x() - 2061.31).abs() < 0.1);
    }

    #[test]
    fn test_same_seed_same_course() {
        assert_eq!(course(777), course(777));
        assert_ne!(course(777), course(778));
    }

    #[test]
    fn test_spacing_and_dimensions() {
        let obstacles = course(2024);
        let mut prev = 400.0;
        for o in &obstacles {
            let gap = o.x() - prev;
            assert!(gap >= 399.9 && gap < 700.1, "gap {gap}");
            prev = o.x();
            match *o {
                Obstacle::Ramp { width, height, angle, .. } => {
                    assert_eq!(width, RAMP_WIDTH);
                    assert_eq!(height, RAMP_HEIGHT);
                    assert_eq!(angle, RAMP_ANGLE);
                }
                Obstacle::Box { width, height, .. } => {
                    assert!((30.0..70.0).contains(&width));
                    assert!((30.0..90.0).contains(&height));
                }
            }
        }
        // Only the last obstacle may pass the bound
        for o in &obstacles[..obstacles.len() - 1] {
            assert!(o.x() < 4800.0);
        }
    }

    #[test]
    fn test_empty_range() {
        let obstacles = generate_obstacles(&mut Mulberry32::new(1), 400.0, 500.0, 500.0);
        assert!(obstacles.is_empty());
    }

    #[test]
    fn test_box_top_sits_on_terrain() {
        let terrain = Terrain::flat(300.0);
        let b = Obstacle::Box {
            x: 50.0,
            width: 40.0,
            height: 60.0,
        };
        assert_eq!(b.top(&terrain), 240.0);
    }

    #[test]
    fn test_serde_tagging() {
        let json = serde_json::to_string(&Obstacle::Box {
            x: 1.0,
            width: 2.0,
            height: 3.0,
        })
        .unwrap();
        assert!(json.contains("\"type\":\"box\""));
    }
}
