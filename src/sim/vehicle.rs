//! Bike body and per-tick dynamics
//!
//! The bike is a single body with two wheel contact points half a
//! wheelbase either side of its center. Velocities are in units per
//! nominal frame; every step is scaled by the normalized `dt`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::obstacle::Obstacle;
use super::terrain::Terrain;
use super::tick::TickInput;
use crate::config::WorldConfig;
use crate::consts::*;
use crate::{clamp_speed, direction};

/// Mutable bike state, owned by the running race
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Body angle (radians, 0 = level, positive = nose down)
    pub angle: f32,
    pub angular_vel: f32,
    pub on_ground: bool,
    /// Wheel rotation phase (visual only)
    pub wheel_spin: f32,
}

impl Vehicle {
    /// Bike at rest on the terrain at `x`, aligned with the slope
    pub fn at_start(terrain: &Terrain, x: f32) -> Self {
        Self {
            pos: Vec2::new(x, terrain.height(x)),
            vel: Vec2::ZERO,
            angle: terrain.slope_angle(x),
            angular_vel: 0.0,
            on_ground: false,
            wheel_spin: 0.0,
        }
    }

    pub fn speed(&self) -> f32 {
        self.vel.length()
    }

    /// Thrust along the body axis, capped at `speed_cap`
    pub fn accelerate(&mut self, power: f32, speed_cap: f32, dt: f32) {
        let thrust = power * dt;
        self.vel = clamp_speed(self.vel + direction(self.angle) * thrust, speed_cap);
        self.wheel_spin += thrust * WHEEL_SPIN_PER_THRUST;
    }

    /// Hop off the ground. Returns false when airborne.
    pub fn jump(&mut self) -> bool {
        if !self.on_ground {
            return false;
        }
        self.vel.y -= JUMP_IMPULSE;
        self.on_ground = false;
        true
    }

    /// Rotate in the air; `direction` is -1 (nose up) or +1 (nose down)
    pub fn tilt(&mut self, direction: f32, torque: f32, dt: f32) {
        if !self.on_ground {
            self.angular_vel += direction * torque * dt;
        }
    }

    /// Gravity, then explicit Euler position update
    pub fn integrate(&mut self, gravity: f32, dt: f32) {
        self.vel.y += gravity * dt;
        self.pos += self.vel * dt;
    }

    /// Bounce off boxes, get pushed by ramps
    pub fn interact(&mut self, obstacles: &[Obstacle], terrain: &Terrain, dt: f32) {
        for obstacle in obstacles {
            match *obstacle {
                Obstacle::Box { x, width, height } => {
                    let top = terrain.height(x) - height;
                    let half = width * 0.5;
                    let inside_x = self.pos.x > x - half && self.pos.x < x + half;
                    let inside_y = self.pos.y > top - BOX_TOP_MARGIN
                        && self.pos.y < top + height + BOX_BOTTOM_MARGIN;
                    if inside_x && inside_y {
                        self.vel.x *= BOX_BOUNCE_X;
                        self.vel.y = -self.vel.y.abs() * BOX_BOUNCE_Y;
                        self.pos.y = top - BOX_REST_OFFSET;
                    }
                }
                Obstacle::Ramp { x, width, angle, .. } => {
                    if (self.pos.x - x).abs() < width {
                        self.vel += direction(angle) * RAMP_ACCEL * dt;
                    }
                }
            }
        }
    }

    /// Back and front wheel contact points
    pub fn wheel_points(&self, wheel_base: f32) -> (Vec2, Vec2) {
        let half = direction(self.angle) * (wheel_base * 0.5);
        (self.pos - half, self.pos + half)
    }

    /// Push the bike out of the ground. Sets `on_ground`.
    ///
    /// `step` calls this after the obstacle response, so a box bounce and
    /// the ground contact land in the same tick.
    pub fn resolve_ground(&mut self, terrain: &Terrain, wheel_base: f32) {
        let (back, front) = self.wheel_points(wheel_base);
        let penetrations = [
            back.y - terrain.height(back.x),
            front.y - terrain.height(front.x),
        ];

        self.on_ground = false;
        for pen in penetrations {
            if pen > 0.0 {
                self.pos.y -= pen * PENETRATION_CORRECTION;
                self.vel.y *= GROUND_BOUNCE;
                self.on_ground = true;
            }
        }
    }

    /// Follow the slope and roll when grounded, spin and drag when airborne
    pub fn orient(&mut self, terrain: &Terrain, config: &WorldConfig, dt: f32) {
        if self.on_ground {
            let target = terrain.slope_angle(self.pos.x);
            self.angle += (target - self.angle) * SLOPE_SMOOTHING;
            self.angular_vel *= GROUND_SPIN_DECAY;
            self.vel *= config.friction;
        } else {
            self.angle += self.angular_vel * dt;
            self.vel *= 1.0 - config.air_drag * dt;
        }
    }

    /// One full dynamics step: controls, integration, obstacles, ground,
    /// orientation, and a final speed cap. Returns true if the bike jumped.
    pub fn step(
        &mut self,
        input: &TickInput,
        config: &WorldConfig,
        terrain: &Terrain,
        obstacles: &[Obstacle],
        dt: f32,
    ) -> bool {
        if input.accelerate {
            self.accelerate(config.power, config.speed_cap, dt);
        }
        let jumped = input.jump && self.jump();
        if input.tilt_left {
            self.tilt(-1.0, config.torque, dt);
        }
        if input.tilt_right {
            self.tilt(1.0, config.torque, dt);
        }

        self.integrate(config.gravity, dt);
        self.interact(obstacles, terrain, dt);
        self.resolve_ground(terrain, config.wheel_base);
        self.orient(terrain, config, dt);

        // Ramps and gravity can push past the cap too
        self.vel = clamp_speed(self.vel, config.speed_cap);
        jumped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GROUND: f32 = 300.0;

    fn flat() -> Terrain {
        Terrain::flat(GROUND)
    }

    fn airborne_at(pos: Vec2, vel: Vec2) -> Vehicle {
        Vehicle {
            pos,
            vel,
            angle: 0.0,
            angular_vel: 0.0,
            on_ground: false,
            wheel_spin: 0.0,
        }
    }

    #[test]
    fn test_start_pose_follows_slope() {
        let terrain = Terrain::custom(|x| 200.0 + x);
        let bike = Vehicle::at_start(&terrain, 100.0);
        assert_eq!(bike.pos, Vec2::new(100.0, 300.0));
        assert!((bike.angle - std::f32::consts::FRAC_PI_4).abs() < 1e-5);
        assert_eq!(bike.vel, Vec2::ZERO);
    }

    #[test]
    fn test_accelerate_respects_cap() {
        let mut bike = airborne_at(Vec2::ZERO, Vec2::new(11.95, 0.0));
        bike.accelerate(0.12, 12.0, 2.5);
        assert!(bike.speed() <= 12.0 + 1e-4);
        assert!(bike.wheel_spin > 0.0);
    }

    #[test]
    fn test_jump_only_when_grounded() {
        let mut bike = airborne_at(Vec2::ZERO, Vec2::ZERO);
        assert!(!bike.jump());
        assert_eq!(bike.vel.y, 0.0);

        bike.on_ground = true;
        assert!(bike.jump());
        assert_eq!(bike.vel.y, -JUMP_IMPULSE);
        assert!(!bike.on_ground);
    }

    #[test]
    fn test_tilt_only_when_airborne() {
        let mut bike = airborne_at(Vec2::ZERO, Vec2::ZERO);
        bike.tilt(1.0, 0.004, 1.0);
        assert!((bike.angular_vel - 0.004).abs() < 1e-7);

        bike.on_ground = true;
        bike.tilt(1.0, 0.004, 1.0);
        assert!((bike.angular_vel - 0.004).abs() < 1e-7);
    }

    #[test]
    fn test_box_bounce() {
        let terrain = flat();
        let boxes = [Obstacle::Box {
            x: 500.0,
            width: 40.0,
            height: 50.0,
        }];
        let top = GROUND - 50.0;
        let config = WorldConfig::default();

        // Just short of the left face, inside the vertical window, moving right
        let mut bike = airborne_at(Vec2::new(476.0, top + 5.0), Vec2::new(8.0, 1.0));
        bike.step(&TickInput::default(), &config, &terrain, &boxes, 1.0);

        let expected_vx = -8.0 * 0.3 * (1.0 - config.air_drag);
        assert!(bike.vel.x < 0.0);
        assert!((bike.vel.x - expected_vx).abs() < 1e-4, "vx {}", bike.vel.x);
        assert!(bike.vel.y <= 0.0);
        assert_eq!(bike.pos.y, top - BOX_REST_OFFSET);
        assert!(!bike.on_ground);
    }

    #[test]
    fn test_box_ignored_when_clear() {
        let terrain = flat();
        let boxes = [Obstacle::Box {
            x: 500.0,
            width: 40.0,
            height: 50.0,
        }];
        // Well above the box
        let mut bike = airborne_at(Vec2::new(495.0, 100.0), Vec2::new(2.0, 0.0));
        bike.interact(&boxes, &terrain, 1.0);
        assert_eq!(bike.vel, Vec2::new(2.0, 0.0));
    }

    #[test]
    fn test_ramp_pushes_along_angle() {
        let terrain = flat();
        let ramps = [Obstacle::Ramp {
            x: 500.0,
            width: 80.0,
            height: 40.0,
            angle: RAMP_ANGLE,
        }];
        let mut bike = airborne_at(Vec2::new(550.0, 100.0), Vec2::ZERO);
        bike.interact(&ramps, &terrain, 2.0);
        assert!(bike.vel.x > 0.0);
        assert!(bike.vel.y < 0.0);
        assert!((bike.vel.length() - RAMP_ACCEL * 2.0).abs() < 1e-6);

        let mut far = airborne_at(Vec2::new(590.0, 100.0), Vec2::ZERO);
        far.interact(&ramps, &terrain, 1.0);
        assert_eq!(far.vel, Vec2::ZERO);
    }

    #[test]
    fn test_ground_resolution() {
        let terrain = flat();
        let mut bike = airborne_at(Vec2::new(0.0, GROUND + 10.0), Vec2::new(0.0, 4.0));
        bike.resolve_ground(&terrain, 60.0);
        assert!(bike.on_ground);
        // Both wheels resolved 70% of the same 10 units
        assert!((bike.pos.y - (GROUND + 10.0 - 14.0)).abs() < 1e-4);
        assert!((bike.vel.y - 4.0 * 0.05 * 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_grounded_orientation_relaxes_to_slope() {
        let terrain = Terrain::custom(|x| 200.0 + x);
        let config = WorldConfig::default();
        let mut bike = airborne_at(Vec2::new(0.0, 200.0), Vec2::new(5.0, 0.0));
        bike.on_ground = true;
        bike.angular_vel = 1.0;
        bike.orient(&terrain, &config, 1.0);
        let target = std::f32::consts::FRAC_PI_4;
        assert!((bike.angle - target * SLOPE_SMOOTHING).abs() < 1e-5);
        assert!((bike.angular_vel - 0.7).abs() < 1e-6);
        assert!((bike.vel.x - 5.0 * config.friction).abs() < 1e-5);
    }

    #[test]
    fn test_airborne_spin_and_drag() {
        let terrain = flat();
        let config = WorldConfig::default();
        let mut bike = airborne_at(Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0));
        bike.angular_vel = 0.1;
        bike.orient(&terrain, &config, 2.0);
        assert!((bike.angle - 0.2).abs() < 1e-6);
        assert!((bike.vel.x - 10.0 * (1.0 - config.air_drag * 2.0)).abs() < 1e-5);
    }

    #[test]
    fn test_step_lands_and_rolls() {
        let terrain = flat();
        let config = WorldConfig::default();
        let mut bike = Vehicle::at_start(&terrain, 100.0);
        let input = TickInput {
            accelerate: true,
            ..Default::default()
        };
        for _ in 0..120 {
            bike.step(&input, &config, &terrain, &[], 1.0);
        }
        assert!(bike.on_ground);
        assert!(bike.pos.x > 100.0);
        assert!(bike.speed() <= config.speed_cap + 1e-4);
        // Never sinks far below the surface
        assert!(bike.pos.y < GROUND + 5.0);
    }
}
