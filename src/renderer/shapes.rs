//! Shape generation for 2D primitives

use glam::Vec2;

use crate::sim::Terrain;

/// Horizontal spacing of terrain outline samples
pub const TERRAIN_SAMPLE_STEP: f32 = 4.0;

/// Closed terrain outline from `x0` to `x1`, dropped to `bottom` at both ends
pub fn terrain_outline(terrain: &Terrain, x0: f32, x1: f32, bottom: f32) -> Vec<Vec2> {
    let samples = ((x1 - x0) / TERRAIN_SAMPLE_STEP).ceil().max(0.0) as usize + 1;
    let mut points = Vec::with_capacity(samples + 2);
    points.push(Vec2::new(x0, bottom));
    for i in 0..samples {
        let x = x0 + i as f32 * TERRAIN_SAMPLE_STEP;
        points.push(Vec2::new(x, terrain.height(x)));
    }
    let last_x = x0 + (samples - 1) as f32 * TERRAIN_SAMPLE_STEP;
    points.push(Vec2::new(last_x, bottom));
    points
}

/// Bike frame polyline in body space (rear axle, saddle, front axle)
pub fn bike_frame(wheel_base: f32, wheel_radius: f32) -> [Vec2; 3] {
    let half = wheel_base * 0.5;
    [
        Vec2::new(-half, -wheel_radius * 0.5),
        Vec2::new(0.0, -wheel_radius * 1.7),
        Vec2::new(half, -wheel_radius * 0.4),
    ]
}

/// Rider torso in body space
pub fn rider_torso(wheel_radius: f32) -> [Vec2; 2] {
    [
        Vec2::new(0.0, -wheel_radius * 1.7),
        Vec2::new(0.0, -wheel_radius * 2.6),
    ]
}

/// Rider head center in body space
pub fn rider_head(wheel_radius: f32) -> Vec2 {
    Vec2::new(0.0, -wheel_radius * 3.0)
}

/// One wheel spoke through `center`, rotated by the spin phase
pub fn spoke(center: Vec2, radius: f32, spin: f32) -> [Vec2; 2] {
    let d = Vec2::new(spin.cos(), spin.sin()) * radius * 0.8;
    [center - d, center + d]
}

/// Size of one finish flag square
pub const CHECKER_SIZE: f32 = 8.0;

/// Top-left corners of the white squares of a 5x6 checkered flag
pub fn checker_squares(origin: Vec2) -> Vec<Vec2> {
    (0..5)
        .flat_map(|row| (0..6).map(move |col| (row, col)))
        .filter(|(row, col)| (row + col) % 2 == 0)
        .map(|(row, col)| {
            origin + Vec2::new(5.0 + col as f32 * CHECKER_SIZE, row as f32 * CHECKER_SIZE)
        })
        .collect()
}
