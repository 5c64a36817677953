//! Scene drawing: sky, terrain, obstacles, finish flag, bike and HUD

use glam::Vec2;

use super::Renderer;
use super::shapes;
use super::surface::Surface;
use crate::sim::{Obstacle, RacePhase, RaceState};

pub const SKY_TOP: &str = "#b6d6ff";
pub const SKY_BOTTOM: &str = "#e6f2ff";
pub const GRASS: &str = "#9bd27c";
pub const GRASS_EDGE: &str = "#6aa84f";
pub const BOX_COLOR: &str = "#8d6e63";
pub const RAMP_COLOR: &str = "#ffc107";
pub const POLE_COLOR: &str = "#333";
pub const FLAG_COLOR: &str = "#fff";
pub const WHEEL_COLOR: &str = "#212121";
pub const FRAME_COLOR: &str = "#1565c0";
pub const RIDER_COLOR: &str = "#000";
pub const HEAD_COLOR: &str = "#222";
pub const HUD_PANEL: &str = "rgba(0,0,0,0.55)";
pub const HUD_TEXT: &str = "#fff";

/// Extra world units drawn past each edge of the view
const VIEW_MARGIN: f32 = 20.0;
const HUD_FONT_PX: f32 = 14.0;
const HEAD_RADIUS: f32 = 8.0;
const RAMP_THICKNESS: f32 = 16.0;
const POLE_HEIGHT: f32 = 82.0;
const FLAG_DROP: f32 = 80.0;

/// Draws a race onto any `Surface`
pub struct SceneRenderer<S: Surface> {
    surface: S,
}

impl<S: Surface> SceneRenderer<S> {
    pub fn new(surface: S) -> Self {
        Self { surface }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    fn draw_world(&mut self, state: &RaceState) {
        let (w, h) = self.surface.size();
        let scroll = state.run.scroll_x;
        let view_min = scroll - VIEW_MARGIN;
        let view_max = scroll + w + VIEW_MARGIN;

        self.surface.fill_gradient_rect(0.0, 0.0, w, h, SKY_TOP, SKY_BOTTOM);

        // Everything below is in world coordinates
        self.surface.save();
        self.surface.translate(-scroll, 0.0);

        let outline = shapes::terrain_outline(state.terrain(), view_min, view_max, h);
        self.surface.fill_polygon(&outline, GRASS, Some((GRASS_EDGE, 2.0)));

        for obstacle in state.obstacles() {
            let half = obstacle_half_width(obstacle);
            if obstacle.x() + half < view_min || obstacle.x() - half > view_max {
                continue;
            }
            self.draw_obstacle(state, obstacle);
        }

        self.draw_finish(state);
        self.surface.restore();
    }

    fn draw_obstacle(&mut self, state: &RaceState, obstacle: &Obstacle) {
        let top = obstacle.top(state.terrain());
        match *obstacle {
            Obstacle::Box {
                x, width, height, ..
            } => {
                self.surface.fill_rect(x - width * 0.5, top, width, height, BOX_COLOR);
            }
            Obstacle::Ramp {
                x, width, angle, ..
            } => {
                self.surface.save();
                self.surface.translate(x, top);
                self.surface.rotate(angle);
                self.surface.fill_rect(
                    -width * 0.5,
                    -RAMP_THICKNESS * 0.5,
                    width,
                    RAMP_THICKNESS,
                    RAMP_COLOR,
                );
                self.surface.restore();
            }
        }
    }

    fn draw_finish(&mut self, state: &RaceState) {
        let fx = state.config().finish_x;
        let fy = state.terrain().height(fx) - FLAG_DROP;
        self.surface.fill_rect(fx - 2.0, fy, 4.0, POLE_HEIGHT, POLE_COLOR);
        for corner in shapes::checker_squares(Vec2::new(fx, fy)) {
            self.surface.fill_rect(
                corner.x,
                corner.y,
                shapes::CHECKER_SIZE,
                shapes::CHECKER_SIZE,
                FLAG_COLOR,
            );
        }
    }

    fn draw_bike(&mut self, state: &RaceState) {
        let config = state.config();
        let bike = &state.vehicle;
        let half = config.wheel_base * 0.5;
        let r = config.wheel_radius;

        self.surface.save();
        self.surface.translate(bike.pos.x - state.run.scroll_x, bike.pos.y);
        self.surface.rotate(bike.angle);

        for center in [Vec2::new(-half, 0.0), Vec2::new(half, 0.0)] {
            self.surface.fill_circle(center, r, WHEEL_COLOR);
            let spoke = shapes::spoke(center, r, bike.wheel_spin);
            self.surface.stroke_polyline(&spoke, FLAG_COLOR, 1.5);
        }

        let frame = shapes::bike_frame(config.wheel_base, r);
        self.surface.stroke_polyline(&frame, FRAME_COLOR, 6.0);
        let torso = shapes::rider_torso(r);
        self.surface.stroke_polyline(&torso, RIDER_COLOR, 4.0);
        self.surface.fill_circle(shapes::rider_head(r), HEAD_RADIUS, HEAD_COLOR);

        self.surface.restore();
    }

    fn draw_hud(&mut self, state: &RaceState, now_ms: f64) {
        let elapsed = state.elapsed_at(now_ms);
        self.surface.fill_rect(10.0, 10.0, 240.0, 84.0, HUD_PANEL);

        let lines = [
            format!("Dist: {} m", state.run.max_distance.floor() as i64),
            format!("Time: {:.2} s", elapsed),
            format!("Finish @ {} m", state.config().finish_x),
        ];
        for (i, line) in lines.iter().enumerate() {
            let y = 34.0 + i as f32 * 20.0;
            self.surface.fill_text(line, 20.0, y, HUD_FONT_PX, HUD_TEXT);
        }

        let banner = match state.phase {
            RacePhase::Paused => Some("PAUSED".to_string()),
            RacePhase::Finished => Some(format!("FINISHED  {:.2} s", state.run.elapsed_secs)),
            RacePhase::Ready | RacePhase::Running => None,
        };
        if let Some(banner) = banner {
            let (w, h) = self.surface.size();
            self.surface.fill_text(
                &banner,
                w * 0.5 - 80.0,
                h * 0.5,
                HUD_FONT_PX * 2.0,
                HUD_TEXT,
            );
        }
    }
}

fn obstacle_half_width(obstacle: &Obstacle) -> f32 {
    match *obstacle {
        Obstacle::Box { width, .. } | Obstacle::Ramp { width, .. } => width * 0.5,
    }
}

impl<S: Surface> Renderer for SceneRenderer<S> {
    fn render(&mut self, state: &RaceState, now_ms: f64) {
        self.surface.clear();
        self.draw_world(state);
        self.draw_bike(state);
        self.draw_hud(state, now_ms);
    }
}
