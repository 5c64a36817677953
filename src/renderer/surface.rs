//! Drawing surface abstraction
//!
//! A small slice of the 2D canvas API, in logical (CSS pixel) units. The
//! browser build forwards it to a `CanvasRenderingContext2d`; tests record
//! the calls.

use glam::Vec2;

/// 2D drawing target
pub trait Surface {
    /// Logical width and height of the drawable area
    fn size(&self) -> (f32, f32);
    /// Clear the whole surface and reset transforms
    fn clear(&mut self);
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, x: f32, y: f32);
    fn rotate(&mut self, angle: f32);
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: &str);
    /// Rect filled with a top-to-bottom gradient
    fn fill_gradient_rect(&mut self, x: f32, y: f32, w: f32, h: f32, top: &str, bottom: &str);
    /// Closed polygon, optionally outlined with (color, width)
    fn fill_polygon(&mut self, points: &[Vec2], color: &str, outline: Option<(&str, f32)>);
    fn stroke_polyline(&mut self, points: &[Vec2], color: &str, width: f32);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: &str);
    fn fill_text(&mut self, text: &str, x: f32, y: f32, font_px: f32, color: &str);
}

/// A recorded drawing call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    Save,
    Restore,
    Translate(f32, f32),
    Rotate(f32),
    Rect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        color: String,
    },
    Gradient {
        top: String,
        bottom: String,
    },
    Polygon {
        points: usize,
        color: String,
    },
    Polyline {
        points: usize,
        color: String,
    },
    Circle {
        center: Vec2,
        radius: f32,
        color: String,
    },
    Text(String),
}

/// Surface that records every call
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    width: f32,
    height: f32,
    pub commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    /// All text drawn so far
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Rects drawn in `color`
    pub fn rects_of(&self, color: &str) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Rect { color: fill, .. } if fill == color))
            .count()
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    fn clear(&mut self) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear);
    }

    fn save(&mut self) {
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        self.commands.push(DrawCommand::Restore);
    }

    fn translate(&mut self, x: f32, y: f32) {
        self.commands.push(DrawCommand::Translate(x, y));
    }

    fn rotate(&mut self, angle: f32) {
        self.commands.push(DrawCommand::Rotate(angle));
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: &str) {
        self.commands.push(DrawCommand::Rect {
            x,
            y,
            w,
            h,
            color: color.to_string(),
        });
    }

    fn fill_gradient_rect(&mut self, _x: f32, _y: f32, _w: f32, _h: f32, top: &str, bottom: &str) {
        self.commands.push(DrawCommand::Gradient {
            top: top.to_string(),
            bottom: bottom.to_string(),
        });
    }

    fn fill_polygon(&mut self, points: &[Vec2], color: &str, _outline: Option<(&str, f32)>) {
        self.commands.push(DrawCommand::Polygon {
            points: points.len(),
            color: color.to_string(),
        });
    }

    fn stroke_polyline(&mut self, points: &[Vec2], color: &str, _width: f32) {
        self.commands.push(DrawCommand::Polyline {
            points: points.len(),
            color: color.to_string(),
        });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: &str) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color: color.to_string(),
        });
    }

    fn fill_text(&mut self, text: &str, _x: f32, _y: f32, _font_px: f32, _color: &str) {
        self.commands.push(DrawCommand::Text(text.to_string()));
    }
}
