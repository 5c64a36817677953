//! `CanvasRenderingContext2d` surface for the browser build

use glam::Vec2;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::surface::Surface;

/// Smallest logical canvas size
pub const MIN_WIDTH: f32 = 600.0;
pub const MIN_HEIGHT: f32 = 350.0;

/// Device pixel ratio bounds
const MIN_PIXEL_RATIO: f64 = 1.0;
const MAX_PIXEL_RATIO: f64 = 2.0;

/// Canvas 2D surface working in logical (CSS pixel) units.
///
/// The backing store is sized by the device pixel ratio and a base
/// transform scales logical units onto it.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    width: f32,
    height: f32,
    pixel_ratio: f64,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        let mut surface = Self {
            canvas,
            ctx,
            width: MIN_WIDTH,
            height: MIN_HEIGHT,
            pixel_ratio: 1.0,
        };
        surface.resize();
        Ok(surface)
    }

    /// Match the backing store to the element's layout size
    pub fn resize(&mut self) {
        let ratio = web_sys::window()
            .map(|w| w.device_pixel_ratio())
            .unwrap_or(1.0)
            .clamp(MIN_PIXEL_RATIO, MAX_PIXEL_RATIO);
        let width = (self.canvas.client_width() as f32).max(MIN_WIDTH);
        let height = (self.canvas.client_height() as f32).max(MIN_HEIGHT);

        self.canvas.set_width((width as f64 * ratio).round() as u32);
        self.canvas.set_height((height as f64 * ratio).round() as u32);
        self.width = width;
        self.height = height;
        self.pixel_ratio = ratio;
        log::info!("Canvas sized to {}x{} @ {}x", width, height, ratio);
    }

    pub fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    fn trace_path(&self, points: &[Vec2]) {
        self.ctx.begin_path();
        let mut iter = points.iter();
        if let Some(first) = iter.next() {
            self.ctx.move_to(first.x as f64, first.y as f64);
        }
        for p in iter {
            self.ctx.line_to(p.x as f64, p.y as f64);
        }
    }
}

fn warn_on_err(op: &str, result: Result<(), JsValue>) {
    if let Err(e) = result {
        log::warn!("Canvas {} failed: {:?}", op, e);
    }
}

impl Surface for CanvasSurface {
    fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    fn clear(&mut self) {
        warn_on_err("reset transform", self.ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0));
        self.ctx.clear_rect(
            0.0,
            0.0,
            self.canvas.width() as f64,
            self.canvas.height() as f64,
        );
        let pr = self.pixel_ratio;
        warn_on_err("scale", self.ctx.set_transform(pr, 0.0, 0.0, pr, 0.0, 0.0));
    }

    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn translate(&mut self, x: f32, y: f32) {
        warn_on_err("translate", self.ctx.translate(x as f64, y as f64));
    }

    fn rotate(&mut self, angle: f32) {
        warn_on_err("rotate", self.ctx.rotate(angle as f64));
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: &str) {
        self.ctx.set_fill_style_str(color);
        self.ctx.fill_rect(x as f64, y as f64, w as f64, h as f64);
    }

    fn fill_gradient_rect(&mut self, x: f32, y: f32, w: f32, h: f32, top: &str, bottom: &str) {
        let gradient = self
            .ctx
            .create_linear_gradient(0.0, y as f64, 0.0, (y + h) as f64);
        warn_on_err("gradient stop", gradient.add_color_stop(0.0, top));
        warn_on_err("gradient stop", gradient.add_color_stop(1.0, bottom));
        self.ctx.set_fill_style_canvas_gradient(&gradient);
        self.ctx.fill_rect(x as f64, y as f64, w as f64, h as f64);
    }

    fn fill_polygon(&mut self, points: &[Vec2], color: &str, outline: Option<(&str, f32)>) {
        if points.len() < 3 {
            return;
        }
        self.trace_path(points);
        self.ctx.close_path();
        self.ctx.set_fill_style_str(color);
        self.ctx.fill();
        if let Some((stroke, width)) = outline {
            self.ctx.set_stroke_style_str(stroke);
            self.ctx.set_line_width(width as f64);
            self.ctx.stroke();
        }
    }

    fn stroke_polyline(&mut self, points: &[Vec2], color: &str, width: f32) {
        if points.len() < 2 {
            return;
        }
        self.trace_path(points);
        self.ctx.set_stroke_style_str(color);
        self.ctx.set_line_width(width as f64);
        self.ctx.stroke();
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: &str) {
        self.ctx.begin_path();
        warn_on_err(
            "arc",
            self.ctx.arc(
                center.x as f64,
                center.y as f64,
                radius as f64,
                0.0,
                std::f64::consts::TAU,
            ),
        );
        self.ctx.set_fill_style_str(color);
        self.ctx.fill();
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, font_px: f32, color: &str) {
        self.ctx.set_font(&format!("{}px monospace", font_px));
        self.ctx.set_fill_style_str(color);
        warn_on_err("text", self.ctx.fill_text(text, x as f64, y as f64));
    }
}
