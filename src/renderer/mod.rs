//! Canvas 2D rendering module
//!
//! Scene drawing is written against the `Surface` trait so it runs the same
//! in the browser and under test.

#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod scene;
pub mod shapes;
pub mod surface;

pub use scene::SceneRenderer;
pub use surface::{DrawCommand, RecordingSurface, Surface};

use crate::sim::RaceState;

/// Draws one frame of a race. Read-only over the state.
pub trait Renderer {
    fn render(&mut self, state: &RaceState, now_ms: f64);
}

/// Renderer for headless runs
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn render(&mut self, _state: &RaceState, _now_ms: f64) {}
}
