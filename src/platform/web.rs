//! Browser implementations: `performance.now()` and requestAnimationFrame

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use super::{Clock, FrameHandle, FrameScheduler};

/// `performance.now()`, falling back to `Date.now()`
pub struct PerformanceClock {
    performance: Option<web_sys::Performance>,
}

impl PerformanceClock {
    pub fn new() -> Self {
        Self {
            performance: web_sys::window().and_then(|w| w.performance()),
        }
    }
}

impl Default for PerformanceClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for PerformanceClock {
    fn now_ms(&self) -> f64 {
        match &self.performance {
            Some(performance) => performance.now(),
            None => js_sys::Date::now(),
        }
    }
}

/// JS callback fired for every animation frame
pub type FrameCallback = Closure<dyn FnMut(f64)>;

/// requestAnimationFrame scheduler.
///
/// The frame callback is installed after construction because it needs a
/// handle to the driver that owns this scheduler.
#[derive(Clone, Default)]
pub struct RafScheduler {
    callback: Rc<RefCell<Option<FrameCallback>>>,
}

impl RafScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_callback(&self, callback: FrameCallback) {
        *self.callback.borrow_mut() = Some(callback);
    }
}

impl FrameScheduler for RafScheduler {
    fn request(&mut self) -> FrameHandle {
        let callback = self.callback.borrow();
        let (Some(window), Some(callback)) = (web_sys::window(), callback.as_ref()) else {
            log::warn!("No window or frame callback, frame not scheduled");
            return FrameHandle(0);
        };
        match window.request_animation_frame(callback.as_ref().unchecked_ref()) {
            Ok(id) => FrameHandle(id as u64),
            Err(e) => {
                log::warn!("requestAnimationFrame failed: {:?}", e);
                FrameHandle(0)
            }
        }
    }

    fn cancel(&mut self, handle: FrameHandle) {
        if handle.0 == 0 {
            return;
        }
        if let Some(window) = web_sys::window() {
            let _ = window.cancel_animation_frame(handle.0 as i32);
        }
    }
}
