//! Browser bindings
//!
//! Mounts a race on a canvas and exposes it to JS as `BikeRacer`. Driver
//! callbacks only queue notices; JS callbacks run after the driver is
//! released, so they may call back into the racer (restart, destroy).

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Once;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{HtmlCanvasElement, KeyboardEvent};

use crate::config::WorldConfig;
use crate::driver::FrameDriver;
use crate::highscores::{self, BestTimes, course_key};
use crate::levels::LEVELS;
use crate::persistence::LocalStorage;
use crate::platform::web::{PerformanceClock, RafScheduler};
use crate::renderer::SceneRenderer;
use crate::renderer::canvas::CanvasSurface;
use crate::sim::RaceSnapshot;

type WebDriver = FrameDriver<PerformanceClock, RafScheduler, SceneRenderer<CanvasSurface>>;
type Listener = Closure<dyn FnMut(web_sys::Event)>;

static INIT: Once = Once::new();

/// Panic hook and console logging, once per page
pub fn init_logging() {
    INIT.call_once(|| {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&JsValue::from_str(&format!("Logger init failed: {}", e)));
        }
    });
}

enum Notice {
    Finished(f64),
    Tick(RaceSnapshot),
}

/// Everything a mounted race owns
struct Mounted {
    driver: RefCell<WebDriver>,
    notices: Rc<RefCell<Vec<Notice>>>,
    on_finish: RefCell<Option<js_sys::Function>>,
    on_tick: RefCell<Option<js_sys::Function>>,
    listeners: RefCell<Vec<(&'static str, Listener)>>,
    best_times: RefCell<BestTimes>,
}

impl Mounted {
    fn mount(canvas: HtmlCanvasElement, config: WorldConfig) -> Result<Rc<Self>, JsValue> {
        let surface = CanvasSurface::new(canvas)?;
        let scheduler = RafScheduler::new();
        let notices = Rc::new(RefCell::new(Vec::new()));

        let finish_sink = notices.clone();
        let tick_sink = notices.clone();
        let driver = FrameDriver::new(
            config,
            PerformanceClock::new(),
            scheduler.clone(),
            SceneRenderer::new(surface),
        )
        .on_finish(move |secs| finish_sink.borrow_mut().push(Notice::Finished(secs)))
        .on_tick(move |snapshot| tick_sink.borrow_mut().push(Notice::Tick(*snapshot)));

        let mounted = Rc::new(Self {
            driver: RefCell::new(driver),
            notices,
            on_finish: RefCell::new(None),
            on_tick: RefCell::new(None),
            listeners: RefCell::new(Vec::new()),
            best_times: RefCell::new(BestTimes::load(&LocalStorage)),
        });

        // Weak: the scheduler lives inside `mounted`
        let weak = Rc::downgrade(&mounted);
        scheduler.set_callback(Closure::new(move |_timestamp: f64| {
            if let Some(mounted) = weak.upgrade() {
                mounted.frame();
            }
        }));
        mounted.listen()?;
        Ok(mounted)
    }

    fn listen(self: &Rc<Self>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let mut listeners = Vec::new();

        for (kind, down) in [("keydown", true), ("keyup", false)] {
            let weak = Rc::downgrade(self);
            let closure = Listener::new(move |event: web_sys::Event| {
                let Some(mounted) = weak.upgrade() else {
                    return;
                };
                if let Some(event) = event.dyn_ref::<KeyboardEvent>() {
                    mounted.key(event, down);
                }
            });
            window.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
            listeners.push((kind, closure));
        }

        let weak = Rc::downgrade(self);
        let closure = Listener::new(move |_event: web_sys::Event| {
            let Some(mounted) = weak.upgrade() else {
                return;
            };
            if let Ok(mut driver) = mounted.driver.try_borrow_mut() {
                driver.renderer_mut().surface_mut().resize();
            }
        });
        window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
        listeners.push(("resize", closure));

        *self.listeners.borrow_mut() = listeners;
        Ok(())
    }

    fn key(&self, event: &KeyboardEvent, down: bool) {
        let key = event.key();
        let Ok(mut driver) = self.driver.try_borrow_mut() else {
            return;
        };
        let used = if down {
            driver.key_down(&key)
        } else {
            driver.key_up(&key)
        };
        // Keep arrows and space from scrolling the page
        if used && matches!(key.as_str(), " " | "ArrowUp" | "ArrowLeft" | "ArrowRight") {
            event.prevent_default();
        }
    }

    fn frame(&self) {
        {
            let Ok(mut driver) = self.driver.try_borrow_mut() else {
                log::warn!("Frame fired while the driver was busy");
                return;
            };
            if let Some(handle) = driver.pending_frame() {
                driver.on_frame(handle);
            }
        }
        self.flush();
    }

    /// Deliver queued notices to JS
    fn flush(&self) {
        let notices = std::mem::take(&mut *self.notices.borrow_mut());
        for notice in notices {
            if self.is_destroyed() {
                break;
            }
            match notice {
                Notice::Finished(secs) => {
                    self.record_best(secs);
                    let callback = self.on_finish.borrow().clone();
                    if let Some(callback) = callback {
                        call_js(&callback, &JsValue::from_f64(secs));
                    }
                }
                Notice::Tick(snapshot) => {
                    let callback = self.on_tick.borrow().clone();
                    let Some(callback) = callback else {
                        continue;
                    };
                    match serde_json::to_string(&snapshot)
                        .map_err(|e| JsValue::from_str(&e.to_string()))
                        .and_then(|json| js_sys::JSON::parse(&json))
                    {
                        Ok(value) => call_js(&callback, &value),
                        Err(e) => log::warn!("Could not encode snapshot: {:?}", e),
                    }
                }
            }
        }
    }

    fn record_best(&self, secs: f64) {
        let course = match self.driver.try_borrow() {
            Ok(driver) => course_key(driver.state().config().finish_x, driver.state().seed()),
            Err(_) => return,
        };
        self.best_times
            .borrow_mut()
            .record_finish(&mut LocalStorage, &course, secs);
    }

    fn is_destroyed(&self) -> bool {
        self.driver
            .try_borrow()
            .map(|driver| driver.is_destroyed())
            .unwrap_or(false)
    }

    fn destroy(&self) {
        match self.driver.try_borrow_mut() {
            Ok(mut driver) => driver.destroy(),
            Err(_) => log::warn!("destroy() while the driver was busy"),
        }
        if let Some(window) = web_sys::window() {
            for (kind, closure) in self.listeners.borrow_mut().drain(..) {
                let _ = window
                    .remove_event_listener_with_callback(kind, closure.as_ref().unchecked_ref());
            }
        }
        self.notices.borrow_mut().clear();
        *self.on_finish.borrow_mut() = None;
        *self.on_tick.borrow_mut() = None;
    }
}

impl Drop for Mounted {
    // JS may free the racer without calling destroy()
    fn drop(&mut self) {
        self.destroy();
    }
}

fn call_js(callback: &js_sys::Function, arg: &JsValue) {
    if let Err(e) = callback.call1(&JsValue::NULL, arg) {
        log::warn!("JS callback threw: {:?}", e);
    }
}

fn parse_config(json: Option<String>) -> Result<WorldConfig, JsValue> {
    match json {
        Some(json) => WorldConfig::from_json(&json).map_err(|e| JsValue::from_str(&e.to_string())),
        None => Ok(WorldConfig::default()),
    }
}

/// A race running on a canvas
#[wasm_bindgen]
pub struct BikeRacer {
    inner: Rc<Mounted>,
}

#[wasm_bindgen]
impl BikeRacer {
    /// Mount on `canvas`; `config_json` is an optional partial `WorldConfig`
    #[wasm_bindgen(constructor)]
    pub fn new(
        canvas: HtmlCanvasElement,
        config_json: Option<String>,
    ) -> Result<BikeRacer, JsValue> {
        init_logging();
        let config = parse_config(config_json)?;
        Ok(Self {
            inner: Mounted::mount(canvas, config)?,
        })
    }

    /// Start or restart the run
    pub fn start(&self) {
        if let Ok(mut driver) = self.inner.driver.try_borrow_mut() {
            driver.start();
        }
    }

    #[wasm_bindgen(js_name = togglePause)]
    pub fn toggle_pause(&self) {
        if let Ok(mut driver) = self.inner.driver.try_borrow_mut() {
            driver.toggle_pause();
        }
    }

    pub fn destroy(&self) {
        self.inner.destroy();
    }

    /// `callback(seconds)` once per finished run
    #[wasm_bindgen(js_name = onFinish)]
    pub fn on_finish(&self, callback: Option<js_sys::Function>) {
        *self.inner.on_finish.borrow_mut() = callback;
    }

    /// `callback(snapshot)` after every frame
    #[wasm_bindgen(js_name = onTick)]
    pub fn on_tick(&self, callback: Option<js_sys::Function>) {
        *self.inner.on_tick.borrow_mut() = callback;
    }

    /// Start a new run with a new config
    #[wasm_bindgen(js_name = applyConfig)]
    pub fn apply_config(&self, config_json: &str) -> Result<(), JsValue> {
        let config = parse_config(Some(config_json.to_string()))?;
        if let Ok(mut driver) = self.inner.driver.try_borrow_mut() {
            driver.apply_config(config);
        }
        Ok(())
    }

    /// Best time on the current course, if any
    #[wasm_bindgen(js_name = bestTime)]
    pub fn best_time(&self) -> Option<f64> {
        let driver = self.inner.driver.try_borrow().ok()?;
        let course = course_key(driver.state().config().finish_x, driver.state().seed());
        self.inner.best_times.borrow().best(&course)
    }
}

/// Leaderboard of the preset levels as JSON
#[wasm_bindgen(js_name = leaderboardJson)]
pub fn leaderboard_json() -> String {
    let rows = highscores::leaderboard(&BestTimes::load(&LocalStorage), &LEVELS);
    serde_json::to_string(&rows).unwrap_or_else(|e| {
        log::warn!("Could not encode leaderboard: {}", e);
        "[]".to_string()
    })
}

/// Mount and start a race on the canvas with id `canvas_id`
pub fn mount(canvas_id: &str) -> Result<BikeRacer, JsValue> {
    let canvas = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(canvas_id))
        .ok_or_else(|| JsValue::from_str("canvas not found"))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| JsValue::from_str("element is not a canvas"))?;
    let racer = BikeRacer::new(canvas, None)?;
    racer.start();
    Ok(racer)
}
