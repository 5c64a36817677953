//! Frame driver
//!
//! Owns a run and pumps it one tick per animation frame: measure the frame
//! time, sample input, tick, report, render, schedule the next frame.
//! Exactly one frame is pending while the driver is live, and nothing
//! fires after `destroy`.

use crate::config::WorldConfig;
use crate::input::InputState;
use crate::platform::{Clock, FrameHandle, FrameScheduler};
use crate::renderer::Renderer;
use crate::sim::{
    InputTrace, RaceEvent, RaceSnapshot, RaceState, normalize_frame_dt, tick, tick_recorded,
};

/// Called once per run with the finish time in seconds
pub type FinishCallback = Box<dyn FnMut(f64)>;
/// Called after every frame with the current run
pub type TickCallback = Box<dyn FnMut(&RaceSnapshot)>;

pub struct FrameDriver<C: Clock, S: FrameScheduler, R: Renderer> {
    state: RaceState,
    input: InputState,
    clock: C,
    scheduler: S,
    renderer: R,
    pending: Option<FrameHandle>,
    last_frame_ms: Option<f64>,
    destroyed: bool,
    on_finish: Option<FinishCallback>,
    on_tick: Option<TickCallback>,
    record_trace: bool,
    trace: Option<InputTrace>,
}

impl<C: Clock, S: FrameScheduler, R: Renderer> FrameDriver<C, S, R> {
    pub fn new(config: WorldConfig, clock: C, scheduler: S, renderer: R) -> Self {
        Self::with_state(RaceState::new(config), clock, scheduler, renderer)
    }

    /// Drive runs on the course of `state` (custom terrain, fixed obstacles)
    pub fn with_state(state: RaceState, clock: C, scheduler: S, renderer: R) -> Self {
        Self {
            state,
            input: InputState::new(),
            clock,
            scheduler,
            renderer,
            pending: None,
            last_frame_ms: None,
            destroyed: false,
            on_finish: None,
            on_tick: None,
            record_trace: false,
            trace: None,
        }
    }

    pub fn on_finish(mut self, callback: impl FnMut(f64) + 'static) -> Self {
        self.on_finish = Some(Box::new(callback));
        self
    }

    pub fn on_tick(mut self, callback: impl FnMut(&RaceSnapshot) + 'static) -> Self {
        self.on_tick = Some(Box::new(callback));
        self
    }

    /// Record every run's inputs for replay
    pub fn with_trace_recording(mut self) -> Self {
        self.record_trace = true;
        self
    }

    /// (Re)start the run from the start line
    pub fn start(&mut self) {
        if self.destroyed {
            log::warn!("start() on a destroyed driver ignored");
            return;
        }
        self.cancel_pending();
        // A toggle queued against the old run must not pause the new one
        self.input.cancel_pause();
        let now = self.clock.now_ms();
        self.state.reset(now);
        self.last_frame_ms = None;
        if self.record_trace {
            self.trace = Some(InputTrace::new(now));
        }
        log::info!(
            "Race started: seed {}, finish at {}",
            self.state.seed(),
            self.state.config().finish_x
        );
        self.schedule();
    }

    /// Handle a scheduled frame. Returns false if the frame was stale or
    /// the driver is destroyed.
    pub fn on_frame(&mut self, handle: FrameHandle) -> bool {
        if self.destroyed || self.pending != Some(handle) {
            log::debug!("Ignoring stale frame {:?}", handle);
            return false;
        }
        self.pending = None;

        let now = self.clock.now_ms();
        let dt = normalize_frame_dt(self.last_frame_ms.map(|last| now - last));
        self.last_frame_ms = Some(now);

        let input = self.input.sample();
        let events = match self.trace.as_mut() {
            Some(trace) => tick_recorded(&mut self.state, trace, &input, dt, now),
            None => tick(&mut self.state, &input, dt, now),
        };

        for event in &events {
            match event {
                RaceEvent::Finished { elapsed_secs } => {
                    if let Some(callback) = self.on_finish.as_mut() {
                        callback(*elapsed_secs);
                    }
                }
                RaceEvent::Paused => log::info!("Paused"),
                RaceEvent::Resumed => log::info!("Resumed"),
                RaceEvent::Started | RaceEvent::Jumped => {}
            }
        }

        self.renderer.render(&self.state, now);
        if let Some(callback) = self.on_tick.as_mut() {
            callback(&self.state.snapshot());
        }

        self.schedule();
        true
    }

    /// Toggle pause on the next frame
    pub fn toggle_pause(&mut self) {
        if !self.destroyed {
            self.input.request_pause();
        }
    }

    /// Stop for good: cancel the pending frame and drop the callbacks
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.cancel_pending();
        self.destroyed = true;
        self.on_finish = None;
        self.on_tick = None;
        self.input.clear();
        log::info!("Driver destroyed");
    }

    /// Returns true if the key is one the game uses
    pub fn key_down(&mut self, key: &str) -> bool {
        !self.destroyed && self.input.key_down(key)
    }

    pub fn key_up(&mut self, key: &str) -> bool {
        !self.destroyed && self.input.key_up(key)
    }

    /// Replace the run with a new one using `config` and start it. Custom
    /// terrain and fixed obstacles carry over.
    pub fn apply_config(&mut self, config: WorldConfig) {
        if self.destroyed {
            return;
        }
        self.state = self.state.reconfigured(config);
        self.start();
    }

    pub fn state(&self) -> &RaceState {
        &self.state
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Inputs of the current run, if recording
    pub fn trace(&self) -> Option<&InputTrace> {
        self.trace.as_ref()
    }

    fn schedule(&mut self) {
        self.pending = Some(self.scheduler.request());
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use super::*;
    use crate::platform::{ManualClock, ManualScheduler};
    use crate::renderer::NullRenderer;
    use crate::sim::{Obstacle, RacePhase, Terrain, replay, replay_course};

    type TestDriver = FrameDriver<ManualClock, ManualScheduler, NullRenderer>;

    fn driver(config: WorldConfig) -> (TestDriver, ManualClock, ManualScheduler) {
        let clock = ManualClock::new(1000.0);
        let scheduler = ManualScheduler::new();
        let driver =
            FrameDriver::new(config, clock.clone(), scheduler.clone(), NullRenderer);
        (driver, clock, scheduler)
    }

    /// Fire the pending frame after `ms` of wall time
    fn pump(
        driver: &mut TestDriver,
        clock: &ManualClock,
        scheduler: &ManualScheduler,
        ms: f64,
    ) {
        clock.advance(ms);
        let handle = scheduler.pop().unwrap();
        assert!(driver.on_frame(handle));
    }

    #[test]
    fn test_single_pending_frame() {
        let (mut d, clock, scheduler) = driver(WorldConfig::default());
        d.start();
        for _ in 0..20 {
            assert_eq!(scheduler.pending().len(), 1);
            pump(&mut d, &clock, &scheduler, 16.7);
        }
        assert_eq!(scheduler.pending().len(), 1);
        assert_eq!(d.pending_frame(), scheduler.pending().first().copied());
    }

    #[test]
    fn test_restart_cancels_previous_frame() {
        let (mut d, _clock, scheduler) = driver(WorldConfig::default());
        d.start();
        let stale = d.pending_frame().unwrap();
        d.start();
        assert_eq!(scheduler.pending().len(), 1);
        assert_eq!(scheduler.counts(), (2, 1));
        assert!(!d.on_frame(stale));
    }

    #[test]
    fn test_restart_resets_run() {
        let (mut d, clock, scheduler) = driver(WorldConfig::default());
        d.start();
        d.key_down("ArrowUp");
        for _ in 0..60 {
            pump(&mut d, &clock, &scheduler, 16.7);
        }
        assert!(d.state().vehicle.pos.x > 100.0);

        d.start();
        assert_eq!(d.state().vehicle.pos.x, 100.0);
        assert_eq!(d.state().phase, RacePhase::Ready);
        assert_eq!(d.state().run.start_timestamp_ms, clock.now_ms());
    }

    #[test]
    fn test_no_callbacks_after_destroy() {
        let ticks = Rc::new(Cell::new(0));
        let counter = ticks.clone();
        let (d, clock, scheduler) = driver(WorldConfig::default());
        let mut d = d.on_tick(move |_| counter.set(counter.get() + 1));
        d.start();
        pump(&mut d, &clock, &scheduler, 16.7);
        assert_eq!(ticks.get(), 1);

        let handle = d.pending_frame().unwrap();
        d.destroy();
        assert!(scheduler.pending().is_empty());
        assert!(!d.on_frame(handle));
        d.start();
        assert!(scheduler.pending().is_empty());
        assert_eq!(ticks.get(), 1);
        assert!(!d.key_down("ArrowUp"));
    }

    #[test]
    fn test_finish_fires_once() {
        let finishes = Rc::new(RefCell::new(Vec::new()));
        let sink = finishes.clone();
        let (d, clock, scheduler) = driver(WorldConfig::default());
        let mut d = d.on_finish(move |secs| sink.borrow_mut().push(secs));
        d.start();
        pump(&mut d, &clock, &scheduler, 16.7);

        // Put the bike past the line 2.5 s into the run
        d.state.vehicle.pos.x = d.state.config().finish_x + 50.0;
        clock.set(d.state.run.start_timestamp_ms + 2500.0);
        let handle = scheduler.pop().unwrap();
        assert!(d.on_frame(handle));
        for _ in 0..10 {
            pump(&mut d, &clock, &scheduler, 16.7);
        }

        let finishes = finishes.borrow();
        assert_eq!(finishes.len(), 1);
        assert!((finishes[0] - 2.5).abs() < 1e-9);
        assert_eq!(d.state().phase, RacePhase::Finished);
        // Still animating after the finish
        assert_eq!(scheduler.pending().len(), 1);
    }

    #[test]
    fn test_pause_freezes_state() {
        let (mut d, clock, scheduler) = driver(WorldConfig::default());
        d.start();
        d.key_down("ArrowUp");
        for _ in 0..10 {
            pump(&mut d, &clock, &scheduler, 16.7);
        }

        d.key_down("p");
        pump(&mut d, &clock, &scheduler, 16.7);
        assert_eq!(d.state().phase, RacePhase::Paused);
        let frozen = d.state().vehicle;
        for _ in 0..10 {
            pump(&mut d, &clock, &scheduler, 16.7);
        }
        assert_eq!(d.state().vehicle, frozen);

        d.key_up("p");
        d.toggle_pause();
        pump(&mut d, &clock, &scheduler, 16.7);
        assert_eq!(d.state().phase, RacePhase::Running);
        assert_ne!(d.state().vehicle, frozen);
    }

    #[test]
    fn test_frame_dt_from_clock() {
        let (d, clock, scheduler) = driver(WorldConfig::default());
        let mut d = d.with_trace_recording();
        d.start();
        pump(&mut d, &clock, &scheduler, 500.0);
        pump(&mut d, &clock, &scheduler, 33.4);
        pump(&mut d, &clock, &scheduler, 1000.0);

        let frames = &d.trace().unwrap().frames;
        // First frame is nominal no matter how late it fires
        assert_eq!(frames[0].dt, 1.0);
        assert!((frames[1].dt - 2.0).abs() < 1e-5);
        assert_eq!(frames[2].dt, 2.5);
    }

    #[test]
    fn test_recorded_run_replays() {
        let config = WorldConfig::with_seed(31337);
        let (d, clock, scheduler) = driver(config);
        let mut d = d.with_trace_recording();
        d.start();
        d.key_down("ArrowUp");
        for i in 0..400 {
            if i == 150 {
                d.key_down(" ");
            }
            if i == 152 {
                d.key_up(" ");
            }
            pump(&mut d, &clock, &scheduler, 15.0 + (i % 4) as f64);
        }

        let (replayed, _) = replay(config, d.trace().unwrap());
        assert_eq!(replayed.vehicle, d.state().vehicle);
        assert_eq!(replayed.run, d.state().run);
    }

    #[test]
    fn test_apply_config_starts_new_run() {
        let (mut d, _clock, scheduler) = driver(WorldConfig::default());
        d.start();
        d.apply_config(WorldConfig::with_seed(9));
        assert_eq!(d.state().seed(), 9);
        assert_eq!(d.state().phase, RacePhase::Ready);
        assert_eq!(scheduler.pending().len(), 1);
    }

    #[test]
    fn test_restart_drops_queued_pause() {
        let (mut d, clock, scheduler) = driver(WorldConfig::default());
        d.start();
        pump(&mut d, &clock, &scheduler, 16.7);
        assert_eq!(d.state().phase, RacePhase::Running);

        d.toggle_pause();
        d.start();
        pump(&mut d, &clock, &scheduler, 16.7);
        assert_eq!(d.state().phase, RacePhase::Running);

        d.toggle_pause();
        d.apply_config(WorldConfig::with_seed(3));
        pump(&mut d, &clock, &scheduler, 16.7);
        assert_eq!(d.state().phase, RacePhase::Running);
    }

    #[test]
    fn test_custom_course_run_replays() {
        let crate_box = Obstacle::Box {
            x: 900.0,
            width: 40.0,
            height: 40.0,
        };
        let course = RaceState::with_terrain(WorldConfig::default(), Terrain::flat(300.0))
            .with_obstacles(vec![crate_box]);
        let clock = ManualClock::new(1000.0);
        let scheduler = ManualScheduler::new();
        let mut d = FrameDriver::with_state(course, clock.clone(), scheduler.clone(), NullRenderer)
            .with_trace_recording();

        d.start();
        assert_eq!(d.state().obstacles(), &[crate_box]);
        assert_eq!(d.state().vehicle.pos.y, 300.0);
        d.key_down("ArrowUp");
        for _ in 0..120 {
            pump(&mut d, &clock, &scheduler, 16.7);
        }
        assert!(d.state().vehicle.pos.x > 100.0);

        let (replayed, _) = replay_course(d.state(), d.trace().unwrap());
        assert_eq!(replayed.vehicle, d.state().vehicle);
        assert_eq!(replayed.run, d.state().run);

        // The course survives a config change
        d.apply_config(WorldConfig::with_seed(8));
        assert_eq!(d.state().seed(), 8);
        assert_eq!(d.state().obstacles(), &[crate_box]);
        assert_eq!(d.state().terrain().height(2500.0), 300.0);
    }

    #[test]
    fn test_destroy_twice_is_harmless() {
        let (mut d, _clock, scheduler) = driver(WorldConfig::default());
        d.start();
        d.destroy();
        d.destroy();
        assert!(d.is_destroyed());
        assert!(scheduler.pending().is_empty());
        assert_eq!(scheduler.counts(), (1, 1));
    }
}
