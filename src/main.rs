//! Bike Racer entry point
//!
//! Web: mounts a race on `#canvas`. Native: runs a scripted headless race
//! and logs the result.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
thread_local! {
    // Listeners and frame callbacks live as long as the page
    static RACER: std::cell::RefCell<Option<bike_racer::web::BikeRacer>> =
        const { std::cell::RefCell::new(None) };
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    bike_racer::web::init_logging();
    log::info!("Bike Racer starting...");
    match bike_racer::web::mount("canvas") {
        Ok(racer) => {
            RACER.with(|slot| *slot.borrow_mut() = Some(racer));
            log::info!("Bike Racer running!");
        }
        Err(e) => log::error!("Failed to mount: {:?}", e),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Bike Racer (native) starting...");

    let mut args = std::env::args().skip(1);
    let mut config = bike_racer::WorldConfig::default();
    if let Some(seed) = args.next() {
        match seed.parse() {
            Ok(seed) => config.seed = seed,
            Err(e) => log::warn!("Ignoring seed {:?}: {}", seed, e),
        }
    }
    if let Some(finish) = args.next() {
        match finish.parse() {
            Ok(finish) => config.finish_x = finish,
            Err(e) => log::warn!("Ignoring finish distance {:?}: {}", finish, e),
        }
    }

    match headless::race(config) {
        Some(secs) => println!("Finished seed {} in {:.2} s", config.seed, secs),
        None => println!("Did not finish seed {}", config.seed),
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::cell::Cell;
    use std::rc::Rc;

    use bike_racer::highscores::{BestTimes, course_key};
    use bike_racer::persistence::MemoryStore;
    use bike_racer::platform::{ManualClock, ManualScheduler};
    use bike_racer::renderer::NullRenderer;
    use bike_racer::sim::Obstacle;
    use bike_racer::{FrameDriver, WorldConfig};

    const FRAME_MS: f64 = 16.7;
    /// Give up after ten simulated minutes
    const MAX_FRAMES: usize = 36_000;
    /// Jump when a box is this close ahead
    const JUMP_LOOKAHEAD: f32 = 70.0;
    /// Body angle the autopilot corrects toward level
    const TILT_LIMIT: f32 = 0.25;

    /// Race `config` with a simple autopilot. Returns the finish time.
    pub fn race(config: WorldConfig) -> Option<f64> {
        let clock = ManualClock::new(0.0);
        let scheduler = ManualScheduler::new();
        let finish = Rc::new(Cell::new(None));
        let sink = finish.clone();
        let mut driver = FrameDriver::new(config, clock.clone(), scheduler.clone(), NullRenderer)
            .on_finish(move |secs| sink.set(Some(secs)));

        driver.start();
        driver.key_down("ArrowUp");
        for _ in 0..MAX_FRAMES {
            if finish.get().is_some() {
                break;
            }
            steer(&mut driver);
            clock.advance(FRAME_MS);
            let Some(handle) = scheduler.pop() else {
                break;
            };
            driver.on_frame(handle);
        }

        let secs = finish.get()?;
        let mut store = MemoryStore::new();
        let course = course_key(driver.state().config().finish_x, driver.state().seed());
        BestTimes::load(&store).record_finish(&mut store, &course, secs);
        Some(secs)
    }

    fn steer(driver: &mut FrameDriver<ManualClock, ManualScheduler, NullRenderer>) {
        let state = driver.state();
        let bike = state.vehicle;
        let box_ahead = state.obstacles().iter().any(|o| {
            matches!(o, Obstacle::Box { .. })
                && o.x() > bike.pos.x
                && o.x() - bike.pos.x < JUMP_LOOKAHEAD
        });

        if box_ahead && bike.on_ground {
            driver.key_down(" ");
        } else {
            driver.key_up(" ");
        }
        if bike.on_ground {
            driver.key_up("ArrowLeft");
            driver.key_up("ArrowRight");
        } else if bike.angle < -TILT_LIMIT {
            driver.key_down("ArrowRight");
            driver.key_up("ArrowLeft");
        } else if bike.angle > TILT_LIMIT {
            driver.key_down("ArrowLeft");
            driver.key_up("ArrowRight");
        }
    }
}
