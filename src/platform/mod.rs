//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Time (`Clock`)
//! - Frame scheduling (`FrameScheduler`, requestAnimationFrame on web)
//!
//! The manual implementations drive the game from tests and the headless
//! native build.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[cfg(target_arch = "wasm32")]
pub mod web;

/// Source of wall-clock time in milliseconds
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// Clock advanced by hand. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    pub fn set(&self, ms: f64) {
        self.now.set(ms);
    }

    pub fn advance(&self, ms: f64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}

/// Identifies one scheduled frame callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Schedules a single future frame callback
pub trait FrameScheduler {
    /// Ask for one frame callback
    fn request(&mut self) -> FrameHandle;
    /// Withdraw a request that has not fired yet
    fn cancel(&mut self, handle: FrameHandle);
}

#[derive(Debug, Default)]
struct FrameQueue {
    next_id: u64,
    pending: Vec<FrameHandle>,
    requested: u64,
    cancelled: u64,
}

/// Scheduler whose frames are fired by the caller. Clones share the queue.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    queue: Rc<RefCell<FrameQueue>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests not yet fired or cancelled
    pub fn pending(&self) -> Vec<FrameHandle> {
        self.queue.borrow().pending.clone()
    }

    /// Remove and return the oldest pending request
    pub fn pop(&self) -> Option<FrameHandle> {
        let mut queue = self.queue.borrow_mut();
        if queue.pending.is_empty() {
            None
        } else {
            Some(queue.pending.remove(0))
        }
    }

    /// Total requests and cancellations so far
    pub fn counts(&self) -> (u64, u64) {
        let queue = self.queue.borrow();
        (queue.requested, queue.cancelled)
    }
}

impl FrameScheduler for ManualScheduler {
    fn request(&mut self) -> FrameHandle {
        let mut queue = self.queue.borrow_mut();
        queue.next_id += 1;
        queue.requested += 1;
        let handle = FrameHandle(queue.next_id);
        queue.pending.push(handle);
        handle
    }

    fn cancel(&mut self, handle: FrameHandle) {
        let mut queue = self.queue.borrow_mut();
        let before = queue.pending.len();
        queue.pending.retain(|h| *h != handle);
        if queue.pending.len() != before {
            queue.cancelled += 1;
        }
    }
}
