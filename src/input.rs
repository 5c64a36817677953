//! Keyboard input handling
//!
//! Key events mutate the held-key set; the frame driver samples it once
//! per tick. Pause is edge-triggered: holding the key (and the browser's
//! key repeat) toggles once.

use std::collections::HashSet;

use crate::sim::TickInput;

/// What a key does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Accelerate,
    TiltLeft,
    TiltRight,
    Jump,
    Pause,
}

impl Action {
    /// Map a `KeyboardEvent.key` value to an action
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowUp" | "w" | "W" => Some(Action::Accelerate),
            "ArrowLeft" | "a" | "A" => Some(Action::TiltLeft),
            "ArrowRight" | "d" | "D" => Some(Action::TiltRight),
            " " | "Spacebar" => Some(Action::Jump),
            "p" | "P" => Some(Action::Pause),
            _ => None,
        }
    }
}

/// Held actions plus a latched pause press
#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: HashSet<Action>,
    pause_pending: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle key down. Returns true if the key is one the game uses.
    pub fn key_down(&mut self, key: &str) -> bool {
        let Some(action) = Action::from_key(key) else {
            return false;
        };
        let newly_pressed = self.held.insert(action);
        if action == Action::Pause && newly_pressed {
            self.request_pause();
        }
        true
    }

    /// Handle key up. Returns true if the key is one the game uses.
    pub fn key_up(&mut self, key: &str) -> bool {
        match Action::from_key(key) {
            Some(action) => {
                self.held.remove(&action);
                true
            }
            None => false,
        }
    }

    /// Queue a pause toggle for the next tick. Two requests before the
    /// next tick cancel out.
    pub fn request_pause(&mut self) {
        self.pause_pending = !self.pause_pending;
    }

    /// Drop a queued pause toggle; held keys stay held
    pub fn cancel_pause(&mut self) {
        self.pause_pending = false;
    }

    pub fn is_held(&self, action: Action) -> bool {
        self.held.contains(&action)
    }

    /// Intent for this tick; consumes the pending pause press
    pub fn sample(&mut self) -> TickInput {
        TickInput {
            accelerate: self.is_held(Action::Accelerate),
            jump: self.is_held(Action::Jump),
            tilt_left: self.is_held(Action::TiltLeft),
            tilt_right: self.is_held(Action::TiltRight),
            pause: std::mem::take(&mut self.pause_pending),
        }
    }

    /// Drop everything held (focus loss, restart)
    pub fn clear(&mut self) {
        self.held.clear();
        self.pause_pending = false;
    }
}
