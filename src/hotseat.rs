//! Hot-seat time trial: two players race the same course in turn

use serde::{Deserialize, Serialize};

use crate::config::WorldConfig;

/// Finish distance of a match course
pub const MATCH_FINISH_X: f32 = 5000.0;

/// Upper bound (exclusive) for generated match seeds
const MAX_MATCH_SEED: u32 = 1_000_000_000;

/// Whose turn it is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPhase {
    Player1,
    Player2,
    Done,
}

/// Result of a completed match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Player1,
    Player2,
    Tie,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Player1 => "Player 1",
            Outcome::Player2 => "Player 2",
            Outcome::Tie => "Tie",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotseatMatch {
    pub seed: u32,
    pub phase: MatchPhase,
    pub p1: Option<f64>,
    pub p2: Option<f64>,
}

impl HotseatMatch {
    pub fn new(seed: u32) -> Self {
        Self {
            seed,
            phase: MatchPhase::Player1,
            p1: None,
            p2: None,
        }
    }

    /// Match on a freshly drawn course
    pub fn random() -> Self {
        Self::new(rand::random_range(0..MAX_MATCH_SEED))
    }

    /// Course both players race
    pub fn config(&self) -> WorldConfig {
        WorldConfig {
            seed: self.seed,
            finish_x: MATCH_FINISH_X,
            ..WorldConfig::default()
        }
    }

    /// Store a finish time for the player whose turn it is. A rerun
    /// replaces the earlier time.
    pub fn record_finish(&mut self, secs: f64) {
        match self.phase {
            MatchPhase::Player1 => self.p1 = Some(secs),
            MatchPhase::Player2 => self.p2 = Some(secs),
            MatchPhase::Done => log::debug!("Finish after match end ignored"),
        }
    }

    /// Hand over to the next player (or end the match)
    pub fn next_phase(&mut self) -> MatchPhase {
        self.phase = match self.phase {
            MatchPhase::Player1 => MatchPhase::Player2,
            MatchPhase::Player2 | MatchPhase::Done => MatchPhase::Done,
        };
        self.phase
    }

    /// Lower time wins once both players have one
    pub fn winner(&self) -> Option<Outcome> {
        let (p1, p2) = (self.p1?, self.p2?);
        Some(if p1 < p2 {
            Outcome::Player1
        } else if p2 < p1 {
            Outcome::Player2
        } else {
            Outcome::Tie
        })
    }

    /// Start over on a new course
    pub fn reset(&mut self) {
        *self = Self::random();
        log::info!("New hot-seat match, seed {}", self.seed);
    }
}
