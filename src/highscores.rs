//! Best finish times per course
//!
//! Persisted as one JSON object (course key → seconds) under a single
//! storage key. Storage problems never reach the race: a missing or
//! corrupt record reads as empty, a failed write is logged.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::levels::Level;
use crate::persistence::KeyValueStore;

/// Storage key holding the best-times map
pub const STORAGE_KEY: &str = "bikeracer_best_times";

/// Key identifying a course: finish distance and seed
pub fn course_key(finish_x: f32, seed: u32) -> String {
    format!("{}-{}", finish_x, seed)
}

/// Best time in seconds for each course
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BestTimes {
    times: BTreeMap<String, f64>,
}

impl BestTimes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from storage; anything unreadable counts as no records
    pub fn load(store: &impl KeyValueStore) -> Self {
        let raw = match store.get(STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                log::info!("No best times found, starting fresh");
                return Self::new();
            }
            Err(e) => {
                log::warn!("Could not read best times: {}", e);
                return Self::new();
            }
        };
        match serde_json::from_str::<BestTimes>(&raw) {
            Ok(mut times) => {
                times.times.retain(|_, secs| secs.is_finite() && *secs > 0.0);
                log::info!("Loaded best times for {} courses", times.len());
                times
            }
            Err(e) => {
                log::warn!("Discarding corrupt best times: {}", e);
                Self::new()
            }
        }
    }

    pub fn best(&self, course: &str) -> Option<f64> {
        self.times.get(course).copied()
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Keep `secs` if it beats the stored time. Returns true if it did.
    pub fn improve(&mut self, course: &str, secs: f64) -> bool {
        if !secs.is_finite() || secs <= 0.0 {
            return false;
        }
        match self.times.get(course) {
            Some(best) if *best <= secs => false,
            _ => {
                self.times.insert(course.to_string(), secs);
                true
            }
        }
    }

    /// Record a finish and persist on improvement. Returns true if it was
    /// a new best.
    ///
    /// Reloads before comparing so records made elsewhere (another tab)
    /// are not overwritten by a stale copy.
    pub fn record_finish(
        &mut self,
        store: &mut impl KeyValueStore,
        course: &str,
        secs: f64,
    ) -> bool {
        let stored = Self::load(store);
        for (key, best) in stored.times {
            self.improve(&key, best);
        }
        if !self.improve(course, secs) {
            return false;
        }
        log::info!("New best time on {}: {:.2} s", course, secs);
        match serde_json::to_string(self) {
            Ok(json) => {
                if let Err(e) = store.set(STORAGE_KEY, &json) {
                    log::warn!("Could not save best times: {}", e);
                }
            }
            Err(e) => log::warn!("Could not encode best times: {}", e),
        }
        true
    }
}

/// One leaderboard line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardRow {
    /// 1-indexed position
    pub rank: usize,
    pub level: &'static str,
    pub best_secs: Option<f64>,
}

/// One row per level, fastest first, courses without a time last
pub fn leaderboard(times: &BestTimes, levels: &[Level]) -> Vec<LeaderboardRow> {
    let mut rows: Vec<(&Level, Option<f64>)> = levels
        .iter()
        .map(|level| (level, times.best(&level.course_key())))
        .collect();
    // Stable sort keeps menu order among unranked courses
    rows.sort_by(|(_, a), (_, b)| {
        a.unwrap_or(f64::INFINITY)
            .total_cmp(&b.unwrap_or(f64::INFINITY))
    });
    rows.into_iter()
        .enumerate()
        .map(|(i, (level, best_secs))| LeaderboardRow {
            rank: i + 1,
            level: level.name,
            best_secs,
        })
        .collect()
}

/// Best time as shown on the board
pub fn format_time(best_secs: Option<f64>) -> String {
    match best_secs {
        Some(secs) => format!("{:.2}s", secs),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::LEVELS;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_course_key() {
        assert_eq!(course_key(5000.0, 12345), "5000-12345");
        assert_eq!(course_key(2500.5, 7), "2500.5-7");
    }

    #[test]
    fn test_record_only_improvements() {
        let mut store = MemoryStore::new();
        let mut times = BestTimes::load(&store);
        assert!(times.is_empty());

        assert!(times.record_finish(&mut store, "5000-1", 40.0));
        assert!(!times.record_finish(&mut store, "5000-1", 45.0));
        assert!(times.record_finish(&mut store, "5000-1", 38.5));

        let reloaded = BestTimes::load(&store);
        assert_eq!(reloaded.best("5000-1"), Some(38.5));
    }

    #[test]
    fn test_slower_time_leaves_storage_untouched() {
        let mut store = MemoryStore::new();
        store.set(STORAGE_KEY, r#"{"5000-1":30.0}"#).unwrap();
        let mut times = BestTimes::new();
        assert!(!times.record_finish(&mut store, "5000-1", 31.0));
        assert_eq!(
            store.get(STORAGE_KEY).unwrap().as_deref(),
            Some(r#"{"5000-1":30.0}"#)
        );
    }

    #[test]
    fn test_corrupt_storage_reads_empty() {
        let mut store = MemoryStore::new();
        store.set(STORAGE_KEY, "{not json").unwrap();
        assert!(BestTimes::load(&store).is_empty());

        // A bad record is replaced by the next finish
        let mut times = BestTimes::load(&store);
        assert!(times.record_finish(&mut store, "3000-12345", 20.0));
        assert_eq!(BestTimes::load(&store).best("3000-12345"), Some(20.0));
    }

    #[test]
    fn test_unavailable_storage_is_harmless() {
        let mut store = MemoryStore::unavailable();
        let mut times = BestTimes::load(&store);
        assert!(times.record_finish(&mut store, "5000-1", 12.0));
        assert_eq!(times.best("5000-1"), Some(12.0));
    }

    #[test]
    fn test_rejects_nonsense_times() {
        let mut times = BestTimes::new();
        assert!(!times.improve("a", f64::NAN));
        assert!(!times.improve("a", -1.0));
        assert!(times.is_empty());
    }

    #[test]
    fn test_leaderboard_order() {
        let mut times = BestTimes::new();
        times.improve(&LEVELS[2].course_key(), 61.0);
        times.improve(&LEVELS[1].course_key(), 42.0);

        let rows = leaderboard(&times, &LEVELS);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].level, "Valley Run");
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[1].level, "Long Haul");
        assert_eq!(rows[2].level, "Rolling Hills");
        assert_eq!(rows[2].best_secs, None);
        assert_eq!(format_time(rows[0].best_secs), "42.00s");
        assert_eq!(format_time(rows[2].best_secs), "-");
    }
}
