//! history.rs — bounded in-memory store of scored readings.
//!
//! Stands in for the durable store (database CRUD lives with the outer
//! collaborators): keeps the recent tail for the API's list/latest lookups
//! and for diagnostics. Oldest entries are dropped once the cap is reached.

use std::sync::Mutex;

use crate::reading::ScoredReading;

#[derive(Debug)]
pub struct History {
    inner: Mutex<Vec<ScoredReading>>,
    cap: usize,
}

impl History {
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            inner: Mutex::new(Vec::with_capacity(cap.min(10_000))),
            cap: cap.min(10_000),
        }
    }

    pub fn record(&self, reading: ScoredReading) {
        let mut v = self.inner.lock().expect("history mutex poisoned");
        v.push(reading);
        if v.len() > self.cap {
            let excess = v.len() - self.cap;
            v.drain(0..excess);
        }
    }

    /// Most recent `n` readings, oldest first.
    pub fn snapshot_last_n(&self, n: usize) -> Vec<ScoredReading> {
        let v = self.inner.lock().expect("history mutex poisoned");
        let start = v.len().saturating_sub(n);
        v[start..].to_vec()
    }

    /// Latest reading for one cup, if any was recorded.
    pub fn latest_for_cup(&self, cup_id: &str) -> Option<ScoredReading> {
        let v = self.inner.lock().expect("history mutex poisoned");
        v.iter().rev().find(|r| r.cup_id == cup_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("history mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reading::{PredictionMethod, ScoredReading};

    fn reading(cup_id: &str, score: f64) -> ScoredReading {
        ScoredReading {
            cup_id: cup_id.to_string(),
            ph: 7.0,
            tds: 120.0,
            salinity_ppt: 0.1,
            temperature: 21.0,
            cleanliness_score: score,
            prediction_method: Some(PredictionMethod::Rule),
            timestamp: "2025-08-07T12:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn cap_drops_oldest_entries() {
        let h = History::with_capacity(3);
        for i in 0..5 {
            h.record(reading("CUP1", i as f64));
        }
        let tail = h.snapshot_last_n(10);
        assert_eq!(tail.len(), 3);
        assert_eq!(tail[0].cleanliness_score, 2.0);
        assert_eq!(tail[2].cleanliness_score, 4.0);
    }

    #[test]
    fn latest_for_cup_picks_the_newest_match() {
        let h = History::with_capacity(10);
        h.record(reading("CUP1", 50.0));
        h.record(reading("CUP2", 60.0));
        h.record(reading("CUP1", 70.0));
        assert_eq!(h.latest_for_cup("CUP1").unwrap().cleanliness_score, 70.0);
        assert_eq!(h.latest_for_cup("CUP2").unwrap().cleanliness_score, 60.0);
        assert!(h.latest_for_cup("CUP404").is_none());
    }

    #[test]
    fn snapshot_returns_oldest_first() {
        let h = History::with_capacity(10);
        h.record(reading("CUP1", 1.0));
        h.record(reading("CUP1", 2.0));
        let snap = h.snapshot_last_n(2);
        assert_eq!(snap[0].cleanliness_score, 1.0);
        assert_eq!(snap[1].cleanliness_score, 2.0);
    }
}
