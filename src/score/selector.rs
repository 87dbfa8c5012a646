//! Score selection policy: provided score → learned model → rule bands.
//!
//! A pure composition layer. It owns no model state of its own; the learned
//! scorer sits behind an `Arc<RwLock<..>>` shared with whoever retrains it
//! (single writer, many readers — scoring only ever takes the read lock).
//! Identical inputs against identical model state always resolve to the
//! same output.

use std::sync::{Arc, RwLock};

use metrics::counter;
use tracing::warn;

use super::model::LearnedScorer;
use super::rules;
use crate::reading::{PredictionMethod, ReadingInput, ScoredReading};

#[derive(Clone)]
pub struct ScoreSelector {
    learned: Arc<RwLock<LearnedScorer>>,
}

impl ScoreSelector {
    pub fn new(learned: Arc<RwLock<LearnedScorer>>) -> Self {
        Self { learned }
    }

    /// Shared handle to the learned scorer (for retraining/swapping).
    pub fn learned(&self) -> Arc<RwLock<LearnedScorer>> {
        Arc::clone(&self.learned)
    }

    /// Resolve a score for the reading. Never fails: the rule bands are the
    /// unconditional last tier.
    ///
    /// 1. A `cleanliness_score` already in the payload is used verbatim —
    ///    no recomputation, no plausibility check, no clamp.
    /// 2. Otherwise the learned model predicts.
    /// 3. Otherwise (no model, or inference failed) the rule bands score
    ///    from pH/TDS/salinity; temperature is dropped at this tier.
    pub fn resolve(&self, input: &ReadingInput) -> ScoredReading {
        if let Some(provided) = input.cleanliness_score {
            counter!("score_provided_total").increment(1);
            return ScoredReading::from_normalized(&input.normalized(), provided, None);
        }

        let learned = self.learned.read().expect("learned scorer lock poisoned");
        match learned.process_reading(input) {
            Ok(scored) => {
                counter!("score_model_total").increment(1);
                scored
            }
            Err(err) => {
                warn!(%err, "learned scorer unavailable; falling back to rule bands");
                counter!("score_rule_fallback_total").increment(1);
                let reading = input.normalized();
                let score = rules::score(reading.ph, reading.tds, reading.salinity_ppt) as f64;
                ScoredReading::from_normalized(&reading, score, Some(PredictionMethod::Rule))
            }
        }
    }

    /// Direct prediction (used by the manual predict endpoint): same tiers
    /// minus the provided-score shortcut.
    pub fn predict(&self, input: &ReadingInput) -> ScoredReading {
        let stripped = ReadingInput {
            cleanliness_score: None,
            ..input.clone()
        };
        self.resolve(&stripped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn selector(trained: bool) -> ScoreSelector {
        let mut scorer = LearnedScorer::new();
        if trained {
            scorer.train(300);
        }
        ScoreSelector::new(Arc::new(RwLock::new(scorer)))
    }

    fn input(v: serde_json::Value) -> ReadingInput {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn provided_score_wins_verbatim() {
        let sel = selector(false);
        let scored = sel.resolve(&input(
            json!({"ph": 1.0, "tds": 9999.0, "salinity": 40.0, "cleanliness_score": 92.5}),
        ));
        assert_eq!(scored.cleanliness_score, 92.5);
        assert_eq!(scored.prediction_method, None);
    }

    #[test]
    fn provided_score_is_not_validated() {
        // Out-of-range caller values pass through untouched.
        let sel = selector(true);
        let scored = sel.resolve(&input(json!({"cleanliness_score": 250.0})));
        assert_eq!(scored.cleanliness_score, 250.0);
    }

    #[test]
    fn untrained_selector_matches_rule_bands_exactly() {
        let sel = selector(false);
        let scored = sel.resolve(&input(
            json!({"ph": 7.2, "tds": 245.0, "salinity": 0.02, "temperature": 23.5}),
        ));
        assert_eq!(scored.prediction_method, Some(PredictionMethod::Rule));
        assert_eq!(
            scored.cleanliness_score,
            rules::score(7.2, 245.0, 0.02) as f64
        );
    }

    #[test]
    fn trained_selector_uses_the_model() {
        let sel = selector(true);
        let scored = sel.resolve(&input(
            json!({"ph": 7.2, "tds": 245.0, "salinity": 0.02, "temperature": 23.5}),
        ));
        assert_eq!(scored.prediction_method, Some(PredictionMethod::Model));
        assert!((0.0..=100.0).contains(&scored.cleanliness_score));
    }

    #[test]
    fn resolve_is_idempotent_for_fixed_model_state() {
        let sel = selector(true);
        let payload = json!({"ph": 6.9, "tds": 130.0, "salinity": 0.1, "temperature": 21.0});
        let a = sel.resolve(&input(payload.clone()));
        let b = sel.resolve(&input(payload));
        assert_eq!(a.cleanliness_score, b.cleanliness_score);
        assert_eq!(a.prediction_method, b.prediction_method);
    }

    #[test]
    fn predict_ignores_a_provided_score() {
        let sel = selector(false);
        let scored = sel.predict(&input(
            json!({"ph": 7.0, "tds": 100.0, "salinity": 0.1, "cleanliness_score": 3.0}),
        ));
        assert_eq!(scored.prediction_method, Some(PredictionMethod::Rule));
        assert_eq!(scored.cleanliness_score, 100.0);
    }

    #[test]
    fn defaults_apply_before_the_rule_tier() {
        let sel = selector(false);
        let scored = sel.resolve(&input(json!({})));
        // rules::score(7.0, 200.0, 0.5) = 45 + 32 + 10
        assert_eq!(scored.cleanliness_score, 87.0);
        assert_eq!(scored.ph, 7.0);
        assert_eq!(scored.tds, 200.0);
        assert_eq!(scored.salinity_ppt, 0.5);
        assert_eq!(scored.temperature, 22.0);
    }
}
