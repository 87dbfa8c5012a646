//! The learned scorer: train / evaluate / persist / load / predict.
//!
//! Wraps the boosted-tree regressor with the numeric contract the rest of
//! the system relies on: predictions are finite, clamped to [0, 100] and
//! rounded to one decimal at a single boundary point, so nothing downstream
//! ever sees a raw ensemble output.

use std::fs;
use std::path::Path;

use anyhow::Context;
use rand::seq::SliceRandom;
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::dataset;
use super::gbdt::{GbdtParams, GbdtRegressor};
use super::ScoreError;
use crate::reading::{PredictionMethod, ReadingInput, ScoredReading};

/// Canonical feature order of the model artifact.
pub const FEATURES: [&str; 4] = ["ph", "tds", "salinity_ppt", "temperature"];

/// Default artifact location, relative to the working directory.
pub const DEFAULT_MODEL_PATH: &str = "water_quality_model.json";

/// Held-out diagnostics from a training run. Informational only — training
/// always completes; a weak fit is something to alert on, not to crash on.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TrainingReport {
    pub n_samples: usize,
    pub n_train: usize,
    pub n_test: usize,
    pub mse: f64,
    pub r2: f64,
}

/// On-disk shape of the persisted model. Replaced wholesale on retrain.
#[derive(Debug, Serialize, Deserialize)]
struct ModelArtifact {
    features: Vec<String>,
    model: GbdtRegressor,
}

#[derive(Debug, Default)]
pub struct LearnedScorer {
    model: Option<GbdtRegressor>,
}

impl LearnedScorer {
    pub fn new() -> Self {
        Self { model: None }
    }

    pub fn is_trained(&self) -> bool {
        self.model.is_some()
    }

    /// Train on freshly generated synthetic data with the fixed seed.
    pub fn train(&mut self, n_samples: usize) -> TrainingReport {
        self.train_with_seed(n_samples, dataset::SEED)
    }

    /// Train with an explicit seed (the seed fixes both the generated data
    /// and the train/test split, so runs are reproducible end to end).
    pub fn train_with_seed(&mut self, n_samples: usize, seed: u64) -> TrainingReport {
        let samples = dataset::generate(n_samples.max(10), seed);

        // 80/20 shuffled split.
        let mut order: Vec<usize> = (0..samples.len()).collect();
        order.shuffle(&mut StdRng::seed_from_u64(seed));
        let n_test = (samples.len() / 5).max(1);
        let (test_idx, train_idx) = order.split_at(n_test);

        let xs: Vec<Vec<f64>> = train_idx.iter().map(|&i| samples[i].features()).collect();
        let ys: Vec<f64> = train_idx
            .iter()
            .map(|&i| samples[i].cleanliness_score)
            .collect();

        let model = GbdtRegressor::fit(GbdtParams::default(), &xs, &ys);

        let test_mean = test_idx
            .iter()
            .map(|&i| samples[i].cleanliness_score)
            .sum::<f64>()
            / test_idx.len() as f64;
        let mut ss_res = 0.0;
        let mut ss_tot = 0.0;
        for &i in test_idx {
            let actual = samples[i].cleanliness_score;
            let predicted = model.predict(&samples[i].features());
            ss_res += (actual - predicted) * (actual - predicted);
            ss_tot += (actual - test_mean) * (actual - test_mean);
        }
        let mse = ss_res / test_idx.len() as f64;
        let r2 = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 0.0 };

        let report = TrainingReport {
            n_samples: samples.len(),
            n_train: train_idx.len(),
            n_test: test_idx.len(),
            mse,
            r2,
        };
        info!(
            n_train = report.n_train,
            n_test = report.n_test,
            mse = report.mse,
            r2 = report.r2,
            "cleanliness model trained"
        );

        self.model = Some(model);
        report
    }

    /// Predict a cleanliness score for the fixed feature order
    /// `[ph, tds, salinity_ppt, temperature]`.
    ///
    /// The returned value is the sanitized scalar: finite, in [0, 100],
    /// one decimal. This is the only place ensemble output crosses into
    /// the rest of the system.
    pub fn predict(
        &self,
        ph: f64,
        tds: f64,
        salinity_ppt: f64,
        temperature: f64,
    ) -> Result<f64, ScoreError> {
        let model = self.model.as_ref().ok_or(ScoreError::ModelUnavailable)?;
        let raw = model.predict(&[ph, tds, salinity_ppt, temperature]);
        if !raw.is_finite() {
            return Err(ScoreError::Prediction(format!(
                "non-finite ensemble output {raw}"
            )));
        }
        Ok(sanitize_score(raw))
    }

    /// Score a raw reading end to end: normalize, predict, assemble.
    pub fn process_reading(&self, input: &ReadingInput) -> Result<ScoredReading, ScoreError> {
        let reading = input.normalized();
        let score = self.predict(
            reading.ph,
            reading.tds,
            reading.salinity_ppt,
            reading.temperature,
        )?;
        debug!(cup_id = %reading.cup_id, score, "model scored reading");
        Ok(ScoredReading::from_normalized(
            &reading,
            score,
            Some(PredictionMethod::Model),
        ))
    }

    /// Serialize the fitted model to `path`. Explicit user action — may fail.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let path = path.as_ref();
        let model = self.model.as_ref().context("no trained model to save")?;
        let artifact = ModelArtifact {
            features: FEATURES.iter().map(|f| f.to_string()).collect(),
            model: model.clone(),
        };
        let bytes = serde_json::to_vec(&artifact).context("serialize model artifact")?;
        fs::write(path, bytes)
            .with_context(|| format!("write model artifact to {}", path.display()))?;
        info!(path = %path.display(), "model artifact saved");
        Ok(())
    }

    /// Try to load a persisted artifact. Absence or corruption is not fatal:
    /// the scorer stays untrained and the caller falls back (or retrains).
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> bool {
        let path = path.as_ref();
        let bytes = match fs::read(path) {
            Ok(b) => b,
            Err(err) => {
                debug!(path = %path.display(), %err, "no model artifact to load");
                return false;
            }
        };
        let artifact: ModelArtifact = match serde_json::from_slice(&bytes) {
            Ok(a) => a,
            Err(err) => {
                warn!(path = %path.display(), %err, "model artifact is corrupt; ignoring it");
                return false;
            }
        };
        if !artifact.features.iter().map(String::as_str).eq(FEATURES) {
            warn!(
                path = %path.display(),
                features = ?artifact.features,
                "model artifact has an unexpected feature order; ignoring it"
            );
            return false;
        }
        self.model = Some(artifact.model);
        info!(path = %path.display(), "model artifact loaded");
        true
    }
}

/// Clamp into [0, 100] and round to one decimal.
pub fn sanitize_score(raw: f64) -> f64 {
    (raw.clamp(0.0, 100.0) * 10.0).round() / 10.0
}
