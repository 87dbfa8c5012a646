//! Synthetic training data for the learned scorer.
//!
//! Samples are drawn to mimic real probe telemetry (pH around neutral, TDS
//! and salinity long-tailed, temperature around room temp), labeled with the
//! four-input reference table plus Gaussian noise. The set is regenerated on
//! every training run and never persisted; only the fitted model is.

use rand::{rngs::StdRng, SeedableRng};
use rand_distr::{Distribution, Exp, Normal};
use serde::Serialize;

use super::reference;

/// Default sample count for a training run.
pub const DEFAULT_SAMPLES: usize = 1000;

/// Fixed seed so training runs are reproducible end to end.
pub const SEED: u64 = 42;

/// One labeled synthetic record. Feature order matches the model artifact.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TrainingSample {
    pub ph: f64,
    pub tds: f64,
    pub salinity_ppt: f64,
    pub temperature: f64,
    pub cleanliness_score: f64,
}

impl TrainingSample {
    /// Feature vector in the canonical `[ph, tds, salinity_ppt, temperature]` order.
    pub fn features(&self) -> Vec<f64> {
        vec![self.ph, self.tds, self.salinity_ppt, self.temperature]
    }
}

/// Generate `n` labeled samples from the given seed.
pub fn generate(n: usize, seed: u64) -> Vec<TrainingSample> {
    let mut rng = StdRng::seed_from_u64(seed);

    let ph_dist = Normal::<f64>::new(7.2, 1.0).expect("valid pH distribution");
    let temp_dist = Normal::<f64>::new(22.0, 8.0).expect("valid temperature distribution");
    let noise_dist = Normal::<f64>::new(0.0, 2.0).expect("valid noise distribution");
    // Exp is parameterized by rate; mean 200 resp. 0.5.
    let tds_dist = Exp::<f64>::new(1.0 / 200.0).expect("valid TDS distribution");
    let salinity_dist = Exp::<f64>::new(1.0 / 0.5).expect("valid salinity distribution");

    let mut samples = Vec::with_capacity(n);
    for _ in 0..n {
        let ph: f64 = ph_dist.sample(&mut rng).clamp(3.0, 11.0);
        let tds: f64 = (tds_dist.sample(&mut rng) + 50.0).clamp(10.0, 1000.0);
        let salinity_ppt: f64 = salinity_dist.sample(&mut rng).clamp(0.0, 40.0);
        let temperature: f64 = temp_dist.sample(&mut rng).clamp(0.0, 50.0);

        let label = reference::label_score(ph, tds, salinity_ppt, temperature) as f64;
        let noisy = (label + noise_dist.sample(&mut rng)).clamp(0.0, 100.0);

        samples.push(TrainingSample {
            ph,
            tds,
            salinity_ppt,
            temperature,
            cleanliness_score: noisy,
        });
    }
    samples
}
