use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::warn;

use crate::config::AppConfig;
use crate::history::History;
use crate::metrics::set_model_loaded;
use crate::reading::{defaults, QualityBand, ReadingInput, ScoredReading};
use crate::score::{LearnedScorer, ScoreSelector, TrainingReport};

#[derive(Clone)]
pub struct AppState {
    selector: ScoreSelector,
    history: Arc<History>,
    model_path: PathBuf,
    train_samples: usize,
}

impl AppState {
    pub fn new(selector: ScoreSelector, history: Arc<History>, cfg: &AppConfig) -> Self {
        Self {
            selector,
            history,
            model_path: cfg.model_path.clone(),
            train_samples: cfg.train_samples,
        }
    }

    pub fn selector(&self) -> &ScoreSelector {
        &self.selector
    }

    pub fn history(&self) -> &Arc<History> {
        &self.history
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/sensor-data", post(receive_sensor_data))
        .route("/api/predict", post(predict))
        .route("/api/readings", get(list_readings))
        .route("/api/readings/{cup_id}/latest", get(latest_for_cup))
        .route("/admin/retrain", post(retrain))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Serialize)]
struct IngestResp {
    status: &'static str,
    message: &'static str,
    data: ScoredReading,
    /// False when the caller supplied its own score.
    ml_generated: bool,
}

/// Ingest endpoint for probes and simulators. Never rejects a reading over
/// its content: missing and malformed fields take the documented defaults,
/// and the three-tier selector always produces a score.
async fn receive_sensor_data(
    State(state): State<AppState>,
    Json(input): Json<ReadingInput>,
) -> Json<IngestResp> {
    let ml_generated = input.cleanliness_score.is_none();
    let scored = state.selector.resolve(&input);
    state.history.record(scored.clone());
    Json(IngestResp {
        status: "success",
        message: "Sensor data received successfully",
        data: scored,
        ml_generated,
    })
}

#[derive(Serialize)]
struct PredictResp {
    status: &'static str,
    band: QualityBand,
    prediction: ScoredReading,
}

/// Manual prediction: always recomputes, even if the payload carries a score.
async fn predict(State(state): State<AppState>, Json(input): Json<ReadingInput>) -> Json<PredictResp> {
    let scored = state.selector.predict(&input);
    Json(PredictResp {
        status: "success",
        band: scored.band(),
        prediction: scored,
    })
}

#[derive(Deserialize)]
struct ListParams {
    n: Option<usize>,
}

async fn list_readings(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Json<Vec<ScoredReading>> {
    let n = params.n.unwrap_or(50).min(500);
    Json(state.history.snapshot_last_n(n))
}

/// Latest reading for a cup; dashboards get a neutral default payload when
/// the cup has not reported yet.
async fn latest_for_cup(
    State(state): State<AppState>,
    Path(cup_id): Path<String>,
) -> Json<ScoredReading> {
    let reading = state.history.latest_for_cup(&cup_id).unwrap_or_else(|| ScoredReading {
        cup_id,
        ph: defaults::PH,
        tds: defaults::TDS,
        salinity_ppt: defaults::SALINITY_PPT,
        temperature: defaults::TEMPERATURE_C,
        cleanliness_score: 85.0,
        prediction_method: None,
        timestamp: chrono::Utc::now().to_rfc3339(),
    });
    Json(reading)
}

#[derive(Deserialize)]
struct RetrainParams {
    samples: Option<usize>,
}

#[derive(Serialize)]
struct RetrainResp {
    status: &'static str,
    saved: bool,
    report: TrainingReport,
}

/// Explicit retrain: fit a fresh scorer off the hot path, persist it, then
/// swap it in under the write lock. Readers keep scoring against the old
/// model until the swap.
async fn retrain(
    State(state): State<AppState>,
    Query(params): Query<RetrainParams>,
) -> Json<RetrainResp> {
    let samples = params.samples.unwrap_or(state.train_samples).max(10);
    let handle = state.selector.learned();
    let model_path = state.model_path.clone();

    let (report, saved) = tokio::task::spawn_blocking(move || {
        let mut fresh = LearnedScorer::new();
        let report = fresh.train(samples);
        let saved = match fresh.save(&model_path) {
            Ok(()) => true,
            Err(err) => {
                warn!(%err, "failed to persist retrained model; swapping it in anyway");
                false
            }
        };
        let mut guard = handle.write().expect("learned scorer lock poisoned");
        *guard = fresh;
        (report, saved)
    })
    .await
    .expect("retrain task panicked");

    set_model_loaded(true);
    Json(RetrainResp {
        status: "success",
        saved,
        report,
    })
}
