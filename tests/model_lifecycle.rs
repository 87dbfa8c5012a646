// tests/model_lifecycle.rs
//
// Train → persist → reload lifecycle of the learned scorer, plus the
// /admin/retrain route that swaps a freshly trained model in at runtime.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use axum::{
    body::{self, Body},
    http::Request,
    Router,
};
use serde_json::{json, Value as Json};
use tower::ServiceExt as _;

use water_quality_analyzer::api::{self, AppState};
use water_quality_analyzer::config::AppConfig;
use water_quality_analyzer::history::History;
use water_quality_analyzer::score::{LearnedScorer, ScoreSelector};

fn unique_tmp_path(name: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    dir.push(format!("{name}_{nanos}.json"));
    dir
}

#[test]
fn save_load_round_trip_reproduces_predictions() {
    let path = unique_tmp_path("wq_lifecycle_roundtrip");

    let mut original = LearnedScorer::new();
    original.train(300);
    original.save(&path).expect("save artifact");

    let mut restored = LearnedScorer::new();
    assert!(restored.load(&path), "fresh instance should load the artifact");

    for (ph, tds, sal, temp) in [
        (7.2, 245.0, 0.02, 23.5),
        (5.9, 450.0, 0.08, 28.1),
        (7.4, 180.0, 0.01, 20.0),
        (9.2, 600.0, 1.5, 35.0),
    ] {
        let a = original.predict(ph, tds, sal, temp).expect("original predict");
        let b = restored.predict(ph, tds, sal, temp).expect("restored predict");
        assert!((a - b).abs() < 1e-6, "{a} vs {b} for ({ph},{tds},{sal},{temp})");
    }

    let _ = std::fs::remove_file(&path);
}

#[test]
fn training_is_reproducible_across_instances() {
    let mut a = LearnedScorer::new();
    let mut b = LearnedScorer::new();
    let ra = a.train(200);
    let rb = b.train(200);

    assert_eq!(ra.n_train, rb.n_train);
    assert_eq!(ra.mse, rb.mse);
    assert_eq!(
        a.predict(7.2, 245.0, 0.02, 23.5).unwrap(),
        b.predict(7.2, 245.0, 0.02, 23.5).unwrap()
    );
}

fn router_with_model_path(path: PathBuf) -> Router {
    let cfg = AppConfig {
        model_path: path,
        ..AppConfig::default()
    };
    let selector = ScoreSelector::new(Arc::new(RwLock::new(LearnedScorer::new())));
    let history = Arc::new(History::with_capacity(cfg.history_cap));
    api::router(AppState::new(selector, history, &cfg))
}

async fn read_json(resp: axum::response::Response) -> Json {
    let bytes = body::to_bytes(resp.into_body(), 1024 * 1024)
        .await
        .expect("read body")
        .to_vec();
    serde_json::from_slice(&bytes).expect("parse json body")
}

#[tokio::test]
async fn retrain_route_swaps_the_model_in_and_persists_it() {
    let path = unique_tmp_path("wq_lifecycle_retrain");
    let app = router_with_model_path(path.clone());

    // Starts untrained: ingest answers from the rule bands.
    let payload = json!({"ph": 7.2, "tds": 245.0, "salinity": 0.02, "temperature": 23.5});
    let before = read_json(
        app.clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/sensor-data")
                    .header("content-type", "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .expect("oneshot ingest"),
    )
    .await;
    assert_eq!(before["data"]["prediction_method"], json!("RULE"));

    // Retrain with a small sample count to keep the test quick.
    let retrain = read_json(
        app.clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/admin/retrain?samples=200")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .expect("oneshot retrain"),
    )
    .await;
    assert_eq!(retrain["status"], json!("success"));
    assert_eq!(retrain["saved"], json!(true));
    assert_eq!(retrain["report"]["n_samples"].as_u64(), Some(200));
    assert!(retrain["report"]["r2"].as_f64().unwrap() > 0.5);

    // The swapped-in model now serves the model tier.
    let after = read_json(
        app.clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/sensor-data")
                    .header("content-type", "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .expect("oneshot ingest after retrain"),
    )
    .await;
    assert_eq!(after["data"]["prediction_method"], json!("MODEL"));

    // And the artifact on disk is loadable by a fresh instance.
    let mut fresh = LearnedScorer::new();
    assert!(fresh.load(&path));
    assert!(fresh.is_trained());

    let _ = std::fs::remove_file(&path);
}
