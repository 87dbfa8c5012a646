//! Water Quality Analyzer — Binary Entrypoint
//! Boots the Axum HTTP server, wiring scorer state, routes, and the probe poller.
//!
//! See `DESIGN.md` for the scoring policy and module layout.

use std::sync::{Arc, RwLock};

use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use water_quality_analyzer::api::{self, AppState};
use water_quality_analyzer::config::AppConfig;
use water_quality_analyzer::history::History;
use water_quality_analyzer::metrics::Metrics;
use water_quality_analyzer::monitor::{spawn_probe_poller, PollerCfg};
use water_quality_analyzer::score::{LearnedScorer, ScoreSelector};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("water_quality_analyzer=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = AppConfig::from_env();

    // Load the persisted model, else train and persist a fresh one so the
    // model tier is warm before the first reading arrives.
    let mut scorer = LearnedScorer::new();
    if !scorer.load(&cfg.model_path) {
        info!(
            samples = cfg.train_samples,
            "no usable model artifact; training a fresh one"
        );
        let report = scorer.train(cfg.train_samples);
        info!(mse = report.mse, r2 = report.r2, "startup training finished");
        if let Err(err) = scorer.save(&cfg.model_path) {
            warn!(%err, "could not persist the model artifact; continuing in-memory");
        }
    }

    let metrics = Metrics::init(scorer.is_trained());

    let selector = ScoreSelector::new(Arc::new(RwLock::new(scorer)));
    let history = Arc::new(History::with_capacity(cfg.history_cap));

    if let Some(url) = cfg.probe_url.clone() {
        spawn_probe_poller(
            PollerCfg {
                probe_url: url,
                interval_secs: cfg.poll_interval_secs,
            },
            selector.clone(),
            Arc::clone(&history),
        );
    }

    let state = AppState::new(selector, history, &cfg);
    let router = api::router(state).merge(metrics.router());

    info!(addr = %cfg.bind_addr, "water-quality-analyzer listening");
    let listener = tokio::net::TcpListener::bind(cfg.bind_addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
