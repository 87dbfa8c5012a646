use axum::{routing::get, Router};
use metrics::gauge;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Initialize the Prometheus recorder and seed the model-availability gauge.
    pub fn init(model_loaded: bool) -> Self {
        // Use default buckets to avoid API differences across crate versions.
        let builder = PrometheusBuilder::new();

        let handle = builder
            .install_recorder()
            .expect("prometheus: install recorder");

        set_model_loaded(model_loaded);

        Self { handle }
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

/// 1.0 when a fitted model is serving predictions, 0.0 when the rule
/// fallback is answering. Flipped on load, train and retrain.
pub fn set_model_loaded(loaded: bool) {
    gauge!("model_loaded").set(if loaded { 1.0 } else { 0.0 });
}
