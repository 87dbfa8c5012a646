// src/monitor.rs
//! Background probe poller: periodically fetch the latest raw reading from
//! a remote probe, resolve a score and record it, so viewers see fresh data
//! even when the probe itself never posts to the ingest endpoint.

use std::sync::Arc;
use std::time::Duration;

use metrics::{counter, gauge};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::history::History;
use crate::reading::{ReadingInput, ScoredReading};
use crate::score::ScoreSelector;

#[derive(Clone, Debug)]
pub struct PollerCfg {
    pub probe_url: String,
    pub interval_secs: u64,
}

/// Spawn the polling loop. Runs until the process exits; individual poll
/// failures are logged and counted, never fatal.
pub fn spawn_probe_poller(
    cfg: PollerCfg,
    selector: ScoreSelector,
    history: Arc<History>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .expect("build probe http client");
        let mut ticker = tokio::time::interval(Duration::from_secs(cfg.interval_secs));
        info!(
            url = %cfg.probe_url,
            interval_secs = cfg.interval_secs,
            "probe polling started"
        );

        loop {
            ticker.tick().await;
            match poll_once(&client, &cfg.probe_url, &selector, &history).await {
                Ok(scored) => {
                    counter!("probe_poll_total").increment(1);
                    gauge!("probe_last_poll_ts").set(chrono::Utc::now().timestamp() as f64);
                    info!(
                        cup_id = %scored.cup_id,
                        score = scored.cleanliness_score,
                        band = ?scored.band(),
                        "probe reading scored"
                    );
                }
                Err(err) => {
                    counter!("probe_poll_errors_total").increment(1);
                    warn!(%err, "probe poll failed");
                }
            }
        }
    })
}

async fn poll_once(
    client: &reqwest::Client,
    url: &str,
    selector: &ScoreSelector,
    history: &History,
) -> anyhow::Result<ScoredReading> {
    let input: ReadingInput = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    let scored = selector.resolve(&input);
    history.record(scored.clone());
    Ok(scored)
}
