// src/config.rs
//! Service configuration, resolved once at startup from the environment
//! (`.env` is loaded by the binary before this runs). Malformed values log
//! a warning and keep the default rather than aborting boot.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use tracing::warn;

use crate::score::DEFAULT_MODEL_PATH;

pub const ENV_BIND_ADDR: &str = "WQ_BIND_ADDR";
pub const ENV_MODEL_PATH: &str = "WQ_MODEL_PATH";
pub const ENV_TRAIN_SAMPLES: &str = "WQ_TRAIN_SAMPLES";
pub const ENV_PROBE_URL: &str = "WQ_PROBE_URL";
pub const ENV_POLL_INTERVAL_SECS: &str = "WQ_POLL_INTERVAL_SECS";
pub const ENV_HISTORY_CAP: &str = "WQ_HISTORY_CAP";

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP listen address.
    pub bind_addr: SocketAddr,
    /// Model artifact path.
    pub model_path: PathBuf,
    /// Synthetic sample count for startup/retrain runs.
    pub train_samples: usize,
    /// Probe endpoint to poll; polling is disabled when unset.
    pub probe_url: Option<String>,
    pub poll_interval_secs: u64,
    pub history_cap: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:5004".parse().expect("valid default bind addr"),
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            train_samples: 1000,
            probe_url: None,
            poll_interval_secs: 10,
            history_cap: 2000,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Some(addr) = parse_var::<SocketAddr>(ENV_BIND_ADDR) {
            cfg.bind_addr = addr;
        }
        if let Ok(path) = env::var(ENV_MODEL_PATH) {
            if !path.trim().is_empty() {
                cfg.model_path = PathBuf::from(path);
            }
        }
        if let Some(n) = parse_var::<usize>(ENV_TRAIN_SAMPLES) {
            cfg.train_samples = n.max(10);
        }
        if let Ok(url) = env::var(ENV_PROBE_URL) {
            if !url.trim().is_empty() {
                cfg.probe_url = Some(url);
            }
        }
        if let Some(secs) = parse_var::<u64>(ENV_POLL_INTERVAL_SECS) {
            cfg.poll_interval_secs = secs.max(1);
        }
        if let Some(cap) = parse_var::<usize>(ENV_HISTORY_CAP) {
            cfg.history_cap = cap.max(1);
        }

        cfg
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(var = name, value = %raw, "unparseable env var; keeping default");
            None
        }
    }
}
