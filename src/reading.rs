//! reading.rs — wire-facing reading types and the coercion boundary.
//!
//! Incoming payloads are duck-typed in practice: fields go missing, numbers
//! arrive as strings, timestamps are unix floats or ISO strings depending on
//! which collaborator sent them. All of that is absorbed here, once. Past
//! `ReadingInput::normalized()` everything is a plain `f64` with documented
//! defaults, and the scored output is JSON-safe by construction.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Canonical defaults substituted for missing or unparseable fields.
///
/// The upstream collaborators historically disagreed (the ingest endpoint
/// used tds=0/salinity=0/temp=25, the model layer 200/0.5/22); the model
/// layer's set is canonical here since scoring is what the defaults feed.
pub mod defaults {
    pub const PH: f64 = 7.0;
    pub const TDS: f64 = 200.0;
    pub const SALINITY_PPT: f64 = 0.5;
    pub const TEMPERATURE_C: f64 = 22.0;
    pub const CUP_ID: &str = "UNKNOWN";
}

/// Raw inbound reading; every field optional, numerics leniently coerced.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReadingInput {
    #[serde(default)]
    pub cup_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub ph: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub tds: Option<f64>,
    /// Accepts both the probe's `salinity` key and the scored `salinity_ppt`.
    #[serde(default, deserialize_with = "lenient_f64", alias = "salinity_ppt")]
    pub salinity: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub temperature: Option<f64>,
    /// Caller-supplied score (e.g. the probe's own camera analysis); used
    /// verbatim when present.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub cleanliness_score: Option<f64>,
    #[serde(default)]
    pub timestamp: Option<TimestampInput>,
}

impl ReadingInput {
    /// Apply the documented defaults and resolve the timestamp.
    pub fn normalized(&self) -> NormalizedReading {
        NormalizedReading {
            cup_id: self
                .cup_id
                .clone()
                .unwrap_or_else(|| defaults::CUP_ID.to_string()),
            ph: self.ph.unwrap_or(defaults::PH),
            tds: self.tds.unwrap_or(defaults::TDS),
            salinity_ppt: self.salinity.unwrap_or(defaults::SALINITY_PPT),
            temperature: self.temperature.unwrap_or(defaults::TEMPERATURE_C),
            timestamp: self
                .timestamp
                .as_ref()
                .and_then(TimestampInput::to_utc)
                .unwrap_or_else(Utc::now),
        }
    }
}

/// A reading after the coercion boundary: no options, no wrappers.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedReading {
    pub cup_id: String,
    pub ph: f64,
    pub tds: f64,
    pub salinity_ppt: f64,
    pub temperature: f64,
    pub timestamp: DateTime<Utc>,
}

/// Timestamps arrive as unix seconds (possibly fractional) or ISO strings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TimestampInput {
    Unix(f64),
    Text(String),
}

impl TimestampInput {
    /// Best-effort parse; `None` means "stamp at scoring time instead".
    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        match self {
            TimestampInput::Unix(secs) if secs.is_finite() => {
                let whole = secs.trunc() as i64;
                let nanos = (secs.fract().abs() * 1e9) as u32;
                DateTime::from_timestamp(whole, nanos)
            }
            TimestampInput::Unix(_) => None,
            TimestampInput::Text(s) => DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
                .or_else(|| {
                    // Bare `isoformat()` strings carry no offset.
                    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                        .map(|ndt| ndt.and_utc())
                        .ok()
                }),
        }
    }
}

/// How the final score was produced, for observability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PredictionMethod {
    Rule,
    Model,
}

/// The scored result handed back to persistence/broadcast collaborators.
///
/// Every field is a plain JSON-encodable value. `cleanliness_score` is in
/// [0, 100] whenever this subsystem computed it; a caller-supplied score is
/// passed through verbatim and `prediction_method` is omitted for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredReading {
    pub cup_id: String,
    pub ph: f64,
    pub tds: f64,
    pub salinity_ppt: f64,
    pub temperature: f64,
    pub cleanliness_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prediction_method: Option<PredictionMethod>,
    /// RFC 3339, UTC.
    pub timestamp: String,
}

impl ScoredReading {
    /// Assemble from a normalized reading plus the resolved score.
    pub fn from_normalized(
        reading: &NormalizedReading,
        cleanliness_score: f64,
        prediction_method: Option<PredictionMethod>,
    ) -> Self {
        Self {
            cup_id: reading.cup_id.clone(),
            ph: reading.ph,
            tds: reading.tds,
            salinity_ppt: reading.salinity_ppt,
            temperature: reading.temperature,
            cleanliness_score,
            prediction_method,
            timestamp: reading.timestamp.to_rfc3339(),
        }
    }

    pub fn band(&self) -> QualityBand {
        QualityBand::from_score(self.cleanliness_score)
    }
}

/// Display bands used by the dashboard gauge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityBand {
    Excellent,
    Good,
    Fair,
    Poor,
    Critical,
}

impl QualityBand {
    pub fn from_score(score: f64) -> Self {
        if score >= 85.0 {
            QualityBand::Excellent
        } else if score >= 70.0 {
            QualityBand::Good
        } else if score >= 50.0 {
            QualityBand::Fair
        } else if score >= 30.0 {
            QualityBand::Poor
        } else {
            QualityBand::Critical
        }
    }
}

/// Accept a JSON number, a numeric string, or anything else (treated as
/// absent so the documented default applies instead of failing the reading).
fn lenient_f64<'de, D>(de: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(de)?;
    Ok(v.and_then(coerce_f64))
}

fn coerce_f64(v: Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
