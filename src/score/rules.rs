//! Deterministic fallback scorer over hand-tuned threshold bands.
//!
//! Three independent dimensions, additive points (45 + 40 + 15 = 100):
//! - pH      : 45 pts max, ideal [6.8, 8.2]
//! - TDS     : 40 pts max (mg/L), ideal [50, 150]
//! - salinity: 15 pts max (small fractional ratio), ideal < 0.3
//!
//! Pure function, no state, no error path. Any numeric input routes through
//! a band; the final `else` catches both tails (and non-finite values, which
//! fail every range test and land on 0 points for that dimension).
//!
//! Band boundaries are closed on the lower end: pH exactly 6.8 scores 45,
//! exactly 8.5 scores 35. The branch order below encodes that; each later
//! range only sees values the earlier ranges rejected.

/// Maximum points contributed by the pH bands.
pub const PH_MAX_POINTS: u32 = 45;
/// Maximum points contributed by the TDS bands.
pub const TDS_MAX_POINTS: u32 = 40;
/// Maximum points contributed by the salinity bands.
pub const SALINITY_MAX_POINTS: u32 = 15;

/// Score a reading from pH, TDS (mg/L) and salinity alone.
///
/// Temperature is deliberately absent: this is the last-resort tier and
/// mirrors the probe firmware's own three-sensor heuristic.
pub fn score(ph: f64, tds: f64, salinity: f64) -> u32 {
    let total = ph_points(ph) + tds_points(tds) + salinity_points(salinity);
    // The bands already sum to at most 100; clamp anyway.
    total.min(100)
}

fn ph_points(ph: f64) -> u32 {
    if (6.8..=8.2).contains(&ph) {
        PH_MAX_POINTS
    } else if (6.5..=8.5).contains(&ph) {
        // [6.5, 6.8) and (8.2, 8.5] after the first branch
        35
    } else if (6.0..=9.0).contains(&ph) {
        20
    } else if (5.5..=9.5).contains(&ph) {
        8
    } else {
        0
    }
}

fn tds_points(tds: f64) -> u32 {
    if (50.0..=150.0).contains(&tds) {
        TDS_MAX_POINTS
    } else if tds > 150.0 && tds <= 250.0 {
        32
    } else if tds < 50.0 {
        // Ultra-pure; slight penalty for lacking minerals
        25
    } else if tds <= 400.0 {
        15
    } else if tds <= 600.0 {
        6
    } else {
        0
    }
}

fn salinity_points(salinity: f64) -> u32 {
    if salinity < 0.3 {
        SALINITY_MAX_POINTS
    } else if salinity < 0.8 {
        10
    } else if salinity < 1.5 {
        6
    } else if salinity < 3.0 {
        3
    } else {
        0
    }
}
