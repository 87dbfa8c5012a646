//! Four-input reference scorer used to label synthetic training data.
//!
//! Distinct from the fallback bands in [`super::rules`]: this table also
//! weighs temperature and distributes points as 30 + 25 + 25 + 20. The two
//! tables are intentionally kept separate — one is what the service answers
//! with when no model exists, the other defines what the model learns.
//! Salinity here is in ppt.

/// Label a synthetic sample. Returns an integer in [0, 100].
pub fn label_score(ph: f64, tds: f64, salinity_ppt: f64, temperature: f64) -> u32 {
    let total = ph_points(ph)
        + tds_points(tds)
        + salinity_points(salinity_ppt)
        + temperature_points(temperature);
    total.min(100)
}

fn ph_points(ph: f64) -> u32 {
    if (6.5..=8.5).contains(&ph) {
        30
    } else if (6.0..=9.0).contains(&ph) {
        20
    } else if (5.5..=9.5).contains(&ph) {
        10
    } else {
        0
    }
}

fn tds_points(tds: f64) -> u32 {
    if (50.0..=150.0).contains(&tds) {
        25
    } else if tds > 150.0 && tds <= 300.0 {
        20
    } else if tds < 50.0 {
        15
    } else if tds <= 500.0 {
        10
    } else {
        0
    }
}

fn salinity_points(salinity_ppt: f64) -> u32 {
    if salinity_ppt < 0.5 {
        25
    } else if salinity_ppt < 1.0 {
        20
    } else if salinity_ppt < 2.0 {
        10
    } else if salinity_ppt < 10.0 {
        5
    } else {
        0
    }
}

fn temperature_points(temperature: f64) -> u32 {
    if (15.0..=25.0).contains(&temperature) {
        20
    } else if (10.0..=30.0).contains(&temperature) {
        15
    } else if (5.0..=35.0).contains(&temperature) {
        10
    } else if (0.0..=40.0).contains(&temperature) {
        5
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ideal_sample_labels_100() {
        assert_eq!(label_score(7.0, 100.0, 0.1, 20.0), 100);
    }

    #[test]
    fn worst_sample_labels_0() {
        assert_eq!(label_score(12.0, 800.0, 40.0, 45.0), 0);
    }

    #[test]
    fn each_dimension_degrades_independently() {
        // 20 + 25 + 25 + 20
        assert_eq!(label_score(8.7, 100.0, 0.1, 20.0), 90);
        // 30 + 20 + 25 + 20
        assert_eq!(label_score(7.0, 200.0, 0.1, 20.0), 95);
        // 30 + 25 + 10 + 20
        assert_eq!(label_score(7.0, 100.0, 1.5, 20.0), 85);
        // 30 + 25 + 25 + 15
        assert_eq!(label_score(7.0, 100.0, 0.1, 28.0), 95);
    }

    #[test]
    fn labels_stay_in_range() {
        for ph in [3.0, 6.2, 7.2, 9.3, 11.0] {
            for tds in [10.0, 120.0, 420.0, 1000.0] {
                for sal in [0.0, 0.7, 5.0, 40.0] {
                    for temp in [0.0, 12.0, 22.0, 38.0, 50.0] {
                        assert!(label_score(ph, tds, sal, temp) <= 100);
                    }
                }
            }
        }
    }
}
