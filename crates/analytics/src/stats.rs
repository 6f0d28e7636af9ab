//! Small numeric helpers shared by the analyzers.

use std::collections::HashMap;
use std::hash::Hash;

/// Median of the values; the mean of the two middle values for even counts.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

pub fn population_variance(values: &[f64]) -> Option<f64> {
    let mean = mean(values)?;
    Some(values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / values.len() as f64)
}

/// Counts occurrences of each key.
pub fn histogram<K, I>(keys: I) -> HashMap<K, usize>
where
    K: Eq + Hash,
    I: IntoIterator<Item = K>,
{
    let mut counts = HashMap::new();
    for key in keys {
        *counts.entry(key).or_insert(0) += 1;
    }
    counts
}

/// Herfindahl-Hirschman index of a histogram: the sum of squared shares, in [0, 1].
pub fn herfindahl<K>(counts: &HashMap<K, usize>) -> f64 {
    let total: usize = counts.values().sum();
    if total == 0 {
        return 0.0;
    }
    counts
        .values()
        .map(|&c| {
            let share = c as f64 / total as f64;
            share * share
        })
        .sum()
}

/// Rounds to `places` decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Rounds to a whole, non-negative currency amount.
pub fn whole_units(value: f64) -> u64 {
    // `as` saturates: negatives and NaN become 0.
    value.round() as u64
}

/// Rounds and clamps to an integer score in `[min, max]`.
pub fn score(value: f64, min: f64, max: f64) -> u8 {
    if value.is_nan() {
        return min as u8;
    }
    value.round().clamp(min, max) as u8
}
