//! Window statistics over the coil collection.
//!
//! Both repositories hand their coils to [`compute_stats`], so the in-memory
//! and Postgres backends cannot drift apart on edge cases.
//!
//! # Algorithm
//!
//! For an inclusive window `[start, end]`:
//!
//! 1. **Counts.** `added_count` counts coils whose `date_added` lies in the
//!    window, `removed_count` those whose `date_removed` does. A coil may
//!    contribute to both.
//! 2. **Relevant set.** A coil is relevant when it was added in the window,
//!    removed in the window, or present at some point of it (added on or
//!    before `end` and not removed before `start`). Length/weight aggregates
//!    and storage-time extrema are computed over this set.
//! 3. **Daily series.** Starting at `start` truncated to midnight and stepping
//!    one day while `day <= end`, count the coils present at instant `day`
//!    across the *whole* collection and sum their weight. The first day
//!    reaching each extremum wins.
//!
//! When nothing was added in the window the result is the empty shape, with
//! `removed_count` also reported as 0 even if removals happened.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{start_of_day, Coil, TimeWindow};

/// Aggregated statistics for a time window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoilStats {
    pub added_count: u64,
    pub removed_count: u64,
    pub avg_length: Option<f64>,
    pub avg_weight: Option<f64>,
    pub max_length: Option<f64>,
    pub min_length: Option<f64>,
    pub max_weight: Option<f64>,
    pub min_weight: Option<f64>,
    pub total_weight: Option<f64>,
    /// Longest time between arrival and removal, in seconds.
    pub max_time_diff: Option<f64>,
    /// Shortest time between arrival and removal, in seconds.
    pub min_time_diff: Option<f64>,
    pub day_max_count: Option<DateTime<Utc>>,
    pub day_min_count: Option<DateTime<Utc>>,
    pub day_max_weight: Option<DateTime<Utc>>,
    pub day_min_weight: Option<DateTime<Utc>>,
}

impl CoilStats {
    /// Result for a window in which no coil was added.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::empty()
    }
}

/// Warehouse occupancy at the start of one day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyOccupancy {
    pub day: DateTime<Utc>,
    pub count: usize,
    pub weight: f64,
}

/// Compute [`CoilStats`] for `window` over the full coil collection.
///
/// `coils` must not be pre-filtered by the window: the daily series looks at
/// every coil. Input order only affects floating point summation order, so
/// both repositories pass coils sorted by id.
pub fn compute_stats(coils: &[Coil], window: &TimeWindow) -> CoilStats {
    let added_count = coils
        .iter()
        .filter(|c| window.contains(&c.date_added))
        .count() as u64;

    if added_count == 0 {
        return CoilStats::empty();
    }

    let removed_count = coils
        .iter()
        .filter(|c| c.date_removed.is_some_and(|removed| window.contains(&removed)))
        .count() as u64;

    let relevant: Vec<&Coil> = coils.iter().filter(|c| overlaps_window(c, window)).collect();
    let lengths: Vec<f64> = relevant.iter().map(|c| c.length).collect();
    let weights: Vec<f64> = relevant.iter().map(|c| c.weight).collect();
    let storage_times: Vec<f64> = relevant.iter().filter_map(|c| c.storage_seconds()).collect();

    let series = daily_occupancy(coils, window);
    let (day_max_count, day_min_count) = extreme_days(&series, |d| d.count);
    let (day_max_weight, day_min_weight) = extreme_days(&series, |d| d.weight);

    CoilStats {
        added_count,
        removed_count,
        avg_length: mean(&lengths),
        avg_weight: mean(&weights),
        max_length: maximum(&lengths),
        min_length: minimum(&lengths),
        max_weight: maximum(&weights),
        min_weight: minimum(&weights),
        total_weight: (!weights.is_empty()).then(|| weights.iter().sum()),
        max_time_diff: maximum(&storage_times),
        min_time_diff: minimum(&storage_times),
        day_max_count,
        day_min_count,
        day_max_weight,
        day_min_weight,
    }
}

/// True if the coil was added in, removed in, or present during `window`.
pub fn overlaps_window(coil: &Coil, window: &TimeWindow) -> bool {
    let added_in = window.contains(&coil.date_added);
    let removed_in = coil
        .date_removed
        .is_some_and(|removed| window.contains(&removed));
    let present = coil.date_added <= window.max
        && coil.date_removed.is_none_or(|removed| removed >= window.min);

    added_in || removed_in || present
}

/// Occupancy sampled at each midnight from `start_of_day(window.min)` up to
/// `window.max` (inclusive, compared against the untruncated end).
pub fn daily_occupancy(coils: &[Coil], window: &TimeWindow) -> Vec<DailyOccupancy> {
    let mut series = Vec::new();
    let mut day = start_of_day(window.min);

    while day <= window.max {
        let (count, weight) = coils
            .iter()
            .filter(|c| c.is_active_at(day))
            .fold((0usize, 0.0f64), |(n, w), c| (n + 1, w + c.weight));
        series.push(DailyOccupancy { day, count, weight });

        day = match day.checked_add_signed(TimeDelta::days(1)) {
            Some(next) => next,
            None => break,
        };
    }

    series
}

/// Days holding the maximum and minimum of `key`.
///
/// Scans in ascending order and only replaces the current best on a strict
/// improvement, so ties resolve to the earliest day.
fn extreme_days<K, F>(series: &[DailyOccupancy], key: F) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>)
where
    K: PartialOrd + Copy,
    F: Fn(&DailyOccupancy) -> K,
{
    let Some(first) = series.first() else {
        return (None, None);
    };

    let (mut max_day, mut max_key) = (first.day, key(first));
    let (mut min_day, mut min_key) = (first.day, key(first));

    for point in &series[1..] {
        let k = key(point);
        if k > max_key {
            max_key = k;
            max_day = point.day;
        }
        if k < min_key {
            min_key = k;
            min_day = point.day;
        }
    }

    (Some(max_day), Some(min_day))
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn maximum(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

fn minimum(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}
