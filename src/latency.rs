//! # Latency Module
//!
//! Links each assistant reply to the user entry it answers (`parentUuid`) and
//! measures the time between them.
//!
//! The admissible range is closed: `[0.1, 300]` seconds. Anything shorter is
//! treated as a replayed or synthetic pair and anything longer as an idle
//! session, and both are dropped.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::LogEntry;

pub const MIN_RESPONSE_SECS: f64 = 0.1;
pub const MAX_RESPONSE_SECS: f64 = 300.0;

pub fn is_admissible(secs: f64) -> bool {
    (MIN_RESPONSE_SECS..=MAX_RESPONSE_SECS).contains(&secs)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatencySample {
    pub seconds: f64,
    /// When the assistant reply was written.
    pub replied_at: DateTime<Utc>,
}

/// Identity index over one file's entries. Later duplicates win.
pub struct ResponseLinker<'a> {
    by_id: HashMap<&'a str, &'a LogEntry>,
}

impl<'a> ResponseLinker<'a> {
    pub fn new(entries: &'a [LogEntry]) -> Self {
        let by_id = entries
            .iter()
            .filter_map(|e| e.id.as_deref().map(|id| (id, e)))
            .collect();
        Self { by_id }
    }

    /// Sample for one entry, if it is an assistant reply to a known user entry
    /// within the admissible range.
    pub fn sample_for(&self, entry: &LogEntry) -> Option<LatencySample> {
        if !entry.is_assistant() {
            return None;
        }
        let parent = self.by_id.get(entry.parent_id.as_deref()?)?;
        if !parent.is_user() {
            return None;
        }
        let replied_at = entry.timestamp.as_ref()?.to_instant()?;
        let asked_at = parent.timestamp.as_ref()?.to_instant()?;
        let seconds = (replied_at - asked_at).num_microseconds()? as f64 / 1e6;
        is_admissible(seconds).then_some(LatencySample {
            seconds,
            replied_at,
        })
    }

    /// Samples for the whole file, in file order.
    pub fn link(&self, entries: &[LogEntry]) -> Vec<LatencySample> {
        entries.iter().filter_map(|e| self.sample_for(e)).collect()
    }
}

/// Two-pass convenience: index, then link.
pub fn link_responses(entries: &[LogEntry]) -> Vec<LatencySample> {
    ResponseLinker::new(entries).link(entries)
}

/// `[low, high)` seconds per distribution bucket; the last bucket also takes `high`.
pub const DISTRIBUTION_BOUNDS: [(u32, u32); 8] = [
    (0, 1),
    (1, 2),
    (2, 5),
    (5, 10),
    (10, 20),
    (20, 30),
    (30, 60),
    (60, 300),
];

pub const PERCENTILES: [u32; 6] = [25, 50, 75, 90, 95, 99];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DistributionBucket {
    pub low: u32,
    pub high: u32,
    pub count: usize,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatencySummary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    /// `(percentile, seconds)`
    pub percentiles: Vec<(u32, f64)>,
    pub distribution: Vec<DistributionBucket>,
}

impl LatencySummary {
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let mut sorted = samples.to_vec();
        sorted.sort_by(f64::total_cmp);
        let n = sorted.len();
        let mean = sorted.iter().sum::<f64>() / n as f64;
        let median = if n % 2 == 1 {
            sorted[n / 2]
        } else {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        };
        let percentiles = PERCENTILES
            .iter()
            .map(|&p| (p, nearest_rank(&sorted, p)))
            .collect();
        let last = DISTRIBUTION_BOUNDS.len() - 1;
        let distribution = DISTRIBUTION_BOUNDS
            .iter()
            .enumerate()
            .map(|(i, &(low, high))| {
                let count = sorted
                    .iter()
                    .filter(|&&t| {
                        t >= low as f64 && (t < high as f64 || (i == last && t <= high as f64))
                    })
                    .count();
                DistributionBucket {
                    low,
                    high,
                    count,
                    percent: count as f64 / n as f64 * 100.0,
                }
            })
            .collect();
        Some(Self {
            count: n,
            min: sorted[0],
            max: sorted[n - 1],
            mean,
            median,
            percentiles,
            distribution,
        })
    }

    pub fn percentile(&self, p: u32) -> Option<f64> {
        self.percentiles
            .iter()
            .find(|(q, _)| *q == p)
            .map(|(_, v)| *v)
    }
}

/// `sorted[floor(n * p / 100)]`, clamped to the last element. `sorted` must be non-empty.
pub fn nearest_rank(sorted: &[f64], p: u32) -> f64 {
    let idx = (sorted.len() * p as usize) / 100;
    sorted[idx.min(sorted.len() - 1)]
}

/// One-second histogram of samples, capped at `max_bucket` (the last bucket
/// absorbs everything slower).
pub fn second_buckets(samples: &[f64], max_bucket: usize) -> Vec<u64> {
    let mut buckets = vec![0u64; max_bucket];
    if max_bucket == 0 {
        return buckets;
    }
    for &t in samples {
        let idx = (t.max(0.0) as usize).min(max_bucket - 1);
        buckets[idx] += 1;
    }
    buckets
}
