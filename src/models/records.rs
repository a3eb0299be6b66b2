use std::collections::BTreeSet;
use std::ops::AddAssign;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::models::message::Usage;

#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TokenCounts {
    pub input: u64,
    pub output: u64,
    pub cache_create: u64,
    pub cache_read: u64,
}

impl TokenCounts {
    pub fn total(&self) -> u64 {
        self.input + self.output + self.cache_create + self.cache_read
    }
}

impl AddAssign<&Usage> for TokenCounts {
    fn add_assign(&mut self, usage: &Usage) {
        self.input += usage.input_tokens;
        self.output += usage.output_tokens;
        self.cache_create += usage.cache_creation;
        self.cache_read += usage.cache_read;
    }
}

/// Totals for one log file.
#[derive(Default, Clone, Debug, PartialEq, Serialize)]
pub struct SessionRecord {
    pub cost: f64,
    pub tokens: TokenCounts,
    /// First counted assistant timestamp, in file order.
    pub start: Option<DateTime<Utc>>,
    /// Last counted assistant timestamp, in file order.
    pub end: Option<DateTime<Utc>>,
    /// Local calendar date of `start`.
    pub start_date: Option<NaiveDate>,
    pub messages: u64,
}

impl SessionRecord {
    /// Wall-clock span between first and last assistant entry, in seconds.
    pub fn duration_secs(&self) -> Option<f64> {
        let (start, end) = (self.start?, self.end?);
        Some((end - start).num_milliseconds() as f64 / 1000.0)
    }
}

#[derive(Default, Clone, Debug, PartialEq, Serialize)]
pub struct ProjectRecord {
    pub cost: f64,
    pub sessions: BTreeSet<String>,
    pub days: BTreeSet<NaiveDate>,
    pub tokens: TokenCounts,
    pub messages: u64,
    pub response_times: Vec<f64>,
}

#[derive(Default, Clone, Copy, Debug, PartialEq, Serialize)]
pub struct DailyAggregate {
    pub cost: f64,
    pub messages: u64,
}

/// Result of classifying one `tool_result` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolOutcome {
    Accepted,
    Interrupted,
}

/// Tool-use counters. Only [`ToolUseStats::record`] mutates them, which keeps
/// `total == accepted + interrupted`.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ToolUseStats {
    total: u64,
    accepted: u64,
    interrupted: u64,
}

impl ToolUseStats {
    pub fn record(&mut self, outcome: ToolOutcome) {
        self.total += 1;
        match outcome {
            ToolOutcome::Accepted => self.accepted += 1,
            ToolOutcome::Interrupted => self.interrupted += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    pub fn interrupted(&self) -> u64 {
        self.interrupted
    }

    pub fn accepted_percent(&self) -> f64 {
        percent(self.accepted, self.total)
    }

    pub fn interrupted_percent(&self) -> f64 {
        percent(self.interrupted, self.total)
    }
}

pub(crate) fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
