//! # Aggregate Module
//!
//! Folds decoded log entries into per-scope totals and hands back an immutable
//! [`UsageReport`].
//!
//! ## What counts where
//!
//! - Cost, tokens and activity come from `assistant` entries with a parseable
//!   timestamp whose local date is not before the cutoff.
//! - `<synthetic>` messages count as activity but never as cost or tokens.
//! - Response-time samples ignore the cutoff, except the per-date buckets, which
//!   are keyed and filtered by the reply's UTC date.
//! - Tool results are counted from every `user` entry regardless of date.
//!
//! All keyed state lives in ordered maps and is summed in fold order, so the same
//! files always produce the same numbers.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Local, NaiveDate, TimeZone};
use serde::Serialize;

use crate::latency::{LatencySample, LatencySummary, ResponseLinker, second_buckets};
use crate::models::records::percent;
use crate::models::{
    DailyAggregate, LogEntry, ProjectRecord, SessionRecord, TokenCounts, ToolUseStats,
};
use crate::pricing::{DEFAULT_MODEL, SYNTHETIC_MODEL, calculate_cost};
use crate::tools::classify_entry;

/// Minimum cost for a project to appear in the default project listing.
pub const MIN_LISTED_PROJECT_COST: f64 = 0.01;

/// Accumulates every file of one run. `Tz` decides calendar bucketing.
pub struct Aggregator<Tz: TimeZone = Local> {
    tz: Tz,
    cutoff: Option<NaiveDate>,
    total_cost: f64,
    cache_savings: f64,
    priced_entries: u64,
    tokens: TokenCounts,
    daily: BTreeMap<NaiveDate, DailyAggregate>,
    sessions: BTreeMap<String, SessionRecord>,
    projects: BTreeMap<String, ProjectRecord>,
    hourly: [u64; 24],
    weekday: [u64; 7],
    response_times: Vec<f64>,
    daily_response_times: BTreeMap<NaiveDate, Vec<f64>>,
    tool_use: ToolUseStats,
    files_scanned: usize,
    lines_skipped: usize,
}

impl Aggregator<Local> {
    pub fn new(cutoff: Option<NaiveDate>) -> Self {
        Self::with_timezone(Local, cutoff)
    }
}

impl<Tz: TimeZone> Aggregator<Tz> {
    pub fn with_timezone(tz: Tz, cutoff: Option<NaiveDate>) -> Self {
        Self {
            tz,
            cutoff,
            total_cost: 0.0,
            cache_savings: 0.0,
            priced_entries: 0,
            tokens: TokenCounts::default(),
            daily: BTreeMap::new(),
            sessions: BTreeMap::new(),
            projects: BTreeMap::new(),
            hourly: [0; 24],
            weekday: [0; 7],
            response_times: Vec::new(),
            daily_response_times: BTreeMap::new(),
            tool_use: ToolUseStats::default(),
            files_scanned: 0,
            lines_skipped: 0,
        }
    }

    fn before_cutoff(&self, date: NaiveDate) -> bool {
        self.cutoff.is_some_and(|c| date < c)
    }

    /// Fold one complete file. `entries` must be in file order.
    pub fn ingest_file(&mut self, session_id: &str, project: &str, entries: &[LogEntry]) {
        self.files_scanned += 1;
        let linker = ResponseLinker::new(entries);
        for entry in entries {
            if entry.is_user() {
                for outcome in classify_entry(entry) {
                    self.tool_use.record(outcome);
                }
            }
            if let Some(sample) = linker.sample_for(entry) {
                self.record_latency(project, sample);
            }
            if entry.is_assistant() {
                self.fold_assistant(session_id, project, entry);
            }
        }
    }

    /// Count lines the reader dropped.
    pub fn note_skipped(&mut self, lines: usize) {
        self.lines_skipped += lines;
    }

    fn record_latency(&mut self, project: &str, sample: LatencySample) {
        self.response_times.push(sample.seconds);
        self.projects
            .entry(project.to_string())
            .or_default()
            .response_times
            .push(sample.seconds);
        let date = sample.replied_at.date_naive();
        if !self.before_cutoff(date) {
            self.daily_response_times
                .entry(date)
                .or_default()
                .push(sample.seconds);
        }
    }

    fn fold_assistant(&mut self, session_id: &str, project: &str, entry: &LogEntry) {
        let Some(ts) = entry.timestamp.as_ref() else {
            return;
        };
        let (Some(instant), Some(local)) = (ts.to_instant(), ts.to_local_calendar_fields(&self.tz))
        else {
            return;
        };
        if self.before_cutoff(local.date) {
            return;
        }

        let session = self.sessions.entry(session_id.to_string()).or_default();
        if session.start.is_none() {
            session.start = Some(instant);
            session.start_date = Some(local.date);
        }
        session.end = Some(instant);
        session.messages += 1;

        let proj = self.projects.entry(project.to_string()).or_default();
        proj.sessions.insert(session_id.to_string());
        proj.days.insert(local.date);
        proj.messages += 1;

        self.hourly[local.hour as usize] += 1;
        self.weekday[local.weekday as usize] += 1;
        let day = self.daily.entry(local.date).or_default();
        day.messages += 1;

        let cost = if let Some(precomputed) = entry.cost_usd.filter(|c| *c >= 0.0) {
            precomputed
        } else if let Some(usage) = entry.usage() {
            let model = entry.model().unwrap_or(DEFAULT_MODEL);
            if model == SYNTHETIC_MODEL {
                return;
            }
            let breakdown = calculate_cost(usage, model);
            session.tokens += usage;
            proj.tokens += usage;
            self.tokens += usage;
            self.cache_savings += breakdown.cache_savings;
            breakdown.actual
        } else {
            return;
        };

        day.cost += cost;
        session.cost += cost;
        proj.cost += cost;
        self.total_cost += cost;
        self.priced_entries += 1;
    }

    pub fn finish(self) -> UsageReport {
        UsageReport {
            total_cost: self.total_cost,
            cache_savings: self.cache_savings,
            priced_entries: self.priced_entries,
            tokens: self.tokens,
            daily: self.daily,
            sessions: self.sessions,
            projects: self.projects,
            hourly: self.hourly,
            weekday: self.weekday,
            response_times: self.response_times,
            daily_response_times: self.daily_response_times,
            tool_use: self.tool_use,
            cutoff: self.cutoff,
            files_scanned: self.files_scanned,
            lines_skipped: self.lines_skipped,
        }
    }
}

/// Final state of a run. Owned by the caller; nothing refers back into the scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageReport {
    pub total_cost: f64,
    pub cache_savings: f64,
    /// Assistant entries that contributed a cost (priced usage or `costUSD`).
    pub priced_entries: u64,
    pub tokens: TokenCounts,
    /// Keyed by local calendar date.
    pub daily: BTreeMap<NaiveDate, DailyAggregate>,
    pub sessions: BTreeMap<String, SessionRecord>,
    pub projects: BTreeMap<String, ProjectRecord>,
    /// Assistant messages per local hour of day.
    pub hourly: [u64; 24],
    /// Assistant messages per local weekday, Monday first.
    pub weekday: [u64; 7],
    pub response_times: Vec<f64>,
    /// Keyed by UTC date of the reply.
    pub daily_response_times: BTreeMap<NaiveDate, Vec<f64>>,
    pub tool_use: ToolUseStats,
    pub cutoff: Option<NaiveDate>,
    pub files_scanned: usize,
    pub lines_skipped: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TokenShares {
    pub cache_read: f64,
    pub cache_write: f64,
    pub output: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectSummary {
    pub name: String,
    pub cost: f64,
    pub sessions: usize,
    pub days: usize,
    pub avg_response_secs: Option<f64>,
    pub avg_session_secs: Option<f64>,
    pub tokens: u64,
    pub cache_percent: f64,
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

impl UsageReport {
    pub fn has_cost_data(&self) -> bool {
        self.priced_entries > 0
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Distinct local dates on which a session started.
    pub fn active_days(&self) -> usize {
        self.sessions
            .values()
            .filter_map(|s| s.start_date)
            .collect::<BTreeSet<_>>()
            .len()
    }

    pub fn cost_per_session(&self) -> f64 {
        match self.session_count() {
            0 => 0.0,
            n => self.total_cost / n as f64,
        }
    }

    pub fn cost_per_active_day(&self) -> f64 {
        match self.active_days() {
            0 => 0.0,
            n => self.total_cost / n as f64,
        }
    }

    fn durations<'a>(&self, ids: impl Iterator<Item = &'a String>) -> Vec<f64> {
        ids.filter_map(|id| self.sessions.get(id))
            .filter_map(SessionRecord::duration_secs)
            .filter(|d| *d > 0.0)
            .collect()
    }

    /// Mean duration of sessions that lasted longer than an instant.
    pub fn average_session_duration(&self) -> Option<f64> {
        mean(&self.durations(self.sessions.keys()))
    }

    pub fn token_shares(&self) -> TokenShares {
        let total = self.tokens.total();
        TokenShares {
            cache_read: percent(self.tokens.cache_read, total),
            cache_write: percent(self.tokens.cache_create, total),
            output: percent(self.tokens.output, total),
        }
    }

    pub fn latency_summary(&self) -> Option<LatencySummary> {
        LatencySummary::from_samples(&self.response_times)
    }

    pub fn response_histogram(&self, max_bucket: usize) -> Vec<u64> {
        second_buckets(&self.response_times, max_bucket)
    }

    /// Message counts for every date in `[start, end]`, zero-filled.
    pub fn daily_message_series(&self, start: NaiveDate, end: NaiveDate) -> Vec<u64> {
        start
            .iter_days()
            .take_while(|d| *d <= end)
            .map(|d| self.daily.get(&d).map(|a| a.messages).unwrap_or(0))
            .collect()
    }

    /// Projects costing more than `min_cost`, most expensive first.
    pub fn project_summaries(&self, min_cost: f64) -> Vec<ProjectSummary> {
        let mut rows: Vec<ProjectSummary> = self
            .projects
            .iter()
            .filter(|(_, p)| p.cost > min_cost)
            .map(|(name, p)| ProjectSummary {
                name: name.clone(),
                cost: p.cost,
                sessions: p.sessions.len(),
                days: p.days.len(),
                avg_response_secs: mean(&p.response_times),
                avg_session_secs: mean(&self.durations(p.sessions.iter())),
                tokens: p.tokens.total(),
                cache_percent: percent(p.tokens.cache_read, p.tokens.total()),
            })
            .collect();
        rows.sort_by(|a, b| b.cost.total_cmp(&a.cost));
        rows
    }
}
