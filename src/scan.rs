//! # Scan Module
//!
//! Walks `<claude_dir>/projects`, reads every `.jsonl` session log and folds it
//! into an [`Aggregator`]. Files are visited in sorted path order so repeated
//! scans over unchanged data give identical reports.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate, TimeDelta, TimeZone};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::aggregate::{Aggregator, UsageReport};
use crate::error::{Result, ScanError};
use crate::project::ProjectResolver;
use crate::reader::LogReader;

pub const PROJECTS_DIR: &str = "projects";
pub const LOG_EXTENSION: &str = "jsonl";

/// Everything a scan needs to know. Built by the binary from CLI flags.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub claude_dir: PathBuf,
    /// Used to decode project directories and shorten project paths.
    pub home: PathBuf,
    /// Assistant entries dated (locally) before this day are ignored.
    pub cutoff: Option<NaiveDate>,
}

impl ScanConfig {
    pub fn new(claude_dir: impl Into<PathBuf>, home: impl Into<PathBuf>) -> Self {
        Self {
            claude_dir: claude_dir.into(),
            home: home.into(),
            cutoff: None,
        }
    }

    pub fn with_cutoff(mut self, cutoff: Option<NaiveDate>) -> Self {
        self.cutoff = cutoff;
        self
    }

    /// Keep the last `days` days counted back from `today`.
    pub fn with_lookback_days(self, today: NaiveDate, days: u32) -> Self {
        let cutoff = today.checked_sub_signed(TimeDelta::days(i64::from(days)));
        self.with_cutoff(cutoff)
    }

    pub fn projects_dir(&self) -> PathBuf {
        self.claude_dir.join(PROJECTS_DIR)
    }
}

fn is_log_path(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(LOG_EXTENSION)
}

/// All session logs below `root`, sorted. Unreadable subdirectories are logged
/// and skipped; only a failure on `root` itself is an error.
pub fn collect_log_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => return Err(ScanError::Walk(err)),
            Err(err) => {
                warn!(error = %err, "skipping unreadable path");
                continue;
            }
        };
        if entry.file_type().is_file() && is_log_path(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Scan with local-time calendar bucketing.
pub fn scan_usage(config: &ScanConfig) -> Result<UsageReport> {
    scan_usage_in(config, Local)
}

pub fn scan_usage_in<Tz: TimeZone>(config: &ScanConfig, tz: Tz) -> Result<UsageReport> {
    let root = config.projects_dir();
    if !root.is_dir() {
        return Err(ScanError::MissingRoot(root));
    }

    let files = collect_log_files(&root)?;
    debug!(root = %root.display(), files = files.len(), "scanning session logs");

    let mut resolver = ProjectResolver::new(&config.home);
    let mut agg = Aggregator::with_timezone(tz, config.cutoff);
    for path in &files {
        let reader = LogReader::new(path);
        let read = match reader.read_all() {
            Ok(read) => read,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "skipping unreadable log");
                continue;
            }
        };
        if read.skipped > 0 {
            debug!(path = %path.display(), skipped = read.skipped, "skipped undecodable lines");
        }
        let project = resolver.project_for_file(&root, path);
        agg.ingest_file(&reader.session_id(), &project, &read.entries);
        agg.note_skipped(read.skipped);
    }

    let report = agg.finish();
    debug!(
        files = report.files_scanned,
        sessions = report.session_count(),
        total_cost = report.total_cost,
        "scan complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookback_sets_cutoff() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();
        let config = ScanConfig::new("/c", "/h").with_lookback_days(today, 30);
        assert_eq!(config.cutoff, NaiveDate::from_ymd_opt(2025, 3, 1));
        assert_eq!(config.projects_dir(), PathBuf::from("/c/projects"));
    }

    #[test]
    fn only_jsonl_files_are_logs() {
        assert!(is_log_path(Path::new("/a/b.jsonl")));
        assert!(!is_log_path(Path::new("/a/b.json")));
        assert!(!is_log_path(Path::new("/a/jsonl")));
    }

    #[test]
    fn missing_root_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let config = ScanConfig::new(dir.path(), "/home/nobody");
        match scan_usage(&config) {
            Err(ScanError::MissingRoot(p)) => assert_eq!(p, dir.path().join("projects")),
            other => panic!("expected MissingRoot, got {other:?}"),
        }
    }
}
