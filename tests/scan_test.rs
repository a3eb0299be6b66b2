use std::fs;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use tempfile::TempDir;

use claude_costs::error::ScanError;
use claude_costs::project::UNKNOWN_PROJECT;
use claude_costs::scan::{ScanConfig, scan_usage_in};

const SONNET: &str = "claude-sonnet-4-20250514";

fn assistant(uuid: &str, parent: &str, ts: &str, input: u64, output: u64) -> String {
    format!(
        r#"{{"type":"assistant","uuid":"{uuid}","parentUuid":"{parent}","timestamp":"{ts}","message":{{"role":"assistant","model":"{SONNET}","usage":{{"input_tokens":{input},"output_tokens":{output}}}}}}}"#
    )
}

fn user(uuid: &str, ts: &str) -> String {
    format!(r#"{{"type":"user","uuid":"{uuid}","timestamp":"{ts}","message":{{"role":"user","content":"hi"}}}}"#)
}

fn write_session(claude_dir: &Path, project_dir: &str, session: &str, lines: &[String]) -> PathBuf {
    let dir = claude_dir.join("projects").join(project_dir);
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(format!("{session}.jsonl"));
    fs::write(&path, lines.join("\n") + "\n").unwrap();
    path
}

fn config(claude_dir: &Path) -> ScanConfig {
    ScanConfig::new(claude_dir, "/home/alice")
}

#[test]
fn scans_sessions_into_projects() {
    let tmp = TempDir::new().unwrap();
    write_session(
        tmp.path(),
        "-home-alice-proj",
        "s1",
        &[
            user("u1", "2025-06-02T09:00:00Z"),
            assistant("a1", "u1", "2025-06-02T09:00:04Z", 1_000_000, 0),
            user("u2", "2025-06-02T09:10:00Z"),
            assistant("a2", "u2", "2025-06-02T09:10:06Z", 0, 100_000),
        ],
    );

    let report = scan_usage_in(&config(tmp.path()), Utc).unwrap();
    assert!((report.total_cost - 4.5).abs() < 1e-9);
    assert_eq!(report.files_scanned, 1);
    assert_eq!(report.session_count(), 1);
    assert_eq!(report.active_days(), 1);

    let proj = &report.projects["proj"];
    assert_eq!(proj.messages, 2);
    assert_eq!(proj.response_times, vec![4.0, 6.0]);
    assert_eq!(report.sessions["s1"].duration_secs(), Some(602.0));

    let summary = report.latency_summary().unwrap();
    assert_eq!(summary.count, 2);
    assert!((summary.mean - 5.0).abs() < 1e-9);
}

#[test]
fn repeated_scans_are_identical() {
    let tmp = TempDir::new().unwrap();
    for (dir, session) in [("-home-alice-b", "s2"), ("-home-alice-a", "s1"), ("-srv-x", "s3")] {
        write_session(
            tmp.path(),
            dir,
            session,
            &[
                user("u", "2025-06-02T09:00:00Z"),
                assistant("a", "u", "2025-06-02T09:00:01.5Z", 12_345, 678),
            ],
        );
    }
    let cfg = config(tmp.path());
    let first = scan_usage_in(&cfg, Utc).unwrap();
    let second = scan_usage_in(&cfg, Utc).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        first.projects.keys().cloned().collect::<Vec<_>>(),
        vec!["/srv/x".to_string(), "a".to_string(), "b".to_string()]
    );
}

#[test]
fn corrupt_lines_do_not_block_other_files() {
    let tmp = TempDir::new().unwrap();
    let bad = write_session(tmp.path(), "-home-alice-p", "bad", &[]);
    fs::write(
        &bad,
        format!(
            "{{truncated\n\n{}\nnot json\n",
            assistant("a", "x", "2025-06-02T09:00:00Z", 1_000_000, 0)
        ),
    )
    .unwrap();
    write_session(
        tmp.path(),
        "-home-alice-p",
        "good",
        &[assistant("b", "y", "2025-06-02T10:00:00Z", 1_000_000, 0)],
    );

    let report = scan_usage_in(&config(tmp.path()), Utc).unwrap();
    assert_eq!(report.files_scanned, 2);
    assert_eq!(report.lines_skipped, 2);
    assert!((report.total_cost - 6.0).abs() < 1e-9);
    assert_eq!(report.projects["p"].sessions.len(), 2);
}

#[test]
fn missing_projects_directory_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let err = scan_usage_in(&config(tmp.path()), Utc).unwrap_err();
    assert!(matches!(err, ScanError::MissingRoot(_)));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn empty_projects_directory_has_no_cost_data() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join("projects")).unwrap();
    let report = scan_usage_in(&config(tmp.path()), Utc).unwrap();
    assert!(!report.has_cost_data());
    assert_eq!(report.files_scanned, 0);
}

#[test]
fn loose_files_and_other_extensions() {
    let tmp = TempDir::new().unwrap();
    let projects = tmp.path().join("projects");
    fs::create_dir_all(&projects).unwrap();
    fs::write(
        projects.join("loose.jsonl"),
        assistant("a", "x", "2025-06-02T09:00:00Z", 10, 10) + "\n",
    )
    .unwrap();
    fs::write(
        projects.join("notes.json"),
        assistant("b", "x", "2025-06-02T09:00:00Z", 10, 10) + "\n",
    )
    .unwrap();

    let report = scan_usage_in(&config(tmp.path()), Utc).unwrap();
    assert_eq!(report.files_scanned, 1);
    assert!(report.projects.contains_key(UNKNOWN_PROJECT));
}

#[test]
fn lookback_window_drops_old_assistant_entries() {
    let tmp = TempDir::new().unwrap();
    write_session(
        tmp.path(),
        "-home-alice-proj",
        "s1",
        &[
            assistant("old", "x", "2025-05-01T12:00:00Z", 1_000_000, 0),
            assistant("new", "x", "2025-06-01T12:00:00Z", 1_000_000, 0),
        ],
    );
    let today = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
    let cfg = config(tmp.path()).with_lookback_days(today, 7);
    let report = scan_usage_in(&cfg, Utc).unwrap();
    assert!((report.total_cost - 3.0).abs() < 1e-9);
    assert_eq!(report.daily.len(), 1);
    assert_eq!(report.sessions["s1"].messages, 1);
}

#[test]
fn hyphenated_project_resolved_against_real_directories() {
    let home = TempDir::new().unwrap();
    let claude = TempDir::new().unwrap();
    fs::create_dir_all(home.path().join("work").join("my-app")).unwrap();
    let encoded = home.path().join("work").join("my-app").to_string_lossy().replace('/', "-");
    write_session(
        claude.path(),
        &encoded,
        "s1",
        &[assistant("a", "x", "2025-06-02T09:00:00Z", 100, 100)],
    );

    let cfg = ScanConfig::new(claude.path(), home.path());
    let report = scan_usage_in(&cfg, Utc).unwrap();
    assert!(report.projects.contains_key("work/my-app"), "{:?}", report.projects.keys());
}
