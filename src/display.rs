use chrono::{NaiveDate, TimeDelta};
use std::path::Path;

#[cfg(feature = "colors")]
use owo_colors::OwoColorize;

// Provide a no-op color shim when "colors" feature is disabled
#[cfg(not(feature = "colors"))]
pub mod color_shim {
    use std::fmt::{self, Display, Formatter};

    #[derive(Clone)]
    pub struct Plain(pub String);

    impl Display for Plain {
        fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
            f.write_str(&self.0)
        }
    }

    pub trait ColorizeShim {
        fn as_str(&self) -> &str;

        fn bright_black(&self) -> Plain {
            Plain(self.as_str().to_string())
        }
        fn red(&self) -> Plain {
            Plain(self.as_str().to_string())
        }
        fn yellow(&self) -> Plain {
            Plain(self.as_str().to_string())
        }
        fn green(&self) -> Plain {
            Plain(self.as_str().to_string())
        }
        fn cyan(&self) -> Plain {
            Plain(self.as_str().to_string())
        }
        fn blue(&self) -> Plain {
            Plain(self.as_str().to_string())
        }
        fn magenta(&self) -> Plain {
            Plain(self.as_str().to_string())
        }
        fn bold(&self) -> Plain {
            Plain(self.as_str().to_string())
        }
        fn dimmed(&self) -> Plain {
            Plain(self.as_str().to_string())
        }
    }

    impl ColorizeShim for &str {
        fn as_str(&self) -> &str {
            self
        }
    }
    impl ColorizeShim for String {
        fn as_str(&self) -> &str {
            self.as_str()
        }
    }
    impl ColorizeShim for Plain {
        fn as_str(&self) -> &str {
            &self.0
        }
    }
}

#[cfg(not(feature = "colors"))]
use color_shim::ColorizeShim as OwoColorize;

use crate::aggregate::{MIN_LISTED_PROJECT_COST, ProjectSummary, UsageReport};
use crate::cli::Args;
use crate::utils::{format_currency, format_duration, format_tokens};

const SPARK_BLOCKS: [char; 9] = [' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
const RESPONSE_BUCKETS: usize = 30;
const MAX_SPARK_WIDTH: usize = 30;
/// Longest stretch of days the daily sparkline samples from.
const MAX_DAILY_SPAN: u32 = 3650;

/// Unicode block sparkline, resampled down to `width` when longer.
pub fn create_sparkline(values: &[f64], width: usize) -> String {
    if values.iter().all(|v| *v == 0.0) {
        return "─".repeat(width);
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max == min {
        return "▄".repeat(width);
    }
    let blocks: Vec<char> = values
        .iter()
        .map(|v| SPARK_BLOCKS[(((v - min) / (max - min)) * 8.0) as usize])
        .collect();
    if blocks.len() <= width {
        return blocks.into_iter().collect();
    }
    let step = blocks.len() as f64 / width as f64;
    (0..width)
        .map(|i| blocks[(i as f64 * step) as usize])
        .collect()
}

/// Horizontal bars scaled to the largest value, with each value's share.
pub fn create_bar_chart(values: &[f64], labels: &[&str], max_width: usize) -> Vec<String> {
    if values.iter().all(|v| *v == 0.0) {
        return Vec::new();
    }
    let max = values.iter().copied().fold(0.0, f64::max);
    let sum: f64 = values.iter().sum();
    labels
        .iter()
        .zip(values)
        .map(|(label, value)| {
            let bar = "█".repeat(((value / max) * max_width as f64) as usize);
            let pct = value / sum * 100.0;
            format!("{label:>3}: {bar:<max_width$} {pct:4.0}%")
        })
        .collect()
}

fn as_f64(values: &[u64]) -> Vec<f64> {
    values.iter().map(|v| *v as f64).collect()
}

pub fn print_missing_root(projects_dir: &Path) {
    eprintln!(
        "{}",
        format!("Error: {} does not exist", projects_dir.display()).red()
    );
    eprintln!(
        "{}",
        "Make sure you're pointing to the correct Claude directory.".yellow()
    );
}

pub fn print_no_data() {
    println!("{}", "No cost data found in JSONL files".yellow());
    println!(
        "{}",
        "Make sure there are .jsonl files in the projects/ subdirectory".dimmed()
    );
}

fn summary_lines(report: &UsageReport, args: &Args, out: &mut Vec<String>) {
    out.push(format!(
        "💰 {} API value (last {} days, {} with activity)",
        format_currency(report.total_cost).green().bold(),
        args.days,
        report.active_days()
    ));
    if args.cache && report.cache_savings > 0.01 {
        out.push(format!(
            "💸 {} saved from caching ({} without cache)",
            format_currency(report.cache_savings).green(),
            format_currency(report.total_cost + report.cache_savings)
        ));
    }
    let mut sessions_line = format!(
        "📊 {} sessions • {}/session • {}/day",
        report.session_count(),
        format_currency(report.cost_per_session()),
        format_currency(report.cost_per_active_day())
    );
    if let Some(avg) = report.average_session_duration() {
        sessions_line.push_str(&format!(" • {} avg", format_duration(avg)));
    }
    out.push(sessions_line);
    out.push(
        "Note: This shows API value, not your actual subscription cost"
            .dimmed()
            .to_string(),
    );

    let total = report.tokens.total();
    if args.cache {
        let shares = report.token_shares();
        let parts: Vec<String> = [
            (shares.cache_read, "cached"),
            (shares.cache_write, "cache write"),
            (shares.output, "output"),
        ]
        .iter()
        .filter(|(pct, _)| *pct > 0.5)
        .map(|(pct, label)| format!("{pct:.0}% {label}"))
        .collect();
        let breakdown = if parts.is_empty() {
            "no token breakdown available".to_string()
        } else {
            parts.join(" / ")
        };
        out.push(format!("🔤 {} tokens ({breakdown})", format_tokens(total)));
    } else {
        out.push(format!("🔤 {} tokens total", format_tokens(total)));
    }
}

fn project_lines(rows: &[ProjectSummary], args: &Args, out: &mut Vec<String>) {
    out.push(String::new());
    out.push("Project Breakdown:".bold().to_string());
    let shown = match args.project_limit() {
        Some(limit) => &rows[..rows.len().min(limit)],
        None => rows,
    };
    let name_w = shown
        .iter()
        .map(|r| r.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Project".len());

    let mut header = format!(
        "  {:<name_w$}  {:>9}  {:>8}  {:>5}  {:>9}  {:>8}",
        "Project", "Cost", "Sessions", "Days", "Resp Time", "Tokens"
    );
    if args.cache {
        header.push_str(&format!("  {:>6}", "Cache%"));
    }
    out.push(header.bright_black().to_string());

    for row in shown {
        let resp = row
            .avg_response_secs
            .map(|s| format!("{s:.1}s"))
            .unwrap_or_else(|| "-".to_string());
        let mut line = format!(
            "  {}  {}  {}  {}  {}  {}",
            format!("{:<name_w$}", row.name).cyan(),
            format!("{:>9}", format_currency(row.cost)).green(),
            format!("{:>8}", row.sessions).yellow(),
            format!("{:>5}", row.days).magenta(),
            format!("{resp:>9}").cyan(),
            format!("{:>8}", format_tokens(row.tokens)).blue(),
        );
        if args.cache {
            line.push_str(&format!("  {}", format!("{:>5.0}%", row.cache_percent).dimmed()));
        }
        out.push(line);
    }

    if shown.len() < rows.len() {
        out.push(String::new());
        out.push(
            format!(
                "Showing top {} projects. Use --verbose to see all {} projects.",
                shown.len(),
                rows.len()
            )
            .dimmed()
            .to_string(),
        );
    }
}

fn activity_lines(report: &UsageReport, days: u32, today: NaiveDate, out: &mut Vec<String>) {
    out.push(String::new());
    out.push("Activity Patterns:".bold().to_string());

    if report.hourly.iter().any(|h| *h > 0) {
        out.push(format!(
            "Hourly:  {} (24h)",
            create_sparkline(&as_f64(&report.hourly), 24)
        ));
        let markers: String = (0..24).map(|h| if h % 6 == 0 { '↑' } else { ' ' }).collect();
        out.push(format!("         {markers}"));
        out.push(format!("         {:>1}{:>6}{:>6}{:>6}", "0", "6", "12", "18"));
    }

    let span = days.clamp(1, MAX_DAILY_SPAN);
    let series = today
        .checked_sub_signed(TimeDelta::days(i64::from(span) - 1))
        .map(|start| report.daily_message_series(start, today))
        .unwrap_or_default();
    if series.iter().any(|v| *v > 0) {
        let width = series.len().min(MAX_SPARK_WIDTH);
        let active = series.iter().filter(|v| **v > 0).count();
        out.push(String::new());
        out.push(format!(
            "Daily:   {} (last {days} days, {active} active)",
            create_sparkline(&as_f64(&series), width)
        ));
        if width >= 20 {
            let mid = width / 2;
            out.push(format!(
                "         ↑{}↑{}↑",
                " ".repeat(mid - 1),
                " ".repeat(width - mid - 2)
            ));
            let mid_w = width - mid - 5;
            out.push(format!(
                "         {:<mid$}{:^mid_w$}{:>5}",
                format!("{days}d ago"),
                format!("{}d", days / 2),
                "today"
            ));
        } else if width >= 2 {
            out.push(format!("         ↑{}↑", " ".repeat(width - 2)));
            let half = width / 2;
            let rest = width - half;
            out.push(format!(
                "         {:<half$}{:>rest$}",
                format!("{days}d"),
                "today"
            ));
        }
    }

    if let Some(summary) = report.latency_summary() {
        let buckets = report.response_histogram(RESPONSE_BUCKETS);
        let last = buckets
            .iter()
            .rposition(|c| *c > 0)
            .map(|i| (i + 3).min(RESPONSE_BUCKETS))
            .unwrap_or(RESPONSE_BUCKETS);
        let values = as_f64(&buckets[..last]);
        let spark = create_sparkline(&values, values.len().min(MAX_SPARK_WIDTH));
        let len = spark.chars().count();
        out.push(String::new());
        out.push(format!(
            "Response: {spark} (p50: {:.0}s, p95: {:.0}s, p99: {:.0}s)",
            summary.percentile(50).unwrap_or(0.0),
            summary.percentile(95).unwrap_or(0.0),
            summary.percentile(99).unwrap_or(0.0)
        ));
        let half = len / 2;
        let rest = len.saturating_sub(half + 1);
        out.push(format!("          {:>1}{:>half$}{:>rest$}", "↑", "↑", "↑"));
        out.push(format!(
            "          {:>2}{:>half$}{:>rest2$}",
            "0s",
            format!("{}s", last / 2),
            format!("{last}s"),
            rest2 = len.saturating_sub(half + 2)
        ));
    }

    let bars = create_bar_chart(&as_f64(&report.weekday), &WEEKDAYS, 25);
    if !bars.is_empty() {
        out.push(String::new());
        out.push("Daily distribution:".to_string());
        out.extend(bars.into_iter().map(|l| format!("  {l}")));
    }
}

fn tool_lines(report: &UsageReport, out: &mut Vec<String>) {
    let stats = &report.tool_use;
    if stats.total() == 0 {
        return;
    }
    out.push(String::new());
    out.push("Tool Use Stats:".bold().to_string());
    out.push(format!("  Total tool uses: {}", stats.total()));
    out.push(format!(
        "  {} Accepted: {} ({:.1}%)",
        "✓".green(),
        stats.accepted(),
        stats.accepted_percent()
    ));
    out.push(format!(
        "  {} Rejected: {} ({:.1}%)",
        "✗".red(),
        stats.interrupted(),
        stats.interrupted_percent()
    ));
}

/// Full human-readable report. `today` anchors the daily sparkline.
pub fn render_text_report(report: &UsageReport, args: &Args, today: NaiveDate) -> String {
    let mut out = vec![String::new()];
    summary_lines(report, args, &mut out);
    project_lines(&report.project_summaries(MIN_LISTED_PROJECT_COST), args, &mut out);
    activity_lines(report, args.days, today, &mut out);
    tool_lines(report, &mut out);
    out.join("\n")
}

pub fn print_text_output(report: &UsageReport, args: &Args, claude_dir: &Path, today: NaiveDate) {
    println!();
    println!(
        "{}",
        format!("Analyzing: {}", claude_dir.display()).dimmed()
    );
    if !report.has_cost_data() {
        print_no_data();
        return;
    }
    println!("{}", render_text_report(report, args, today));
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

pub fn build_json_output(report: &UsageReport, days: u32) -> serde_json::Value {
    let shares = report.token_shares();
    let daily: Vec<serde_json::Value> = report
        .daily
        .iter()
        .map(|(date, agg)| {
            let times = report.daily_response_times.get(date);
            let avg_response = times
                .filter(|t| !t.is_empty())
                .map(|t| t.iter().sum::<f64>() / t.len() as f64);
            serde_json::json!({
                "date": date.to_string(),
                "cost_usd": agg.cost,
                "messages": agg.messages,
                "avg_response_secs": avg_response,
            })
        })
        .collect();
    let weekday: serde_json::Map<String, serde_json::Value> = WEEKDAYS
        .iter()
        .zip(report.weekday)
        .map(|(name, count)| (name.to_string(), serde_json::json!(count)))
        .collect();

    serde_json::json!({
        "total_cost_usd": report.total_cost,
        "cache_savings_usd": report.cache_savings,
        "days": days,
        "cutoff": report.cutoff.map(|d| d.to_string()),
        "active_days": report.active_days(),
        "sessions": {
            "count": report.session_count(),
            "cost_per_session_usd": round2(report.cost_per_session()),
            "cost_per_active_day_usd": round2(report.cost_per_active_day()),
            "avg_duration_secs": report.average_session_duration(),
        },
        "tokens": {
            "input": report.tokens.input,
            "output": report.tokens.output,
            "cache_create": report.tokens.cache_create,
            "cache_read": report.tokens.cache_read,
            "total": report.tokens.total(),
            "cache_read_percent": shares.cache_read,
            "cache_write_percent": shares.cache_write,
            "output_percent": shares.output,
        },
        "daily": daily,
        "projects": report.project_summaries(MIN_LISTED_PROJECT_COST),
        "activity": {
            "hourly": report.hourly,
            "weekday": weekday,
        },
        "response_times": report.latency_summary(),
        "tool_use": {
            "total": report.tool_use.total(),
            "accepted": report.tool_use.accepted(),
            "interrupted": report.tool_use.interrupted(),
            "accepted_percent": report.tool_use.accepted_percent(),
            "interrupted_percent": report.tool_use.interrupted_percent(),
        },
        "scan": {
            "files": report.files_scanned,
            "lines_skipped": report.lines_skipped,
            "priced_entries": report.priced_entries,
        },
    })
}

pub fn print_json_output(report: &UsageReport, days: u32) -> anyhow::Result<()> {
    let json = build_json_output(report, days);
    println!("{}", serde_json::to_string(&json)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sparkline_edge_cases() {
        assert_eq!(create_sparkline(&[], 5), "─────");
        assert_eq!(create_sparkline(&[0.0, 0.0], 3), "───");
        assert_eq!(create_sparkline(&[2.0, 2.0], 4), "▄▄▄▄");
        assert_eq!(create_sparkline(&[0.0, 4.0, 8.0], 10), " ▄█");
    }

    #[test]
    fn sparkline_resamples_to_width() {
        let values: Vec<f64> = (0..90).map(|v| v as f64).collect();
        let s = create_sparkline(&values, 30);
        assert_eq!(s.chars().count(), 30);
        assert_eq!(s.chars().next(), Some(' '));
    }

    #[test]
    fn bar_chart_scales_to_max() {
        let lines = create_bar_chart(&[1.0, 3.0], &["Mon", "Tue"], 6);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "Mon: ██       25%");
        assert_eq!(lines[1], "Tue: ██████   75%");
        assert!(create_bar_chart(&[0.0, 0.0], &["a", "b"], 6).is_empty());
    }

    fn one_day_report() -> UsageReport {
        use crate::aggregate::Aggregator;
        let entry = serde_json::from_str(
            r#"{"type":"assistant","timestamp":"2025-06-01T09:00:00Z","message":{"model":"claude-sonnet-4-20250514","usage":{"input_tokens":10000}}}"#,
        )
        .unwrap();
        let mut agg = Aggregator::with_timezone(chrono::Utc, None);
        agg.ingest_file("s1", "proj", &[entry]);
        agg.finish()
    }

    #[test]
    fn text_report_survives_huge_lookback() {
        let report = one_day_report();
        let today = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let args = Args::try_parse_from(["claude-costs", "-d", "4000000000"]).unwrap();
        let text = render_text_report(&report, &args, today);
        assert!(text.contains("Daily:"));
        assert!(text.contains("last 4000000000 days"));
    }

    #[test]
    fn text_report_daily_sparkline_for_default_window() {
        let report = one_day_report();
        let today = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let args = Args::try_parse_from(["claude-costs"]).unwrap();
        let text = render_text_report(&report, &args, today);
        assert!(text.contains("(last 90 days, 1 active)"));
        assert!(!text.contains("Tool Use Stats:"));
    }
}
