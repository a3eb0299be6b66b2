use std::path::PathBuf;

pub const CLAUDE_DIR_NAME: &str = ".claude";

pub fn home_dir() -> PathBuf {
    directories::BaseDirs::new()
        .map(|b| b.home_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~"))
}

/// `--claude-dir` / `CLAUDE_CONFIG_DIR` when given (first entry of a
/// comma-separated list), otherwise `~/.claude`.
pub fn resolve_claude_dir(override_dir: Option<&str>) -> PathBuf {
    override_dir
        .and_then(|list| list.split(',').map(str::trim).find(|p| !p.is_empty()))
        .map(PathBuf::from)
        .unwrap_or_else(|| home_dir().join(CLAUDE_DIR_NAME))
}

pub fn format_currency(v: f64) -> String {
    format!("${v:.2}")
}

pub fn format_tokens(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1e6)
    } else if n >= 1_000 {
        format!("{:.1}k", n as f64 / 1e3)
    } else {
        n.to_string()
    }
}

/// `42s`, `17m`, `2h5m`, `3h`
pub fn format_duration(seconds: f64) -> String {
    let secs = seconds.max(0.0) as u64;
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        format!("{}m", secs / 60)
    } else {
        let hours = secs / 3600;
        let minutes = (secs % 3600) / 60;
        if minutes > 0 {
            format!("{hours}h{minutes}m")
        } else {
            format!("{hours}h")
        }
    }
}
