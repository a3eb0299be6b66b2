#[derive(clap::Parser, Debug)]
#[command(
    name = "claude-costs",
    version,
    about = "Usage and cost analytics for Claude Code session logs"
)]
pub struct Args {
    /// Number of days to analyze
    #[arg(short, long, default_value_t = 90)]
    pub days: u32,

    /// Show every project instead of the top 10
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to the Claude directory. Defaults to ~/.claude
    #[arg(short = 'c', long, env = "CLAUDE_CONFIG_DIR")]
    pub claude_dir: Option<String>,

    /// Show cache statistics (savings, token breakdown, per-project cache share)
    #[arg(long)]
    pub cache: bool,

    /// Emit JSON instead of colored text
    #[arg(long)]
    pub json: bool,

    /// Debug mode: log scan details to stderr
    #[arg(long, env = "CLAUDE_DEBUG")]
    pub debug: bool,
}

impl Args {
    pub fn parse() -> Self {
        <Args as clap::Parser>::parse()
    }

    pub fn try_parse_from<I, T>(iter: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Args as clap::Parser>::try_parse_from(iter)
    }

    /// Projects to list, `None` for all.
    pub fn project_limit(&self) -> Option<usize> {
        if self.verbose { None } else { Some(10) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["claude-costs"]).unwrap();
        assert_eq!(args.days, 90);
        assert!(!args.json);
        assert_eq!(args.project_limit(), Some(10));
    }

    #[test]
    fn short_flags() {
        let args = Args::try_parse_from(["claude-costs", "-d", "7", "-v", "-c", "/tmp/x"]).unwrap();
        assert_eq!(args.days, 7);
        assert_eq!(args.project_limit(), None);
        assert_eq!(args.claude_dir.as_deref(), Some("/tmp/x"));
    }
}
