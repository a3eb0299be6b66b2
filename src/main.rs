use anyhow::Result;
use chrono::Local;
use tracing_subscriber::EnvFilter;

use claude_costs::cli::Args;
use claude_costs::display::{print_json_output, print_missing_root, print_text_output};
use claude_costs::error::ScanError;
use claude_costs::scan::{ScanConfig, scan_usage};
use claude_costs::utils::{home_dir, resolve_claude_dir};

fn init_tracing(debug: bool) {
    let fallback = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.debug);

    let claude_dir = resolve_claude_dir(args.claude_dir.as_deref());
    let today = Local::now().date_naive();
    let config = ScanConfig::new(&claude_dir, home_dir()).with_lookback_days(today, args.days);

    let report = match scan_usage(&config) {
        Ok(report) => report,
        Err(err @ ScanError::MissingRoot(_)) => {
            print_missing_root(&config.projects_dir());
            std::process::exit(err.exit_code());
        }
        Err(err) => return Err(err.into()),
    };

    if args.json {
        print_json_output(&report, args.days)?;
    } else {
        print_text_output(&report, &args, &claude_dir, today);
    }
    Ok(())
}
