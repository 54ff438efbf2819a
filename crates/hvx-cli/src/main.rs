//! 🚀 hvx-cli — the front door, the bouncer, the maitre d' of harvex.
//!
//! 🎬 *[narrator voice]* "It all started with a simple main() function..."
//! 📦 This binary is the thin wrapper: parse args, init tracing, load the
//! config, run the collection, print the table. Like a manager — present
//! at the kickoff and the demo, absent for the work in between. 🦆

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use hvx::RunSummary;
use tracing::error;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = "hvx.toml";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Bulk collector for SoilEnviron open-data statistics"
)]
struct Cli {
    /// 🔧 Config file; when the default is absent, configuration comes
    /// from HVX_* environment variables alone. No file, no drama.
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    config: PathBuf,

    /// 🗺️ Override the region code file from the config.
    #[arg(long)]
    regions: Option<PathBuf>,

    /// 📁 Override the snapshot output directory from the config.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// 🚜 Override the per-dataset fetch worker count from the config.
    #[arg(long)]
    workers: Option<usize>,
}

/// 🚀 main() — where it all begins. The genesis. The "I pressed enter and
/// held my breath" moment.
///
/// 🔧 Steps:
/// 1. Init tracing (so we can see what goes wrong, and when)
/// 2. Parse args (clap does the arguing for us)
/// 3. Load config (the moment of truth)
/// 4. Run the thing (send it — politely, ~1 request/sec/worker 🐢)
/// 5. Print the table (or cry, see step 6)
/// 6. Handle errors (cry)
#[tokio::main]
async fn main() -> Result<()> {
    // 📡 Set up tracing — because println! debugging is a lifestyle choice
    // we're trying to move past, like flip phones and cargo shorts
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    // 🔒 A missing *default* config file is fine (env-only run); a missing
    // *explicitly requested* file is a hard error. We only get upset about
    // files you actually asked for by name.
    let config_file = if cli.config.exists() {
        Some(cli.config.as_path())
    } else if cli.config.as_path() == Path::new(DEFAULT_CONFIG) {
        None
    } else {
        report_error(&anyhow::anyhow!(
            "config file '{}' does not exist",
            cli.config.display()
        ));
        std::process::exit(1);
    };
    let mut config = match hvx::load_config(config_file) {
        Ok(config) => config,
        Err(err) => {
            report_error(&err);
            std::process::exit(1);
        }
    };

    // 🎛️ CLI flags beat the config file. The person at the keyboard
    // outranks the file on disk. That's just seniority.
    if let Some(regions) = cli.regions {
        config.regions_file = regions;
    }
    if let Some(output_dir) = cli.output_dir {
        config.output_dir = output_dir;
    }
    if let Some(workers) = cli.workers {
        config.runtime.fetch_workers = workers;
    }

    // 🚀 SEND IT. No take-backs. (well — one polite GET at a time)
    match hvx::run(config).await {
        Ok(summary) => {
            print_summary(&summary);
            Ok(())
        }
        Err(err) => {
            report_error(&err);
            std::process::exit(1);
        }
    }
}

fn print_summary(summary: &RunSummary) {
    // 🍽️ one row per dataset, numbers right-aligned like a proper bill
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["dataset", "requested", "ok", "failed", "empty", "file"]);

    for report in &summary.reports {
        table.add_row(vec![
            Cell::new(&report.name),
            Cell::new(report.total()).set_alignment(CellAlignment::Right),
            Cell::new(report.succeeded).set_alignment(CellAlignment::Right),
            Cell::new(report.failed).set_alignment(CellAlignment::Right),
            Cell::new(report.empty).set_alignment(CellAlignment::Right),
            Cell::new(
                report
                    .output
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ),
        ]);
    }

    println!("{table}");

    let requests = summary.total_requests();
    let succeeded = summary.total_succeeded();
    let rate = if requests > 0 {
        succeeded as f64 / requests as f64 * 100.0
    } else {
        0.0
    };
    // ✅ the bottom line — literally
    println!(
        "{succeeded}/{requests} requests succeeded ({rate:.1}%) in {:.0?}",
        summary.elapsed
    );
}

/// 💀 Error reporting: the part where we find out what went wrong and say
/// it in a way that's helpful at 3am.
fn report_error(err: &anyhow::Error) {
    error!("💀 error: {err}");
    // -- 🧅 peel the cause chain one tear-jerking layer at a time
    let mut smells_like_the_network = false;
    for cause in err.chain().skip(1) {
        error!("⚠️  cause: {cause}");
        // -- 🕵️ sniff each cause for connection-problem cologne
        let cause = cause.to_string();
        if cause.contains("error sending request")
            || cause.contains("connection refused")
            || cause.contains("Connection refused")
            || cause.contains("tcp connect error")
            || cause.contains("dns error")
            || cause.contains("operation timed out")
        {
            smells_like_the_network = true;
        }
    }
    // -- 📡 if it smells like a connection problem, it's probably a
    // connection problem. like when the wifi icon has full bars and
    // nothing loads.
    if smells_like_the_network {
        error!(
            "🔧 hint: the upstream API looks unreachable. Check your network \
             path to apis.data.go.kr (or the configured base_url) and rerun — \
             already-written snapshots are kept, re-running is the recovery \
             plan. ☕"
        );
    }
}
