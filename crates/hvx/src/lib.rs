//! 🌱 harvex core — region codes go in, CSV snapshots come out.
//!
//! 🎬 *[narrator voice]* "Somewhere, a government API knows everything about
//! dirt. It answers one region at a time. Slowly. This crate asks all the
//! questions anyway."
//!
//! The pipeline: load the region codes once, then for each selected dataset
//! a small pool of throttled fetch workers drains a shared queue, successful
//! records pile up per dataset, and when the queue runs dry the pile becomes
//! one CSV snapshot. A failed request costs that one region, never the run.
//! 🦆

pub mod app_config;
pub mod catalog;
pub mod common;
pub mod error;
pub mod regions;
pub mod sink;
pub mod throttle;

mod collector;
mod progress;
mod upstream;
mod workers;

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use futures::{StreamExt, stream};
use indicatif::MultiProgress;
use tracing::info;

pub use app_config::{AppConfig, load_config};
pub use common::{DatasetReport, RunSummary};

/// 🚀 Collects every selected dataset against every region code and returns
/// the per-dataset tallies.
///
/// ⚠️ Aborts only before the first request leaves the building: unreadable
/// region file, empty region list, or a dataset selection that matches
/// nothing. Past that point failures are tallied, not thrown — the batch
/// always crosses the finish line.
pub async fn run(config: AppConfig) -> Result<RunSummary> {
    let started = Instant::now();

    // 🗺️ The guest list. No regions, no party.
    let regions = regions::load(&config.regions_file)
        .context("💀 Couldn't load the region codes. No list, no requests, no run.")?;
    if regions.is_empty() {
        bail!(
            "region code file '{}' contains no usable region codes",
            config.regions_file.display()
        );
    }
    info!("🗺️ Loaded {} region codes — the guest list is set", regions.len());

    let defs = catalog::select(&config.datasets);
    if defs.is_empty() {
        bail!("dataset selection matches nothing in the catalog");
    }

    let client = Arc::new(
        upstream::UpstreamClient::new(&config.upstream, &config.service_key)
            .context("💀 Couldn't build the upstream client. reqwest said no before we even dialed.")?,
    );
    let throttle: Arc<dyn throttle::Throttle> =
        Arc::new(throttle::JitterThrottle::from_config(&config.throttle));
    let multi = MultiProgress::new();

    info!(
        "🚀 Collecting {} datasets ({} at a time, {} fetch workers each) — send it, politely",
        defs.len(),
        config.runtime.dataset_parallelism,
        config.runtime.fetch_workers
    );

    // 🧵 Datasets share nothing but the client, the throttle policy, and the
    // progress multiplexer; each gets its own accumulator and its own output
    // file. Embarrassingly parallel, and proud of it.
    let mut reports: Vec<DatasetReport> = stream::iter(defs)
        .map(|def| {
            collector::collect_dataset(
                def,
                &regions,
                Arc::clone(&client),
                Arc::clone(&throttle),
                &config.runtime,
                &config.output_dir,
                &multi,
            )
        })
        .buffer_unordered(config.runtime.dataset_parallelism.max(1))
        .collect()
        .await;
    reports.sort_by_key(|report| (report.group, report.seq));

    Ok(RunSummary {
        reports,
        elapsed: started.elapsed(),
    })
}
