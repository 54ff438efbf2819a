//! 🏭 Per-dataset collection — a queue of region codes drained by a small
//! pool of fetch workers, accumulating into one shared context.
//!
//! 🎬 *[a channel fills with region codes. somewhere, a worker waits.]*
//! *[the throttle says "not yet." the worker waits some more.]*

use std::path::Path;
use std::sync::Arc;

use indicatif::MultiProgress;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::app_config::RuntimeConfig;
use crate::catalog::DatasetDefinition;
use crate::common::{DatasetReport, Record, RegionCode};
use crate::error::FetchError;
use crate::progress::ProgressMetrics;
use crate::sink;
use crate::throttle::Throttle;
use crate::upstream::UpstreamClient;
use crate::workers::{FetchWorker, Worker};

/// 🧺 Shared state for one dataset collection, owned by the workers for
/// the duration of the run.
///
/// One lock guards the accumulator, the tally, and the progress render
/// together, so an append and its log line are a single atomic step and
/// worker output never interleaves mid-record. The lock is held only for
/// that one append-and-log — grab, scribble, release, back to the field.
#[derive(Debug)]
pub(crate) struct CollectContext {
    def: DatasetDefinition,
    state: Mutex<CollectState>,
}

#[derive(Debug)]
struct CollectState {
    records: Vec<Record>,
    succeeded: usize,
    failed: usize,
    empty: usize,
    progress: ProgressMetrics,
}

impl CollectContext {
    fn new(def: DatasetDefinition, progress: ProgressMetrics) -> Self {
        Self {
            def,
            state: Mutex::new(CollectState {
                records: Vec::new(),
                succeeded: 0,
                failed: 0,
                empty: 0,
                progress,
            }),
        }
    }

    pub(crate) fn definition(&self) -> &DatasetDefinition {
        &self.def
    }

    pub(crate) async fn record_item(&self, region: &RegionCode, record: Record) {
        let mut state = self.state.lock().await;
        debug!(
            "📦 [{}] region {} delivered {} fields",
            self.def.name,
            region,
            record.len()
        );
        state.records.push(record);
        state.succeeded += 1;
        state.progress.update(true);
    }

    pub(crate) async fn record_empty(&self, region: &RegionCode) {
        let mut state = self.state.lock().await;
        debug!("🫙 [{}] region {} had nothing to declare", self.def.name, region);
        state.empty += 1;
        state.progress.update(false);
    }

    pub(crate) async fn record_failure(&self, region: &RegionCode, error: &FetchError) {
        let mut state = self.state.lock().await;
        warn!("💥 [{}] region {} failed: {}", self.def.name, region, error);
        state.failed += 1;
        state.progress.update(false);
    }

    /// 🧾 Takes the accumulated records and final counts once the queue is
    /// exhausted and every worker has clocked out.
    async fn drain(&self) -> (Vec<Record>, usize, usize, usize) {
        let mut state = self.state.lock().await;
        state.progress.finish();
        let records = std::mem::take(&mut state.records);
        (records, state.succeeded, state.failed, state.empty)
    }
}

/// 🏭 Runs one dataset against every region code and writes its snapshot.
///
/// Per-unit failures are tallied, never propagated; a snapshot write
/// failure is logged and reported as a missing output. The returned report
/// always satisfies `succeeded + failed == regions.len()` — the books
/// balance or the books are a bug.
pub(crate) async fn collect_dataset(
    def: DatasetDefinition,
    regions: &[RegionCode],
    client: Arc<UpstreamClient>,
    throttle: Arc<dyn Throttle>,
    runtime: &RuntimeConfig,
    output_dir: &Path,
    multi: &MultiProgress,
) -> DatasetReport {
    info!(
        "🏭 [{}] collecting {} regions with {} workers",
        def.name,
        regions.len(),
        runtime.fetch_workers
    );

    let progress = ProgressMetrics::new(multi, &def.name, regions.len());
    let ctx = Arc::new(CollectContext::new(def, progress));

    let (tx, rx) = async_channel::bounded(runtime.queue_capacity.max(1));
    let feeder = tokio::spawn({
        let codes = regions.to_vec();
        async move {
            for code in codes {
                // -- 🏳️ a closed queue means every worker is gone; nothing
                // left to feed, nobody left to feed it to
                if tx.send(code).await.is_err() {
                    break;
                }
            }
        }
    });

    let handles: Vec<_> = (0..runtime.fetch_workers.max(1))
        .map(|i| {
            FetchWorker::new(
                i + 1,
                rx.clone(),
                Arc::clone(&client),
                Arc::clone(&throttle),
                Arc::clone(&ctx),
            )
            .start()
        })
        .collect();
    drop(rx);

    if let Err(error) = feeder.await {
        warn!("💀 region feeder task failed: {error}");
    }
    for handle in handles {
        match handle.await {
            Ok(Ok(())) => {}
            Ok(Err(error)) => warn!("💀 fetch worker exited with an error: {error}"),
            Err(error) => warn!("💀 fetch worker panicked: {error}"),
        }
    }

    let (mut records, succeeded, failed, empty) = ctx.drain().await;
    let def = ctx.definition();

    // -- 🔀 workers append in whatever order the network felt like; stable
    // ordering is an explicit post-pass where the dataset asks for one
    if def.sort_by_region {
        records.sort_by(|a, b| {
            a.get("stdg_Cd")
                .unwrap_or("")
                .cmp(b.get("stdg_Cd").unwrap_or(""))
        });
    }

    let output = match sink::write(def, &records, output_dir).await {
        Ok(path) => path,
        Err(error) => {
            warn!("💀 [{}] snapshot write failed: {}", def.name, error);
            None
        }
    };

    info!(
        "🏁 [{}] done — {} ok, {} failed",
        def.name,
        succeeded,
        failed + empty
    );

    DatasetReport {
        group: def.group,
        seq: def.seq,
        name: def.name.clone(),
        stem: def.stem.clone(),
        succeeded,
        failed: failed + empty,
        empty,
        output,
    }
}
