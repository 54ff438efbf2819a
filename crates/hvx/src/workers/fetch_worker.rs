//! 🎬 *[a queue fills with region codes. somewhere, a fetch worker waits.]*
//! *[the throttle counts milliseconds. the worker respects the throttle.]*
//! *[nobody asked for ten-digit soil bureaucracy. and yet, here we are.]*
//!
//! 🚜 The FetchWorker — patient, throttled, and deeply unbothered by what
//! the upstream thinks of any individual region. It pulls a code, waits
//! its turn, asks the question, records exactly one outcome, and reaches
//! for the next code. It is the field hand of this pipeline.
//!
//! 🦆 (the duck defers all soil questions to the API)

use std::sync::Arc;

use anyhow::Result;
use async_channel::Receiver;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::collector::CollectContext;
use crate::common::RegionCode;
use crate::throttle::Throttle;
use crate::upstream::{Fetched, UpstreamClient};
use crate::workers::Worker;

/// 🚜 One member of a dataset's fetch pool: pulls region codes off the
/// shared queue, throttles, fetches, and records exactly one outcome per
/// code. No retries, no grudges.
///
/// Workers never talk to each other — the queue closing is the only stop
/// signal, and the collect context's lock is the only shared state.
#[derive(Debug)]
pub(crate) struct FetchWorker {
    id: usize,
    rx: Receiver<RegionCode>,
    client: Arc<UpstreamClient>,
    throttle: Arc<dyn Throttle>,
    ctx: Arc<CollectContext>,
}

impl FetchWorker {
    pub(crate) fn new(
        id: usize,
        rx: Receiver<RegionCode>,
        client: Arc<UpstreamClient>,
        throttle: Arc<dyn Throttle>,
        ctx: Arc<CollectContext>,
    ) -> Self {
        // 🔧 Five fields. One job. Zero drama.
        Self {
            id,
            rx,
            client,
            throttle,
            ctx,
        }
    }
}

impl Worker for FetchWorker {
    fn start(self) -> JoinHandle<Result<()>> {
        tokio::spawn(async move {
            debug!(
                "🚜 [{}] fetch worker {} clocking in",
                self.ctx.definition().name,
                self.id
            );
            loop {
                match self.rx.recv().await {
                    Ok(region) => {
                        // -- 🐢 throttle first, always. the API remembers.
                        self.throttle.before_request().await;
                        match self.client.fetch(self.ctx.definition(), &region).await {
                            Ok(Fetched::Item(record)) => {
                                self.ctx.record_item(&region, record).await;
                            }
                            Ok(Fetched::Empty) => self.ctx.record_empty(&region).await,
                            Err(error) => self.ctx.record_failure(&region, &error).await,
                        }
                    }
                    Err(_) => {
                        // -- 🏁 queue empty and closed; this worker is done
                        debug!("🏁 fetch worker {}: queue drained, clocking out", self.id);
                        return Ok(());
                    }
                }
            }
        })
    }
}
