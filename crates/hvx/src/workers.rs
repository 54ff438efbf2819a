//! 🧵 Workers — the ones who actually do the fetching while the collector
//! takes the credit in the summary table.

use anyhow::Result;
use tokio::task::JoinHandle;

mod fetch_worker;

pub(crate) use fetch_worker::FetchWorker;

/// 🏗️ A background worker that runs until its work queue closes.
///
/// "What's the DEAL with work queues? You put work in, work comes out.
///  Nobody ever asks how the worker feels about it."
pub(crate) trait Worker {
    /// 🚀 Start the worker. Returns a JoinHandle because we trust but
    /// verify. Mostly verify.
    fn start(self) -> JoinHandle<Result<()>>;
}
